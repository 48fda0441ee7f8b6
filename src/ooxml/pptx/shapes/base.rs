/// Base shape types for PowerPoint presentations.
///
/// Shapes are not materialized as trees. A slide keeps its XML as a string
/// and each shape is an index entry pointing at the byte range of its
/// element, plus the few properties read while scanning it.
use crate::ooxml::error::{OoxmlError, Result};
use crate::template::Geometry;
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use std::ops::Range;

/// Shape type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    /// An auto shape or text box (p:sp)
    Shape,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table or chart (p:graphicFrame)
    GraphicFrame,
    /// A group shape (p:grpSp)
    GroupShape,
    /// A connector shape (p:cxnSp)
    Connector,
}

impl ShapeType {
    /// Map a shape tree child's local name to its shape type.
    pub fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"sp" => Some(Self::Shape),
            b"pic" => Some(Self::Picture),
            b"graphicFrame" => Some(Self::GraphicFrame),
            b"grpSp" => Some(Self::GroupShape),
            b"cxnSp" => Some(Self::Connector),
            _ => None,
        }
    }

    /// Only auto shapes carry a text frame of their own.
    #[inline]
    pub fn has_text_frame(&self) -> bool {
        matches!(self, Self::Shape)
    }
}

/// Identity of a placeholder (`<p:ph type=".." idx=".."/>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderKey {
    /// The `type` attribute; absent means an object placeholder
    pub kind: Option<String>,
    /// The `idx` attribute; absent means 0
    pub idx: u32,
}

impl PlaceholderKey {
    /// Placeholder type with the schema default applied.
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("obj")
    }

    /// Type of the slide master placeholder this one inherits from.
    ///
    /// Masters only define title, body and the footer placeholders, so
    /// content placeholders all fall back to the master's body.
    pub fn master_kind(&self) -> &str {
        match self.kind() {
            "ctrTitle" | "title" => "title",
            "dt" => "dt",
            "ftr" => "ftr",
            "sldNum" => "sldNum",
            _ => "body",
        }
    }
}

/// A shape entry in a slide's shape tree.
#[derive(Debug, Clone)]
pub struct BaseShape {
    shape_type: ShapeType,
    /// `p:cNvPr/@id`, unique within the slide
    id: u32,
    /// `p:cNvPr/@name`
    name: String,
    placeholder: Option<PlaceholderKey>,
    /// Geometry from the shape's own transform, if it has one
    geometry: Option<Geometry>,
    /// Byte range of the shape element within the slide XML
    span: Range<usize>,
}

impl BaseShape {
    /// Get the shape type.
    #[inline]
    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// Get the shape id.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Get the shape name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholder identity, if this shape is a placeholder.
    #[inline]
    pub fn placeholder(&self) -> Option<&PlaceholderKey> {
        self.placeholder.as_ref()
    }

    /// Position and size declared on the shape itself.
    ///
    /// Placeholders usually leave this out and inherit it from the layout.
    #[inline]
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    /// Byte range of this shape within the slide XML.
    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

/// Index of a slide's shape tree.
#[derive(Debug, Clone)]
pub(crate) struct ShapeTree {
    /// Direct children of the tree in document order
    pub shapes: Vec<BaseShape>,
    /// Offset of the `</p:spTree>` end tag, where new shapes are inserted
    pub end: usize,
    /// Highest `p:cNvPr/@id` anywhere in the tree, grouped shapes and the
    /// tree's own properties included
    pub max_id: u32,
}

/// Index the direct children of the first `p:spTree` in `xml`.
pub(crate) fn index_shape_tree(xml: &str) -> Result<ShapeTree> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut tree_depth: Option<usize> = None;
    let mut shapes = Vec::new();
    let mut max_id = 0u32;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                let local = e.local_name();
                if tree_depth.is_none() && local.as_ref() == b"spTree" {
                    tree_depth = Some(depth);
                } else if tree_depth.is_some() && local.as_ref() == b"cNvPr" {
                    max_id = max_id.max(cnvpr_id(&e)?.unwrap_or(0));
                } else if tree_depth.is_some_and(|d| d + 1 == depth) {
                    if let Some(shape_type) = ShapeType::from_local_name(local.as_ref()) {
                        let scan = scan_shape(&mut reader)?;
                        depth -= 1;
                        max_id = max_id.max(scan.max_id);
                        shapes.push(BaseShape {
                            shape_type,
                            id: scan.id.unwrap_or(0),
                            name: scan.name,
                            placeholder: scan.placeholder,
                            geometry: scan.geometry,
                            span: before..scan.end,
                        });
                    }
                }
            },
            Event::Empty(e) if tree_depth.is_some() && e.local_name().as_ref() == b"cNvPr" => {
                max_id = max_id.max(cnvpr_id(&e)?.unwrap_or(0));
            },
            Event::End(e) => {
                if tree_depth == Some(depth) && e.local_name().as_ref() == b"spTree" {
                    return Ok(ShapeTree {
                        shapes,
                        end: before,
                        max_id,
                    });
                }
                depth = depth.saturating_sub(1);
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Err(OoxmlError::InvalidFormat(
        "slide part has no shape tree".to_string(),
    ))
}

/// Properties collected while walking one shape element.
#[derive(Default)]
struct ShapeScan {
    id: Option<u32>,
    /// Highest id of the shape and everything nested in it
    max_id: u32,
    name: String,
    placeholder: Option<PlaceholderKey>,
    geometry: Option<Geometry>,
    end: usize,
}

/// Walk a shape element whose start tag was just consumed, up to and
/// including its end tag.
fn scan_shape(reader: &mut Reader<&[u8]>) -> Result<ShapeScan> {
    let mut scan = ShapeScan::default();
    let mut depth = 1usize;
    // 0: no transform seen, 1: inside the first one, 2: done
    let mut xfrm_state = 0u8;
    let mut offset: Option<(i64, i64)> = None;
    let mut extent: Option<(i64, i64)> = None;

    loop {
        let decoder = reader.decoder();
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if e.local_name().as_ref() == b"xfrm" && xfrm_state == 0 {
                    xfrm_state = 1;
                }
                collect(&e, decoder, xfrm_state == 1, &mut scan, &mut offset, &mut extent)?;
            },
            Event::Empty(e) => {
                collect(&e, decoder, xfrm_state == 1, &mut scan, &mut offset, &mut extent)?;
            },
            Event::End(e) => {
                depth -= 1;
                if e.local_name().as_ref() == b"xfrm" && xfrm_state == 1 {
                    xfrm_state = 2;
                }
                if depth == 0 {
                    scan.end = reader.buffer_position() as usize;
                    break;
                }
            },
            Event::Eof => {
                return Err(OoxmlError::Xml(
                    "unexpected end of XML inside shape".to_string(),
                ));
            },
            _ => {},
        }
    }

    if let (Some((x, y)), Some((cx, cy))) = (offset, extent) {
        scan.geometry = Some(Geometry { x, y, cx, cy });
    }
    Ok(scan)
}

fn collect(
    e: &BytesStart<'_>,
    decoder: Decoder,
    in_xfrm: bool,
    scan: &mut ShapeScan,
    offset: &mut Option<(i64, i64)>,
    extent: &mut Option<(i64, i64)>,
) -> Result<()> {
    match e.local_name().as_ref() {
        b"cNvPr" if scan.id.is_none() => {
            for attr in e.attributes() {
                let attr = attr?;
                match attr.key.as_ref() {
                    b"id" => scan.id = parse_num::<u32>(&attr),
                    b"name" => scan.name = attr_string(&attr, decoder)?,
                    _ => {},
                }
            }
            scan.max_id = scan.max_id.max(scan.id.unwrap_or(0));
        },
        // children of a group shape
        b"cNvPr" => {
            scan.max_id = scan.max_id.max(cnvpr_id(e)?.unwrap_or(0));
        },
        b"ph" if scan.placeholder.is_none() => {
            let mut key = PlaceholderKey { kind: None, idx: 0 };
            for attr in e.attributes() {
                let attr = attr?;
                match attr.key.as_ref() {
                    b"type" => key.kind = Some(attr_string(&attr, decoder)?),
                    b"idx" => key.idx = parse_num::<u32>(&attr).unwrap_or(0),
                    _ => {},
                }
            }
            scan.placeholder = Some(key);
        },
        b"off" if in_xfrm && offset.is_none() => {
            *offset = Some(pair(e, b"x", b"y")?);
        },
        b"ext" if in_xfrm && extent.is_none() => {
            *extent = Some(pair(e, b"cx", b"cy")?);
        },
        _ => {},
    }
    Ok(())
}

fn cnvpr_id(e: &BytesStart<'_>) -> Result<Option<u32>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"id" {
            return Ok(parse_num(&attr));
        }
    }
    Ok(None)
}

/// Read two integer attributes, defaulting missing ones to zero.
fn pair(e: &BytesStart<'_>, first: &[u8], second: &[u8]) -> Result<(i64, i64)> {
    let mut a = 0;
    let mut b = 0;
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == first {
            a = parse_num(&attr).unwrap_or(0);
        } else if attr.key.as_ref() == second {
            b = parse_num(&attr).unwrap_or(0);
        }
    }
    Ok((a, b))
}

fn parse_num<T: std::str::FromStr>(attr: &Attribute<'_>) -> Option<T> {
    std::str::from_utf8(&attr.value).ok()?.trim().parse().ok()
}

pub(crate) fn attr_string(attr: &Attribute<'_>, decoder: Decoder) -> Result<String> {
    attr.decode_and_unescape_value(decoder)
        .map(|v| v.into_owned())
        .map_err(|e| OoxmlError::Xml(e.to_string()))
}

/// Consume events up to the end tag matching an already-consumed start tag
/// and return the offset just past it.
pub(crate) fn skip_subtree(reader: &mut Reader<&[u8]>) -> Result<usize> {
    let mut depth = 1usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(reader.buffer_position() as usize);
                }
            },
            Event::Eof => {
                return Err(OoxmlError::Xml(
                    "unexpected end of XML inside element".to_string(),
                ));
            },
            _ => {},
        }
    }
}
