/// Slide part: a slide's XML with an index of its shape tree.
///
/// Slide layouts and masters share the `p:cSld/p:spTree` structure and are
/// loaded through the same type when placeholder geometry has to be
/// inherited.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::PackURI;
use crate::ooxml::pptx::shapes::base::{BaseShape, index_shape_tree};
use crate::ooxml::pptx::shapes::textframe::TextFrame;

const REL_NS_DECL: &str =
    r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

#[derive(Debug, Clone)]
pub struct SlidePart {
    partname: PackURI,
    xml: String,
    shapes: Vec<BaseShape>,
    /// Offset of `</p:spTree>`
    tree_end: usize,
    /// Highest shape id in the tree, nested shapes included
    max_id: u32,
}

impl SlidePart {
    /// Parse a slide, layout or master part.
    pub fn from_xml(partname: PackURI, blob: &[u8]) -> Result<Self> {
        let xml = std::str::from_utf8(blob)
            .map_err(|e| OoxmlError::Xml(format!("{}: {}", partname, e)))?
            .to_string();
        let tree = index_shape_tree(&xml)?;
        Ok(Self {
            partname,
            xml,
            shapes: tree.shapes,
            tree_end: tree.end,
            max_id: tree.max_id,
        })
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Current XML of the part.
    #[inline]
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Shapes of the shape tree in document order.
    #[inline]
    pub fn shapes(&self) -> &[BaseShape] {
        &self.shapes
    }

    /// Find a shape by its `p:cNvPr/@id`.
    pub fn shape(&self, shape_id: u32) -> Option<&BaseShape> {
        self.shapes.iter().find(|s| s.id() == shape_id)
    }

    /// XML of one shape element.
    pub fn shape_xml(&self, shape_id: u32) -> Option<&str> {
        self.shape(shape_id).map(|s| &self.xml[s.span()])
    }

    /// Text of a shape; `None` for shapes without a text frame.
    pub fn shape_text(&self, shape_id: u32) -> Result<Option<String>> {
        let shape = self.require(shape_id)?;
        if !shape.shape_type().has_text_frame() {
            return Ok(None);
        }
        TextFrame::new(&self.xml[shape.span()]).text()
    }

    /// Replace the text of an auto shape.
    pub fn set_shape_text(&mut self, shape_id: u32, text: &str) -> Result<()> {
        let shape = self.require(shape_id)?;
        if !shape.shape_type().has_text_frame() {
            return Err(OoxmlError::InvalidFormat(format!(
                "shape {} ({:?}) has no text frame",
                shape_id,
                shape.shape_type()
            )));
        }
        let span = shape.span();
        let replaced = TextFrame::new(&self.xml[span.clone()]).replace_text(text)?;
        self.splice(span, &replaced)
    }

    /// Id for a new shape: one past the highest id on the slide, counting
    /// shapes inside groups.
    ///
    /// The shape tree's own `p:nvGrpSpPr` usually holds id 1, so a new
    /// shape on an empty slide gets 2.
    pub fn next_shape_id(&self) -> u32 {
        self.max_id.max(1).saturating_add(1)
    }

    /// Append a shape element at the end of the shape tree, on top of the
    /// existing shapes.
    pub fn append_shape(&mut self, shape_xml: &str) -> Result<()> {
        if shape_xml.contains(" r:") && !self.declares_rel_namespace() {
            self.declare_rel_namespace()?;
        }
        let at = self.tree_end;
        self.splice(at..at, shape_xml)
    }

    /// Remove a shape element from the shape tree.
    pub fn remove_shape(&mut self, shape_id: u32) -> Result<()> {
        let span = self.require(shape_id)?.span();
        self.splice(span, "")
    }

    fn require(&self, shape_id: u32) -> Result<&BaseShape> {
        self.shape(shape_id).ok_or_else(|| {
            OoxmlError::PartNotFound(format!("shape {} in {}", shape_id, self.partname))
        })
    }

    fn splice(&mut self, span: std::ops::Range<usize>, replacement: &str) -> Result<()> {
        self.xml.replace_range(span, replacement);
        let tree = index_shape_tree(&self.xml)?;
        self.shapes = tree.shapes;
        self.tree_end = tree.end;
        self.max_id = tree.max_id;
        Ok(())
    }

    /// Offset and text of the root element's start tag.
    fn root_tag(&self) -> Option<(usize, &str)> {
        let mut from = 0;
        while let Some(pos) = self.xml[from..].find('<') {
            let start = from + pos;
            let rest = &self.xml[start + 1..];
            if !rest.starts_with('?') && !rest.starts_with('!') {
                let end = self.xml[start..].find('>')? + start;
                return Some((start, &self.xml[start..end]));
            }
            from = start + 1;
        }
        None
    }

    fn declares_rel_namespace(&self) -> bool {
        self.root_tag()
            .is_some_and(|(_, tag)| tag.contains("xmlns:r="))
    }

    fn declare_rel_namespace(&mut self) -> Result<()> {
        let (start, tag) = self
            .root_tag()
            .ok_or_else(|| OoxmlError::InvalidFormat(format!("{} has no root element", self.partname)))?;
        let name_end = tag
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(tag.len());
        let at = start + name_end;
        self.splice(at..at, REL_NS_DECL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::base::ShapeType;

    const SLIDE: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>{title}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="Body"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>{body}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        r#"</p:spTree></p:cSld></p:sld>"#
    );

    fn slide() -> SlidePart {
        SlidePart::from_xml(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            SLIDE.as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_shape_text() {
        let slide = slide();
        assert_eq!(slide.shapes().len(), 2);
        assert_eq!(slide.shape_text(2).unwrap().as_deref(), Some("{title}"));
        assert_eq!(slide.shape_text(5).unwrap().as_deref(), Some("{body}"));
        assert!(matches!(slide.shape_text(3), Err(OoxmlError::PartNotFound(_))));
    }

    #[test]
    fn test_set_text_reindexes() {
        let mut slide = slide();
        slide.set_shape_text(2, "A much longer title than before").unwrap();
        assert_eq!(
            slide.shape_text(2).unwrap().as_deref(),
            Some("A much longer title than before")
        );
        // the following shape moved but is still found
        assert_eq!(slide.shape_text(5).unwrap().as_deref(), Some("{body}"));
        assert!(slide.xml().contains(r#"<a:rPr lang="en-US"/><a:t>A much"#));
    }

    #[test]
    fn test_append_and_remove() {
        let mut slide = slide();
        assert_eq!(slide.next_shape_id(), 6);

        let pic = r#"<p:pic><p:nvPicPr><p:cNvPr id="6" name="Picture 5"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/></p:blipFill><p:spPr/></p:pic>"#;
        slide.append_shape(pic).unwrap();
        assert!(slide.xml().contains("xmlns:r="));
        assert_eq!(slide.shapes().len(), 3);
        assert_eq!(slide.shapes()[2].shape_type(), ShapeType::Picture);
        assert_eq!(slide.shape_text(6).unwrap(), None);

        slide.remove_shape(2).unwrap();
        let ids: Vec<u32> = slide.shapes().iter().map(|s| s.id()).collect();
        assert_eq!(ids, [5, 6]);
        assert!(!slide.xml().contains("{title}"));
        assert!(slide.xml().ends_with("</p:spTree></p:cSld></p:sld>"));
    }

    #[test]
    fn test_next_id_counts_grouped_shapes() {
        let xml = SLIDE.replace(
            "</p:spTree>",
            concat!(
                r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="6" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#,
                r#"<p:sp><p:nvSpPr><p:cNvPr id="8" name="Inner"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#,
                r#"</p:grpSp></p:spTree>"#
            ),
        );
        let mut slide =
            SlidePart::from_xml(PackURI::new("/ppt/slides/slide1.xml").unwrap(), xml.as_bytes())
                .unwrap();
        let ids: Vec<u32> = slide.shapes().iter().map(|s| s.id()).collect();
        assert_eq!(ids, [2, 5, 6]);
        assert_eq!(slide.next_shape_id(), 9);

        // still counted after the grouped shape's neighbours change
        slide.remove_shape(5).unwrap();
        assert_eq!(slide.next_shape_id(), 9);
    }

    #[test]
    fn test_next_id_on_empty_tree() {
        let xml = r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld></p:sld>"#;
        let slide =
            SlidePart::from_xml(PackURI::new("/ppt/slides/slide1.xml").unwrap(), xml.as_bytes())
                .unwrap();
        assert_eq!(slide.next_shape_id(), 2);
    }

    #[test]
    fn test_set_text_drops_control_characters() {
        let mut slide = slide();
        slide.set_shape_text(2, "a\u{1}b").unwrap();
        assert!(!slide.xml().contains('\u{1}'));
        assert_eq!(slide.shape_text(2).unwrap().as_deref(), Some("ab"));
    }

    #[test]
    fn test_set_text_rejects_picture() {
        let mut slide = slide();
        let pic = r#"<p:pic><p:nvPicPr><p:cNvPr id="6" name="Picture 5"/></p:nvPicPr><p:spPr/></p:pic>"#;
        slide.append_shape(pic).unwrap();
        assert!(matches!(
            slide.set_shape_text(6, "x"),
            Err(OoxmlError::InvalidFormat(_))
        ));
    }
}
