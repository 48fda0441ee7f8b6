/// Package implementation for PowerPoint presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::format::ImageFormat;
use crate::ooxml::pptx::parts::{PresentationPart, SlidePart};
use crate::ooxml::pptx::shapes::PlaceholderKey;
use crate::template::Geometry;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A PowerPoint (.pptx) package opened for editing.
///
/// Slides are parsed once on open and kept in presentation order. Every
/// mutation is written straight back into the underlying OPC package, so
/// the package can be serialized at any time.
///
/// # Examples
///
/// ```rust,no_run
/// use pptx_blueprint::ooxml::pptx::Package;
///
/// let pkg = Package::open("template.pptx")?;
/// println!("Presentation has {} slides", pkg.slide_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Package {
    opc: OpcPackage,
    slides: Vec<SlidePart>,
    /// Media parts added since the package was loaded
    media: Vec<PackURI>,
    /// File the package was opened from
    source: Option<PathBuf>,
}

impl Package {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut pkg = Self::from_opc(OpcPackage::open(path)?)?;
        pkg.source = Some(path.to_path_buf());
        debug!(path = %path.display(), slides = pkg.slide_count(), "opened presentation");
        Ok(pkg)
    }

    /// Load a .pptx package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    /// Load a .pptx package from its bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main = opc
            .main_document_partname()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        // Support both regular and macro-enabled presentations
        let content_type = opc.content_type(&main)?;
        if content_type != ct::PML_PRESENTATION_MAIN && content_type != ct::PML_PRES_MACRO_MAIN {
            return Err(OoxmlError::InvalidContentType {
                expected: format!(
                    "{} or {}",
                    ct::PML_PRESENTATION_MAIN,
                    ct::PML_PRES_MACRO_MAIN
                ),
                got: content_type.to_string(),
            });
        }

        let presentation = PresentationPart::from_xml(opc.part(&main)?)?;
        let rels = opc.relationships(&main)?;
        let slides = presentation
            .slide_r_ids()
            .iter()
            .map(|r_id| {
                let partname = rels.target_partname(r_id)?;
                let blob = opc.part(&partname)?;
                SlidePart::from_xml(partname, blob)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            opc,
            slides,
            media: Vec::new(),
            source: None,
        })
    }

    /// Path the package was opened from, if any.
    #[inline]
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of slides.
    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides in presentation order.
    #[inline]
    pub fn slides(&self) -> &[SlidePart] {
        &self.slides
    }

    /// Slide at a 0-based index.
    pub fn slide(&self, index: usize) -> Result<&SlidePart> {
        self.slides
            .get(index)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("slide {}", index + 1)))
    }

    /// Position and size of a shape.
    ///
    /// Placeholders without a transform of their own inherit it from the
    /// matching placeholder on the slide layout, then on the slide master.
    pub fn shape_geometry(&self, slide: usize, shape_id: u32) -> Result<Option<Geometry>> {
        let part = self.slide(slide)?;
        let shape = part.shape(shape_id).ok_or_else(|| {
            OoxmlError::PartNotFound(format!("shape {} on slide {}", shape_id, slide + 1))
        })?;

        match (shape.geometry(), shape.placeholder()) {
            (Some(geometry), _) => Ok(Some(geometry)),
            (None, Some(key)) => self.inherited_geometry(part.partname(), key),
            (None, None) => Ok(None),
        }
    }

    fn inherited_geometry(
        &self,
        slide: &PackURI,
        key: &PlaceholderKey,
    ) -> Result<Option<Geometry>> {
        let Some(layout) = self.related_part(slide, rt::SLIDE_LAYOUT)? else {
            return Ok(None);
        };

        // slide placeholders inherit from the layout placeholder with the same idx
        let layout_shape = layout
            .shapes()
            .iter()
            .find(|s| s.placeholder().is_some_and(|p| p.idx == key.idx));
        if let Some(geometry) = layout_shape.and_then(|s| s.geometry()) {
            return Ok(Some(geometry));
        }
        let key = layout_shape.and_then(|s| s.placeholder()).unwrap_or(key);

        let Some(master) = self.related_part(layout.partname(), rt::SLIDE_MASTER)? else {
            return Ok(None);
        };
        Ok(master
            .shapes()
            .iter()
            .find(|s| {
                s.placeholder()
                    .is_some_and(|p| p.kind() == key.master_kind())
            })
            .and_then(|s| s.geometry()))
    }

    /// Load the first part of type `reltype` related from `source`.
    fn related_part(&self, source: &PackURI, reltype: &str) -> Result<Option<SlidePart>> {
        let rels = self.opc.relationships(source)?;
        let Some(rel) = rels.first_of_type(reltype) else {
            return Ok(None);
        };
        let partname = rels.target_partname(rel.r_id())?;
        let blob = self.opc.part(&partname)?;
        SlidePart::from_xml(partname, blob).map(Some)
    }

    /// Replace the text of a shape.
    pub fn set_shape_text(&mut self, slide: usize, shape_id: u32, text: &str) -> Result<()> {
        self.edit_slide(slide, |part| part.set_shape_text(shape_id, text))
    }

    /// Id for a new shape on a slide.
    pub fn next_shape_id(&self, slide: usize) -> Result<u32> {
        Ok(self.slide(slide)?.next_shape_id())
    }

    /// Append shape XML to a slide's shape tree.
    pub fn append_shape(&mut self, slide: usize, shape_xml: &str) -> Result<()> {
        self.edit_slide(slide, |part| part.append_shape(shape_xml))
    }

    /// Remove a shape from a slide.
    pub fn remove_shape(&mut self, slide: usize, shape_id: u32) -> Result<()> {
        self.edit_slide(slide, |part| part.remove_shape(shape_id))
    }

    fn edit_slide<F>(&mut self, slide: usize, edit: F) -> Result<()>
    where
        F: FnOnce(&mut SlidePart) -> Result<()>,
    {
        let part = self
            .slides
            .get_mut(slide)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("slide {}", slide + 1)))?;
        edit(part)?;
        self.opc
            .set_part(part.partname().clone(), part.xml().as_bytes().to_vec());
        Ok(())
    }

    /// Store image bytes as a media part and register its content type.
    ///
    /// Bytes identical to media added earlier reuse that part.
    pub fn add_media(&mut self, data: &[u8], format: ImageFormat) -> PackURI {
        if let Some(existing) = self
            .media
            .iter()
            .find(|p| self.opc.part(p).is_ok_and(|blob| blob == data))
        {
            return existing.clone();
        }

        let partname = self.opc.next_partname("ppt/media/image", format.extension());
        self.opc
            .content_types_mut()
            .add_default(format.extension(), format.content_type());
        self.opc.set_part(partname.clone(), data.to_vec());
        self.media.push(partname.clone());
        debug!(part = %partname, bytes = data.len(), "added media part");
        partname
    }

    /// Relate a slide to a media part, returning the relationship id.
    pub fn relate_image(&mut self, slide: usize, media: &PackURI) -> Result<String> {
        let partname = self.slide(slide)?.partname().clone();
        let mut rels = self.opc.relationships(&partname)?;
        let r_id = rels.get_or_add(rt::IMAGE, media);
        self.opc.set_relationships(&partname, &rels);
        Ok(r_id)
    }

    /// Serialize the package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }

    /// Write the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.opc.save(path)?;
        Ok(())
    }
}
