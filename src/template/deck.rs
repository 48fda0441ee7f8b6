//! The deck a template operates on.
//!
//! [`Deck`] is the narrow view of a presentation the label resolver and the
//! replacement operations need: slides, shapes with text and geometry, and
//! a handful of edits. [`PptxDeck`](crate::ooxml::pptx::PptxDeck) implements
//! it over a .pptx file; [`MemoryDeck`] keeps everything in memory.

use crate::ooxml::pptx::ImageFormat;
use crate::template::error::{Result, TemplateError};
use crate::template::table::Grid;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reference to a shape: 0-based slide index plus the shape's id, which is
/// unique within its slide and stable while other shapes change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeRef {
    pub slide: usize,
    pub shape_id: u32,
}

/// Position and size of a shape in EMUs (914400 per inch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// Image bytes with their sniffed format.
#[derive(Debug, Clone)]
pub struct Image {
    data: Vec<u8>,
    format: ImageFormat,
    description: String,
}

impl Image {
    /// Wrap image bytes, detecting the format from the content.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let format = ImageFormat::detect(&data).ok_or_else(|| {
            TemplateError::UnsupportedImage(
                "not a PNG, JPEG, GIF, BMP or TIFF image".to_string(),
            )
        })?;
        Ok(Self {
            data,
            format,
            description: String::new(),
        })
    }

    /// Read an image file. The file name becomes the description.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let image = Self::from_bytes(data).map_err(|_| {
            TemplateError::UnsupportedImage(format!(
                "{}: not a PNG, JPEG, GIF, BMP or TIFF image",
                path.display()
            ))
        })?;
        let description = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(image.with_description(description))
    }

    /// Set the alternative text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A presentation as seen by the template filler.
pub trait Deck {
    /// Number of slides.
    fn slide_count(&self) -> usize;

    /// Shapes of a slide, in document order.
    fn shapes(&self, slide: usize) -> Result<Vec<ShapeRef>>;

    /// Visible text of a shape, `None` if it cannot hold text.
    fn shape_text(&self, shape: ShapeRef) -> Result<Option<String>>;

    /// Replace the text of a shape.
    fn set_shape_text(&mut self, shape: ShapeRef, text: &str) -> Result<()>;

    /// Position and size of a shape.
    fn geometry(&self, shape: ShapeRef) -> Result<Geometry>;

    /// Insert a table on `slide` covering `geometry`.
    fn add_table(&mut self, slide: usize, geometry: Geometry, grid: &Grid) -> Result<ShapeRef>;

    /// Insert a picture on `slide` stretched over `geometry`.
    fn add_picture(&mut self, slide: usize, geometry: Geometry, image: &Image)
    -> Result<ShapeRef>;

    /// Delete a shape.
    fn remove_shape(&mut self, shape: ShapeRef) -> Result<()>;

    /// Write the deck to `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// File the deck was loaded from, if any.
    fn source_path(&self) -> Option<&Path> {
        None
    }
}

/// What a shape of a [`MemoryDeck`] holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeContent {
    Text(String),
    Table {
        cells: Vec<Vec<String>>,
        column_widths: Vec<i64>,
    },
    Picture {
        format: String,
        bytes: usize,
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryShape {
    pub id: u32,
    pub geometry: Geometry,
    pub content: ShapeContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySlide {
    pub shapes: Vec<MemoryShape>,
}

/// In-memory deck.
///
/// Saving writes a YAML snapshot of the slides.
///
/// # Examples
///
/// ```
/// use pptx_blueprint::template::{Deck, Geometry, MemoryDeck};
///
/// let mut deck = MemoryDeck::new();
/// let slide = deck.add_slide();
/// let shape = deck.add_text(slide, "{title}", Geometry::default());
/// assert_eq!(deck.shape_text(shape).unwrap().as_deref(), Some("{title}"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDeck {
    slides: Vec<MemorySlide>,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl MemoryDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML snapshot written by [`Deck::save`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let mut deck: Self = serde_saphyr::from_str(&yaml)
            .map_err(|e| TemplateError::Plan(format!("{}: {}", path.display(), e)))?;
        deck.source = Some(path.to_path_buf());
        Ok(deck)
    }

    /// Append an empty slide and return its index.
    pub fn add_slide(&mut self) -> usize {
        self.slides.push(MemorySlide::default());
        self.slides.len() - 1
    }

    /// Add a text shape to a slide.
    ///
    /// # Panics
    ///
    /// Panics if `slide` is out of range.
    pub fn add_text(&mut self, slide: usize, text: &str, geometry: Geometry) -> ShapeRef {
        self.push_shape(slide, geometry, ShapeContent::Text(text.to_string()))
    }

    /// Slides in order.
    #[inline]
    pub fn slides(&self) -> &[MemorySlide] {
        &self.slides
    }

    /// Look up a shape.
    pub fn shape(&self, shape: ShapeRef) -> Option<&MemoryShape> {
        self.slides
            .get(shape.slide)?
            .shapes
            .iter()
            .find(|s| s.id == shape.shape_id)
    }

    fn shape_mut(&mut self, shape: ShapeRef) -> Result<&mut MemoryShape> {
        self.slides
            .get_mut(shape.slide)
            .and_then(|s| s.shapes.iter_mut().find(|s| s.id == shape.shape_id))
            .ok_or(TemplateError::ShapeNotFound {
                slide: shape.slide,
                shape_id: shape.shape_id,
            })
    }

    fn push_shape(&mut self, slide: usize, geometry: Geometry, content: ShapeContent) -> ShapeRef {
        let shapes = &mut self.slides[slide].shapes;
        let id = shapes.iter().map(|s| s.id).max().unwrap_or(1) + 1;
        shapes.push(MemoryShape {
            id,
            geometry,
            content,
        });
        ShapeRef {
            slide,
            shape_id: id,
        }
    }

    fn check_slide(&self, slide: usize) -> Result<()> {
        if slide < self.slides.len() {
            Ok(())
        } else {
            Err(TemplateError::SlideIndex {
                number: i64::try_from(slide).map_or(i64::MAX, |n| n.saturating_add(1)),
                slide_count: self.slides.len(),
            })
        }
    }
}

impl Deck for MemoryDeck {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn shapes(&self, slide: usize) -> Result<Vec<ShapeRef>> {
        self.check_slide(slide)?;
        Ok(self.slides[slide]
            .shapes
            .iter()
            .map(|s| ShapeRef {
                slide,
                shape_id: s.id,
            })
            .collect())
    }

    fn shape_text(&self, shape: ShapeRef) -> Result<Option<String>> {
        let found = self.shape(shape).ok_or(TemplateError::ShapeNotFound {
            slide: shape.slide,
            shape_id: shape.shape_id,
        })?;
        Ok(match &found.content {
            ShapeContent::Text(text) => Some(text.clone()),
            _ => None,
        })
    }

    fn set_shape_text(&mut self, shape: ShapeRef, text: &str) -> Result<()> {
        self.shape_mut(shape)?.content = ShapeContent::Text(text.to_string());
        Ok(())
    }

    fn geometry(&self, shape: ShapeRef) -> Result<Geometry> {
        self.shape(shape)
            .map(|s| s.geometry)
            .ok_or(TemplateError::ShapeNotFound {
                slide: shape.slide,
                shape_id: shape.shape_id,
            })
    }

    fn add_table(&mut self, slide: usize, geometry: Geometry, grid: &Grid) -> Result<ShapeRef> {
        self.check_slide(slide)?;
        let cells = (0..grid.row_count())
            .map(|r| {
                (0..grid.column_count())
                    .map(|c| grid.cell(r, c).to_string())
                    .collect()
            })
            .collect();
        let content = ShapeContent::Table {
            cells,
            column_widths: grid.column_widths().to_vec(),
        };
        Ok(self.push_shape(slide, geometry, content))
    }

    fn add_picture(
        &mut self,
        slide: usize,
        geometry: Geometry,
        image: &Image,
    ) -> Result<ShapeRef> {
        self.check_slide(slide)?;
        let content = ShapeContent::Picture {
            format: image.format().to_string(),
            bytes: image.data().len(),
            description: image.description().to_string(),
        };
        Ok(self.push_shape(slide, geometry, content))
    }

    fn remove_shape(&mut self, shape: ShapeRef) -> Result<()> {
        let slide = self
            .slides
            .get_mut(shape.slide)
            .ok_or(TemplateError::ShapeNotFound {
                slide: shape.slide,
                shape_id: shape.shape_id,
            })?;
        let before = slide.shapes.len();
        slide.shapes.retain(|s| s.id != shape.shape_id);
        if slide.shapes.len() == before {
            return Err(TemplateError::ShapeNotFound {
                slide: shape.slide,
                shape_id: shape.shape_id,
            });
        }
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_saphyr::to_string(self)
            .map_err(|e| TemplateError::Plan(format!("failed to serialize deck: {}", e)))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
