/// Error types for template filling.
use crate::ooxml::error::OoxmlError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors raised while resolving labels or filling a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The label has no `:` separator or an empty tag
    #[error("Malformed label {label:?}: {reason}")]
    MalformedLabel { label: String, reason: &'static str },

    /// The slide selector is neither `*` nor an integer
    #[error("Invalid slide selector {0:?}: expected a slide number or '*'")]
    InvalidSelector(String),

    /// The slide number does not name a slide of the deck
    #[error("Slide {number} is out of range: the deck has {slide_count} slides")]
    SlideIndex { number: i64, slide_count: usize },

    /// Table dimensions do not agree with its labels
    #[error("Table shape mismatch: {0}")]
    TableShape(String),

    /// The grid to insert would have no rows or no columns
    #[error("Table has no cells: {rows} rows x {columns} columns")]
    EmptyTable { rows: usize, columns: usize },

    /// The image bytes are not in a supported format
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// A shape reference does not resolve
    #[error("Shape {shape_id} not found on slide {}", .slide + 1)]
    ShapeNotFound { slide: usize, shape_id: u32 },

    /// Saving would overwrite the template the deck was opened from
    #[error("Refusing to overwrite the template file {}", .0.display())]
    OverwriteTemplate(PathBuf),

    /// A fill plan or deck snapshot could not be read or written
    #[error("YAML error: {0}")]
    Plan(String),

    /// Presentation package error
    #[error("OOXML error: {0}")]
    Ooxml(#[from] OoxmlError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::ooxml::opc::error::OpcError> for TemplateError {
    fn from(err: crate::ooxml::opc::error::OpcError) -> Self {
        TemplateError::Ooxml(err.into())
    }
}
