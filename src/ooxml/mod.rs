//! Office Open XML support.
//!
//! - `opc`: the package container (ZIP parts, content types, relationships)
//! - `pptx`: PresentationML on top of it

pub mod error;
pub mod opc;
pub mod pptx;
pub(crate) mod xml;

pub use error::{OoxmlError, Result};
