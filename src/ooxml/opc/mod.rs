/// Open Packaging Conventions (OPC) implementation.
///
/// The subset of OPC needed to open a presentation package, edit a handful of
/// parts and write it back:
///
/// - Package structure (parts held in archive order)
/// - Content type management (`[Content_Types].xml`)
/// - Relationships (`*.rels`)
/// - ZIP-based physical packaging

pub mod constants;
pub mod content_types;
pub mod error;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
