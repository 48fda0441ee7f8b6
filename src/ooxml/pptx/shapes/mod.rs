/// Shapes on a slide.
///
/// - `base`: shape tree indexing, shape types and placeholder identity
/// - `textframe`: reading and rewriting `p:txBody`
pub mod base;
pub mod textframe;

pub use base::{BaseShape, PlaceholderKey, ShapeType};
pub use textframe::TextFrame;
