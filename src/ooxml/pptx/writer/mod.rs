//! XML generation for shapes inserted into existing slides.

pub mod shape;

pub use shape::{write_picture, write_table_frame};
