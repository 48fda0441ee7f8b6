//! PowerPoint (.pptx) presentation support.
//!
//! Just enough of PresentationML to fill a template: slides are read in
//! presentation order, shapes are located by id inside each slide's shape
//! tree, and edits splice the slide XML in place. Everything the filler
//! does not touch (layouts, masters, themes, notes, media) is carried
//! through byte for byte.
//!
//! - `Package`: the opened .pptx file
//! - `PptxDeck`: the same type seen through the [`Deck`](crate::template::Deck) trait
//! - `parts`: presentation and slide parts
//! - `shapes`: shape tree index and text frames
//! - `writer`: XML for inserted tables and pictures
//!
//! # Example
//!
//! ```rust,no_run
//! use pptx_blueprint::ooxml::pptx::Package;
//!
//! let mut pkg = Package::open("template.pptx")?;
//! let id = pkg.slide(0)?.shapes()[0].id();
//! pkg.set_shape_text(0, id, "Hello")?;
//! pkg.save("filled.pptx")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod deck;
pub mod format;
pub mod package;
pub mod parts;
pub mod shapes;
pub mod writer;

pub use deck::PptxDeck;
pub use format::ImageFormat;
pub use package::Package;
