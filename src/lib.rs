//! pptx-blueprint - fill PowerPoint templates
//!
//! A template is an ordinary .pptx file in which some shapes contain only a
//! bracketed tag such as `{title}` or `{logo}`. This crate finds those
//! shapes and replaces them with text, tables or pictures.
//!
//! Shapes are addressed by a label `"<slide>:<tag>"`: `"2:name"` is every
//! `{name}` shape on the second slide and `"*:logo"` every `{logo}` shape in
//! the deck.
//!
//! # Features
//!
//! - **Text**: keeps the placeholder's run and paragraph formatting
//! - **Tables**: optional header row and row-name column, sized to the placeholder
//! - **Pictures**: PNG, JPEG, GIF, BMP and TIFF, detected from content
//! - **Fill plans**: batches of replacements loaded from YAML
//! - **Untouched parts**: layouts, masters, themes and notes are written back as read
//!
//! # Example
//!
//! ```no_run
//! use pptx_blueprint::{LabeledTable, TableOptions, Template};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut template = Template::open("template.pptx")?;
//!
//! template.replace_text("1:title", "Quarterly report")?;
//! template.replace_picture("*:logo", "logo.png")?;
//!
//! let figures = LabeledTable::from_rows(
//!     vec!["Q1".to_string(), "Q2".to_string()],
//!     vec![vec!["10".to_string(), "12".to_string()]],
//! )?;
//! template.replace_table("2:figures", &figures, &TableOptions::new().with_header(true))?;
//!
//! template.save("report.pptx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Fill plan
//!
//! ```no_run
//! use pptx_blueprint::{FillPlan, Template};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let plan = FillPlan::open("report.yaml")?;
//! let mut template = Template::open("template.pptx")?;
//! template.apply_plan(&plan)?;
//! template.save("report.pptx")?;
//! # Ok(())
//! # }
//! ```

pub mod ooxml;
pub mod template;

pub use ooxml::pptx::{ImageFormat, PptxDeck};
pub use template::{
    Deck, FillPlan, FillStep, Geometry, Grid, Image, Label, LabeledTable, MemoryDeck, Result,
    ShapeRef, SlideSelector, TableData, TableOptions, Template, TemplateError,
};
