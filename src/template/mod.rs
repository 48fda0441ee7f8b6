//! Template filling.
//!
//! A template is a presentation whose placeholder shapes contain a tag in
//! curly braces, such as `{title}`. Operations address placeholders with a
//! label `"<slide>:<tag>"`, where `<slide>` is a 1-based slide number or `*`
//! for every slide, and replace each matching shape with text, a table or
//! a picture.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pptx_blueprint::template::{LabeledTable, TableOptions, Template};
//!
//! let mut template = Template::open("report-template.pptx")?;
//! template.replace_text("1:title", "Quarterly report")?;
//!
//! let figures = LabeledTable::new(
//!     vec!["Q1".into(), "Q2".into()],
//!     vec!["north".into(), "south".into()],
//!     vec![vec!["1".into(), "2".into()], vec!["3".into(), "4".into()]],
//! )?;
//! template.replace_table("*:figures", &figures, &TableOptions::new().with_header(true))?;
//! template.replace_picture("2:logo", "logo.png")?;
//! template.save("report.pptx")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod deck;
pub mod error;
pub mod label;
pub mod matcher;
pub mod plan;
pub mod table;

pub use deck::{Deck, Geometry, Image, MemoryDeck, ShapeRef};
pub use error::{Result, TemplateError};
pub use label::{Label, SlideSelector};
pub use plan::{FillPlan, FillStep, TableStep};
pub use table::{Grid, LabeledTable, TableData, TableOptions};

use crate::ooxml::pptx::PptxDeck;
use std::path::Path;
use tracing::{info, warn};

/// A presentation being filled in.
pub struct Template<D: Deck = PptxDeck> {
    deck: D,
}

impl Template<PptxDeck> {
    /// Open a .pptx template.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(PptxDeck::open(path)?))
    }
}

impl<D: Deck> Template<D> {
    /// Fill an already loaded deck.
    pub fn new(deck: D) -> Self {
        Self { deck }
    }

    #[inline]
    pub fn deck(&self) -> &D {
        &self.deck
    }

    #[inline]
    pub fn deck_mut(&mut self) -> &mut D {
        &mut self.deck
    }

    #[inline]
    pub fn into_deck(self) -> D {
        self.deck
    }

    /// Shapes matching a label, in slide order.
    pub fn find(&self, label: &str) -> Result<Vec<ShapeRef>> {
        matcher::find(&self.deck, &Label::parse(label)?)
    }

    /// Replace the text of every placeholder matching `label`.
    ///
    /// Returns the number of shapes changed.
    pub fn replace_text(&mut self, label: &str, text: &str) -> Result<usize> {
        let shapes = self.find(label)?;
        for &shape in &shapes {
            self.deck.set_shape_text(shape, text)?;
        }
        report(label, shapes.len());
        Ok(shapes.len())
    }

    /// Replace every placeholder matching `label` with a table.
    ///
    /// Each table takes the position and size of the placeholder it
    /// replaces. The placeholder is removed unless
    /// [`TableOptions::keep_placeholder`] is set.
    pub fn replace_table<T>(&mut self, label: &str, data: &T, options: &TableOptions) -> Result<usize>
    where
        T: TableData + ?Sized,
    {
        let label = Label::parse(label)?;
        // reject an empty table before touching the deck
        Grid::build(data, options, 0)?;

        let shapes = matcher::find(&self.deck, &label)?;
        for &shape in &shapes {
            let geometry = self.deck.geometry(shape)?;
            let grid = Grid::build(data, options, geometry.cx)?;
            self.deck.add_table(shape.slide, geometry, &grid)?;
            if !options.keep_placeholder {
                self.deck.remove_shape(shape)?;
            }
        }
        report(&label.to_string(), shapes.len());
        Ok(shapes.len())
    }

    /// Replace every placeholder matching `label` with the image at `path`.
    pub fn replace_picture<P: AsRef<Path>>(&mut self, label: &str, path: P) -> Result<usize> {
        let image = Image::open(path)?;
        self.replace_image(label, &image)
    }

    /// Replace every placeholder matching `label` with `image`, stretched
    /// over the placeholder's position and size.
    pub fn replace_image(&mut self, label: &str, image: &Image) -> Result<usize> {
        let shapes = self.find(label)?;
        for &shape in &shapes {
            let geometry = self.deck.geometry(shape)?;
            self.deck.add_picture(shape.slide, geometry, image)?;
            self.deck.remove_shape(shape)?;
        }
        report(label, shapes.len());
        Ok(shapes.len())
    }

    /// Run every step of a plan in order, stopping at the first error.
    ///
    /// Returns the total number of shapes replaced.
    pub fn apply_plan(&mut self, plan: &FillPlan) -> Result<usize> {
        let mut total = 0;
        for step in plan.steps() {
            total += match step {
                FillStep::Text { label, value } => self.replace_text(label, value)?,
                FillStep::Table(step) => {
                    self.replace_table(&step.label, &step.table()?, &step.options())?
                },
                FillStep::Picture { label, path } => {
                    self.replace_picture(label, plan.resolve(path))?
                },
            };
        }
        Ok(total)
    }

    /// Write the filled presentation to `path`.
    ///
    /// Fails with [`TemplateError::OverwriteTemplate`] if `path` is the
    /// file the template was opened from.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(source) = self.deck.source_path() {
            if same_file(source, path) {
                return Err(TemplateError::OverwriteTemplate(path.to_path_buf()));
            }
        }
        self.deck.save(path)?;
        info!(path = %path.display(), "saved presentation");
        Ok(())
    }
}

fn report(label: &str, count: usize) {
    if count == 0 {
        warn!(label, "no placeholder matched");
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => match (std::path::absolute(a), std::path::absolute(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        },
    }
}
