//! Fill plans: a list of replacements loaded from YAML.
//!
//! ```yaml
//! - text: { label: "1:title", value: "Quarterly report" }
//! - table:
//!     label: "*:figures"
//!     header: true
//!     rownames: true
//!     columns: [Q1, Q2]
//!     index: [north, south]
//!     rows: [["1", "2"], ["3", "4"]]
//! - picture: { label: "2:logo", path: "logo.png" }
//! ```
//!
//! Relative picture paths are resolved against the plan file's directory.

use crate::template::error::{Result, TemplateError};
use crate::template::table::{LabeledTable, TableOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One replacement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStep {
    Text { label: String, value: String },
    Table(TableStep),
    Picture { label: String, path: PathBuf },
}

/// A table replacement with its data inline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableStep {
    pub label: String,
    #[serde(default)]
    pub header: bool,
    #[serde(default)]
    pub rownames: bool,
    #[serde(default)]
    pub keep_placeholder: bool,
    pub columns: Vec<String>,
    /// Row labels; `0..n` when omitted
    #[serde(default)]
    pub index: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl TableStep {
    /// Validate the inline data.
    pub fn table(&self) -> Result<LabeledTable> {
        match &self.index {
            Some(index) => LabeledTable::new(self.columns.clone(), index.clone(), self.rows.clone()),
            None => LabeledTable::from_rows(self.columns.clone(), self.rows.clone()),
        }
    }

    pub fn options(&self) -> TableOptions {
        TableOptions::new()
            .with_header(self.header)
            .with_rownames(self.rownames)
            .with_keep_placeholder(self.keep_placeholder)
    }
}

/// An ordered list of replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillPlan {
    steps: Vec<FillStep>,
    base_dir: Option<PathBuf>,
}

impl FillPlan {
    pub fn new(steps: Vec<FillStep>) -> Self {
        Self {
            steps,
            base_dir: None,
        }
    }

    /// Parse a plan from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        parse_steps(yaml).map(Self::new).map_err(TemplateError::Plan)
    }

    /// Load a plan file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let steps = parse_steps(&yaml)
            .map_err(|e| TemplateError::Plan(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            steps,
            base_dir: path.parent().map(Path::to_path_buf),
        })
    }

    #[inline]
    pub fn steps(&self) -> &[FillStep] {
        &self.steps
    }

    /// Resolve a path named in the plan.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn parse_steps(yaml: &str) -> std::result::Result<Vec<FillStep>, String> {
    serde_saphyr::from_str(yaml).map_err(|e| e.to_string())
}
