//! Tabular data and its layout as a slide table.

use crate::template::error::{Result, TemplateError};
use serde::Deserialize;

/// A rectangular table with column labels and row labels.
///
/// Everything is rendered as display strings; the slide table has no
/// notion of cell types.
pub trait TableData {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// Header text of a column.
    fn column_label(&self, col: usize) -> String;

    /// Label of a row, shown when row names are enabled.
    fn row_label(&self, row: usize) -> String;

    /// Body cell text. `row < row_count()` and `col < column_count()`.
    fn cell(&self, row: usize, col: usize) -> String;
}

/// Owned table of strings with column and row labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTable {
    columns: Vec<String>,
    index: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LabeledTable {
    /// Build a table, checking that every row has one cell per column and
    /// that there is one row label per row.
    pub fn new(columns: Vec<String>, index: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if index.len() != rows.len() {
            return Err(TemplateError::TableShape(format!(
                "{} row labels for {} rows",
                index.len(),
                rows.len()
            )));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(TemplateError::TableShape(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    /// Build a table whose rows are labelled `0`, `1`, ...
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let index = (0..rows.len()).map(|i| i.to_string()).collect();
        Self::new(columns, index, rows)
    }
}

impl TableData for LabeledTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_label(&self, col: usize) -> String {
        self.columns[col].clone()
    }

    fn row_label(&self, row: usize) -> String {
        self.index[row].clone()
    }

    fn cell(&self, row: usize, col: usize) -> String {
        self.rows[row][col].clone()
    }
}

/// Options for [`Template::replace_table`](crate::template::Template::replace_table).
///
/// # Examples
///
/// ```rust
/// use pptx_blueprint::template::TableOptions;
///
/// let options = TableOptions::new().with_header(true).with_rownames(true);
/// assert!(!options.keep_placeholder);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Put column labels in an extra first row
    pub header: bool,
    /// Put row labels in an extra first column
    pub rownames: bool,
    /// Leave the placeholder shape on the slide under the table
    pub keep_placeholder: bool,
}

impl TableOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    #[inline]
    pub fn with_rownames(mut self, rownames: bool) -> Self {
        self.rownames = rownames;
        self
    }

    #[inline]
    pub fn with_keep_placeholder(mut self, keep: bool) -> Self {
        self.keep_placeholder = keep;
        self
    }
}

/// Cell text and column widths of a table about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    /// Row-major
    cells: Vec<String>,
    column_widths: Vec<i64>,
    header: bool,
    row_names: bool,
}

impl Grid {
    /// Lay out `data` for a frame `width` EMUs wide.
    ///
    /// With a header the first row holds the column labels; with row names
    /// the first column holds the row labels. When both are on, the
    /// top-left cell stays empty. Every column gets `width / columns`.
    pub fn build<T>(data: &T, options: &TableOptions, width: i64) -> Result<Self>
    where
        T: TableData + ?Sized,
    {
        let row_offset = usize::from(options.header);
        let col_offset = usize::from(options.rownames);
        let rows = data.row_count() + row_offset;
        let columns = data.column_count() + col_offset;
        if rows == 0 || columns == 0 {
            return Err(TemplateError::EmptyTable { rows, columns });
        }

        let mut cells = vec![String::new(); rows * columns];
        if options.header {
            for c in 0..data.column_count() {
                cells[c + col_offset] = data.column_label(c);
            }
        }
        for r in 0..data.row_count() {
            let row = (r + row_offset) * columns;
            if options.rownames {
                cells[row] = data.row_label(r);
            }
            for c in 0..data.column_count() {
                cells[row + c + col_offset] = data.cell(r, c);
            }
        }

        let column_width = width / columns as i64;
        Ok(Self {
            rows,
            columns,
            cells,
            column_widths: vec![column_width; columns],
            header: options.header,
            row_names: options.rownames,
        })
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Cell text at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        assert!(col < self.columns, "column {col} out of range");
        &self.cells[row * self.columns + col]
    }

    #[inline]
    pub fn column_widths(&self) -> &[i64] {
        &self.column_widths
    }

    /// Whether the first row holds column labels.
    #[inline]
    pub fn has_header(&self) -> bool {
        self.header
    }

    /// Whether the first column holds row labels.
    #[inline]
    pub fn has_row_names(&self) -> bool {
        self.row_names
    }
}
