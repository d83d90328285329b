//! Growable character grid
//!
//! Rows are addressed by index and only grow through `ensure_row` and
//! `Row::pad_to`, so every growth point is explicit.

use serde::{Deserialize, Serialize};

use super::cell::StyledChar;

/// A row of styled characters. Rows have no fixed width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<StyledChar>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[StyledChar] {
        &self.cells
    }

    pub fn last(&self) -> Option<&StyledChar> {
        self.cells.last()
    }

    /// Pad with blank cells until the row is `len` cells long
    pub fn pad_to(&mut self, len: usize) {
        if self.cells.len() < len {
            self.cells.resize(len, StyledChar::blank());
        }
    }

    /// Write a character at `col`, padding with blanks first
    pub fn put(&mut self, col: usize, c: StyledChar) {
        self.pad_to(col);
        if col < self.cells.len() {
            self.cells[col] = c;
        } else {
            self.cells.push(c);
        }
    }

    /// Remove every cell at or after `col`
    pub fn truncate(&mut self, col: usize) {
        self.cells.truncate(col);
    }

    /// Replace existing cells from the start through `col` (inclusive) with blanks
    pub fn blank_through(&mut self, col: usize) {
        for cell in self.cells.iter_mut().take(col.saturating_add(1)) {
            *cell = StyledChar::blank();
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn to_text(&self) -> String {
        self.cells.iter().map(|c| c.symbol).collect()
    }
}

/// Ordered list of rows. Always holds at least one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            rows: vec![Row::new()],
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Append empty rows until `row` is a valid index
    pub fn ensure_row(&mut self, row: usize) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Row::new);
        }
    }

    /// Mutable access to a row, creating it if needed
    pub fn row_mut(&mut self, row: usize) -> &mut Row {
        self.ensure_row(row);
        &mut self.rows[row]
    }

    /// Drop every row after `row`
    pub fn truncate_after(&mut self, row: usize) {
        self.rows.truncate(row.saturating_add(1).max(1));
    }

    /// Empty every row before `row`
    pub fn clear_before(&mut self, row: usize) {
        for r in self.rows.iter_mut().take(row) {
            r.clear();
        }
    }

    /// Back to a single empty row
    pub fn reset(&mut self) {
        self.rows.clear();
        self.rows.push(Row::new());
    }

    /// Join rows into one sequence with a line break between consecutive
    /// rows. Each break carries the style of the last character before it.
    pub fn flatten(&self) -> Vec<StyledChar> {
        let total = self.rows.iter().map(Row::len).sum::<usize>() + self.rows.len();
        let mut out = Vec::with_capacity(total);

        for (i, row) in self.rows.iter().enumerate() {
            out.extend_from_slice(row.cells());
            if i + 1 < self.rows.len() {
                out.push(StyledChar::line_break_after(row.last()));
            }
        }

        out
    }
}
