//! Cursor state
//!
//! Both coordinates are 0-based and never negative. There is no upper bound
//! on the column; wrapping is decided when the next character is written.

use serde::{Deserialize, Serialize};

/// Cursor position with a one-slot saved position (CSI s / CSI u)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
    saved: Option<(usize, usize)>,
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to an absolute position
    pub fn move_to(&mut self, col: usize, row: usize) {
        self.col = col;
        self.row = row;
    }

    pub fn move_up(&mut self, n: usize) {
        self.row = self.row.saturating_sub(n);
    }

    pub fn move_down(&mut self, n: usize) {
        self.row = self.row.saturating_add(n);
    }

    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    pub fn move_right(&mut self, n: usize) {
        self.col = self.col.saturating_add(n);
    }

    pub fn carriage_return(&mut self) {
        self.col = 0;
    }

    /// Start of the next row
    pub fn next_line(&mut self) {
        self.row += 1;
        self.col = 0;
    }

    pub fn home(&mut self) {
        self.col = 0;
        self.row = 0;
    }

    pub fn save(&mut self) {
        self.saved = Some((self.col, self.row));
    }

    /// Restore the saved position. Without a prior save this is a no-op.
    pub fn restore(&mut self) {
        if let Some((col, row)) = self.saved {
            self.col = col;
            self.row = row;
        }
    }
}
