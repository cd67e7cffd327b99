//! The machine's memory: fixed-length cells with a single cursor.

use std::fmt;

/// Default number of cells on the tape.
pub const DEFAULT_CAPACITY: usize = 30_000;

/// Fixed-length tape of wrapping `u8` cells.
///
/// The tape never grows. Moving the cursor off either end is refused and
/// leaves the cursor where it was; the caller turns that into an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    cursor: usize,
    high_water_mark: usize,
}

impl Tape {
    /// Create a zeroed tape. A capacity of 0 is clamped to a single cell.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![0; capacity.max(1)],
            cursor: 0,
            high_water_mark: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Largest cursor position reached so far.
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self) -> u8 {
        self.cells[self.cursor]
    }

    pub fn set(&mut self, value: u8) {
        self.cells[self.cursor] = value;
    }

    pub fn increment(&mut self) -> u8 {
        let after = self.get().wrapping_add(1);
        self.set(after);
        after
    }

    pub fn decrement(&mut self) -> u8 {
        let after = self.get().wrapping_sub(1);
        self.set(after);
        after
    }

    /// Returns `false` without moving when already on the last cell.
    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.cells.len() - 1 {
            return false;
        }
        self.cursor += 1;
        self.high_water_mark = self.high_water_mark.max(self.cursor);
        true
    }

    /// Returns `false` without moving when already on cell 0.
    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Read-only view of the cells visited so far.
    pub fn view(&self) -> TapeView<'_> {
        TapeView {
            window: &self.cells[..=self.high_water_mark],
            cursor: self.cursor,
        }
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Borrowed window `[0, high water mark]` of a tape plus the cursor.
///
/// Renders as an index row, a data row and a caret under the cursor:
///
/// ```text
/// index     = |   0|   1|
/// data      = |   0|   5|
/// position  =     ^
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TapeView<'a> {
    window: &'a [u8],
    cursor: usize,
}

impl<'a> TapeView<'a> {
    pub fn cells(&self) -> &'a [u8] {
        self.window
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

const CELL_WIDTH: usize = 5;

impl fmt::Display for TapeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index     = ")?;
        for index in 0..self.window.len() {
            write!(f, "| {:>3}", index)?;
        }
        writeln!(f, "|")?;

        write!(f, "data      = ")?;
        for value in self.window {
            write!(f, "| {:>3}", value)?;
        }
        writeln!(f, "|")?;

        // Caret sits under the last digit column of the cursor's cell.
        let offset = self.cursor * CELL_WIDTH + CELL_WIDTH - 1;
        write!(f, "position  = {}^", " ".repeat(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let tape = Tape::new(4);
        assert_eq!(tape.cells(), &[0, 0, 0, 0]);
        assert_eq!(tape.cursor(), 0);
        assert_eq!(tape.high_water_mark(), 0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let tape = Tape::new(0);
        assert_eq!(tape.capacity(), 1);
    }

    #[test]
    fn wrapping_arithmetic() {
        let mut tape = Tape::new(1);
        assert_eq!(tape.decrement(), 255);
        assert_eq!(tape.increment(), 0);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut tape = Tape::new(2);
        assert!(!tape.move_left());
        assert!(tape.move_right());
        assert!(!tape.move_right());
        assert_eq!(tape.cursor(), 1);
    }

    #[test]
    fn high_water_mark_does_not_drop() {
        let mut tape = Tape::new(10);
        tape.move_right();
        tape.move_right();
        tape.move_left();
        tape.move_left();
        assert_eq!(tape.cursor(), 0);
        assert_eq!(tape.high_water_mark(), 2);
    }

    #[test]
    fn view_renders_visited_window() {
        let mut tape = Tape::new(10);
        tape.move_right();
        tape.set(5);
        tape.move_left();

        let view = tape.view();
        assert_eq!(view.cells(), &[0, 5]);
        assert_eq!(
            view.to_string(),
            "index     = |   0|   1|\ndata      = |   0|   5|\nposition  =     ^"
        );
    }

    #[test]
    fn caret_follows_cursor() {
        let mut tape = Tape::new(10);
        tape.move_right();
        let rendered = tape.view().to_string();
        let last = rendered.lines().last().unwrap();
        assert_eq!(last, "position  =          ^");
    }
}
