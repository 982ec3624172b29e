//! The timeline occupancy grid.
//!
//! A fixed-size window onto simulated time, one column per machine. Row 0
//! is the oldest time held; the bottom `hidden_rows` rows are the hidden
//! lookback buffer (the recent past, sized to the maximum setup time), and
//! the rows above them are the visible window. Advancing time scrolls the
//! whole buffer down one row: the bottom row is evicted to the caller, and
//! a fresh empty row appears at the top.
//!
//! The grid is a single logically contiguous ring buffer; hidden and
//! visible rows differ only by index, so scrolling and cell addressing have
//! one code path.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::JobTypeId;

/// Rows in the visible window.
pub const VISIBLE_ROWS: usize = 22;

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// No work scheduled.
    Empty,
    /// Non-productive changeover time.
    Setup,
    /// Occupied by a segment of the given job type.
    Job(JobTypeId),
}

impl Cell {
    /// Whether the cell is empty.
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Whether the cell holds a productive job segment.
    pub fn is_job(self) -> bool {
        matches!(self, Cell::Job(_))
    }

    /// Whether the cell is a setup marker.
    pub fn is_setup(self) -> bool {
        matches!(self, Cell::Setup)
    }

    /// The occupying job type, if productive.
    pub fn job_type(self) -> Option<JobTypeId> {
        match self {
            Cell::Job(id) => Some(id),
            _ => None,
        }
    }

    /// The raw integer encoding: 0 empty, 1 setup, ≥2 job type id.
    pub fn code(self) -> u16 {
        match self {
            Cell::Empty => 0,
            Cell::Setup => 1,
            Cell::Job(id) => id,
        }
    }
}

/// A row of cells as evicted into the history log.
pub type HistoryRow = Vec<Cell>;

/// The scrolling occupancy buffer plus per-column bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleGrid {
    width: usize,
    hidden_rows: usize,
    rows: VecDeque<Vec<Cell>>,
    column_tops: Vec<Option<JobTypeId>>,
    column_top_rows: Vec<i64>,
}

impl ScheduleGrid {
    /// Creates an empty grid: `VISIBLE_ROWS + hidden_rows` rows high.
    pub fn new(width: usize, hidden_rows: usize) -> Self {
        let height = VISIBLE_ROWS + hidden_rows;
        Self {
            width,
            hidden_rows,
            rows: (0..height).map(|_| vec![Cell::Empty; width]).collect(),
            column_tops: vec![None; width],
            column_top_rows: vec![0; width],
        }
    }

    /// Number of machine columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total rows, hidden buffer included.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Rows in the hidden lookback buffer (indices `0..hidden_rows`).
    pub fn hidden_rows(&self) -> usize {
        self.hidden_rows
    }

    /// The cell at (row, column). Row 0 is the oldest time held.
    pub fn cell(&self, row: usize, column: usize) -> Cell {
        self.rows[row][column]
    }

    /// One full row of cells.
    pub fn row(&self, row: usize) -> &[Cell] {
        &self.rows[row]
    }

    /// All rows, oldest first.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Scrolls the window one row forward in time.
    ///
    /// The bottom row — the row leaving the hidden lookback buffer — is
    /// returned for the history log; every other row shifts down and a
    /// zeroed row is revealed at the top.
    pub fn scroll_one_row(&mut self) -> HistoryRow {
        let evicted = self
            .rows
            .pop_front()
            .unwrap_or_else(|| vec![Cell::Empty; self.width]);
        self.rows.push_back(vec![Cell::Empty; self.width]);
        for top_row in &mut self.column_top_rows {
            *top_row -= 1;
        }
        evicted
    }

    /// Writes `length` setup markers upward from `start_row` in `column`.
    ///
    /// Rows below the buffer (negative indices from deep-lookback setups)
    /// are skipped.
    pub fn mark_setup(&mut self, column: usize, start_row: i64, length: usize) {
        self.fill(column, start_row, length, Cell::Setup);
    }

    /// Writes a job segment upward from `start_row` in `column`.
    pub fn mark_job(&mut self, column: usize, start_row: i64, length: usize, type_id: JobTypeId) {
        self.fill(column, start_row, length, Cell::Job(type_id));
    }

    /// Empties `length` cells upward from `start_row` in `column`.
    pub fn clear_span(&mut self, column: usize, start_row: i64, length: usize) {
        self.fill(column, start_row, length, Cell::Empty);
    }

    fn fill(&mut self, column: usize, start_row: i64, length: usize, value: Cell) {
        let height = self.height() as i64;
        for row in start_row..start_row + length as i64 {
            if (0..height).contains(&row) {
                self.rows[row as usize][column] = value;
            }
        }
    }

    /// Whether every cell of the first visible row is occupied.
    pub fn bottom_row_full(&self) -> bool {
        self.rows[self.hidden_rows].iter().all(|c| !c.is_empty())
    }

    /// Zero-fills the whole buffer and forgets the column tops.
    pub fn clear_all(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
        self.column_tops = vec![None; self.width];
        self.column_top_rows = vec![0; self.width];
    }

    // --- occupancy scans -------------------------------------------------

    /// Highest occupied row at or below `row` in `column`.
    pub fn highest_occupied_at_or_below(&self, column: usize, row: usize) -> Option<usize> {
        let top = row.min(self.height().saturating_sub(1));
        (0..=top).rev().find(|&r| !self.rows[r][column].is_empty())
    }

    /// First empty row at or above `row` in `column`.
    ///
    /// Walks upward out of any occupied run; may return `height()` when the
    /// column is occupied to the top.
    pub fn first_free_above(&self, column: usize, row: usize) -> usize {
        let mut r = row;
        while r < self.height() && !self.rows[r][column].is_empty() {
            r += 1;
        }
        r
    }

    /// Topmost productive cell at or below `row`: `(type, row)`.
    ///
    /// Setup markers are skipped; this answers "what job type does the
    /// column currently end with".
    pub fn top_job_at_or_below(&self, column: usize, row: usize) -> Option<(JobTypeId, usize)> {
        let top = row.min(self.height().saturating_sub(1));
        (0..=top)
            .rev()
            .find_map(|r| self.rows[r][column].job_type().map(|id| (id, r)))
    }

    /// Lowest productive cell at or above `row`: `(type, row)`.
    ///
    /// The base of the next committed segment up the column; setup markers
    /// do not count as obstructions.
    pub fn next_job_above(&self, column: usize, row: usize) -> Option<(JobTypeId, usize)> {
        (row..self.height())
            .find_map(|r| self.rows[r][column].job_type().map(|id| (id, r)))
    }

    // --- per-column bookkeeping ------------------------------------------

    /// Records the last committed top of a column.
    ///
    /// `free_row` is the first free row above the committed segment; it
    /// scrolls with the grid and may go negative once the segment leaves
    /// the buffer.
    pub fn record_column_top(&mut self, column: usize, type_id: JobTypeId, free_row: i64) {
        self.column_tops[column] = Some(type_id);
        self.column_top_rows[column] = free_row;
    }

    /// Job type of the last segment committed on top of a column.
    pub fn column_top(&self, column: usize) -> Option<JobTypeId> {
        self.column_tops[column]
    }

    /// First free row above the last top commit (see [`record_column_top`]).
    ///
    /// [`record_column_top`]: ScheduleGrid::record_column_top
    pub fn column_top_row(&self, column: usize) -> i64 {
        self.column_top_rows[column]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_dimensions() {
        let grid = ScheduleGrid::new(4, 3);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), VISIBLE_ROWS + 3);
        assert_eq!(grid.hidden_rows(), 3);
        assert!(grid.rows().all(|row| row.iter().all(|c| c.is_empty())));
    }

    #[test]
    fn test_cell_codes() {
        assert_eq!(Cell::Empty.code(), 0);
        assert_eq!(Cell::Setup.code(), 1);
        assert_eq!(Cell::Job(7).code(), 7);
        assert_eq!(Cell::Job(7).job_type(), Some(7));
        assert!(Cell::Setup.is_setup());
    }

    #[test]
    fn test_mark_and_scroll() {
        let mut grid = ScheduleGrid::new(2, 1);
        grid.mark_job(0, 0, 2, 5);
        grid.mark_setup(1, 0, 1);

        let evicted = grid.scroll_one_row();
        assert_eq!(evicted, vec![Cell::Job(5), Cell::Setup]);
        // The remaining segment cell shifted down to row 0.
        assert_eq!(grid.cell(0, 0), Cell::Job(5));
        assert_eq!(grid.cell(0, 1), Cell::Empty);
        // New top row is empty.
        assert!(grid.row(grid.height() - 1).iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_marks_below_buffer_are_skipped() {
        let mut grid = ScheduleGrid::new(1, 2);
        grid.mark_setup(0, -1, 3); // Rows -1, 0, 1: only 0 and 1 land
        assert_eq!(grid.cell(0, 0), Cell::Setup);
        assert_eq!(grid.cell(1, 0), Cell::Setup);
        assert_eq!(grid.cell(2, 0), Cell::Empty);
    }

    #[test]
    fn test_bottom_row_full() {
        let mut grid = ScheduleGrid::new(2, 1);
        assert!(!grid.bottom_row_full());
        grid.mark_job(0, 1, 1, 2); // Row 1 = first visible row
        assert!(!grid.bottom_row_full());
        grid.mark_setup(1, 1, 1);
        assert!(grid.bottom_row_full());
    }

    #[test]
    fn test_occupancy_scans() {
        let mut grid = ScheduleGrid::new(1, 0);
        // Column: rows 2-3 job A(2), row 4 setup, rows 8-9 job B(3).
        grid.mark_job(0, 2, 2, 2);
        grid.mark_setup(0, 4, 1);
        grid.mark_job(0, 8, 2, 3);

        assert_eq!(grid.highest_occupied_at_or_below(0, 6), Some(4));
        assert_eq!(grid.highest_occupied_at_or_below(0, 1), None);
        // Setup at row 4 is skipped; the productive top below row 6 is A.
        assert_eq!(grid.top_job_at_or_below(0, 6), Some((2, 3)));
        // The next segment above row 5 is B at row 8.
        assert_eq!(grid.next_job_above(0, 5), Some((3, 8)));
        assert_eq!(grid.next_job_above(0, 10), None);
        // Walking out of the occupied run 2..=4.
        assert_eq!(grid.first_free_above(0, 2), 5);
        assert_eq!(grid.first_free_above(0, 5), 5);
    }

    #[test]
    fn test_column_top_bookkeeping_scrolls() {
        let mut grid = ScheduleGrid::new(1, 1);
        grid.record_column_top(0, 2, 5);
        assert_eq!(grid.column_top(0), Some(2));
        assert_eq!(grid.column_top_row(0), 5);
        grid.scroll_one_row();
        assert_eq!(grid.column_top_row(0), 4);
        assert_eq!(grid.column_top(0), Some(2));
    }

    #[test]
    fn test_clear_all() {
        let mut grid = ScheduleGrid::new(2, 1);
        grid.mark_job(0, 3, 2, 2);
        grid.record_column_top(0, 2, 5);
        grid.clear_all();
        assert!(grid.rows().all(|row| row.iter().all(|c| c.is_empty())));
        assert_eq!(grid.column_top(0), None);
    }
}
