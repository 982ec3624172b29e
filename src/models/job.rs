//! An instantiated job piece.
//!
//! A [`Job`] is created from its catalog template the moment its arrival
//! time is reached and destroyed the instant its last segment commits. It
//! owns the mutable remaining projection of the template: the queue of
//! columns still to drop and the shape bitmap with already-dropped columns
//! zeroed out.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::{JobType, JobTypeId};

/// One live puzzle piece in the active list.
///
/// Invariant: `remaining_drops` is empty iff every dropped column's shape
/// row is zeroed. [`Job::drop_next_segment`] maintains this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    job_type: String,
    type_id: JobTypeId,
    remaining_drops: VecDeque<usize>,
    shape: Vec<Vec<u8>>,
    /// Earliest simulated time at which the next segment may be committed.
    ///
    /// Starts at the creation time; each commit raises it to the committed
    /// segment's exclusive top, so successive segments stack upward.
    pub lowest_committable_time: i64,
}

impl Job {
    /// Instantiates a job from its catalog template at `created_at`.
    pub fn from_type(template: &JobType, created_at: i64) -> Self {
        Self {
            job_type: template.name.clone(),
            type_id: template.type_id,
            remaining_drops: template.drop_order.iter().copied().collect(),
            shape: template.shape.clone(),
            lowest_committable_time: created_at,
        }
    }

    /// Catalog name of this job's type.
    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    /// Numeric type id written into grid cells.
    pub fn type_id(&self) -> JobTypeId {
        self.type_id
    }

    /// Columns still to be dropped, front first.
    pub fn remaining_drops(&self) -> &VecDeque<usize> {
        &self.remaining_drops
    }

    /// The column the next drop goes into, if any segment remains.
    pub fn next_column(&self) -> Option<usize> {
        self.remaining_drops.front().copied()
    }

    /// Remaining shape bitmap (`shape[column]` over the piece height).
    pub fn shape(&self) -> &[Vec<u8>] {
        &self.shape
    }

    /// Segment length for a column of the remaining shape.
    pub fn segment_length(&self, column: usize) -> usize {
        self.shape
            .get(column)
            .map(|row| row.iter().filter(|&&c| c != 0).count())
            .unwrap_or(0)
    }

    /// Whether every segment has been dropped.
    pub fn is_finished(&self) -> bool {
        self.remaining_drops.is_empty()
    }

    /// Pops the next column off the drop queue and zeroes its shape row.
    ///
    /// Returns `(segment_length, column)`.
    ///
    /// # Panics
    /// Panics if the job is already finished. Callers only invoke this on
    /// jobs still in the active list, which by construction have segments
    /// remaining.
    pub fn drop_next_segment(&mut self) -> (usize, usize) {
        let column = match self.remaining_drops.pop_front() {
            Some(column) => column,
            None => panic!("drop_next_segment called on a finished job"),
        };
        let length = self.segment_length(column);
        if let Some(row) = self.shape.get_mut(column) {
            row.fill(0);
        }
        (length, column)
    }
}
