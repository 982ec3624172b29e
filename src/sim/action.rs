//! Player actions and cached placements.

use serde::{Deserialize, Serialize};

use crate::models::JobTypeId;

/// One legal move: `(slot, delay)`.
///
/// Slot 0 is always "advance time with no placement"; slots 1..=9 index the
/// active job list. The delay defers the job's next segment relative to its
/// earliest feasible start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// 1-based active-job slot; 0 advances time.
    pub slot: usize,
    /// Placement deferral in time steps.
    pub delay: i64,
}

impl Action {
    /// The unconditional "advance time" action.
    pub const ADVANCE: Action = Action { slot: 0, delay: 0 };

    /// Creates a placement action.
    pub fn new(slot: usize, delay: i64) -> Self {
        Self { slot, delay }
    }
}

/// The precomputed geometry of one legal placement.
///
/// Enumerated together with its [`Action`] and consumed verbatim by commit;
/// all times are absolute simulated times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    /// Target machine column.
    pub column: usize,
    /// Productive start time of the segment.
    pub start: i64,
    /// Leading changeover cells written directly below the segment.
    pub lead_setup: usize,
    /// Segment length in cells.
    pub length: usize,
    /// Changeover cells reserved below the follower, when one exists.
    pub trail_setup: usize,
    /// Idle cells left empty between the segment top and the trailing setup.
    pub trail_gap: usize,
    /// The committed segment directly above, if this placement tucks
    /// underneath one.
    pub follower: Option<JobTypeId>,
}

impl Placement {
    /// Exclusive top of the productive segment.
    pub fn segment_top(&self) -> i64 {
        self.start + self.length as i64
    }

    /// Base time of the follower segment above, if any.
    pub fn follower_base(&self) -> Option<i64> {
        self.follower
            .map(|_| self.segment_top() + self.trail_gap as i64 + self.trail_setup as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_action() {
        assert_eq!(Action::ADVANCE, Action::new(0, 0));
    }

    #[test]
    fn test_placement_geometry() {
        let p = Placement {
            column: 1,
            start: 10,
            lead_setup: 2,
            length: 3,
            trail_setup: 1,
            trail_gap: 4,
            follower: Some(3),
        };
        assert_eq!(p.segment_top(), 13);
        assert_eq!(p.follower_base(), Some(18));
    }

    #[test]
    fn test_placement_without_follower() {
        let p = Placement {
            column: 0,
            start: 0,
            lead_setup: 0,
            length: 2,
            trail_setup: 0,
            trail_gap: 0,
            follower: None,
        };
        assert_eq!(p.follower_base(), None);
    }
}
