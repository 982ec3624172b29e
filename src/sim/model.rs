//! The scheduling engine.
//!
//! [`ScheduleModel`] owns the whole game state: the pending-arrival queue,
//! the active job list, the scrolling grid, and the history log. Per turn,
//! a caller reads [`available_actions`], picks one, and applies it with
//! [`execute_move`]; the engine then recomputes the action cache, so a
//! fresh call never observes stale moves.
//!
//! # Algorithm
//!
//! For each active slot the enumerator:
//! 1. Finds the column's current top job type by scanning downward from
//!    `max(lowest_committable_time, base_time)`, skipping setup markers.
//! 2. Looks up the leading changeover cost against that predecessor.
//! 3. Computes the earliest feasible productive start; changeover cells
//!    falling before `base_time` land in the hidden lookback buffer.
//! 4. Sweeps delays upward until the next committed segment (reserving the
//!    changeover into that follower) or the visible window edge. When even
//!    the earliest start overflows the window, delay 0 alone is offered and
//!    commit extends the window instead of rejecting the move.
//!
//! Committing writes leading setup, segment, reserved gap, and trailing
//! setup, then lets `check_status` cascade: a full bottom row or an empty
//! active list advances time automatically, any number of times.
//!
//! [`available_actions`]: ScheduleModel::available_actions
//! [`execute_move`]: ScheduleModel::execute_move

use std::collections::{HashMap, VecDeque};

use crate::models::{HistoryRow, Job, JobArrival, ScheduleGrid, SimConfig, VISIBLE_ROWS};

use super::action::{Action, Placement};
use super::kpi::SimulationKpi;

/// Visible slots in the active job list.
pub const MAX_ACTIVE_JOBS: usize = 9;

/// The simulation state machine.
///
/// # Example
///
/// ```
/// use u_schedsim::models::{JobFeed, JobTypeCatalog, SetupRuleTable, SimConfig};
/// use u_schedsim::sim::{Action, ScheduleModel};
///
/// let catalog = JobTypeCatalog::new(1).with_type("A", &[(0, 2)]);
/// let feed = JobFeed::new(1).with_arrival(0, "A");
/// let config = SimConfig::new(catalog, SetupRuleTable::new(1), feed).unwrap();
///
/// let mut model = ScheduleModel::new(config);
/// model.start();
/// assert_eq!(model.active_jobs().len(), 1);
/// assert!(model.available_actions().contains(&Action::new(1, 0)));
///
/// model.execute_move(Action::new(1, 0));
/// assert!(model.is_game_over());
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleModel {
    config: SimConfig,
    pending_jobs: VecDeque<JobArrival>,
    active_jobs: Vec<Job>,
    num_remaining_total: usize,
    base_time: i64,
    max_time: i64,
    grid: ScheduleGrid,
    grid_history: Vec<HistoryRow>,
    game_over: bool,
    actions: Vec<Action>,
    placements: HashMap<Action, Placement>,
}

impl ScheduleModel {
    /// Builds a model over a validated configuration.
    ///
    /// The clock starts one step before time 0; call [`start`] to advance
    /// to time 0 and pull the first arrivals.
    ///
    /// [`start`]: ScheduleModel::start
    pub fn new(config: SimConfig) -> Self {
        let grid = ScheduleGrid::new(config.width(), config.max_setup_time());
        let pending_jobs: VecDeque<JobArrival> = config.feed().arrivals().to_vec().into();
        let num_remaining_total = pending_jobs.len();
        let mut model = Self {
            config,
            pending_jobs,
            active_jobs: Vec::new(),
            num_remaining_total,
            base_time: -1,
            max_time: -1 + VISIBLE_ROWS as i64,
            grid,
            grid_history: Vec::new(),
            game_over: false,
            actions: Vec::new(),
            placements: HashMap::new(),
        };
        model.refresh_actions();
        model
    }

    /// Starts the game: advances to time 0 and pulls its arrivals.
    pub fn start(&mut self) {
        self.add_time();
        self.refresh_actions();
    }

    /// The legal moves for the current state, slot 0 first, delays strictly
    /// increasing per slot.
    ///
    /// Recomputed after every mutating call; never stale.
    pub fn available_actions(&self) -> &[Action] {
        &self.actions
    }

    /// Applies one move.
    ///
    /// Slot 0 advances time. A slot beyond the active list is a no-op (the
    /// caller may hold a one-step-stale slot count). A delay that is not in
    /// the current action cache for a live slot is a caller bug and panics.
    pub fn execute_move(&mut self, action: Action) {
        if self.game_over {
            return;
        }
        if action.slot == 0 {
            assert_eq!(
                action.delay, 0,
                "slot 0 only advances time; delay {} is not a legal action",
                action.delay
            );
            self.add_time();
            self.refresh_actions();
            return;
        }
        if action.slot > self.active_jobs.len() {
            return;
        }
        let placement = match self.placements.get(&action) {
            Some(placement) => *placement,
            None => panic!(
                "delay {} is not currently legal for slot {}",
                action.delay, action.slot
            ),
        };
        self.commit(action.slot, placement);
        self.refresh_actions();
    }

    /// Whether both queues are exhausted and the simulation has ended.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Current simulated time (base of the visible window).
    pub fn base_time(&self) -> i64 {
        self.base_time
    }

    /// Upper edge of the visible window.
    pub fn max_time(&self) -> i64 {
        self.max_time
    }

    /// The occupancy grid.
    pub fn grid(&self) -> &ScheduleGrid {
        &self.grid
    }

    /// Jobs currently in the slot table, slot order.
    pub fn active_jobs(&self) -> &[Job] {
        &self.active_jobs
    }

    /// Arrivals not yet pulled into the active list.
    pub fn pending_count(&self) -> usize {
        self.pending_jobs.len()
    }

    /// Jobs not yet fully committed.
    pub fn remaining_job_count(&self) -> usize {
        self.num_remaining_total
    }

    /// Rows that have scrolled out of the hidden buffer, oldest first.
    pub fn grid_history(&self) -> &[HistoryRow] {
        &self.grid_history
    }

    /// The configuration this model runs on.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Quality metrics over the history log.
    pub fn kpi(&self) -> SimulationKpi {
        SimulationKpi::from_history(&self.grid_history)
    }

    // --- time ------------------------------------------------------------

    fn row_of(&self, time: i64) -> i64 {
        time - self.base_time + self.grid.hidden_rows() as i64
    }

    fn time_of(&self, row: i64) -> i64 {
        self.base_time + row - self.grid.hidden_rows() as i64
    }

    /// One time step plus the automatic cascades it triggers.
    fn add_time(&mut self) {
        self.advance_core();
        self.check_status();
    }

    /// The bare advance: clock, arrivals, scroll.
    fn advance_core(&mut self) {
        self.base_time += 1;
        self.max_time += 1;
        while self.active_jobs.len() < MAX_ACTIVE_JOBS {
            match self.pending_jobs.front() {
                Some(arrival) if arrival.arrival_time <= self.base_time => {}
                _ => break,
            }
            let arrival = match self.pending_jobs.pop_front() {
                Some(arrival) => arrival,
                None => break,
            };
            // The lookup always succeeds: the feed was validated against
            // the catalog at construction.
            if let Some(template) = self.config.catalog().get(&arrival.job_type) {
                self.active_jobs.push(Job::from_type(template, self.base_time));
            }
        }
        let evicted = self.grid.scroll_one_row();
        self.grid_history.push(evicted);
    }

    /// Runs the automatic advances until the state is stable or over.
    fn check_status(&mut self) {
        loop {
            if self.game_over {
                break;
            }
            if self.grid.bottom_row_full() {
                self.advance_core();
                continue;
            }
            if self.active_jobs.is_empty() {
                if self.pending_jobs.is_empty() {
                    self.game_over = true;
                    self.flush_grid();
                } else {
                    self.advance_core();
                }
                continue;
            }
            break;
        }
    }

    /// Moves every remaining grid row into the history log.
    fn flush_grid(&mut self) {
        for row in self.grid.rows() {
            self.grid_history.push(row.to_vec());
        }
        self.grid.clear_all();
    }

    // --- commit ----------------------------------------------------------

    fn commit(&mut self, slot: usize, placement: Placement) {
        let type_id = self.active_jobs[slot - 1].type_id();
        let (length, column) = self.active_jobs[slot - 1].drop_next_segment();
        debug_assert_eq!(length, placement.length);
        debug_assert_eq!(column, placement.column);

        // Extend the window until the segment top fits; the placement's
        // absolute times stay fixed while the rows scroll beneath it.
        while placement.segment_top() > self.max_time {
            self.add_time();
        }

        let lead_base = placement.start - placement.lead_setup as i64;
        if let Some(follower_base) = placement.follower_base() {
            // Insertion below a committed segment: reclaim stale changeover
            // marks in the span, then lay down lead setup, segment, the
            // reserved empty gap, and the changeover into the follower.
            let span = (follower_base - lead_base) as usize;
            self.grid.clear_span(column, self.row_of(lead_base), span);
            self.grid
                .mark_setup(column, self.row_of(lead_base), placement.lead_setup);
            self.grid
                .mark_job(column, self.row_of(placement.start), length, type_id);
            self.grid.mark_setup(
                column,
                self.row_of(follower_base - placement.trail_setup as i64),
                placement.trail_setup,
            );
        } else {
            self.grid
                .mark_setup(column, self.row_of(lead_base), placement.lead_setup);
            self.grid
                .mark_job(column, self.row_of(placement.start), length, type_id);
            self.grid
                .record_column_top(column, type_id, self.row_of(placement.segment_top()));
        }

        let job = &mut self.active_jobs[slot - 1];
        job.lowest_committable_time = placement.segment_top();
        if job.is_finished() {
            self.active_jobs.remove(slot - 1);
            self.num_remaining_total -= 1;
        }

        self.check_status();
    }

    // --- legal-action enumeration ----------------------------------------

    fn refresh_actions(&mut self) {
        let mut actions = vec![Action::ADVANCE];
        let mut placements = HashMap::new();
        if !self.game_over {
            for slot in 1..=self.active_jobs.len() {
                self.enumerate_slot(slot, &mut actions, &mut placements);
            }
        }
        self.actions = actions;
        self.placements = placements;
    }

    fn enumerate_slot(
        &self,
        slot: usize,
        actions: &mut Vec<Action>,
        placements: &mut HashMap<Action, Placement>,
    ) {
        let job = &self.active_jobs[slot - 1];
        let column = match job.next_column() {
            Some(column) => column,
            None => return,
        };
        let length = job.segment_length(column);

        let floor_time = job.lowest_committable_time.max(self.base_time);
        let floor_row = self
            .row_of(floor_time)
            .min(self.grid.height() as i64 - 1)
            .max(0) as usize;

        // The column floor below the candidate area, walking up out of any
        // run the floor lands inside, plus the productive predecessor.
        let (free_row, predecessor) = match self.grid.highest_occupied_at_or_below(column, floor_row)
        {
            Some(occupied_row) => {
                let free_row = if occupied_row == floor_row {
                    self.grid.first_free_above(column, floor_row)
                } else {
                    occupied_row + 1
                };
                let predecessor = self.grid.top_job_at_or_below(column, free_row - 1);
                (Some(free_row), predecessor)
            }
            None => (None, None),
        };

        let lead_setup = match predecessor {
            Some((predecessor_id, _)) => match self.config.catalog().name_of(predecessor_id) {
                Some(from) => self.config.setup_rules().get(column, from, job.job_type()),
                None => 0,
            },
            None => 0,
        };

        let mut earliest = floor_time;
        if let Some(free_row) = free_row {
            earliest = earliest.max(self.time_of(free_row as i64) + lead_setup as i64);
        }

        let scan_from = free_row.unwrap_or(0);
        match self.grid.next_job_above(column, scan_from) {
            Some((follower_id, follower_row)) => {
                let follower_base = self.time_of(follower_row as i64);
                let trail_setup = match self.config.catalog().name_of(follower_id) {
                    Some(to) => self.config.setup_rules().get(column, job.job_type(), to),
                    None => 0,
                };
                let max_start = follower_base - trail_setup as i64 - length as i64;
                let mut delay = 0;
                while earliest + delay <= max_start {
                    let start = earliest + delay;
                    let action = Action::new(slot, delay);
                    actions.push(action);
                    placements.insert(
                        action,
                        Placement {
                            column,
                            start,
                            lead_setup,
                            length,
                            trail_setup,
                            trail_gap: (max_start - start) as usize,
                            follower: Some(follower_id),
                        },
                    );
                    delay += 1;
                }
            }
            None => {
                let window_limit = self.max_time - length as i64;
                let last_delay = if earliest > window_limit {
                    // Even the earliest start overflows the window: the move
                    // stays legal and commit extends the window.
                    0
                } else {
                    window_limit - earliest
                };
                for delay in 0..=last_delay {
                    let action = Action::new(slot, delay);
                    actions.push(action);
                    placements.insert(
                        action,
                        Placement {
                            column,
                            start: earliest + delay,
                            lead_setup,
                            length,
                            trail_setup: 0,
                            trail_gap: 0,
                            follower: None,
                        },
                    );
                }
            }
        }
    }
}
