//! Simulation quality metrics.
//!
//! Computes standard performance indicators from the history log of a
//! (finished or running) simulation.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Horizon | Rows between the first and last non-empty history row |
//! | Productive cells | Cells occupied by job segments |
//! | Setup cells | Non-productive changeover cells |
//! | Idle cells | Empty cells inside the horizon |
//! | Utilization | productive / horizon, per column and averaged |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::HashMap;

use crate::models::{HistoryRow, JobTypeId};

/// Performance indicators over a history log.
#[derive(Debug, Clone)]
pub struct SimulationKpi {
    /// Rows spanned by committed work (empty lead-in/lead-out trimmed).
    pub horizon_rows: usize,
    /// Cells occupied by job segments.
    pub productive_cells: u64,
    /// Cells spent on changeovers.
    pub setup_cells: u64,
    /// Empty cells inside the horizon.
    pub idle_cells: u64,
    /// productive / horizon per column.
    pub utilization_by_column: Vec<f64>,
    /// Mean of the per-column utilizations.
    pub avg_utilization: f64,
    /// Productive cells per job type.
    pub cells_by_type: HashMap<JobTypeId, u64>,
}

impl SimulationKpi {
    /// Computes KPIs from a history log (oldest row first).
    pub fn from_history(history: &[HistoryRow]) -> Self {
        let first = history
            .iter()
            .position(|row| row.iter().any(|c| !c.is_empty()));
        let span = match first {
            Some(first) => {
                let last = history
                    .iter()
                    .rposition(|row| row.iter().any(|c| !c.is_empty()))
                    .unwrap_or(first);
                &history[first..=last]
            }
            None => &history[..0],
        };

        let width = span.first().map(|row| row.len()).unwrap_or(0);
        let mut productive_cells = 0u64;
        let mut setup_cells = 0u64;
        let mut idle_cells = 0u64;
        let mut productive_by_column = vec![0u64; width];
        let mut cells_by_type: HashMap<JobTypeId, u64> = HashMap::new();

        for row in span {
            for (column, cell) in row.iter().enumerate() {
                match cell.job_type() {
                    Some(type_id) => {
                        productive_cells += 1;
                        productive_by_column[column] += 1;
                        *cells_by_type.entry(type_id).or_insert(0) += 1;
                    }
                    None if cell.is_setup() => setup_cells += 1,
                    None => idle_cells += 1,
                }
            }
        }

        let horizon_rows = span.len();
        let utilization_by_column: Vec<f64> = if horizon_rows == 0 {
            vec![0.0; width]
        } else {
            productive_by_column
                .iter()
                .map(|&p| p as f64 / horizon_rows as f64)
                .collect()
        };
        let avg_utilization = if utilization_by_column.is_empty() {
            0.0
        } else {
            utilization_by_column.iter().sum::<f64>() / utilization_by_column.len() as f64
        };

        Self {
            horizon_rows,
            productive_cells,
            setup_cells,
            idle_cells,
            utilization_by_column,
            avg_utilization,
            cells_by_type,
        }
    }

    /// Fraction of the horizon lost to changeovers, per the whole grid.
    pub fn setup_ratio(&self) -> f64 {
        let total = self.productive_cells + self.setup_cells + self.idle_cells;
        if total == 0 {
            0.0
        } else {
            self.setup_cells as f64 / total as f64
        }
    }
}
