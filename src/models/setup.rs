//! Sequence-dependent setup rules.
//!
//! When the job type placed in a column differs from the previous occupant,
//! the machine spends a number of non-productive cells on changeover. Each
//! column carries its own matrix, since the same transition can cost
//! differently on different machines.
//!
//! # Reference
//! Allahverdi et al. (2008), "A survey of scheduling problems with
//! setup times or costs"

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Setup times for one column: (from_type, to_type) → cells.
///
/// Same-type transitions return 0 unless explicitly set; other pairs fall
/// back to the matrix default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupMatrix {
    transitions: HashMap<String, HashMap<String, usize>>,
    /// Default setup cells when no explicit transition is defined.
    pub default: usize,
}

impl SetupMatrix {
    /// Creates an empty matrix with default 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default transition cost.
    pub fn with_default(mut self, default: usize) -> Self {
        self.default = default;
        self
    }

    /// Defines the setup cells for a transition.
    pub fn set(&mut self, from: impl Into<String>, to: impl Into<String>, cells: usize) {
        self.transitions
            .entry(from.into())
            .or_default()
            .insert(to.into(), cells);
    }

    /// Setup cells for a transition.
    pub fn get(&self, from: &str, to: &str) -> usize {
        let explicit = self.transitions.get(from).and_then(|row| row.get(to));
        match explicit {
            Some(&cells) => cells,
            // Same-type changeover is free unless a rule says otherwise.
            None if from == to => 0,
            None => self.default,
        }
    }

    /// Largest cost this matrix can produce (explicit entries and default).
    pub fn max_cells(&self) -> usize {
        self.transitions
            .values()
            .flat_map(|row| row.values())
            .copied()
            .chain(std::iter::once(self.default))
            .max()
            .unwrap_or(0)
    }

    /// Number of explicitly defined transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(|row| row.len()).sum()
    }
}

/// Per-column setup matrices for the whole grid.
///
/// # Example
///
/// ```
/// use u_schedsim::models::SetupRuleTable;
///
/// let mut table = SetupRuleTable::new(2);
/// table.set_rule(0, "A", "B", 3);
/// table.set_rule(1, "B", "A", 1);
///
/// assert_eq!(table.get(0, "A", "B"), 3);
/// assert_eq!(table.get(0, "B", "A"), 0); // Not defined, default 0
/// assert_eq!(table.max_setup_time(), 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupRuleTable {
    matrices: Vec<SetupMatrix>,
}

impl SetupRuleTable {
    /// Creates a table with one empty matrix per column.
    pub fn new(num_columns: usize) -> Self {
        Self {
            matrices: vec![SetupMatrix::new(); num_columns],
        }
    }

    /// Builder: defines a transition and returns self.
    pub fn with_rule(
        mut self,
        column: usize,
        from: impl Into<String>,
        to: impl Into<String>,
        cells: usize,
    ) -> Self {
        self.set_rule(column, from, to, cells);
        self
    }

    /// Defines the setup cells for a transition in one column.
    pub fn set_rule(
        &mut self,
        column: usize,
        from: impl Into<String>,
        to: impl Into<String>,
        cells: usize,
    ) {
        if let Some(matrix) = self.matrices.get_mut(column) {
            matrix.set(from, to, cells);
        }
    }

    /// Replaces the matrix for one column.
    pub fn with_matrix(mut self, column: usize, matrix: SetupMatrix) -> Self {
        if let Some(slot) = self.matrices.get_mut(column) {
            *slot = matrix;
        }
        self
    }

    /// Setup cells for a transition in one column.
    ///
    /// Returns 0 for columns outside the table.
    pub fn get(&self, column: usize, from: &str, to: &str) -> usize {
        self.matrices
            .get(column)
            .map(|m| m.get(from, to))
            .unwrap_or(0)
    }

    /// Number of columns covered.
    pub fn num_columns(&self) -> usize {
        self.matrices.len()
    }

    /// Global maximum setup time over all columns.
    ///
    /// Sizes the grid's hidden lookback buffer.
    pub fn max_setup_time(&self) -> usize {
        self.matrices.iter().map(|m| m.max_cells()).max().unwrap_or(0)
    }
}
