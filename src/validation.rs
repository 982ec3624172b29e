//! Configuration validation.
//!
//! Checks the three input tables — job-type catalog, setup rules, and the
//! arrival feed — for structural integrity before a simulation is built.
//! Detects:
//! - Duplicate type names
//! - Empty or self-repeating drop orders
//! - Column references outside the grid
//! - Dimension mismatches between catalog, setup table, and feed
//! - Unknown job types and unordered arrivals in the feed
//! - Pieces taller than the visible window

use crate::models::{JobFeed, JobTypeCatalog, SetupRuleTable, VISIBLE_ROWS};
use std::collections::HashSet;

/// Validation result.
pub type ConfigResult = Result<(), Vec<ConfigError>>;

/// A configuration error.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Error category.
    pub kind: ConfigErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// Two job types share a name.
    DuplicateId,
    /// A job type has no drop segments.
    EmptyDropOrder,
    /// A job type visits the same column twice.
    DuplicateDropColumn,
    /// A drop order references a column outside the grid.
    InvalidColumnReference,
    /// A drop segment has zero length.
    ZeroLengthSegment,
    /// Catalog, setup table, and feed disagree on the column count.
    DimensionMismatch,
    /// The feed references a job type missing from the catalog.
    UnknownJobType,
    /// Feed arrival times are not non-decreasing.
    UnorderedFeed,
    /// A feed arrival time is negative.
    NegativeArrivalTime,
    /// A piece is taller than the visible window.
    PieceTooTall,
}

impl ConfigError {
    fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input tables for a simulation.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(
    catalog: &JobTypeCatalog,
    setup_rules: &SetupRuleTable,
    feed: &JobFeed,
) -> ConfigResult {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    for job_type in catalog.types() {
        if !names.insert(job_type.name.as_str()) {
            errors.push(ConfigError::new(
                ConfigErrorKind::DuplicateId,
                format!("Duplicate job type name: {}", job_type.name),
            ));
        }

        if job_type.drop_order.is_empty() {
            errors.push(ConfigError::new(
                ConfigErrorKind::EmptyDropOrder,
                format!("Job type '{}' has no drop segments", job_type.name),
            ));
        }

        let mut seen_columns = HashSet::new();
        for &column in &job_type.drop_order {
            if column >= catalog.num_columns() {
                errors.push(ConfigError::new(
                    ConfigErrorKind::InvalidColumnReference,
                    format!(
                        "Job type '{}' references column {column} outside the {}-column grid",
                        job_type.name,
                        catalog.num_columns()
                    ),
                ));
            } else if !seen_columns.insert(column) {
                errors.push(ConfigError::new(
                    ConfigErrorKind::DuplicateDropColumn,
                    format!("Job type '{}' visits column {column} twice", job_type.name),
                ));
            } else if job_type.segment_length(column) == 0 {
                errors.push(ConfigError::new(
                    ConfigErrorKind::ZeroLengthSegment,
                    format!(
                        "Job type '{}' has a zero-length segment in column {column}",
                        job_type.name
                    ),
                ));
            }
        }

        if job_type.total_height() > VISIBLE_ROWS {
            errors.push(ConfigError::new(
                ConfigErrorKind::PieceTooTall,
                format!(
                    "Job type '{}' is {} cells tall; the visible window holds {}",
                    job_type.name,
                    job_type.total_height(),
                    VISIBLE_ROWS
                ),
            ));
        }
    }

    if setup_rules.num_columns() != catalog.num_columns() {
        errors.push(ConfigError::new(
            ConfigErrorKind::DimensionMismatch,
            format!(
                "Setup table covers {} columns, catalog has {}",
                setup_rules.num_columns(),
                catalog.num_columns()
            ),
        ));
    }

    if feed.width() != catalog.num_columns() {
        errors.push(ConfigError::new(
            ConfigErrorKind::DimensionMismatch,
            format!(
                "Feed is {} columns wide, catalog has {}",
                feed.width(),
                catalog.num_columns()
            ),
        ));
    }

    let mut last_arrival = i64::MIN;
    for arrival in feed.arrivals() {
        if catalog.get(&arrival.job_type).is_none() {
            errors.push(ConfigError::new(
                ConfigErrorKind::UnknownJobType,
                format!("Feed references unknown job type '{}'", arrival.job_type),
            ));
        }
        if arrival.arrival_time < 0 {
            errors.push(ConfigError::new(
                ConfigErrorKind::NegativeArrivalTime,
                format!(
                    "Arrival of '{}' at negative time {}",
                    arrival.job_type, arrival.arrival_time
                ),
            ));
        }
        if arrival.arrival_time < last_arrival {
            errors.push(ConfigError::new(
                ConfigErrorKind::UnorderedFeed,
                format!(
                    "Arrival of '{}' at time {} comes after time {}",
                    arrival.job_type, arrival.arrival_time, last_arrival
                ),
            ));
        }
        last_arrival = last_arrival.max(arrival.arrival_time);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_catalog() -> JobTypeCatalog {
        JobTypeCatalog::new(2)
            .with_type("A", &[(0, 2), (1, 1)])
            .with_type("B", &[(1, 3)])
    }

    fn kinds(result: ConfigResult) -> Vec<ConfigErrorKind> {
        result.unwrap_err().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_valid_config_passes() {
        let catalog = valid_catalog();
        let setup = SetupRuleTable::new(2).with_rule(0, "A", "B", 3);
        let feed = JobFeed::new(2).with_arrival(0, "A").with_arrival(2, "B");
        assert!(validate_config(&catalog, &setup, &feed).is_ok());
    }

    #[test]
    fn test_duplicate_type_name() {
        let catalog = JobTypeCatalog::new(1)
            .with_type("A", &[(0, 1)])
            .with_type("A", &[(0, 2)]);
        let result = validate_config(&catalog, &SetupRuleTable::new(1), &JobFeed::new(1));
        assert!(kinds(result).contains(&ConfigErrorKind::DuplicateId));
    }

    #[test]
    fn test_column_out_of_range() {
        let catalog = JobTypeCatalog::new(2).with_type("A", &[(5, 1)]);
        let result = validate_config(&catalog, &SetupRuleTable::new(2), &JobFeed::new(2));
        assert!(kinds(result).contains(&ConfigErrorKind::InvalidColumnReference));
    }

    #[test]
    fn test_duplicate_drop_column() {
        let catalog = JobTypeCatalog::new(2).with_type("A", &[(0, 1), (0, 2)]);
        let result = validate_config(&catalog, &SetupRuleTable::new(2), &JobFeed::new(2));
        assert!(kinds(result).contains(&ConfigErrorKind::DuplicateDropColumn));
    }

    #[test]
    fn test_empty_drop_order() {
        let catalog = JobTypeCatalog::new(1).with_type("A", &[]);
        let result = validate_config(&catalog, &SetupRuleTable::new(1), &JobFeed::new(1));
        assert!(kinds(result).contains(&ConfigErrorKind::EmptyDropOrder));
    }

    #[test]
    fn test_dimension_mismatches() {
        let catalog = valid_catalog();
        let result = validate_config(&catalog, &SetupRuleTable::new(3), &JobFeed::new(4));
        let kinds = kinds(result);
        assert_eq!(
            kinds
                .iter()
                .filter(|&k| *k == ConfigErrorKind::DimensionMismatch)
                .count(),
            2
        );
    }

    #[test]
    fn test_feed_errors() {
        let catalog = valid_catalog();
        let feed = JobFeed::new(2)
            .with_arrival(5, "A")
            .with_arrival(3, "Z")
            .with_arrival(-1, "B");
        let kinds = kinds(validate_config(&catalog, &SetupRuleTable::new(2), &feed));
        assert!(kinds.contains(&ConfigErrorKind::UnknownJobType));
        assert!(kinds.contains(&ConfigErrorKind::UnorderedFeed));
        assert!(kinds.contains(&ConfigErrorKind::NegativeArrivalTime));
    }

    #[test]
    fn test_piece_too_tall() {
        let catalog = JobTypeCatalog::new(1).with_type("A", &[(0, VISIBLE_ROWS + 1)]);
        let result = validate_config(&catalog, &SetupRuleTable::new(1), &JobFeed::new(1));
        assert!(kinds(result).contains(&ConfigErrorKind::PieceTooTall));
    }
}
