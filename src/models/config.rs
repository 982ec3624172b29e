//! Simulation configuration.
//!
//! Bundles the three externally loaded tables — job-type catalog, setup
//! rules, and the arrival feed — into one immutable, validated object.
//! Configuration problems surface here, at construction, never during
//! simulation.

use serde::{Deserialize, Serialize};

use crate::validation::{validate_config, ConfigError};

use super::{JobFeed, JobTypeCatalog, SetupRuleTable};

/// The immutable input to one simulation.
///
/// # Example
///
/// ```
/// use u_schedsim::models::{JobFeed, JobTypeCatalog, SetupRuleTable, SimConfig};
///
/// let catalog = JobTypeCatalog::new(2)
///     .with_type("A", &[(0, 2), (1, 1)])
///     .with_type("B", &[(1, 2)]);
/// let setup = SetupRuleTable::new(2).with_rule(1, "A", "B", 3);
/// let feed = JobFeed::new(2).with_arrival(0, "A").with_arrival(1, "B");
///
/// let config = SimConfig::new(catalog, setup, feed).unwrap();
/// assert_eq!(config.max_setup_time(), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    catalog: JobTypeCatalog,
    setup_rules: SetupRuleTable,
    feed: JobFeed,
}

impl SimConfig {
    /// Validates and bundles the input tables.
    ///
    /// # Errors
    /// Returns every detected integrity problem at once.
    pub fn new(
        catalog: JobTypeCatalog,
        setup_rules: SetupRuleTable,
        feed: JobFeed,
    ) -> Result<Self, Vec<ConfigError>> {
        validate_config(&catalog, &setup_rules, &feed)?;
        Ok(Self {
            catalog,
            setup_rules,
            feed,
        })
    }

    /// The job-type catalog.
    pub fn catalog(&self) -> &JobTypeCatalog {
        &self.catalog
    }

    /// The per-column setup rules.
    pub fn setup_rules(&self) -> &SetupRuleTable {
        &self.setup_rules
    }

    /// The arrival feed.
    pub fn feed(&self) -> &JobFeed {
        &self.feed
    }

    /// Grid width in machine columns.
    pub fn width(&self) -> usize {
        self.catalog.num_columns()
    }

    /// Global maximum setup time; sizes the hidden lookback buffer.
    pub fn max_setup_time(&self) -> usize {
        self.setup_rules.max_setup_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ConfigErrorKind;

    #[test]
    fn test_config_construction() {
        let catalog = JobTypeCatalog::new(1).with_type("A", &[(0, 2)]);
        let config = SimConfig::new(catalog, SetupRuleTable::new(1), JobFeed::new(1)).unwrap();
        assert_eq!(config.width(), 1);
        assert_eq!(config.max_setup_time(), 0);
    }

    #[test]
    fn test_config_rejects_bad_input() {
        let catalog = JobTypeCatalog::new(1).with_type("A", &[(0, 1)]);
        let feed = JobFeed::new(1).with_arrival(0, "missing");
        let errors = SimConfig::new(catalog, SetupRuleTable::new(1), feed).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ConfigErrorKind::UnknownJobType));
    }

    #[test]
    fn test_config_round_trips_as_json() {
        // The shape an external loader would hand over.
        let catalog = JobTypeCatalog::new(2)
            .with_type("A", &[(0, 2), (1, 1)])
            .with_type("B", &[(1, 2)]);
        let setup = SetupRuleTable::new(2).with_rule(1, "A", "B", 3);
        let feed = JobFeed::new(2).with_arrival(0, "A");
        let config = SimConfig::new(catalog, setup, feed).unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let mut back: SimConfig = serde_json::from_str(&json).unwrap();
        back.catalog.reindex();
        assert_eq!(back.max_setup_time(), 3);
        assert_eq!(back.catalog().get("B").unwrap().type_id, 3);
        assert_eq!(back.feed().total_job_count(), 1);
    }
}
