//! Pending-job feed.
//!
//! The ordered list of job arrivals the simulation will consume, plus the
//! grid width. The feed is an input table: the engine never appends to it.

use serde::{Deserialize, Serialize};

/// One scheduled job arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobArrival {
    /// Simulated time at which the job enters the active list.
    pub arrival_time: i64,
    /// Catalog name of the job type.
    pub job_type: String,
}

/// The ordered arrival feed for one simulation run.
///
/// # Example
///
/// ```
/// use u_schedsim::models::JobFeed;
///
/// let feed = JobFeed::new(3)
///     .with_arrival(0, "A")
///     .with_arrival(0, "B")
///     .with_arrival(4, "A");
///
/// assert_eq!(feed.total_job_count(), 3);
/// assert_eq!(feed.width(), 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFeed {
    width: usize,
    arrivals: Vec<JobArrival>,
}

impl JobFeed {
    /// Creates an empty feed for a grid `width` columns wide.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            arrivals: Vec::new(),
        }
    }

    /// Appends an arrival. Arrival times must be non-decreasing.
    pub fn with_arrival(mut self, arrival_time: i64, job_type: impl Into<String>) -> Self {
        self.arrivals.push(JobArrival {
            arrival_time,
            job_type: job_type.into(),
        });
        self
    }

    /// The arrivals in feed order.
    pub fn arrivals(&self) -> &[JobArrival] {
        &self.arrivals
    }

    /// Total number of jobs in the feed.
    pub fn total_job_count(&self) -> usize {
        self.arrivals.len()
    }

    /// Grid width (number of machine columns).
    pub fn width(&self) -> usize {
        self.width
    }
}
