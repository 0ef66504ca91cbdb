//! Instructor statistics and the loader that keeps them fresh

use std::collections::BTreeSet;

use chrono::{DateTime, Local};
use serde::Deserialize;
use thiserror::Error;

/// Aggregate numbers shown on the summary cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Statistics {
    #[serde(rename = "misCursos")]
    pub course_count: u32,
    #[serde(rename = "totalEstudiantes")]
    pub student_count: u32,
    #[serde(rename = "clasesHoy")]
    pub todays_class_count: u32,
    #[serde(rename = "asistenciaPromedio")]
    pub average_attendance_rate: f64,
}

impl Statistics {
    pub fn new(
        course_count: u32,
        student_count: u32,
        todays_class_count: u32,
        average_attendance_rate: f64,
    ) -> Self {
        Self {
            course_count,
            student_count,
            todays_class_count,
            average_attendance_rate,
        }
    }

    /// Reject payloads that decoded but cannot be displayed
    pub fn validate(self) -> Result<Self, StatsFetchError> {
        let rate = self.average_attendance_rate;
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err(StatsFetchError::Malformed(format!(
                "asistenciaPromedio out of range: {rate}"
            )));
        }
        Ok(self)
    }

    /// Attendance rate as shown on the card, e.g. `87.5%`
    pub fn attendance_label(&self) -> String {
        format!("{:.1}%", self.average_attendance_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsFetchError {
    #[error("statistics request failed: {0}")]
    Transport(String),
    #[error("statistics endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("session rejected by statistics endpoint")]
    Unauthorized,
    #[error("malformed statistics payload: {0}")]
    Malformed(String),
}

/// What to do with responses that are no longer the newest request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Apply every response in delivery order
    #[default]
    LastWriteWins,
    /// Drop responses from superseded requests or delivered outside Summary
    LatestOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsOutcome {
    Applied,
    Retained(StatsFetchError),
    Discarded,
}

#[derive(Debug)]
pub struct StatsLoader {
    current: Statistics,
    policy: StalePolicy,
    next_generation: u64,
    latest_issued: Option<u64>,
    in_flight: BTreeSet<u64>,
    outbox: Vec<u64>,
    last_error: Option<StatsFetchError>,
    updated_at: Option<DateTime<Local>>,
    revision: u64,
}

impl StatsLoader {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            current: Statistics::default(),
            policy,
            next_generation: 1,
            latest_issued: None,
            in_flight: BTreeSet::new(),
            outbox: Vec::new(),
            last_error: None,
            updated_at: None,
            revision: 0,
        }
    }

    /// Queue a fetch; the app loop hands queued generations to the worker
    pub fn refresh(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.latest_issued = Some(generation);
        self.in_flight.insert(generation);
        self.outbox.push(generation);
        tracing::debug!(generation, "statistics refresh requested");
        generation
    }

    pub fn take_requests(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.outbox)
    }

    /// Settle a request. `summary_active` tells whether the Summary view is
    /// still the one on screen when the response lands.
    pub fn apply(
        &mut self,
        generation: u64,
        result: Result<Statistics, StatsFetchError>,
        summary_active: bool,
    ) -> StatsOutcome {
        self.in_flight.remove(&generation);

        if self.policy == StalePolicy::LatestOnly {
            let superseded = self.latest_issued.is_some_and(|latest| generation < latest);
            if superseded || !summary_active {
                tracing::debug!(generation, superseded, "dropping stale statistics response");
                return StatsOutcome::Discarded;
            }
        }

        match result.and_then(Statistics::validate) {
            Ok(stats) => {
                self.current = stats;
                self.last_error = None;
                self.updated_at = Some(Local::now());
                self.revision += 1;
                StatsOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(generation, error = %err, "failed to load statistics");
                self.last_error = Some(err.clone());
                StatsOutcome::Retained(err)
            }
        }
    }

    pub fn current(&self) -> &Statistics {
        &self.current
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn last_error(&self) -> Option<&StatsFetchError> {
        self.last_error.as_ref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    /// Bumped on every successful replacement
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
