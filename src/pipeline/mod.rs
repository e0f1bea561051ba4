//! The fetch, summarize, format and deliver cycle, once per topic

pub mod compose;
pub mod deliver;
pub mod runner;

pub use runner::{CALENDAR_REPORT_KEY, Pipeline};

use crate::errors::BriefingError;

/// How one topic (or the calendar digest) ended.
#[derive(Debug)]
pub enum TopicOutcome {
    Posted,
    /// Nothing to show and the empty-batch policy said to stay quiet.
    SkippedEmpty,
    /// Articles were fetched but every summary failed.
    NoSummary,
    Unconfigured { missing: &'static str },
    FetchFailed(BriefingError),
    DeliveryFailed(BriefingError),
}

impl TopicOutcome {
    #[must_use]
    pub fn is_posted(&self) -> bool {
        matches!(self, Self::Posted)
    }
}

#[derive(Debug)]
pub struct TopicReport {
    pub key: String,
    pub outcome: TopicOutcome,
}
