//! Visa-application driven job scouting.
//!
//! A submitted application is reduced to an [`ApplicationSnapshot`] (visa kind
//! and JLPT level), every posting in the [`JobCatalog`] is scored against it,
//! and the non-zero matches are ranked for the job list.

pub mod catalog;
pub mod domain;
pub mod matching;
pub mod router;
pub mod service;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, JobCatalog};
pub use domain::{
    parse_timestamp, ApplicationId, ApplicationSnapshot, ApplicationSubmission, JlptLevel, JobId,
    JobPosting, LastApplication, VisaKind,
};
pub use matching::{
    rank_jobs, score_job, Clock, FixedClock, MatchEngine, MatchReason, MatchReasonKind,
    ScoredJob, SystemClock,
};
pub use router::scout_router;
pub use service::{
    ApplyOutcome, JobDetail, RecommendedJob, ScoutOutcome, ScoutService, ScoutServiceError,
};
pub use store::{ApplicationStore, JsonFileStore, StoreError};
pub use views::{format_relative, format_salary_range, JobCardView, Language};
