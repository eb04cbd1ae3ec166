mod clock;
mod ranking;
mod rules;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ranking::rank_jobs;
pub use rules::score_job;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::JobCatalog;
use super::domain::{ApplicationSnapshot, JobPosting};

/// Stateless matcher bound to a time source.
pub struct MatchEngine<C = SystemClock> {
    clock: C,
}

impl<C: Clock> MatchEngine<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn score(&self, app: &ApplicationSnapshot, job: &JobPosting) -> ScoredJob {
        score_job(app, job, self.clock.now())
    }

    pub fn rank(&self, app: &ApplicationSnapshot, catalog: &JobCatalog) -> Vec<ScoredJob> {
        rank_jobs(app, catalog.iter(), self.clock.now())
    }
}

impl Default for MatchEngine<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

/// Category of a match reason; the presentation layer localizes by this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReasonKind {
    JlptExact,
    JlptNear,
    VisaKind,
    Recency,
}

impl MatchReasonKind {
    pub const fn key(self) -> &'static str {
        match self {
            MatchReasonKind::JlptExact => "jlpt_exact",
            MatchReasonKind::JlptNear => "jlpt_near",
            MatchReasonKind::VisaKind => "visa_kind",
            MatchReasonKind::Recency => "recency",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MatchReasonKind::JlptExact => "JLPT exact match",
            MatchReasonKind::JlptNear => "JLPT near match (±1)",
            MatchReasonKind::VisaKind => "visa-kind match",
            MatchReasonKind::Recency => "new-posting bonus",
        }
    }
}

/// Discrete contribution to a match score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReason {
    pub kind: MatchReasonKind,
    pub label: String,
    pub weight: u8,
}

impl MatchReason {
    pub fn new(kind: MatchReasonKind, weight: u8) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            weight,
        }
    }
}

/// A posting annotated with its score (0..=100) and the reasons behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredJob {
    #[serde(flatten)]
    pub job: JobPosting,
    pub score: u8,
    pub reasons: Vec<MatchReason>,
}

impl ScoredJob {
    pub fn reason(&self, kind: MatchReasonKind) -> Option<&MatchReason> {
        self.reasons.iter().find(|reason| reason.kind == kind)
    }
}
