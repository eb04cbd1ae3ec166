use chrono::{DateTime, Utc};

use super::super::domain::{ApplicationSnapshot, JlptLevel, JobPosting, VisaKind};
use super::{MatchReason, MatchReasonKind, ScoredJob};

pub(crate) const JLPT_EXACT_WEIGHT: u8 = 50;
pub(crate) const JLPT_NEAR_WEIGHT: u8 = 30;
pub(crate) const VISA_KIND_WEIGHT: u8 = 40;
pub(crate) const RECENCY_MAX_WEIGHT: u8 = 10;
pub(crate) const RECENCY_WINDOW_DAYS: f64 = 14.0;
pub(crate) const MAX_SCORE: u8 = 100;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Score one posting against an application at the given instant.
///
/// Factors are evaluated in a fixed order (JLPT, visa kind, recency) and
/// the reasons keep that order. Unrecognized levels or kinds and missing
/// dates simply contribute nothing.
pub fn score_job(app: &ApplicationSnapshot, job: &JobPosting, now: DateTime<Utc>) -> ScoredJob {
    let reasons: Vec<MatchReason> = [
        jlpt_reason(app.jlpt, job.jlpt),
        visa_kind_reason(app.visa_kind, job.visa_kind),
        recency_reason(job, now),
    ]
    .into_iter()
    .flatten()
    .collect();

    let total: u32 = reasons.iter().map(|reason| u32::from(reason.weight)).sum();
    let score = total.min(u32::from(MAX_SCORE)) as u8;

    ScoredJob {
        job: job.clone(),
        score,
        reasons,
    }
}

pub(crate) fn jlpt_reason(applicant: JlptLevel, posting: JlptLevel) -> Option<MatchReason> {
    let a = applicant.ordinal()?;
    let b = posting.ordinal()?;

    match a.abs_diff(b) {
        0 => Some(MatchReason::new(MatchReasonKind::JlptExact, JLPT_EXACT_WEIGHT)),
        1 => Some(MatchReason::new(MatchReasonKind::JlptNear, JLPT_NEAR_WEIGHT)),
        _ => None,
    }
}

pub(crate) fn visa_kind_reason(applicant: VisaKind, posting: VisaKind) -> Option<MatchReason> {
    (applicant.is_recognized() && applicant == posting)
        .then(|| MatchReason::new(MatchReasonKind::VisaKind, VISA_KIND_WEIGHT))
}

/// Linear decay from 10 points on the posting day to 0 at two weeks.
/// Future-dated postings are capped at the day-zero value.
pub(crate) fn recency_reason(job: &JobPosting, now: DateTime<Utc>) -> Option<MatchReason> {
    let posted = job.posted_at()?;
    let days = (now - posted).num_milliseconds() as f64 / MILLIS_PER_DAY;
    let weight = recency_weight(days);

    (weight > 0).then(|| MatchReason::new(MatchReasonKind::Recency, weight))
}

pub(crate) fn recency_weight(days: f64) -> u8 {
    let max = f64::from(RECENCY_MAX_WEIGHT);
    let raw = ((RECENCY_WINDOW_DAYS - days) * (max / RECENCY_WINDOW_DAYS)).round();
    raw.clamp(0.0, max) as u8
}
