use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::debug;

use super::super::domain::{ApplicationSnapshot, JobPosting};
use super::rules::score_job;
use super::ScoredJob;

/// Score every posting, drop non-matches and order the rest.
///
/// Ordering is score descending, then posting date descending with undated
/// postings treated as the epoch. The sort is stable, so remaining ties keep
/// catalog order.
pub fn rank_jobs<'a, I>(app: &ApplicationSnapshot, jobs: I, now: DateTime<Utc>) -> Vec<ScoredJob>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let mut candidates = 0usize;
    let mut keyed: Vec<(i64, ScoredJob)> = jobs
        .into_iter()
        .inspect(|_| candidates += 1)
        .map(|job| score_job(app, job, now))
        .filter(|scored| scored.score > 0)
        .map(|scored| (recency_key(&scored), scored))
        .collect();

    keyed.sort_by(|(a_key, a), (b_key, b)| compare_ranked(a.score, *a_key, b.score, *b_key));

    debug!(
        candidates,
        matches = keyed.len(),
        visa_kind = %app.visa_kind,
        jlpt = %app.jlpt,
        "ranked job catalog"
    );

    keyed.into_iter().map(|(_, scored)| scored).collect()
}

fn recency_key(scored: &ScoredJob) -> i64 {
    scored
        .job
        .posted_at()
        .map(|posted| posted.timestamp_millis())
        .unwrap_or(0)
}

fn compare_ranked(a_score: u8, a_key: i64, b_score: u8, b_key: i64) -> Ordering {
    b_score.cmp(&a_score).then_with(|| b_key.cmp(&a_key))
}
