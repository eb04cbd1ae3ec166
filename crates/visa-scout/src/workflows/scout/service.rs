use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::catalog::JobCatalog;
use super::domain::{ApplicationId, ApplicationSubmission, JobId, JobPosting, LastApplication};
use super::matching::{
    rank_jobs, score_job, Clock, MatchEngine, MatchReason, ScoredJob, SystemClock,
};
use super::store::{ApplicationStore, StoreError};

/// Service composing the application store, the job catalog and the match engine.
pub struct ScoutService<S, C = SystemClock> {
    store: Arc<S>,
    catalog: Arc<JobCatalog>,
    engine: MatchEngine<C>,
    sequence: AtomicU64,
}

const APPLICATION_ID_PREFIX: &str = "app-";

fn sequence_after(last: &ApplicationId) -> u64 {
    last.0
        .strip_prefix(APPLICATION_ID_PREFIX)
        .and_then(|digits| digits.parse::<u64>().ok())
        .map_or(1, |n| n.saturating_add(1))
}

/// Result of a recommendation request.
///
/// "Nothing submitted yet" and "submitted but nothing matched" are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoutOutcome {
    NoApplication,
    Matched {
        application_id: ApplicationId,
        /// Instant the recency bonus was computed against.
        evaluated_at: DateTime<Utc>,
        jobs: Vec<RecommendedJob>,
    },
}

/// Ranked job plus whether the applicant already applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendedJob {
    #[serde(flatten)]
    pub scored: ScoredJob,
    pub applied: bool,
}

/// Everything the detail view needs for a single posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDetail {
    pub job: JobPosting,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub reasons: Vec<MatchReason>,
    pub applied: bool,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub job_id: JobId,
    pub already_applied: bool,
}

impl<S, C> ScoutService<S, C>
where
    S: ApplicationStore + 'static,
    C: Clock + 'static,
{
    /// Application ids continue after the last stored application, so a
    /// file-backed store does not hand out the same id after a restart.
    pub fn new(store: Arc<S>, catalog: Arc<JobCatalog>, clock: C) -> Self {
        let first_id = match store.last_application() {
            Ok(Some(application)) => sequence_after(&application.id),
            Ok(None) => 1,
            Err(err) => {
                warn!(error = %err, "could not read last application; numbering from 1");
                1
            }
        };

        Self {
            store,
            catalog,
            engine: MatchEngine::new(clock),
            sequence: AtomicU64::new(first_id),
        }
    }

    fn next_application_id(&self) -> ApplicationId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ApplicationId(format!("{APPLICATION_ID_PREFIX}{id:06}"))
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.catalog
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.engine.now()
    }

    /// Persist a submission as the last application, replacing any earlier one.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<LastApplication, ScoutServiceError> {
        let application = LastApplication {
            id: self.next_application_id(),
            submitted_at: self.engine.now(),
            submission,
        };

        self.store.save_last_application(&application)?;
        info!(
            application_id = %application.id,
            visa_kind = %application.submission.visa_kind,
            jlpt = %application.submission.jlpt,
            "application submitted"
        );

        Ok(application)
    }

    pub fn last_application(&self) -> Result<Option<LastApplication>, ScoutServiceError> {
        Ok(self.store.last_application()?)
    }

    /// Rank the catalog against the last submitted application.
    pub fn recommendations(&self) -> Result<ScoutOutcome, ScoutServiceError> {
        let Some(application) = self.store.last_application()? else {
            return Ok(ScoutOutcome::NoApplication);
        };
        let applied = self.store.applied_jobs()?;
        let evaluated_at = self.engine.now();

        let jobs = rank_jobs(&application.snapshot(), self.catalog.iter(), evaluated_at)
            .into_iter()
            .map(|scored| RecommendedJob {
                applied: applied.contains(&scored.job.id),
                scored,
            })
            .collect();

        Ok(ScoutOutcome::Matched {
            application_id: application.id,
            evaluated_at,
            jobs,
        })
    }

    pub fn job_detail(&self, job_id: &JobId) -> Result<JobDetail, ScoutServiceError> {
        let job = self
            .catalog
            .get(job_id)
            .ok_or_else(|| ScoutServiceError::UnknownJob(job_id.clone()))?;
        let applied = self.store.applied_jobs()?.contains(job_id);
        let evaluated_at = self.engine.now();

        let (score, reasons) = match self.store.last_application()? {
            Some(application) => {
                let scored = score_job(&application.snapshot(), job, evaluated_at);
                (Some(scored.score), scored.reasons)
            }
            None => (None, Vec::new()),
        };

        Ok(JobDetail {
            job: job.clone(),
            score,
            reasons,
            applied,
            evaluated_at,
        })
    }

    /// Record an application to a posting. Applying twice is a no-op.
    pub fn apply(&self, job_id: &JobId) -> Result<ApplyOutcome, ScoutServiceError> {
        if !self.catalog.contains(job_id) {
            return Err(ScoutServiceError::UnknownJob(job_id.clone()));
        }

        let added = self.store.append_applied_job(job_id)?;
        if added {
            info!(job_id = %job_id, "job application recorded");
        }

        Ok(ApplyOutcome {
            job_id: job_id.clone(),
            already_applied: !added,
        })
    }

    pub fn applied_jobs(&self) -> Result<Vec<JobId>, ScoutServiceError> {
        Ok(self.store.applied_jobs()?)
    }
}

/// Error raised by the scout service.
#[derive(Debug, thiserror::Error)]
pub enum ScoutServiceError {
    #[error("job {0} is not in the catalog")]
    UnknownJob(JobId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
