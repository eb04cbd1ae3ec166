use crate::infra::{load_catalog, InMemoryApplicationStore};
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use visa_scout::error::AppError;
use visa_scout::workflows::scout::{
    rank_jobs, ApplicationSnapshot, ApplicationSubmission, FixedClock, JlptLevel, JobCardView,
    JobCatalog, Language, RecommendedJob, ScoutOutcome, ScoutService, VisaKind,
};

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Visa kind of the applicant (e.g. skilled-worker, student)
    #[arg(long, value_parser = crate::infra::parse_visa_kind)]
    pub(crate) visa_kind: VisaKind,
    /// JLPT level of the applicant (none, N5 .. N1)
    #[arg(long, value_parser = crate::infra::parse_jlpt)]
    pub(crate) jlpt: JlptLevel,
    /// Job catalog to rank (.json or .csv). Defaults to the bundled postings.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Reference instant for recency (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Display language for labels (ja, en, zh)
    #[arg(long, default_value = "ja")]
    pub(crate) lang: String,
    /// Print the ranked postings as JSON instead of a listing
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference instant for recency (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Display language for labels (ja, en, zh)
    #[arg(long, default_value = "ja")]
    pub(crate) lang: String,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        visa_kind,
        jlpt,
        catalog,
        now,
        lang,
        json,
    } = args;

    let catalog = load_catalog(catalog.as_deref())?;
    let now = now.unwrap_or_else(Utc::now);
    let language = resolve_language(&lang);
    let application = ApplicationSnapshot::new(visa_kind, jlpt);
    let ranked = rank_jobs(&application, &catalog, now);

    if json {
        match serde_json::to_string_pretty(&ranked) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Ranking payload unavailable: {err}"),
        }
        return Ok(());
    }

    println!(
        "Ranking {} postings for {} / JLPT {} as of {}",
        catalog.len(),
        visa_kind,
        jlpt,
        now.to_rfc3339()
    );
    let cards: Vec<JobCardView> = ranked
        .into_iter()
        .map(|scored| {
            JobCardView::from_recommended(
                &RecommendedJob {
                    scored,
                    applied: false,
                },
                now,
                language,
            )
        })
        .collect();
    render_cards(&cards);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { now, lang } = args;
    let now = now.unwrap_or_else(Utc::now);
    let language = resolve_language(&lang);

    println!("Visa scout demo");
    let store = Arc::new(InMemoryApplicationStore::default());
    let catalog = Arc::new(JobCatalog::standard());
    let service = ScoutService::new(store, catalog.clone(), FixedClock(now));

    if let Ok(ScoutOutcome::NoApplication) = service.recommendations() {
        println!("- No application on file yet; the job list starts empty");
    }

    let application = service.submit(demo_submission())?;
    println!(
        "- Submitted application {} ({} / JLPT {})",
        application.id, application.submission.visa_kind, application.submission.jlpt
    );

    let jobs = match service.recommendations()? {
        ScoutOutcome::Matched { jobs, .. } => jobs,
        ScoutOutcome::NoApplication => {
            println!("  Application was not persisted");
            return Ok(());
        }
    };
    println!(
        "- {} of {} postings matched",
        jobs.len(),
        service.catalog().len()
    );
    let cards: Vec<JobCardView> = jobs
        .iter()
        .map(|job| JobCardView::from_recommended(job, now, language))
        .collect();
    render_cards(&cards);

    let Some(top) = jobs.first() else {
        println!("  Nothing to apply to");
        return Ok(());
    };
    let top_id = top.scored.job.id.clone();
    let first = service.apply(&top_id)?;
    let second = service.apply(&top_id)?;
    println!(
        "- Applied to {} (repeat apply recorded as already applied: {})",
        first.job_id, second.already_applied
    );

    let detail = service.job_detail(&top_id)?;
    match serde_json::to_string_pretty(&detail) {
        Ok(json) => println!("  Detail payload:\n{json}"),
        Err(err) => println!("  Detail payload unavailable: {err}"),
    }

    Ok(())
}

fn demo_submission() -> ApplicationSubmission {
    let mut submission = ApplicationSubmission::new(VisaKind::SkilledWorker, JlptLevel::N2);
    submission.name = "Nguyen Van A".to_string();
    submission.nationality = "Vietnam".to_string();
    submission.passport_number = "redacted".to_string();
    submission
}

fn resolve_language(code: &str) -> Language {
    Language::from_code(code).unwrap_or_default()
}

fn render_cards(cards: &[JobCardView]) {
    if cards.is_empty() {
        println!("  No matching postings");
        return;
    }

    for (rank, card) in cards.iter().enumerate() {
        let applied = if card.applied { " [applied]" } else { "" };
        println!(
            "  {:>2}. [{:>3}] {} @ {}{}",
            rank + 1,
            card.score,
            card.title,
            card.company,
            applied
        );
        println!(
            "      {} | JLPT {} | {} | {} | {}",
            card.visa_kind,
            card.jlpt,
            card.salary_label,
            card.posted_label,
            card.location.as_deref().unwrap_or("-")
        );
        if !card.reason_labels.is_empty() {
            println!("      {}", card.reason_labels.join(" / "));
        }
    }
}
