use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{parse_timestamp, ApplicationId, JlptLevel, JobId, LastApplication, VisaKind};
use super::matching::MatchReasonKind;
use super::service::{JobDetail, RecommendedJob};

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const CARD_REASON_LIMIT: usize = 2;

/// Display language for job cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ja,
    En,
    Zh,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ja" | "jp" => Some(Self::Ja),
            "en" => Some(Self::En),
            "zh" | "cn" => Some(Self::Zh),
            _ => None,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

pub fn reason_label(kind: MatchReasonKind, language: Language) -> &'static str {
    match (kind, language) {
        (MatchReasonKind::JlptExact, Language::Ja) => "日本語レベル完全一致",
        (MatchReasonKind::JlptExact, Language::En) => "Japanese level exact match",
        (MatchReasonKind::JlptExact, Language::Zh) => "日语水平完全匹配",
        (MatchReasonKind::JlptNear, Language::Ja) => "日本語レベル近似（±1）",
        (MatchReasonKind::JlptNear, Language::En) => "Japanese level close match (±1)",
        (MatchReasonKind::JlptNear, Language::Zh) => "日语水平接近（±1）",
        (MatchReasonKind::VisaKind, Language::Ja) => "在留資格一致",
        (MatchReasonKind::VisaKind, Language::En) => "Visa type match",
        (MatchReasonKind::VisaKind, Language::Zh) => "在留资格匹配",
        (MatchReasonKind::Recency, Language::Ja) => "新着求人ボーナス",
        (MatchReasonKind::Recency, Language::En) => "New posting bonus",
        (MatchReasonKind::Recency, Language::Zh) => "新职位加分",
    }
}

/// Salary range in 万円, e.g. `¥450〜600 万円`.
pub fn format_salary_range(min: Option<u32>, max: Option<u32>, base: Option<u32>) -> String {
    match (min, max, base) {
        (Some(min), Some(max), _) => {
            format!("¥{}〜{} 万円", group_thousands(min), group_thousands(max))
        }
        (_, _, Some(base)) => format!("¥{} 万円", group_thousands(base)),
        _ => "-".to_string(),
    }
}

/// Relative age of a posting: today, N days ago, or N days ahead.
pub fn format_relative(raw: Option<&str>, now: DateTime<Utc>, language: Language) -> String {
    let Some(posted) = raw.and_then(parse_timestamp) else {
        return "-".to_string();
    };
    let diff_days = (now - posted).num_milliseconds() as f64 / MILLIS_PER_DAY;

    if diff_days < 0.0 {
        let days = (-diff_days).ceil() as i64;
        return match language {
            Language::Ja => format!("{days}日後"),
            Language::En => format!("in {days} days"),
            Language::Zh => format!("{days}天后"),
        };
    }
    if diff_days < 1.0 {
        return match language {
            Language::Ja => "今日".to_string(),
            Language::En => "Today".to_string(),
            Language::Zh => "今天".to_string(),
        };
    }

    let days = diff_days.floor() as i64;
    match language {
        Language::Ja => format!("{days}日前"),
        Language::En => format!("{days} days ago"),
        Language::Zh => format!("{days}天前"),
    }
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Compact card rendered in the ranked job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCardView {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub visa_kind: VisaKind,
    pub jlpt: JlptLevel,
    pub salary_label: String,
    pub posted_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub score: u8,
    pub reason_labels: Vec<&'static str>,
    pub applied: bool,
}

impl JobCardView {
    pub fn from_recommended(job: &RecommendedJob, now: DateTime<Utc>, language: Language) -> Self {
        let posting = &job.scored.job;
        Self {
            id: posting.id.clone(),
            title: posting.title.clone(),
            company: posting.company.clone(),
            visa_kind: posting.visa_kind,
            jlpt: posting.jlpt,
            salary_label: format_salary_range(
                posting.salary_min,
                posting.salary_max,
                posting.salary,
            ),
            posted_label: format_relative(posting.posted_date.as_deref(), now, language),
            location: posting.location.clone(),
            score: job.scored.score,
            reason_labels: job
                .scored
                .reasons
                .iter()
                .take(CARD_REASON_LIMIT)
                .map(|reason| reason_label(reason.kind, language))
                .collect(),
            applied: job.applied,
        }
    }
}

/// Detail modal payload: the full posting plus localized labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDetailView {
    #[serde(flatten)]
    pub detail: JobDetail,
    pub salary_label: String,
    pub posted_label: String,
    pub updated_label: String,
    pub reason_labels: Vec<&'static str>,
}

impl JobDetailView {
    pub fn new(detail: JobDetail, now: DateTime<Utc>, language: Language) -> Self {
        let job = &detail.job;
        let salary_label = format_salary_range(job.salary_min, job.salary_max, job.salary);
        let posted_label = format_relative(job.posted_date.as_deref(), now, language);
        let updated_label = format_relative(job.last_updated.as_deref(), now, language);
        let reason_labels = detail
            .reasons
            .iter()
            .map(|reason| reason_label(reason.kind, language))
            .collect();

        Self {
            detail,
            salary_label,
            posted_label,
            updated_label,
            reason_labels,
        }
    }
}

/// Sanitized representation of the last application; personal fields stay in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub submitted_at: DateTime<Utc>,
    pub visa_kind: VisaKind,
    pub jlpt: JlptLevel,
}

impl From<&LastApplication> for ApplicationView {
    fn from(application: &LastApplication) -> Self {
        Self {
            application_id: application.id.clone(),
            submitted_at: application.submitted_at,
            visa_kind: application.submission.visa_kind,
            jlpt: application.submission.jlpt,
        }
    }
}
