use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog postings, assigned when the catalog is authored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Residence/work status categories shared by applications and postings.
///
/// Values outside the known set deserialize to [`VisaKind::Unrecognized`]
/// instead of failing, so a stray catalog entry never breaks ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum VisaKind {
    SkilledWorker,
    Student,
    BusinessManager,
    Spouse,
    Family,
    Unrecognized,
}

impl VisaKind {
    pub const RECOGNIZED: [VisaKind; 5] = [
        VisaKind::SkilledWorker,
        VisaKind::Student,
        VisaKind::BusinessManager,
        VisaKind::Spouse,
        VisaKind::Family,
    ];

    /// Accepts the kebab-case keys as well as the form keys (`visa_type_work`, ...).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "skilled-worker" | "skilled_worker" | "visa_type_work" => Self::SkilledWorker,
            "student" | "visa_type_student" => Self::Student,
            "business-manager" | "business_manager" | "visa_type_business" => {
                Self::BusinessManager
            }
            "spouse" | "visa_type_spouse" => Self::Spouse,
            "family" | "visa_type_family" => Self::Family,
            _ => Self::Unrecognized,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            VisaKind::SkilledWorker => "skilled-worker",
            VisaKind::Student => "student",
            VisaKind::BusinessManager => "business-manager",
            VisaKind::Spouse => "spouse",
            VisaKind::Family => "family",
            VisaKind::Unrecognized => "unrecognized",
        }
    }

    pub const fn is_recognized(self) -> bool {
        !matches!(self, VisaKind::Unrecognized)
    }
}

impl From<String> for VisaKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<VisaKind> for &'static str {
    fn from(value: VisaKind) -> Self {
        value.key()
    }
}

impl fmt::Display for VisaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// JLPT proficiency, ordered from "not obtained" up to N1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum JlptLevel {
    NotObtained,
    N5,
    N4,
    N3,
    N2,
    N1,
    Unrecognized,
}

impl JlptLevel {
    /// Recognized levels in ascending order of fluency.
    pub const SCALE: [JlptLevel; 6] = [
        JlptLevel::NotObtained,
        JlptLevel::N5,
        JlptLevel::N4,
        JlptLevel::N3,
        JlptLevel::N2,
        JlptLevel::N1,
    ];

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == "未取得" {
            return Self::NotObtained;
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "none" | "not-obtained" | "not_obtained" | "jlpt_none" => Self::NotObtained,
            "n5" | "jlpt_n5" => Self::N5,
            "n4" | "jlpt_n4" => Self::N4,
            "n3" | "jlpt_n3" => Self::N3,
            "n2" | "jlpt_n2" => Self::N2,
            "n1" | "jlpt_n1" => Self::N1,
            _ => Self::Unrecognized,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            JlptLevel::NotObtained => "none",
            JlptLevel::N5 => "N5",
            JlptLevel::N4 => "N4",
            JlptLevel::N3 => "N3",
            JlptLevel::N2 => "N2",
            JlptLevel::N1 => "N1",
            JlptLevel::Unrecognized => "unrecognized",
        }
    }

    /// Position on [`JlptLevel::SCALE`]; `None` for unrecognized values.
    pub const fn ordinal(self) -> Option<u8> {
        match self {
            JlptLevel::NotObtained => Some(0),
            JlptLevel::N5 => Some(1),
            JlptLevel::N4 => Some(2),
            JlptLevel::N3 => Some(3),
            JlptLevel::N2 => Some(4),
            JlptLevel::N1 => Some(5),
            JlptLevel::Unrecognized => None,
        }
    }
}

impl From<String> for JlptLevel {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<JlptLevel> for &'static str {
    fn from(value: JlptLevel) -> Self {
        value.key()
    }
}

impl fmt::Display for JlptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One open position in the catalog.
///
/// Only `visa_kind`, `jlpt` and `posted_date` feed scoring; everything else is
/// carried through for the job cards and detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub visa_kind: VisaKind,
    #[serde(alias = "jlptLevel")]
    pub jlpt: JlptLevel,
    /// Raw posting date as authored; parsed leniently at scoring time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_count: Option<u32>,
}

impl JobPosting {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
        visa_kind: VisaKind,
        jlpt: JlptLevel,
    ) -> Self {
        Self {
            id: JobId::new(id),
            title: title.into(),
            company: company.into(),
            visa_kind,
            jlpt,
            posted_date: None,
            salary_min: None,
            salary_max: None,
            salary: None,
            location: None,
            remote: None,
            employment_type: None,
            summary: None,
            description: None,
            required_skills: Vec::new(),
            preferred_skills: Vec::new(),
            benefits: Vec::new(),
            last_updated: None,
            applicant_count: None,
        }
    }

    pub fn posted_on(mut self, raw: impl Into<String>) -> Self {
        self.posted_date = Some(raw.into());
        self
    }

    /// Parsed posting instant, or `None` when absent or unparseable.
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.posted_date.as_deref().and_then(parse_timestamp)
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The part of a submitted application that scoring consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSnapshot {
    pub visa_kind: VisaKind,
    #[serde(alias = "jlptLevel")]
    pub jlpt: JlptLevel,
}

impl ApplicationSnapshot {
    pub const fn new(visa_kind: VisaKind, jlpt: JlptLevel) -> Self {
        Self { visa_kind, jlpt }
    }
}

/// Visa application as captured by the intake form.
///
/// Field-level validation belongs to the form; the service stores whatever
/// it receives and only reads the visa kind and JLPT level back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub passport_number: String,
    #[serde(default)]
    pub passport_expiry: String,
    pub visa_kind: VisaKind,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(alias = "jlptLevel")]
    pub jlpt: JlptLevel,
    #[serde(default)]
    pub dynamic_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub company_contact_email: String,
}

impl ApplicationSubmission {
    pub fn new(visa_kind: VisaKind, jlpt: JlptLevel) -> Self {
        Self {
            name: String::new(),
            nationality: String::new(),
            birth_date: String::new(),
            gender: String::new(),
            passport_number: String::new(),
            passport_expiry: String::new(),
            visa_kind,
            expiry_date: String::new(),
            jlpt,
            dynamic_fields: BTreeMap::new(),
            company_contact_email: String::new(),
        }
    }

    pub fn snapshot(&self) -> ApplicationSnapshot {
        ApplicationSnapshot::new(self.visa_kind, self.jlpt)
    }
}

/// The most recently submitted application, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastApplication {
    pub id: ApplicationId,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub submission: ApplicationSubmission,
}

impl LastApplication {
    pub fn snapshot(&self) -> ApplicationSnapshot {
        self.submission.snapshot()
    }
}
