use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{JlptLevel, JobId, JobPosting, VisaKind};

/// Error raised while loading a catalog export.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read job catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid job catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid job catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("job id {0} appears more than once in the catalog")]
    DuplicateJob(JobId),
}

/// Immutable, ordered set of job postings loaded once per process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobCatalog {
    jobs: Vec<JobPosting>,
}

impl JobCatalog {
    pub fn new(jobs: Vec<JobPosting>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(jobs.len());
        for job in &jobs {
            if !seen.insert(&job.id) {
                return Err(CatalogError::DuplicateJob(job.id.clone()));
            }
        }
        Ok(Self { jobs })
    }

    /// Loads a JSON array or, for `.csv` paths, a spreadsheet export.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            Self::from_csv_reader(file)
        } else {
            Self::from_json_reader(file)
        }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let jobs: Vec<JobPosting> = serde_json::from_reader(reader)?;
        Self::new(jobs)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut jobs = Vec::new();

        for row in csv_reader.deserialize::<CatalogRow>() {
            jobs.push(row?.into_posting());
        }

        Self::new(jobs)
    }

    pub fn get(&self, id: &JobId) -> Option<&JobPosting> {
        self.jobs.iter().find(|job| &job.id == id)
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobPosting> {
        self.jobs.iter()
    }

    pub fn as_slice(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Built-in demo catalog spanning every visa kind and most JLPT levels.
    pub fn standard() -> Self {
        let jobs = vec![
            JobPosting {
                salary_min: Some(500),
                salary_max: Some(750),
                location: Some("東京都渋谷区（リモート可）".to_string()),
                remote: Some("週3日リモート".to_string()),
                employment_type: Some("正社員".to_string()),
                summary: Some("決済基盤のバックエンド開発をリードするポジションです。".to_string()),
                required_skills: skills(&["Rust", "PostgreSQL", "AWS"]),
                preferred_skills: skills(&["Kubernetes"]),
                benefits: skills(&["ビザサポート", "住宅手当"]),
                applicant_count: Some(12),
                ..JobPosting::new(
                    "job-001",
                    "バックエンドエンジニア",
                    "株式会社サクラペイ",
                    VisaKind::SkilledWorker,
                    JlptLevel::N2,
                )
                .posted_on("2026-10-12")
            },
            JobPosting {
                salary_min: Some(420),
                salary_max: Some(600),
                location: Some("大阪府大阪市".to_string()),
                employment_type: Some("正社員".to_string()),
                summary: Some("多言語対応のカスタマーサクセスチームでの業務です。".to_string()),
                required_skills: skills(&["英語", "Salesforce"]),
                applicant_count: Some(5),
                ..JobPosting::new(
                    "job-002",
                    "カスタマーサクセス",
                    "なにわクラウド株式会社",
                    VisaKind::SkilledWorker,
                    JlptLevel::N3,
                )
                .posted_on("2026-09-30")
            },
            JobPosting {
                salary: Some(380),
                location: Some("神奈川県横浜市".to_string()),
                employment_type: Some("契約社員".to_string()),
                required_skills: skills(&["Python", "データ分析"]),
                ..JobPosting::new(
                    "job-003",
                    "データアナリスト",
                    "ハマテック合同会社",
                    VisaKind::SkilledWorker,
                    JlptLevel::N1,
                )
            },
            JobPosting {
                salary_min: Some(120),
                salary_max: Some(180),
                location: Some("東京都新宿区".to_string()),
                employment_type: Some("アルバイト".to_string()),
                summary: Some("留学生歓迎、週28時間以内のシフト制です。".to_string()),
                required_skills: skills(&["接客"]),
                ..JobPosting::new(
                    "job-004",
                    "ホテルフロントスタッフ",
                    "新宿グランドホテル",
                    VisaKind::Student,
                    JlptLevel::N4,
                )
                .posted_on("2026-10-14")
            },
            JobPosting {
                salary_min: Some(100),
                salary_max: Some(150),
                location: Some("千葉県船橋市".to_string()),
                employment_type: Some("アルバイト".to_string()),
                ..JobPosting::new(
                    "job-005",
                    "物流センター軽作業",
                    "ベイロジ株式会社",
                    VisaKind::Student,
                    JlptLevel::N5,
                )
                .posted_on("2026-10-01")
            },
            JobPosting {
                salary_min: Some(800),
                salary_max: Some(1200),
                location: Some("東京都港区".to_string()),
                employment_type: Some("業務委託".to_string()),
                summary: Some("日本法人立ち上げを担う経営パートナーを募集します。".to_string()),
                required_skills: skills(&["事業計画", "会計"]),
                ..JobPosting::new(
                    "job-006",
                    "新規事業マネージャー",
                    "ブリッジベンチャーズ",
                    VisaKind::BusinessManager,
                    JlptLevel::N2,
                )
                .posted_on("2026-10-08")
            },
            JobPosting {
                salary_min: Some(300),
                salary_max: Some(420),
                location: Some("埼玉県川口市".to_string()),
                employment_type: Some("正社員".to_string()),
                required_skills: skills(&["介護職員初任者研修"]),
                benefits: skills(&["資格取得支援"]),
                ..JobPosting::new(
                    "job-007",
                    "介護スタッフ",
                    "ひだまりケア",
                    VisaKind::Spouse,
                    JlptLevel::N3,
                )
                .posted_on("2026-10-15")
            },
            JobPosting {
                salary: Some(250),
                location: Some("東京都杉並区".to_string()),
                employment_type: Some("派遣".to_string()),
                ..JobPosting::new(
                    "job-008",
                    "保育補助",
                    "すぎなみキッズ",
                    VisaKind::Family,
                    JlptLevel::N3,
                )
                .posted_on("2026-09-01")
            },
            JobPosting {
                salary_min: Some(350),
                salary_max: Some(480),
                location: Some("東京都中央区（リモート一部可）".to_string()),
                employment_type: Some("正社員".to_string()),
                required_skills: skills(&["TypeScript", "React"]),
                ..JobPosting::new(
                    "job-009",
                    "フロントエンドエンジニア",
                    "銀座デジタル株式会社",
                    VisaKind::SkilledWorker,
                    JlptLevel::NotObtained,
                )
                .posted_on("2026-10-10")
            },
            JobPosting {
                salary_min: Some(280),
                salary_max: Some(360),
                location: Some("東京都品川区".to_string()),
                employment_type: Some("正社員".to_string()),
                ..JobPosting::new(
                    "job-010",
                    "翻訳コーディネーター",
                    "しながわリンガル",
                    VisaKind::Spouse,
                    JlptLevel::N1,
                )
            },
        ];

        Self { jobs }
    }
}

impl<'a> IntoIterator for &'a JobCatalog {
    type Item = &'a JobPosting;
    type IntoIter = std::slice::Iter<'a, JobPosting>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.iter()
    }
}

fn skills(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Company")]
    company: String,
    #[serde(rename = "Visa Kind")]
    visa_kind: String,
    #[serde(rename = "JLPT")]
    jlpt: String,
    #[serde(
        rename = "Posted Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    posted_date: Option<String>,
    #[serde(rename = "Location", default, deserialize_with = "empty_string_as_none")]
    location: Option<String>,
    #[serde(
        rename = "Employment Type",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    employment_type: Option<String>,
    #[serde(rename = "Salary Min", default)]
    salary_min: Option<u32>,
    #[serde(rename = "Salary Max", default)]
    salary_max: Option<u32>,
    #[serde(
        rename = "Required Skills",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    required_skills: Option<String>,
}

impl CatalogRow {
    fn into_posting(self) -> JobPosting {
        let required_skills = self
            .required_skills
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|skill| !skill.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        JobPosting {
            posted_date: self.posted_date,
            location: self.location,
            employment_type: self.employment_type,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            required_skills,
            ..JobPosting::new(
                self.id,
                self.title,
                self.company,
                VisaKind::parse(&self.visa_kind),
                JlptLevel::parse(&self.jlpt),
            )
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CSV_EXPORT: &str = "ID,Title,Company,Visa Kind,JLPT,Posted Date,Location,Employment Type,Salary Min,Salary Max,Required Skills\n\
job-100,Platform Engineer,Kanda Cloud,skilled-worker,N2,2026-10-01,東京都千代田区,正社員,600,800,Rust; Terraform\n\
job-101,Kitchen Staff,Umeda Foods,visa_type_student,N4,,大阪府大阪市,アルバイト,,,\n\
job-102,Archivist,Old Books,diplomat,N7,someday,,,,,\n";

    #[test]
    fn csv_export_populates_postings_and_tolerates_blanks() {
        let catalog =
            JobCatalog::from_csv_reader(Cursor::new(CSV_EXPORT)).expect("csv catalog loads");

        assert_eq!(catalog.len(), 3);

        let platform = catalog.get(&JobId::new("job-100")).expect("first row");
        assert_eq!(platform.visa_kind, VisaKind::SkilledWorker);
        assert_eq!(platform.required_skills, vec!["Rust", "Terraform"]);
        assert_eq!(platform.salary_max, Some(800));
        assert!(platform.posted_at().is_some());

        let kitchen = catalog.get(&JobId::new("job-101")).expect("second row");
        assert_eq!(kitchen.visa_kind, VisaKind::Student);
        assert!(kitchen.posted_date.is_none());
        assert!(kitchen.salary_min.is_none());
        assert!(kitchen.required_skills.is_empty());

        let archivist = catalog.get(&JobId::new("job-102")).expect("third row");
        assert_eq!(archivist.visa_kind, VisaKind::Unrecognized);
        assert_eq!(archivist.jlpt, JlptLevel::Unrecognized);
        assert!(archivist.posted_at().is_none());
    }

    #[test]
    fn json_catalog_rejects_duplicate_ids() {
        let raw = r#"[
            {"id": "job-1", "title": "A", "company": "X", "visaKind": "student", "jlpt": "N3"},
            {"id": "job-1", "title": "B", "company": "Y", "visaKind": "family", "jlpt": "N2"}
        ]"#;

        match JobCatalog::from_json_reader(Cursor::new(raw)) {
            Err(CatalogError::DuplicateJob(id)) => assert_eq!(id, JobId::new("job-1")),
            other => panic!("expected duplicate job error, got {other:?}"),
        }
    }

    #[test]
    fn json_catalog_must_be_an_array() {
        let err = JobCatalog::from_json_reader(Cursor::new(r#"{"jobs": []}"#))
            .expect_err("object is not a catalog");
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn standard_catalog_has_unique_ids_and_covers_every_visa_kind() {
        let standard = JobCatalog::standard();
        let rebuilt = JobCatalog::new(standard.as_slice().to_vec()).expect("ids are unique");
        assert_eq!(rebuilt.len(), standard.len());

        for kind in VisaKind::RECOGNIZED {
            assert!(
                standard.iter().any(|job| job.visa_kind == kind),
                "no posting for {kind}"
            );
        }
    }
}
