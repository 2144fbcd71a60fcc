// src/experiences/repository.rs
//! SQLite-backed storage for interview experiences

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

use super::legacy::{ImportRecord, ImportSummary};
use super::{
    filter_experiences, ExperienceSections, InterviewExperience, NewExperience,
    ValidatedExperience,
};

const SELECT_EXPERIENCES: &str = r#"
    SELECT id, company, position, experience,
           interview_rounds, technical_questions, system_design,
           behavioral_questions, overall_experience,
           date, comments
    FROM interview_experiences
"#;

#[derive(sqlx::FromRow)]
struct ExperienceRow {
    id: i64,
    company: String,
    position: String,
    experience: String,
    interview_rounds: Option<String>,
    technical_questions: Option<String>,
    system_design: Option<String>,
    behavioral_questions: Option<String>,
    overall_experience: Option<String>,
    date: NaiveDate,
    comments: i64,
}

impl From<ExperienceRow> for InterviewExperience {
    fn from(row: ExperienceRow) -> Self {
        Self {
            id: row.id,
            company: row.company,
            position: row.position,
            experience: row.experience,
            sections: ExperienceSections {
                interview_rounds: row.interview_rounds,
                technical_questions: row.technical_questions,
                system_design: row.system_design,
                behavioral_questions: row.behavioral_questions,
                overall_experience: row.overall_experience,
            },
            date: row.date,
            comments: row.comments,
        }
    }
}

pub struct ExperienceRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ExperienceRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All records in id order, filtered by `query` when it is not blank
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<InterviewExperience>> {
        let rows = sqlx::query_as::<_, ExperienceRow>(&format!("{} ORDER BY id ASC", SELECT_EXPERIENCES))
            .fetch_all(self.pool)
            .await
            .context("Failed to load interview experiences")?;

        let records = rows.into_iter().map(InterviewExperience::from).collect();
        Ok(filter_experiences(records, query))
    }

    pub async fn get(&self, id: i64) -> Result<Option<InterviewExperience>> {
        let row = sqlx::query_as::<_, ExperienceRow>(&format!("{} WHERE id = ?", SELECT_EXPERIENCES))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .with_context(|| format!("Failed to load interview experience {}", id))?;

        Ok(row.map(InterviewExperience::from))
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interview_experiences")
            .fetch_one(self.pool)
            .await
            .context("Failed to count interview experiences")?;
        Ok(count)
    }

    /// Validate and store a submission under the next free id, dated today.
    ///
    /// The id is allocated by the insert statement itself, so concurrent
    /// creates serialize on SQLite's write lock.
    pub async fn create(&self, new: &NewExperience) -> Result<InterviewExperience> {
        let validated = new.validate()?;
        let date = Utc::now().date_naive();

        let id = insert_next_id(self.pool, &validated, date, 0).await?;
        let record = build_record(id, validated, date, 0);

        info!(
            "Created interview experience {} ({} - {})",
            record.id, record.company, record.position
        );
        Ok(record)
    }

    /// Insert the starter records when the store is empty. Returns how many were added.
    pub async fn seed_if_empty(&self) -> Result<usize> {
        if self.count().await? > 0 {
            return Ok(0);
        }

        let seeds = initial_experiences();
        let mut tx = self.pool.begin().await?;
        for record in &seeds {
            insert_record(&mut *tx, record).await?;
        }
        tx.commit().await?;

        info!("Seeded {} interview experiences", seeds.len());
        Ok(seeds.len())
    }

    /// Store imported records. Records whose id is already taken are skipped.
    pub async fn import(&self, records: Vec<ImportRecord>, rejected: usize) -> Result<ImportSummary> {
        let mut summary = ImportSummary {
            rejected,
            ..Default::default()
        };

        let mut tx = self.pool.begin().await?;
        for candidate in records {
            let date = candidate.date.unwrap_or_else(|| Utc::now().date_naive());
            let validated = ValidatedExperience {
                company: candidate.company,
                position: candidate.position,
                experience: candidate.experience,
                sections: candidate.sections,
            };

            match candidate.id {
                Some(id) => {
                    let record = build_record(id, validated, date, candidate.comments);
                    if insert_record(&mut *tx, &record).await? {
                        summary.imported += 1;
                    } else {
                        summary.skipped_ids.push(id);
                    }
                }
                None => {
                    insert_next_id(&mut *tx, &validated, date, candidate.comments).await?;
                    summary.imported += 1;
                }
            }
        }
        tx.commit().await?;

        info!(
            "Imported {} interview experiences ({} skipped, {} rejected)",
            summary.imported,
            summary.skipped_ids.len(),
            summary.rejected
        );
        Ok(summary)
    }
}

const INSERT_COLUMNS: &str = r#"
    INSERT INTO interview_experiences (
        id, company, position, experience,
        interview_rounds, technical_questions, system_design,
        behavioral_questions, overall_experience,
        date, comments
    )
"#;

/// Insert under `MAX(id) + 1` (1 for an empty table) in a single statement.
async fn insert_next_id<'e, E>(
    executor: E,
    validated: &ValidatedExperience,
    date: NaiveDate,
    comments: i64,
) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "{} SELECT COALESCE(MAX(id), 0) + 1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ? \
         FROM interview_experiences RETURNING id",
        INSERT_COLUMNS
    );

    let id: i64 = sqlx::query_scalar(&sql)
        .bind(&validated.company)
        .bind(&validated.position)
        .bind(&validated.experience)
        .bind(&validated.sections.interview_rounds)
        .bind(&validated.sections.technical_questions)
        .bind(&validated.sections.system_design)
        .bind(&validated.sections.behavioral_questions)
        .bind(&validated.sections.overall_experience)
        .bind(date)
        .bind(comments)
        .fetch_one(executor)
        .await
        .with_context(|| {
            format!(
                "Failed to insert interview experience ({} - {})",
                validated.company, validated.position
            )
        })?;
    Ok(id)
}

/// Insert under the record's own id. Returns false when the id is taken.
async fn insert_record<'e, E>(executor: E, record: &InterviewExperience) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "{} VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) ON CONFLICT(id) DO NOTHING",
        INSERT_COLUMNS
    );

    let result = sqlx::query(&sql)
        .bind(record.id)
        .bind(&record.company)
        .bind(&record.position)
        .bind(&record.experience)
        .bind(&record.sections.interview_rounds)
        .bind(&record.sections.technical_questions)
        .bind(&record.sections.system_design)
        .bind(&record.sections.behavioral_questions)
        .bind(&record.sections.overall_experience)
        .bind(record.date)
        .bind(record.comments)
        .execute(executor)
        .await
        .with_context(|| format!("Failed to insert interview experience {}", record.id))?;
    Ok(result.rows_affected() == 1)
}

fn build_record(
    id: i64,
    validated: ValidatedExperience,
    date: NaiveDate,
    comments: i64,
) -> InterviewExperience {
    InterviewExperience {
        id,
        company: validated.company,
        position: validated.position,
        experience: validated.experience,
        sections: validated.sections,
        date,
        comments,
    }
}

fn seed(id: i64, company: &str, position: &str, experience: &str, date: (i32, u32, u32)) -> InterviewExperience {
    InterviewExperience {
        id,
        company: company.to_string(),
        position: position.to_string(),
        experience: experience.to_string(),
        sections: ExperienceSections::default(),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
        comments: 0,
    }
}

fn initial_experiences() -> Vec<InterviewExperience> {
    vec![
        seed(
            1,
            "Google",
            "Senior Frontend Developer",
            "The interview process was quite thorough. It started with a phone screening followed by a technical assessment where I had to solve algorithmic problems. Then, there were five rounds of interviews covering system design, coding, behavioral questions, and team fit. Each interviewer was professional and the questions were challenging but fair.",
            (2023, 5, 15),
        ),
        seed(
            2,
            "Microsoft",
            "Full Stack Engineer",
            "Microsoft's interview was structured into a full day of sessions. I had two coding interviews, one system design discussion, and two behavioral interviews. The coding challenges focused on data structures and algorithms, while the system design portion had me architecting a scalable web service. The behavioral questions explored my past experiences and how I handled difficult situations.",
            (2023, 6, 22),
        ),
        seed(
            3,
            "Amazon",
            "Software Development Engineer II",
            "Amazon's interview process was centered around their leadership principles. There were four technical interviews and one bar raiser interview. The technical questions involved both coding and system design. I had to design a warehouse management system and solve problems related to optimization algorithms. The bar raiser interview was particularly challenging, diving deep into my past experiences and technical knowledge.",
            (2023, 7, 10),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::experiences::ExperienceValidationError;

    async fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("experiences.db")).await.unwrap();
        (dir, db)
    }

    fn submission(company: &str, experience: &str) -> NewExperience {
        NewExperience {
            company: company.to_string(),
            position: "Software Engineer".to_string(),
            experience: Some(experience.to_string()),
            sections: ExperienceSections::default(),
        }
    }

    #[tokio::test]
    async fn test_first_record_gets_id_one() {
        let (_dir, db) = test_db().await;
        let repo = ExperienceRepository::new(db.pool());

        let created = repo
            .create(&submission("Shopify", "Take-home project then a review call"))
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.date, Utc::now().date_naive());
        assert_eq!(created.comments, 0);
    }

    #[tokio::test]
    async fn test_create_assigns_max_plus_one() {
        let (_dir, db) = test_db().await;
        let repo = ExperienceRepository::new(db.pool());
        repo.seed_if_empty().await.unwrap();

        let summary = repo
            .import(
                vec![ImportRecord {
                    id: Some(41),
                    company: "Stripe".to_string(),
                    position: "Backend Engineer".to_string(),
                    experience: "Bug squash and API design rounds".to_string(),
                    sections: ExperienceSections::default(),
                    date: None,
                    comments: 2,
                }],
                0,
            )
            .await
            .unwrap();
        assert_eq!(summary.imported, 1);

        let created = repo
            .create(&submission("Datadog", "Three technical rounds over video"))
            .await
            .unwrap();
        assert_eq!(created.id, 42);

        let fetched = repo.get(42).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_submission() {
        let (_dir, db) = test_db().await;
        let repo = ExperienceRepository::new(db.pool());

        let err = repo.create(&submission("Uber", "short")).await.unwrap_err();
        let validation = err.downcast_ref::<ExperienceValidationError>().unwrap();
        assert_eq!(validation.field, "experience");
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let (_dir, db) = test_db().await;
        let repo = ExperienceRepository::new(db.pool());

        assert_eq!(repo.seed_if_empty().await.unwrap(), 3);
        assert_eq!(repo.seed_if_empty().await.unwrap(), 0);

        let companies: Vec<String> = repo
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.company)
            .collect();
        assert_eq!(companies, vec!["Google", "Microsoft", "Amazon"]);

        let google = repo.get(1).await.unwrap().unwrap();
        assert_eq!(google.date, NaiveDate::from_ymd_opt(2023, 5, 15).unwrap());
        assert!(google
            .experience
            .starts_with("The interview process was quite thorough. It started with a phone screening"));
        assert!(google
            .experience
            .ends_with("Each interviewer was professional and the questions were challenging but fair."));
    }

    #[tokio::test]
    async fn test_list_filters_by_query() {
        let (_dir, db) = test_db().await;
        let repo = ExperienceRepository::new(db.pool());
        repo.seed_if_empty().await.unwrap();

        let hits = repo.list(Some("WAREHOUSE")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].company, "Amazon");

        assert_eq!(repo.list(Some("")).await.unwrap().len(), 3);
        assert!(repo.list(Some("netflix")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let (_dir, db) = test_db().await;
        let repo = ExperienceRepository::new(db.pool());

        assert!(repo.get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sections_round_trip_through_storage() {
        let (_dir, db) = test_db().await;
        let repo = ExperienceRepository::new(db.pool());

        let new = NewExperience {
            company: "Airbnb".to_string(),
            position: "Staff Engineer".to_string(),
            experience: None,
            sections: ExperienceSections {
                technical_questions: Some("Implement an LRU cache".to_string()),
                behavioral_questions: Some("Conflict with a product manager".to_string()),
                ..Default::default()
            },
        };

        let created = repo.create(&new).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap().unwrap();

        assert_eq!(
            fetched.sections.technical_questions.as_deref(),
            Some("Implement an LRU cache")
        );
        assert!(fetched.experience.starts_with("Technical questions: Implement an LRU cache"));
    }

    #[tokio::test]
    async fn test_import_skips_taken_ids() {
        let (_dir, db) = test_db().await;
        let repo = ExperienceRepository::new(db.pool());
        repo.seed_if_empty().await.unwrap();

        let record = |id: Option<i64>| ImportRecord {
            id,
            company: "Spotify".to_string(),
            position: "Data Engineer".to_string(),
            experience: "Case study on streaming pipelines".to_string(),
            sections: ExperienceSections::default(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5),
            comments: 0,
        };

        let summary = repo
            .import(vec![record(Some(2)), record(Some(10)), record(None)], 1)
            .await
            .unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped_ids, vec![2]);
        assert_eq!(summary.rejected, 1);
        assert!(repo.get(11).await.unwrap().is_some());
        assert_eq!(repo.get(2).await.unwrap().unwrap().company, "Microsoft");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_creates_all_succeed_with_distinct_ids() {
        let (_dir, db) = test_db().await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = db.pool().clone();
                tokio::spawn(async move {
                    ExperienceRepository::new(&pool)
                        .create(&submission(
                            &format!("Company {}", i),
                            "Two coding rounds and a design review",
                        ))
                        .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=8).collect::<Vec<i64>>());
        assert_eq!(ExperienceRepository::new(db.pool()).count().await.unwrap(), 8);
    }
}
