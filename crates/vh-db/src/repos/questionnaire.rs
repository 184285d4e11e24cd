//! Questionnaire repository: questions with their options and validation
//! rules, and the answer rows owned by vendor rooms and venue checklists.

use std::collections::HashMap;

use vh_core::entities::{Answer, Question, QuestionDetail, QuestionOption, QuestionValidation};
use vh_core::enums::QuestionPurpose;
use vh_core::requests::QuestionPayload;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_i64, get_opt_string, now_text, parse_enum};
use crate::{VenueDb, finish};

/// Answer table owned by one questionnaire-bearing entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerTable {
    pub table: &'static str,
    pub owner_column: &'static str,
}

pub const VENDOR_ROOM_ANSWERS: AnswerTable = AnswerTable {
    table: "vendor_room_answers",
    owner_column: "vendor_room_id",
};

pub const VENUE_CHECKLIST_ANSWERS: AnswerTable = AnswerTable {
    table: "vendor_venue_answers",
    owner_column: "vendor_venue_id",
};

/// A validated answer ready to store. Option answers carry one row per
/// selected option; image answers carry the uploaded URL and an empty
/// `custom_value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: i64,
    pub question_option_id: Option<i64>,
    pub custom_value: String,
    pub file_url: Option<String>,
}

fn row_to_question(row: &libsql::Row) -> Result<Question, DatabaseError> {
    Ok(Question {
        id: row.get(0)?,
        purpose: parse_enum(&row.get::<String>(1)?)?,
        question_text: row.get(2)?,
        sort_order: row.get(3)?,
    })
}

/// Attach options and validation rules to `questions`, keeping their order.
async fn load_details(
    conn: &libsql::Connection,
    questions: Vec<Question>,
) -> Result<Vec<QuestionDetail>, DatabaseError> {
    if questions.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
    let list = placeholders.join(", ");

    let mut options: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
    let mut rows = conn
        .query(
            &format!(
                "SELECT id, question_id, option_text FROM question_options
                 WHERE question_id IN ({list}) ORDER BY id"
            ),
            libsql::params_from_iter(ids.iter().copied()),
        )
        .await?;
    while let Some(row) = rows.next().await? {
        let option = QuestionOption {
            id: row.get(0)?,
            question_id: row.get(1)?,
            option_text: row.get(2)?,
        };
        options.entry(option.question_id).or_default().push(option);
    }

    let mut validations: HashMap<i64, Vec<QuestionValidation>> = HashMap::new();
    let mut rows = conn
        .query(
            &format!(
                "SELECT id, question_id, validation_type, value FROM question_validations
                 WHERE question_id IN ({list}) ORDER BY id"
            ),
            libsql::params_from_iter(ids.iter().copied()),
        )
        .await?;
    while let Some(row) = rows.next().await? {
        let validation = QuestionValidation {
            id: row.get(0)?,
            question_id: row.get(1)?,
            validation_type: parse_enum(&row.get::<String>(2)?)?,
            value: get_opt_string(&row, 3)?,
        };
        validations
            .entry(validation.question_id)
            .or_default()
            .push(validation);
    }

    Ok(questions
        .into_iter()
        .map(|question| QuestionDetail {
            options: options.remove(&question.id).unwrap_or_default(),
            validations: validations.remove(&question.id).unwrap_or_default(),
            question,
        })
        .collect())
}

/// Store `answers` for one owner row.
pub(crate) async fn insert_answers(
    conn: &libsql::Connection,
    table: &AnswerTable,
    owner_id: i64,
    answers: &[NewAnswer],
) -> Result<(), DatabaseError> {
    let sql = format!(
        "INSERT INTO {} ({}, question_id, question_option_id, custom_value, file_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        table.table, table.owner_column
    );
    let now = now_text();
    for answer in answers {
        conn.execute(
            &sql,
            libsql::params![
                owner_id,
                answer.question_id,
                answer.question_option_id,
                answer.custom_value.as_str(),
                answer.file_url.as_deref(),
                now.as_str()
            ],
        )
        .await?;
    }
    Ok(())
}

/// Replace the stored answers of every question present in `answers`;
/// answers to other questions are kept.
pub(crate) async fn replace_answers(
    conn: &libsql::Connection,
    table: &AnswerTable,
    owner_id: i64,
    answers: &[NewAnswer],
) -> Result<(), DatabaseError> {
    let mut question_ids: Vec<i64> = answers.iter().map(|a| a.question_id).collect();
    question_ids.sort_unstable();
    question_ids.dedup();
    if question_ids.is_empty() {
        return Ok(());
    }

    let mut params: Vec<libsql::Value> = vec![owner_id.into()];
    let placeholders: Vec<String> = question_ids
        .iter()
        .map(|id| {
            params.push((*id).into());
            format!("?{}", params.len())
        })
        .collect();
    let sql = format!(
        "DELETE FROM {} WHERE {} = ?1 AND question_id IN ({})",
        table.table,
        table.owner_column,
        placeholders.join(", ")
    );
    conn.execute(&sql, libsql::params_from_iter(params)).await?;
    insert_answers(conn, table, owner_id, answers).await
}

/// Stored answers of one owner row, ordered by question then insertion.
pub(crate) async fn answers_for(
    conn: &libsql::Connection,
    table: &AnswerTable,
    owner_id: i64,
) -> Result<Vec<Answer>, DatabaseError> {
    let sql = format!(
        "SELECT id, question_id, question_option_id, custom_value, file_url
         FROM {} WHERE {} = ?1 ORDER BY question_id, id",
        table.table, table.owner_column
    );
    let mut rows = conn.query(&sql, [owner_id]).await?;
    let mut answers = Vec::new();
    while let Some(row) = rows.next().await? {
        answers.push(Answer {
            id: row.get(0)?,
            question_id: row.get(1)?,
            question_option_id: get_opt_i64(&row, 2)?,
            custom_value: get_opt_string(&row, 3)?.unwrap_or_default(),
            file_url: get_opt_string(&row, 4)?,
        });
    }
    Ok(answers)
}

impl VenueDb {
    /// Insert a question with its options and validation rules.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn create_question(&self, payload: &QuestionPayload) -> Result<i64, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            tx.execute(
                "INSERT INTO questions (purpose, question_text, sort_order) VALUES (?1, ?2, ?3)",
                libsql::params![
                    payload.purpose.as_str(),
                    payload.question_text.trim(),
                    payload.sort_order
                ],
            )
            .await?;
            let id = tx.last_insert_rowid();
            for option in &payload.options {
                tx.execute(
                    "INSERT INTO question_options (question_id, option_text) VALUES (?1, ?2)",
                    libsql::params![id, option.trim()],
                )
                .await?;
            }
            for validation in &payload.validations {
                tx.execute(
                    "INSERT INTO question_validations (question_id, validation_type, value) VALUES (?1, ?2, ?3)",
                    libsql::params![
                        id,
                        validation.validation_type.as_str(),
                        validation.value.as_deref()
                    ],
                )
                .await?;
            }
            Ok(id)
        }
        .await;
        let id = finish(tx, result).await?;
        tracing::info!(id, purpose = %payload.purpose, "question created");
        Ok(id)
    }

    /// Live questions of one questionnaire, in display order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn questions_for_purpose(
        &self,
        purpose: QuestionPurpose,
    ) -> Result<Vec<QuestionDetail>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, purpose, question_text, sort_order FROM questions
                 WHERE purpose = ?1 AND archived_at IS NULL
                 ORDER BY sort_order, id",
                [purpose.as_str()],
            )
            .await?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next().await? {
            questions.push(row_to_question(&row)?);
        }
        load_details(self.conn(), questions).await
    }

    /// Questions with the given ids, with options and rules. Unknown ids
    /// are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn question_bundle(&self, ids: &[i64]) -> Result<Vec<QuestionDetail>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT id, purpose, question_text, sort_order FROM questions
             WHERE id IN ({}) ORDER BY sort_order, id",
            placeholders.join(", ")
        );
        let mut rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(ids.iter().copied()))
            .await?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next().await? {
            questions.push(row_to_question(&row)?);
        }
        load_details(self.conn(), questions).await
    }
}
