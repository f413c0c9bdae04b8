//! PostgreSQL-backed `QuizRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{QuizRepository, RepositoryError};
use crate::domain::{AttemptId, NewAttempt, NewQuiz, Quiz, QuizAttempt, QuizId, UserId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::jsonb_columns::{count_from_db, count_to_db, decode, encode, parse};
use super::models::{AttemptRow, NewAttemptRow, NewQuizRow, QuizRow};
use super::pool::DbPool;
use super::schema::{quiz_attempts, quizzes};

/// Diesel-backed implementation of the [`QuizRepository`] port.
///
/// Attempts cascade with their quiz at the database level.
#[derive(Clone)]
pub struct DieselQuizRepository {
    pool: DbPool,
}

impl DieselQuizRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_quiz(row: QuizRow) -> Result<Quiz, RepositoryError> {
    Ok(Quiz {
        id: QuizId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        title: row.title,
        difficulty: parse(&row.difficulty, "difficulty")?,
        questions: decode(row.questions, "questions")?,
        material_ids: decode(row.material_ids, "material_ids")?,
        created_at: row.created_at,
    })
}

fn row_to_attempt(row: AttemptRow) -> Result<QuizAttempt, RepositoryError> {
    Ok(QuizAttempt {
        id: AttemptId::from_uuid(row.id),
        quiz_id: QuizId::from_uuid(row.quiz_id),
        user_id: UserId::from_uuid(row.user_id),
        answers: decode(row.answers, "answers")?,
        score: count_from_db(row.score, "score")?,
        total_questions: count_from_db(row.total_questions, "total_questions")?,
        completed_at: row.completed_at,
    })
}

#[async_trait]
impl QuizRepository for DieselQuizRepository {
    async fn create(&self, quiz: NewQuiz) -> Result<Quiz, RepositoryError> {
        let new_row = NewQuizRow {
            id: Uuid::new_v4(),
            user_id: *quiz.user_id.as_uuid(),
            title: &quiz.title,
            difficulty: quiz.difficulty.as_str(),
            questions: encode(quiz.questions.as_slice(), "questions")?,
            material_ids: encode(&quiz.material_ids, "material_ids")?,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: QuizRow = diesel::insert_into(quizzes::table)
            .values(&new_row)
            .returning(QuizRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_quiz(row)
    }

    async fn find_by_id(&self, id: QuizId) -> Result<Option<Quiz>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<QuizRow> = quizzes::table
            .filter(quizzes::id.eq(id.as_uuid()))
            .select(QuizRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_quiz).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Quiz>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<QuizRow> = quizzes::table
            .filter(quizzes::user_id.eq(user_id.as_uuid()))
            .order((quizzes::created_at.desc(), quizzes::seq.desc()))
            .select(QuizRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_quiz).collect()
    }

    async fn delete(&self, id: QuizId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(quizzes::table.filter(quizzes::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn create_attempt(&self, attempt: NewAttempt) -> Result<QuizAttempt, RepositoryError> {
        let new_row = NewAttemptRow {
            id: Uuid::new_v4(),
            quiz_id: *attempt.quiz_id.as_uuid(),
            user_id: *attempt.user_id.as_uuid(),
            answers: encode(&attempt.answers, "answers")?,
            score: count_to_db(attempt.score, "score")?,
            total_questions: count_to_db(attempt.total_questions, "total_questions")?,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: AttemptRow = diesel::insert_into(quiz_attempts::table)
            .values(&new_row)
            .returning(AttemptRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_attempt(row)
    }

    async fn list_attempts(
        &self,
        quiz_id: QuizId,
        user_id: UserId,
    ) -> Result<Vec<QuizAttempt>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AttemptRow> = quiz_attempts::table
            .filter(quiz_attempts::quiz_id.eq(quiz_id.as_uuid()))
            .filter(quiz_attempts::user_id.eq(user_id.as_uuid()))
            .order((quiz_attempts::completed_at.asc(), quiz_attempts::seq.asc()))
            .select(AttemptRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_attempt).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{Difficulty, QuestionType};

    #[rstest]
    fn quiz_row_decodes_questions() {
        let row = QuizRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Cells".to_owned(),
            difficulty: "hard".to_owned(),
            questions: json!([{
                "id": "q1",
                "type": "true_false",
                "prompt": "Mitochondria have their own DNA.",
                "options": ["True", "False"],
                "correctAnswer": "True"
            }]),
            material_ids: json!([]),
            created_at: Utc::now(),
        };

        let quiz = row_to_quiz(row).expect("valid row");

        assert_eq!(quiz.difficulty, Difficulty::Hard);
        assert_eq!(quiz.questions[0].question_type, QuestionType::TrueFalse);
    }

    #[rstest]
    fn attempt_row_decodes_answers() {
        let row = AttemptRow {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            answers: json!({"q1": "True", "q2": "Nucleus"}),
            score: 1,
            total_questions: 2,
            completed_at: Utc::now(),
        };

        let attempt = row_to_attempt(row).expect("valid row");

        assert_eq!(attempt.answers.get("q2").map(String::as_str), Some("Nucleus"));
        assert_eq!(attempt.score, 1);
        assert_eq!(attempt.total_questions, 2);
    }
}
