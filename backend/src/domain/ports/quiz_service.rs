//! Driving port for quizzes and attempts.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{Difficulty, Error, MaterialId, Quiz, QuizAttempt, QuizId, UserId};

/// Request to generate a quiz from materials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateQuiz {
    pub material_ids: Vec<MaterialId>,
    pub difficulty: Difficulty,
    /// Already range-checked.
    pub question_count: u32,
    pub title: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizService: Send + Sync {
    async fn list(&self, user_id: UserId) -> Result<Vec<Quiz>, Error>;

    async fn get(&self, user_id: UserId, id: QuizId) -> Result<Quiz, Error>;

    async fn generate(&self, user_id: UserId, request: GenerateQuiz) -> Result<Quiz, Error>;

    /// Grade and store an attempt.
    async fn submit_attempt(
        &self,
        user_id: UserId,
        id: QuizId,
        answers: BTreeMap<String, String>,
    ) -> Result<QuizAttempt, Error>;

    /// The caller's attempts at a quiz, oldest first.
    async fn attempts(&self, user_id: UserId, id: QuizId) -> Result<Vec<QuizAttempt>, Error>;
}
