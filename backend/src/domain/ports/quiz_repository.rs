//! Port abstraction for quizzes and graded attempts.

use async_trait::async_trait;

use crate::domain::{NewAttempt, NewQuiz, Quiz, QuizAttempt, QuizId, UserId};

use super::RepositoryError;

/// Storage for quizzes. Attempts disappear with their quiz.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(&self, quiz: NewQuiz) -> Result<Quiz, RepositoryError>;

    async fn find_by_id(&self, id: QuizId) -> Result<Option<Quiz>, RepositoryError>;

    /// Quizzes owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Quiz>, RepositoryError>;

    async fn delete(&self, id: QuizId) -> Result<bool, RepositoryError>;

    async fn create_attempt(&self, attempt: NewAttempt) -> Result<QuizAttempt, RepositoryError>;

    /// Attempts at `quiz_id` by `user_id`, oldest first.
    async fn list_attempts(
        &self,
        quiz_id: QuizId,
        user_id: UserId,
    ) -> Result<Vec<QuizAttempt>, RepositoryError>;
}
