//! In-memory `QuizRepository`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{QuizRepository, RepositoryError};
use crate::domain::{AttemptId, NewAttempt, NewQuiz, Quiz, QuizAttempt, QuizId, UserId};

use super::{Table, lock, newest_first, oldest_first};

#[derive(Default)]
struct Tables {
    quizzes: Table<QuizId, Quiz>,
    attempts: Table<AttemptId, QuizAttempt>,
}

pub struct MemoryQuizRepository {
    tables: Mutex<Tables>,
    clock: Arc<dyn Clock>,
}

impl MemoryQuizRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            clock,
        }
    }
}

#[async_trait]
impl QuizRepository for MemoryQuizRepository {
    async fn create(&self, quiz: NewQuiz) -> Result<Quiz, RepositoryError> {
        let stored = Quiz::from_draft(QuizId::random(), quiz, self.clock.utc());
        lock(&self.tables)?.quizzes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: QuizId) -> Result<Option<Quiz>, RepositoryError> {
        Ok(lock(&self.tables)?.quizzes.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Quiz>, RepositoryError> {
        let tables = lock(&self.tables)?;
        Ok(newest_first(
            tables
                .quizzes
                .values()
                .filter(|quiz| quiz.user_id == user_id)
                .cloned(),
            |quiz| quiz.created_at,
        ))
    }

    async fn delete(&self, id: QuizId) -> Result<bool, RepositoryError> {
        let mut tables = lock(&self.tables)?;
        let removed = tables.quizzes.remove(&id).is_some();
        if removed {
            tables.attempts.retain(|attempt| attempt.quiz_id != id);
        }
        Ok(removed)
    }

    async fn create_attempt(&self, attempt: NewAttempt) -> Result<QuizAttempt, RepositoryError> {
        let mut tables = lock(&self.tables)?;
        if !tables.quizzes.contains(&attempt.quiz_id) {
            return Err(RepositoryError::query("quiz does not exist"));
        }
        let stored = QuizAttempt::from_draft(AttemptId::random(), attempt, self.clock.utc());
        tables.attempts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_attempts(
        &self,
        quiz_id: QuizId,
        user_id: UserId,
    ) -> Result<Vec<QuizAttempt>, RepositoryError> {
        let tables = lock(&self.tables)?;
        Ok(oldest_first(
            tables
                .attempts
                .values()
                .filter(|attempt| attempt.quiz_id == quiz_id && attempt.user_id == user_id)
                .cloned(),
            |attempt| attempt.completed_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{Difficulty, Question, QuestionSet, QuestionType};

    #[fixture]
    fn repo() -> MemoryQuizRepository {
        MemoryQuizRepository::new(Arc::new(DefaultClock))
    }

    async fn quiz(repo: &MemoryQuizRepository, owner: UserId) -> Quiz {
        let questions = QuestionSet::new(vec![Question {
            id: "q1".to_owned(),
            question_type: QuestionType::ShortAnswer,
            prompt: "Symbol for sodium?".to_owned(),
            options: vec![],
            correct_answer: "Na".to_owned(),
            explanation: None,
        }])
        .expect("questions");
        repo.create(NewQuiz {
            user_id: owner,
            title: "Elements".to_owned(),
            difficulty: Difficulty::Easy,
            questions,
            material_ids: vec![],
        })
        .await
        .expect("create")
    }

    #[rstest]
    #[tokio::test]
    async fn attempts_are_scoped_to_the_submitter(repo: MemoryQuizRepository) {
        let owner = UserId::random();
        let quiz = quiz(&repo, owner).await;
        let answers = BTreeMap::from([("q1".to_owned(), "Na".to_owned())]);
        repo.create_attempt(quiz.grade(owner, answers.clone()))
            .await
            .expect("own attempt");
        repo.create_attempt(quiz.grade(UserId::random(), answers))
            .await
            .expect("other attempt");

        let attempts = repo.list_attempts(quiz.id, owner).await.expect("list");

        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].score, 1);
        assert_eq!(attempts[0].total_questions, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_quiz_drops_its_attempts(repo: MemoryQuizRepository) {
        let owner = UserId::random();
        let quiz = quiz(&repo, owner).await;
        repo.create_attempt(quiz.grade(owner, BTreeMap::new()))
            .await
            .expect("attempt");

        assert!(repo.delete(quiz.id).await.expect("delete"));
        assert!(
            repo.list_attempts(quiz.id, owner)
                .await
                .expect("list")
                .is_empty()
        );
    }
}
