//! Quiz domain service: generation, grading and attempt history.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::generation::map_generation_error;
use crate::domain::material_refs::resolve_required_materials;
use crate::domain::ports::{
    AiGateway, AiTask, CompletionRequest, GenerateQuiz, MaterialRepository, QuizRepository,
    QuizService, map_gateway_error, map_repository_error,
};
use crate::domain::prompts::quiz_messages;
use crate::domain::{
    Error, NewQuiz, Quiz, QuizAttempt, QuizId, UserId, parse_quiz_reply, quiz_title,
    require_owned, validate_answers,
};

/// Quiz service implementing the [`QuizService`] driving port.
#[derive(Clone)]
pub struct QuizServiceImpl<Q, M, A> {
    quizzes: Arc<Q>,
    materials: Arc<M>,
    ai: Arc<A>,
}

impl<Q, M, A> QuizServiceImpl<Q, M, A> {
    pub fn new(quizzes: Arc<Q>, materials: Arc<M>, ai: Arc<A>) -> Self {
        Self {
            quizzes,
            materials,
            ai,
        }
    }
}

impl<Q, M, A> QuizServiceImpl<Q, M, A>
where
    Q: QuizRepository,
    M: MaterialRepository,
    A: AiGateway,
{
    async fn owned(&self, user_id: UserId, id: QuizId) -> Result<Quiz, Error> {
        let found = self
            .quizzes
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?;
        require_owned(found, user_id, "quiz")
    }
}

#[async_trait]
impl<Q, M, A> QuizService for QuizServiceImpl<Q, M, A>
where
    Q: QuizRepository,
    M: MaterialRepository,
    A: AiGateway,
{
    async fn list(&self, user_id: UserId) -> Result<Vec<Quiz>, Error> {
        self.quizzes
            .list_for_user(user_id)
            .await
            .map_err(map_repository_error)
    }

    async fn get(&self, user_id: UserId, id: QuizId) -> Result<Quiz, Error> {
        self.owned(user_id, id).await
    }

    async fn generate(&self, user_id: UserId, request: GenerateQuiz) -> Result<Quiz, Error> {
        let GenerateQuiz {
            material_ids,
            difficulty,
            question_count,
            title,
        } = request;
        let materials =
            resolve_required_materials(self.materials.as_ref(), user_id, &material_ids).await?;
        let reply = self
            .ai
            .complete(CompletionRequest {
                task: AiTask::Reasoning,
                messages: quiz_messages(&materials, difficulty, question_count),
                json_output: true,
            })
            .await
            .map_err(map_gateway_error)?;
        let limit = usize::try_from(question_count).unwrap_or(usize::MAX);
        let generated = parse_quiz_reply(&reply, limit).map_err(map_generation_error)?;

        let title = title
            .or_else(|| {
                generated
                    .title
                    .as_deref()
                    .and_then(|title| quiz_title(title).ok())
            })
            .unwrap_or_else(|| "Quiz".to_owned());

        self.quizzes
            .create(NewQuiz {
                user_id,
                title,
                difficulty,
                questions: generated.questions,
                material_ids: materials.iter().map(|material| material.id).collect(),
            })
            .await
            .map_err(map_repository_error)
    }

    async fn submit_attempt(
        &self,
        user_id: UserId,
        id: QuizId,
        answers: BTreeMap<String, String>,
    ) -> Result<QuizAttempt, Error> {
        validate_answers(&answers).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "answers", "code": "invalid_content" }))
        })?;
        let quiz = self.owned(user_id, id).await?;
        let attempt = quiz.grade(user_id, answers);
        self.quizzes
            .create_attempt(attempt)
            .await
            .map_err(map_repository_error)
    }

    async fn attempts(&self, user_id: UserId, id: QuizId) -> Result<Vec<QuizAttempt>, Error> {
        self.owned(user_id, id).await?;
        self.quizzes
            .list_attempts(id, user_id)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "quiz_service_tests.rs"]
mod tests;
