//! Quiz API handlers.
//!
//! ```text
//! GET /api/quizzes
//! GET /api/quizzes/{id}
//! POST /api/quizzes/generate {"materialIds":["..."],"difficulty":"easy","questionCount":5}
//! POST /api/quizzes/{id}/attempt {"answers":{"q1":"Oxygen"}}
//! GET /api/quizzes/{id}/attempts
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::GenerateQuiz;
use crate::domain::{Difficulty, Error, Quiz, QuizAttempt, QuizId, question_count, quiz_title};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_id, parse_material_ids};

const ID: FieldName = FieldName::new("id");
const TITLE: FieldName = FieldName::new("title");
const QUESTION_COUNT: FieldName = FieldName::new("questionCount");
const MATERIAL_IDS: FieldName = FieldName::new("materialIds");

/// Body for `POST /api/quizzes/generate`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    pub material_ids: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Between 1 and 20; defaults to 5.
    #[serde(default)]
    #[schema(example = 5)]
    pub question_count: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
}

impl TryFrom<GenerateQuizRequest> for GenerateQuiz {
    type Error = Error;

    fn try_from(value: GenerateQuizRequest) -> Result<Self, Self::Error> {
        let question_count = question_count(value.question_count)
            .map_err(|err| field_error(QUESTION_COUNT, "out_of_range", err))?;
        let title = value
            .title
            .as_deref()
            .map(quiz_title)
            .transpose()
            .map_err(|err| field_error(TITLE, "invalid_title", err))?;
        Ok(Self {
            material_ids: parse_material_ids(value.material_ids, MATERIAL_IDS)?,
            difficulty: value.difficulty,
            question_count,
            title,
        })
    }
}

/// Body for `POST /api/quizzes/{id}/attempt`: question id to answer.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

/// List the caller's quizzes, newest first.
#[utoipa::path(
    get,
    path = "/api/quizzes",
    responses(
        (status = 200, description = "Quizzes", body = [Quiz]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "listQuizzes"
)]
#[get("/quizzes")]
pub async fn list_quizzes(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Quiz>>> {
    Ok(web::Json(state.quizzes.list(user.id()).await?))
}

/// Fetch one of the caller's quizzes.
#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    params(("id" = String, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz", body = Quiz),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Quiz not found", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "getQuiz"
)]
#[get("/quizzes/{id}")]
pub async fn get_quiz(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Quiz>> {
    let id: QuizId = parse_id(&path, ID)?;
    Ok(web::Json(state.quizzes.get(user.id(), id).await?))
}

/// Generate a quiz from materials with the reasoning model.
#[utoipa::path(
    post,
    path = "/api/quizzes/generate",
    request_body = GenerateQuizRequest,
    responses(
        (status = 201, description = "Quiz generated", body = Quiz),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Material not found", body = Error),
        (status = 500, description = "AI service failure or invalid AI output", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "generateQuiz"
)]
#[post("/quizzes/generate")]
pub async fn generate_quiz(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<GenerateQuizRequest>,
) -> ApiResult<HttpResponse> {
    let request = GenerateQuiz::try_from(payload.into_inner())?;
    let quiz = state.quizzes.generate(user.id(), request).await?;
    Ok(HttpResponse::Created().json(quiz))
}

/// Grade and store an attempt.
///
/// Each answer must equal the question's correct answer exactly to score.
#[utoipa::path(
    post,
    path = "/api/quizzes/{id}/attempt",
    params(("id" = String, Path, description = "Quiz id")),
    request_body = SubmitAttemptRequest,
    responses(
        (status = 201, description = "Graded attempt", body = QuizAttempt),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Quiz not found", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "submitAttempt"
)]
#[post("/quizzes/{id}/attempt")]
pub async fn submit_attempt(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SubmitAttemptRequest>,
) -> ApiResult<HttpResponse> {
    let id: QuizId = parse_id(&path, ID)?;
    let attempt = state
        .quizzes
        .submit_attempt(user.id(), id, payload.into_inner().answers)
        .await?;
    Ok(HttpResponse::Created().json(attempt))
}

/// The caller's attempts at a quiz, oldest first.
#[utoipa::path(
    get,
    path = "/api/quizzes/{id}/attempts",
    params(("id" = String, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Attempts", body = [QuizAttempt]),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Quiz not found", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "listAttempts"
)]
#[get("/quizzes/{id}/attempts")]
pub async fn list_attempts(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<QuizAttempt>>> {
    let id: QuizId = parse_id(&path, ID)?;
    Ok(web::Json(state.quizzes.attempts(user.id(), id).await?))
}

#[cfg(test)]
#[path = "quizzes_tests.rs"]
mod tests;
