//! Strict decoding of structured AI output.
//!
//! Model replies are untrusted. They are parsed into typed shapes and pushed
//! through the same invariants as user-authored mind maps and quizzes before
//! anything is persisted.

use serde::Deserialize;
use serde_json::Value;

use super::Error;
use super::mind_map::{MindMapConnection, MindMapGraph, MindMapNode, MindMapValidationError};
use super::ports::AI_INVALID_RESPONSE;
use super::quiz::{Question, QuestionSet, QuizValidationError};

/// Reasons a structured reply was rejected.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("reply is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),
    #[error("reply does not match the expected shape: {0}")]
    Shape(#[source] serde_json::Error),
    #[error("generated mind map is invalid: {0}")]
    MindMap(#[from] MindMapValidationError),
    #[error("generated quiz is invalid: {0}")]
    Quiz(#[from] QuizValidationError),
}

/// Report a rejected structured reply as an upstream failure.
pub(crate) fn map_generation_error(error: GenerationError) -> Error {
    tracing::warn!(error = %error, "AI reply failed validation");
    Error::upstream(AI_INVALID_RESPONSE)
}

/// Remove a surrounding Markdown code fence, if any.
///
/// # Examples
/// ```
/// use study_assistant::domain::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
/// assert_eq!(strip_code_fence(" {} "), "{}");
/// ```
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn decode<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, GenerationError> {
    let value: Value =
        serde_json::from_str(strip_code_fence(raw)).map_err(GenerationError::Syntax)?;
    serde_json::from_value(value).map_err(GenerationError::Shape)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MindMapReply {
    #[serde(default)]
    title: Option<String>,
    nodes: Vec<MindMapNode>,
    #[serde(default)]
    connections: Vec<MindMapConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuizReply {
    #[serde(default)]
    title: Option<String>,
    questions: Vec<Question>,
}

/// A validated mind-map generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMindMap {
    pub title: Option<String>,
    pub graph: MindMapGraph,
}

/// A validated quiz generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuiz {
    pub title: Option<String>,
    pub questions: QuestionSet,
}

fn clean_title(title: Option<String>) -> Option<String> {
    title
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Decode a mind-map reply of the form `{title?, nodes, connections}`.
pub fn parse_mind_map_reply(raw: &str) -> Result<GeneratedMindMap, GenerationError> {
    let reply: MindMapReply = decode(raw)?;
    let graph = MindMapGraph::non_empty(reply.nodes, reply.connections)?;
    Ok(GeneratedMindMap {
        title: clean_title(reply.title),
        graph,
    })
}

/// Decode a quiz reply of the form `{title?, questions}`, keeping at most
/// `limit` questions.
pub fn parse_quiz_reply(raw: &str, limit: usize) -> Result<GeneratedQuiz, GenerationError> {
    let mut reply: QuizReply = decode(raw)?;
    reply.questions.truncate(limit);
    let questions = QuestionSet::new(reply.questions)?;
    Ok(GeneratedQuiz {
        title: clean_title(reply.title),
        questions,
    })
}
