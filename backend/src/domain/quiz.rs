//! Quizzes, their questions, and graded attempts.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::conversation::{ConversationValidationError, has_nul, validate_title};
use super::{AttemptId, MaterialId, Owned, QuizId, UserId};

/// Maximum quiz title length.
pub const QUIZ_TITLE_MAX: usize = 200;
/// Maximum number of questions stored on one quiz.
pub const MAX_QUESTIONS: usize = 50;
/// Smallest generation request.
pub const MIN_QUESTION_COUNT: u32 = 1;
/// Largest generation request.
pub const MAX_QUESTION_COUNT: u32 = 20;
/// Questions generated when the request names no count.
pub const DEFAULT_QUESTION_COUNT: u32 = 5;
const TRUE_LABEL: &str = "True";
const FALSE_LABEL: &str = "False";

/// Validation failures for quizzes and attempts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("quiz must contain at least one question")]
    NoQuestions,
    #[error("quiz must contain at most {max} questions")]
    TooManyQuestions { max: usize },
    #[error("question {index} has an empty id")]
    EmptyQuestionId { index: usize },
    #[error("question id `{id}` is used more than once")]
    DuplicateQuestionId { id: String },
    #[error("question {index} has an empty prompt")]
    EmptyPrompt { index: usize },
    #[error("question {index} has an empty correct answer")]
    EmptyAnswer { index: usize },
    #[error("question {index} needs at least two distinct options")]
    TooFewOptions { index: usize },
    #[error("question {index} lists its correct answer outside the options")]
    AnswerNotInOptions { index: usize },
    #[error("question {index} must be answered with True or False")]
    NotBoolean { index: usize },
    #[error("question count must be between {min} and {max}")]
    QuestionCountOutOfRange { min: u32, max: u32 },
    #[error("unknown difficulty `{0}`")]
    UnknownDifficulty(String),
    #[error("title must not contain NUL characters")]
    NulInTitle,
    #[error("question {index} contains a NUL character")]
    NulInQuestion { index: usize },
    #[error("answer to `{question}` contains a NUL character")]
    NulInAnswer { question: String },
}

/// Requested quiz difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuizValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(QuizValidationError::UnknownDifficulty(s.to_owned())),
        }
    }
}

/// Question format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

/// One quiz question with its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[schema(example = "q1")]
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(alias = "question")]
    #[schema(example = "What does chlorophyll absorb?")]
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[schema(example = "Light")]
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A non-empty, internally consistent list of questions.
///
/// Construction trims ids, prompts, options and answers, fills true/false
/// options with `["True", "False"]` and canonicalises their answers, and
/// drops options from short-answer questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet(Vec<Question>);

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizValidationError> {
        if questions.is_empty() {
            return Err(QuizValidationError::NoQuestions);
        }
        if questions.len() > MAX_QUESTIONS {
            return Err(QuizValidationError::TooManyQuestions { max: MAX_QUESTIONS });
        }
        let questions = questions
            .into_iter()
            .enumerate()
            .map(|(index, question)| normalise_question(index, question))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id.as_str()) {
                return Err(QuizValidationError::DuplicateQuestionId {
                    id: question.id.clone(),
                });
            }
        }
        Ok(Self(questions))
    }

    pub fn as_slice(&self) -> &[Question] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Question> {
        self.0
    }
}

fn normalise_question(index: usize, question: Question) -> Result<Question, QuizValidationError> {
    let Question {
        id,
        question_type,
        prompt,
        options,
        correct_answer,
        explanation,
    } = question;

    let nul = [&id, &prompt, &correct_answer]
        .into_iter()
        .chain(&options)
        .chain(explanation.as_ref())
        .any(|text| has_nul(text));
    if nul {
        return Err(QuizValidationError::NulInQuestion { index });
    }
    let id = id.trim().to_owned();
    if id.is_empty() {
        return Err(QuizValidationError::EmptyQuestionId { index });
    }
    let prompt = prompt.trim().to_owned();
    if prompt.is_empty() {
        return Err(QuizValidationError::EmptyPrompt { index });
    }
    let correct_answer = correct_answer.trim().to_owned();
    if correct_answer.is_empty() {
        return Err(QuizValidationError::EmptyAnswer { index });
    }
    let explanation = explanation
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty());

    let (options, correct_answer) = match question_type {
        QuestionType::MultipleChoice => {
            let options: Vec<String> = options
                .iter()
                .map(|option| option.trim().to_owned())
                .filter(|option| !option.is_empty())
                .collect();
            let distinct: HashSet<&str> = options.iter().map(String::as_str).collect();
            if distinct.len() < 2 || distinct.len() != options.len() {
                return Err(QuizValidationError::TooFewOptions { index });
            }
            if !distinct.contains(correct_answer.as_str()) {
                return Err(QuizValidationError::AnswerNotInOptions { index });
            }
            (options, correct_answer)
        }
        QuestionType::TrueFalse => {
            let canonical = match correct_answer.to_ascii_lowercase().as_str() {
                "true" => TRUE_LABEL,
                "false" => FALSE_LABEL,
                _ => return Err(QuizValidationError::NotBoolean { index }),
            };
            (
                vec![TRUE_LABEL.to_owned(), FALSE_LABEL.to_owned()],
                canonical.to_owned(),
            )
        }
        QuestionType::ShortAnswer => (Vec::new(), correct_answer),
    };

    Ok(Question {
        id,
        question_type,
        prompt,
        options,
        correct_answer,
        explanation,
    })
}

/// Validate a quiz title.
pub fn quiz_title(raw: &str) -> Result<String, QuizValidationError> {
    validate_title(raw, QUIZ_TITLE_MAX).map_err(|error| match error {
        ConversationValidationError::EmptyTitle => QuizValidationError::EmptyTitle,
        ConversationValidationError::NulCharacter => QuizValidationError::NulInTitle,
        _ => QuizValidationError::TitleTooLong {
            max: QUIZ_TITLE_MAX,
        },
    })
}

/// Reject submitted answers that could not be stored.
///
/// Answers are otherwise free text: unknown question ids are kept and
/// simply never match.
pub fn validate_answers(answers: &BTreeMap<String, String>) -> Result<(), QuizValidationError> {
    match answers
        .iter()
        .find(|(question, answer)| has_nul(question) || has_nul(answer))
    {
        Some((question, _)) => Err(QuizValidationError::NulInAnswer {
            question: question.replace('\0', ""),
        }),
        None => Ok(()),
    }
}

/// Validate a requested question count, applying the default when absent.
///
/// # Examples
/// ```
/// use study_assistant::domain::question_count;
///
/// assert_eq!(question_count(None).unwrap(), 5);
/// assert!(question_count(Some(0)).is_err());
/// ```
pub fn question_count(requested: Option<u32>) -> Result<u32, QuizValidationError> {
    let count = requested.unwrap_or(DEFAULT_QUESTION_COUNT);
    if (MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&count) {
        Ok(count)
    } else {
        Err(QuizValidationError::QuestionCountOutOfRange {
            min: MIN_QUESTION_COUNT,
            max: MAX_QUESTION_COUNT,
        })
    }
}

/// Count questions whose submitted answer equals the answer key exactly.
///
/// Answers for ids that are not part of the quiz are ignored.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use study_assistant::domain::{score_answers, Question, QuestionType};
///
/// let question = Question {
///     id: "q1".into(),
///     question_type: QuestionType::ShortAnswer,
///     prompt: "2 + 2?".into(),
///     options: vec![],
///     correct_answer: "4".into(),
///     explanation: None,
/// };
/// let answers = BTreeMap::from([("q1".to_owned(), "4".to_owned())]);
/// assert_eq!(score_answers(&[question], &answers), 1);
/// ```
pub fn score_answers(questions: &[Question], answers: &BTreeMap<String, String>) -> u32 {
    let correct = questions
        .iter()
        .filter(|question| answers.get(&question.id) == Some(&question.correct_answer))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

/// Values needed to create a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuiz {
    pub user_id: UserId,
    pub title: String,
    pub difficulty: Difficulty,
    pub questions: QuestionSet,
    pub material_ids: Vec<MaterialId>,
}

/// A stored quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    pub user_id: UserId,
    pub title: String,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub material_ids: Vec<MaterialId>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn from_draft(id: QuizId, draft: NewQuiz, created_at: DateTime<Utc>) -> Self {
        let NewQuiz {
            user_id,
            title,
            difficulty,
            questions,
            material_ids,
        } = draft;
        Self {
            id,
            user_id,
            title,
            difficulty,
            questions: questions.into_inner(),
            material_ids,
            created_at,
        }
    }

    /// Number of questions, fixed once generated.
    pub fn total_questions(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    /// Grade `answers` for `user`, producing an attempt ready to persist.
    pub fn grade(&self, user_id: UserId, answers: BTreeMap<String, String>) -> NewAttempt {
        let score = score_answers(&self.questions, &answers);
        NewAttempt {
            quiz_id: self.id,
            user_id,
            answers,
            score,
            total_questions: self.total_questions(),
        }
    }
}

impl Owned for Quiz {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

/// Values needed to record an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttempt {
    pub quiz_id: QuizId,
    pub user_id: UserId,
    pub answers: BTreeMap<String, String>,
    pub score: u32,
    pub total_questions: u32,
}

/// An immutable graded submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: AttemptId,
    pub quiz_id: QuizId,
    pub user_id: UserId,
    pub answers: BTreeMap<String, String>,
    pub score: u32,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
}

impl QuizAttempt {
    pub fn from_draft(id: AttemptId, draft: NewAttempt, completed_at: DateTime<Utc>) -> Self {
        let NewAttempt {
            quiz_id,
            user_id,
            answers,
            score,
            total_questions,
        } = draft;
        Self {
            id,
            quiz_id,
            user_id,
            answers,
            score,
            total_questions,
            completed_at,
        }
    }
}

impl Owned for QuizAttempt {
    fn owner(&self) -> UserId {
        self.user_id
    }
}
