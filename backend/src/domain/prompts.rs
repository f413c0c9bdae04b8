//! Prompt assembly for the AI gateway.

use super::ports::{ChatMessage, InlineImage};
use super::{Difficulty, Material};

/// Characters of each material's content included in a prompt.
pub(crate) const MATERIAL_CONTEXT_CHARS: usize = 8_000;
/// Prior conversation turns replayed to the chat model.
pub(crate) const HISTORY_TURNS: usize = 20;

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Render materials as labelled context blocks.
pub(crate) fn material_context(materials: &[Material]) -> String {
    materials
        .iter()
        .map(|material| {
            format!(
                "[Material: {} ({})]\n{}",
                material.filename,
                material.material_type.as_str(),
                truncate_chars(&material.content, MATERIAL_CONTEXT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub(crate) fn tutor_system_prompt(materials: &[Material]) -> String {
    let mut prompt = String::from(
        "You are a patient study tutor. Explain concepts clearly, check the \
         student's understanding, and keep answers focused on their question.",
    );
    if !materials.is_empty() {
        prompt.push_str(
            "\n\nBase your answers on the following study materials where relevant:\n\n",
        );
        prompt.push_str(&material_context(materials));
    }
    prompt
}

pub(crate) fn mind_map_messages(materials: &[Material], topic: Option<&str>) -> Vec<ChatMessage> {
    let system = "You build concept mind maps for students. Reply with a single JSON object \
                  of the form {\"title\": string, \"nodes\": [{\"id\": string, \"label\": \
                  string, \"description\": string}], \"connections\": [{\"from\": node id, \
                  \"to\": node id, \"label\": string}]}. Use between 5 and 25 nodes, unique \
                  node ids, and only connect nodes that exist. Do not add any other keys.";
    let focus = topic
        .map(|topic| format!("Focus on the topic: {topic}.\n\n"))
        .unwrap_or_default();
    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!(
            "{focus}Create a mind map from these materials:\n\n{}",
            material_context(materials)
        )),
    ]
}

pub(crate) fn quiz_messages(
    materials: &[Material],
    difficulty: Difficulty,
    question_count: u32,
) -> Vec<ChatMessage> {
    let system = "You write study quizzes. Reply with a single JSON object of the form \
                  {\"title\": string, \"questions\": [{\"id\": string, \"type\": \
                  \"multiple_choice\" | \"true_false\" | \"short_answer\", \"prompt\": string, \
                  \"options\": [string], \"correctAnswer\": string, \"explanation\": string}]}. \
                  Multiple-choice answers must appear verbatim in options; true/false answers \
                  are \"True\" or \"False\"; short-answer questions have no options. Do not add \
                  any other keys.";
    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!(
            "Write exactly {question_count} {} questions from these materials:\n\n{}",
            difficulty.as_str(),
            material_context(materials)
        )),
    ]
}

pub(crate) fn vision_messages(filename: &str, image: InlineImage) -> Vec<ChatMessage> {
    vec![
        ChatMessage::user(format!(
            "Describe the study content of the image `{filename}` in detail. Transcribe any \
             text, formulas, or diagram labels so a student can revise from your description."
        ))
        .with_image(image),
    ]
}
