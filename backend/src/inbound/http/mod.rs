//! HTTP inbound adapter exposing the REST endpoints under `/api`.

pub mod auth;
pub mod conversations;
pub mod error;
pub mod health;
pub mod materials;
pub mod mind_maps;
pub mod quizzes;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::{ApiResult, json_config};

/// Register every `/api` handler on the enclosing scope.
///
/// Literal segments such as `/mindmaps/generate` are registered before the
/// `{id}` routes that share their prefix.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(users::list_users)
        .service(materials::list_materials)
        .service(materials::upload_material)
        .service(materials::add_youtube_material)
        .service(materials::get_material)
        .service(materials::delete_material)
        .service(conversations::list_conversations)
        .service(conversations::create_conversation)
        .service(conversations::delete_conversation)
        .service(conversations::list_messages)
        .service(conversations::post_message)
        .service(mind_maps::list_mind_maps)
        .service(mind_maps::create_mind_map)
        .service(mind_maps::generate_mind_map)
        .service(mind_maps::get_mind_map)
        .service(mind_maps::update_mind_map)
        .service(mind_maps::delete_mind_map)
        .service(quizzes::list_quizzes)
        .service(quizzes::generate_quiz)
        .service(quizzes::get_quiz)
        .service(quizzes::submit_attempt)
        .service(quizzes::list_attempts);
}
