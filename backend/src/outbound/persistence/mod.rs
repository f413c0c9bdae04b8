//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations translate between Diesel rows and domain types
//! and contain no business rules. Rows (`models.rs`) and table definitions
//! (`schema.rs`) never leave this module. Connections come from a `bb8` pool
//! via `diesel-async`; the schema is brought up to date by embedded
//! migrations before the pool is handed to the repositories.
//!
//! # Example
//!
//! ```ignore
//! use study_assistant::outbound::persistence::{
//!     DbPool, DieselMaterialRepository, PoolConfig, run_migrations,
//! };
//!
//! run_migrations("postgres://localhost/study").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/study")).await?;
//! let materials = DieselMaterialRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_conversation_repository;
mod diesel_material_repository;
mod diesel_mind_map_repository;
mod diesel_quiz_repository;
mod diesel_session_store;
mod diesel_user_repository;
mod jsonb_columns;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_conversation_repository::DieselConversationRepository;
pub use diesel_material_repository::DieselMaterialRepository;
pub use diesel_mind_map_repository::DieselMindMapRepository;
pub use diesel_quiz_repository::DieselQuizRepository;
pub use diesel_session_store::DieselSessionStore;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
