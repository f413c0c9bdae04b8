//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: volatile repositories for development and tests
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **sessions**: server-side session stores for actix-session
//! - **ai**: chat-completions client for the AI gateway
//! - **security**: Argon2 password hashing and HS256 bearer tokens
//! - **extraction**: PDF text extraction
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod ai;
pub mod extraction;
pub mod memory;
pub mod persistence;
pub mod security;
pub mod sessions;
