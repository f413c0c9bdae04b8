//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` against a migrated database when the schema changes.
//! Entity tables carry a `seq` column that breaks timestamp ties in
//! insertion order.

diesel::table! {
    /// Registered accounts. `username` and `email` carry unique indexes.
    users (id) {
        id -> Uuid,
        seq -> Int8,
        username -> Varchar,
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        plan -> Varchar,
        role -> Varchar,
        locale -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    materials (id) {
        id -> Uuid,
        seq -> Int8,
        user_id -> Uuid,
        filename -> Varchar,
        material_type -> Varchar,
        content -> Text,
        source_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    conversations (id) {
        id -> Uuid,
        seq -> Int8,
        user_id -> Uuid,
        title -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Conversation turns. `seq` breaks `created_at` ties in insertion order.
    messages (id) {
        id -> Uuid,
        seq -> Int8,
        conversation_id -> Uuid,
        role -> Varchar,
        content -> Text,
        audio_url -> Nullable<Text>,
        /// JSON array of material UUID strings.
        material_ids -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    mind_maps (id) {
        id -> Uuid,
        seq -> Int8,
        user_id -> Uuid,
        title -> Varchar,
        nodes -> Jsonb,
        connections -> Jsonb,
        material_ids -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    quizzes (id) {
        id -> Uuid,
        seq -> Int8,
        user_id -> Uuid,
        title -> Varchar,
        difficulty -> Varchar,
        questions -> Jsonb,
        material_ids -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    quiz_attempts (id) {
        id -> Uuid,
        seq -> Int8,
        quiz_id -> Uuid,
        user_id -> Uuid,
        /// JSON object mapping question id to the submitted answer.
        answers -> Jsonb,
        score -> Int4,
        total_questions -> Int4,
        completed_at -> Timestamptz,
    }
}

diesel::table! {
    /// Server-side session state keyed by the cookie's session key.
    sessions (session_key) {
        session_key -> Varchar,
        state -> Jsonb,
        expires_at -> Timestamptz,
    }
}

diesel::joinable!(materials -> users (user_id));
diesel::joinable!(conversations -> users (user_id));
diesel::joinable!(messages -> conversations (conversation_id));
diesel::joinable!(mind_maps -> users (user_id));
diesel::joinable!(quizzes -> users (user_id));
diesel::joinable!(quiz_attempts -> quizzes (quiz_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    materials,
    conversations,
    messages,
    mind_maps,
    quizzes,
    quiz_attempts,
    sessions,
);
