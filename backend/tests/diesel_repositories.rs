//! Diesel repositories and the session store against embedded PostgreSQL.
//!
//! Each test gets its own database cloned from a migrated template. Tests are
//! synchronous and drive the async adapters through a runtime owned by the
//! context, so pooled connections stay on one runtime for the whole test.

use std::collections::{BTreeMap, HashMap};

use actix_session::storage::{SessionKey, SessionStore};
use actix_web::cookie::time::Duration;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

use study_assistant::domain::ports::{
    ConversationRepository, MaterialRepository, MindMapRepository, QuizRepository,
    RepositoryError, UserRepository,
};
use study_assistant::domain::{
    ConversationTitle, Difficulty, EmailAddress, Locale, MaterialType, MessageRole,
    MindMapChanges, MindMapConnection, MindMapGraph, MindMapNode, NewConversation, NewMaterial,
    NewMessage, NewMindMap, NewQuiz, NewUser, Plan, Question, QuestionSet, QuestionType, Quiz,
    User, UserChanges, UserId, UserRole, Username,
};
use study_assistant::outbound::persistence::{
    DbPool, DieselConversationRepository, DieselMaterialRepository, DieselMindMapRepository,
    DieselQuizRepository, DieselSessionStore, DieselUserRepository, PoolConfig, run_migrations,
};

#[path = "support/cluster_skip.rs"]
mod cluster_skip;
#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;
#[path = "support/pg_embed.rs"]
mod pg_embed;

use cluster_skip::handle_cluster_setup_failure;
use embedded_postgres::{execute, provision_template_database, query_i64};
use pg_embed::shared_cluster;

const FIXED_TIME: &str = "2026-03-01 09:00:00+00";

struct TestContext {
    runtime: Runtime,
    pool: DbPool,
    database_url: String,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn users(&self) -> DieselUserRepository {
        DieselUserRepository::new(self.pool.clone())
    }

    fn materials(&self) -> DieselMaterialRepository {
        DieselMaterialRepository::new(self.pool.clone())
    }

    fn conversations(&self) -> DieselConversationRepository {
        DieselConversationRepository::new(self.pool.clone())
    }

    fn mind_maps(&self) -> DieselMindMapRepository {
        DieselMindMapRepository::new(self.pool.clone())
    }

    fn quizzes(&self) -> DieselQuizRepository {
        DieselQuizRepository::new(self.pool.clone())
    }

    fn sessions(&self) -> DieselSessionStore {
        DieselSessionStore::new(self.pool.clone())
    }

    fn seed_user(&self, username: &str) -> User {
        self.block_on(
            self.users()
                .create(user_draft(username, &format!("{username}@example.com"))),
        )
        .expect("seed user")
    }

    fn count(&self, sql: &str, params: &[&(dyn postgres::types::ToSql + Sync)]) -> i64 {
        query_i64(&self.database_url, sql, params).expect("count query")
    }

    fn execute(&self, sql: &str, params: &[&(dyn postgres::types::ToSql + Sync)]) -> u64 {
        execute(&self.database_url, sql, params).expect("statement")
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let temp_db = provision_template_database(cluster).map_err(|err| err.to_string())?;
    let database_url = temp_db.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        pool,
        database_url,
        _database: temp_db,
    })
}

#[fixture]
fn db() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn user_draft(username: &str, email: &str) -> NewUser {
    NewUser {
        username: Username::new(username).expect("username"),
        email: EmailAddress::new(email).expect("email"),
        password_hash: "$argon2id$stub".to_owned(),
        plan: Plan::Free,
        role: UserRole::User,
        locale: Locale::default(),
    }
}

fn material_draft(user_id: UserId, filename: &str) -> NewMaterial {
    NewMaterial {
        user_id,
        filename: filename.to_owned(),
        material_type: MaterialType::Text,
        content: format!("contents of {filename}"),
        source_url: None,
    }
}

fn node(id: &str) -> MindMapNode {
    MindMapNode {
        id: id.to_owned(),
        label: format!("Label {id}"),
        description: None,
        color: None,
        position: None,
    }
}

fn message(conversation: &study_assistant::domain::Conversation, content: &str) -> NewMessage {
    NewMessage {
        conversation_id: conversation.id,
        role: MessageRole::User,
        content: content.to_owned(),
        audio_url: None,
        material_ids: vec![],
    }
}

fn create_quiz(ctx: &TestContext, owner: UserId) -> Quiz {
    let questions = QuestionSet::new(vec![Question {
        id: "q1".to_owned(),
        question_type: QuestionType::ShortAnswer,
        prompt: "Symbol for sodium?".to_owned(),
        options: vec![],
        correct_answer: "Na".to_owned(),
        explanation: None,
    }])
    .expect("questions");
    ctx.block_on(ctx.quizzes().create(NewQuiz {
        user_id: owner,
        title: "Elements".to_owned(),
        difficulty: Difficulty::Easy,
        questions,
        material_ids: vec![],
    }))
    .expect("create quiz")
}

#[rstest]
fn migrations_bring_an_empty_database_up_to_date() {
    let cluster = match shared_cluster() {
        Ok(cluster) => cluster,
        Err(reason) => {
            let _: Option<()> = handle_cluster_setup_failure(reason);
            eprintln!("SKIP-TEST-CLUSTER: migrations_bring_an_empty_database_up_to_date skipped");
            return;
        }
    };
    let database = cluster
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4()).as_str())
        .expect("temporary database");
    let url = database.url().to_string();
    let runtime = Runtime::new().expect("runtime");

    runtime.block_on(run_migrations(&url)).expect("first run");
    runtime
        .block_on(run_migrations(&url))
        .expect("second run is a no-op");

    let tables = query_i64(
        &url,
        "SELECT count(*) FROM unnest($1::text[]) AS wanted(name) \
         WHERE to_regclass(wanted.name) IS NOT NULL",
        &[&vec![
            "users",
            "materials",
            "conversations",
            "messages",
            "mind_maps",
            "quizzes",
            "quiz_attempts",
            "sessions",
        ]],
    )
    .expect("table count");
    assert_eq!(tables, 8);
}

#[rstest]
fn users_are_found_by_each_key_and_duplicates_fail(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: users_are_found_by_each_key_and_duplicates_fail skipped");
        return;
    };
    let repo = ctx.users();
    let user = ctx
        .block_on(repo.create(user_draft("ada", "Ada@Example.com")))
        .expect("create");

    let by_id = ctx.block_on(repo.find_by_id(user.id())).expect("by id");
    let by_name = ctx.block_on(repo.find_by_username("ada")).expect("by name");
    let by_email = ctx
        .block_on(repo.find_by_email("ada@example.com"))
        .expect("by email");
    assert_eq!(by_id.as_ref(), Some(&user));
    assert_eq!(by_name.as_ref(), Some(&user));
    assert_eq!(by_email.as_ref(), Some(&user));

    let error = ctx
        .block_on(repo.create(user_draft("ada", "other@example.com")))
        .expect_err("duplicate username");
    assert!(matches!(error, RepositoryError::Query { .. }));
}

#[rstest]
fn user_updates_apply_and_missing_users_return_none(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: user_updates_apply_and_missing_users_return_none skipped");
        return;
    };
    let user = ctx.seed_user("grace");
    let repo = ctx.users();

    let updated = ctx
        .block_on(repo.update(
            user.id(),
            UserChanges {
                email: Some(EmailAddress::new("grace@school.test").expect("email")),
                locale: None,
            },
        ))
        .expect("update")
        .expect("present");
    let missing = ctx
        .block_on(repo.update(UserId::random(), UserChanges::default()))
        .expect("update missing");

    assert_eq!(updated.email().as_str(), "grace@school.test");
    assert_eq!(updated.created_at(), user.created_at());
    assert!(missing.is_none());
}

#[rstest]
fn materials_list_is_scoped_and_newest_first(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: materials_list_is_scoped_and_newest_first skipped");
        return;
    };
    let owner = ctx.seed_user("ada").id();
    let other = ctx.seed_user("grace").id();
    let repo = ctx.materials();
    let first = ctx
        .block_on(repo.create(material_draft(owner, "first.txt")))
        .expect("first");
    ctx.block_on(repo.create(material_draft(other, "other.txt")))
        .expect("other");
    ctx.block_on(repo.create(material_draft(owner, "second.txt")))
        .expect("second");

    let fetched = ctx
        .block_on(repo.find_by_id(first.id))
        .expect("find")
        .expect("present");
    let listed = ctx.block_on(repo.list_for_user(owner)).expect("list");
    let names: Vec<_> = listed.iter().map(|m| m.filename.as_str()).collect();

    assert_eq!(fetched, first);
    assert_eq!(fetched.content, "contents of first.txt");
    assert_eq!(names, vec!["second.txt", "first.txt"]);
}

#[rstest]
fn listing_breaks_timestamp_ties_by_insertion_order(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: listing_breaks_timestamp_ties_by_insertion_order skipped");
        return;
    };
    let owner = ctx.seed_user("ada").id();
    let repo = ctx.materials();
    for name in ["a.txt", "b.txt", "c.txt"] {
        ctx.block_on(repo.create(material_draft(owner, name)))
            .expect("create");
    }
    let touched = ctx.execute(
        &format!("UPDATE materials SET created_at = '{FIXED_TIME}' WHERE user_id = $1"),
        &[owner.as_uuid()],
    );
    assert_eq!(touched, 3);

    let listed = ctx.block_on(repo.list_for_user(owner)).expect("list");
    let names: Vec<_> = listed.iter().map(|m| m.filename.as_str()).collect();

    assert_eq!(names, vec!["c.txt", "b.txt", "a.txt"]);
}

#[rstest]
fn material_delete_reports_whether_a_row_went(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: material_delete_reports_whether_a_row_went skipped");
        return;
    };
    let owner = ctx.seed_user("ada").id();
    let repo = ctx.materials();
    let created = ctx
        .block_on(repo.create(material_draft(owner, "gone.txt")))
        .expect("create");

    assert!(ctx.block_on(repo.delete(created.id)).expect("delete"));
    assert!(!ctx.block_on(repo.delete(created.id)).expect("second delete"));
    assert!(
        ctx.block_on(repo.find_by_id(created.id))
            .expect("find")
            .is_none()
    );
}

#[rstest]
fn mind_map_update_refreshes_updated_at_only(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: mind_map_update_refreshes_updated_at_only skipped");
        return;
    };
    let owner = ctx.seed_user("ada").id();
    let repo = ctx.mind_maps();
    let map = ctx
        .block_on(repo.create(NewMindMap {
            user_id: owner,
            title: "Atoms".to_owned(),
            graph: MindMapGraph::new(
                vec![node("a"), node("b")],
                vec![MindMapConnection {
                    from: "a".to_owned(),
                    to: "b".to_owned(),
                    label: None,
                }],
            )
            .expect("graph"),
            material_ids: vec![],
        }))
        .expect("create");
    ctx.execute(
        &format!(
            "UPDATE mind_maps SET created_at = '{FIXED_TIME}', updated_at = '{FIXED_TIME}' \
             WHERE id = $1"
        ),
        &[map.id.as_uuid()],
    );
    let before = ctx
        .block_on(repo.find_by_id(map.id))
        .expect("find")
        .expect("present");

    let updated = ctx
        .block_on(repo.update(
            map.id,
            MindMapChanges {
                title: Some("Atoms and ions".to_owned()),
                graph: None,
            },
        ))
        .expect("update")
        .expect("present");

    assert_eq!(updated.title, "Atoms and ions");
    assert_eq!(updated.created_at, before.created_at);
    assert!(updated.updated_at > before.updated_at);
    assert_eq!(updated.nodes, vec![node("a"), node("b")]);
    assert_eq!(updated.connections, before.connections);
}

#[rstest]
fn conversation_delete_cascades_to_messages(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: conversation_delete_cascades_to_messages skipped");
        return;
    };
    let owner = ctx.seed_user("ada").id();
    let repo = ctx.conversations();
    let conversation = ctx
        .block_on(repo.create(NewConversation {
            user_id: owner,
            title: ConversationTitle::new("Chemistry").expect("title"),
        }))
        .expect("create");
    for content in ["What is a mole?", "How many?", "Thanks"] {
        ctx.block_on(repo.create_message(message(&conversation, content)))
            .expect("message");
    }
    ctx.execute(
        &format!("UPDATE messages SET created_at = '{FIXED_TIME}' WHERE conversation_id = $1"),
        &[conversation.id.as_uuid()],
    );

    let history = ctx
        .block_on(repo.list_messages(conversation.id))
        .expect("history");
    let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["What is a mole?", "How many?", "Thanks"]);

    assert!(ctx.block_on(repo.delete(conversation.id)).expect("delete"));
    assert!(
        ctx.block_on(repo.list_messages(conversation.id))
            .expect("list")
            .is_empty()
    );
    assert_eq!(
        ctx.count(
            "SELECT count(*) FROM messages WHERE conversation_id = $1",
            &[conversation.id.as_uuid()],
        ),
        0
    );
}

#[rstest]
fn message_for_a_missing_conversation_is_a_query_error(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: message_for_a_missing_conversation_is_a_query_error skipped");
        return;
    };
    let owner = ctx.seed_user("ada").id();
    let repo = ctx.conversations();
    let conversation = ctx
        .block_on(repo.create(NewConversation {
            user_id: owner,
            title: ConversationTitle::new("Physics").expect("title"),
        }))
        .expect("create");
    ctx.block_on(repo.delete(conversation.id)).expect("delete");

    let error = ctx
        .block_on(repo.create_message(message(&conversation, "orphan")))
        .expect_err("no parent");

    assert!(matches!(error, RepositoryError::Query { .. }));
}

#[rstest]
fn quiz_attempts_list_oldest_first_and_cascade_on_delete(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!(
            "SKIP-TEST-CLUSTER: quiz_attempts_list_oldest_first_and_cascade_on_delete skipped"
        );
        return;
    };
    let owner = ctx.seed_user("ada").id();
    let other = ctx.seed_user("grace").id();
    let quiz = create_quiz(&ctx, owner);
    let repo = ctx.quizzes();
    for answer in ["K", "Na", "Mg"] {
        let answers = BTreeMap::from([("q1".to_owned(), answer.to_owned())]);
        ctx.block_on(repo.create_attempt(quiz.grade(owner, answers)))
            .expect("attempt");
    }
    ctx.block_on(repo.create_attempt(quiz.grade(other, BTreeMap::new())))
        .expect("other attempt");
    ctx.execute(
        &format!("UPDATE quiz_attempts SET completed_at = '{FIXED_TIME}' WHERE quiz_id = $1"),
        &[quiz.id.as_uuid()],
    );

    let attempts = ctx
        .block_on(repo.list_attempts(quiz.id, owner))
        .expect("attempts");
    let given: Vec<_> = attempts
        .iter()
        .map(|attempt| attempt.answers["q1"].as_str())
        .collect();
    let scores: Vec<_> = attempts.iter().map(|attempt| attempt.score).collect();
    assert_eq!(given, vec!["K", "Na", "Mg"]);
    assert_eq!(scores, vec![0, 1, 0]);

    assert!(ctx.block_on(repo.delete(quiz.id)).expect("delete"));
    assert_eq!(
        ctx.count(
            "SELECT count(*) FROM quiz_attempts WHERE quiz_id = $1",
            &[quiz.id.as_uuid()],
        ),
        0
    );
}

#[rstest]
fn deleting_a_user_cascades_to_owned_rows(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: deleting_a_user_cascades_to_owned_rows skipped");
        return;
    };
    let owner = ctx.seed_user("ada").id();
    ctx.block_on(ctx.materials().create(material_draft(owner, "notes.txt")))
        .expect("material");
    create_quiz(&ctx, owner);

    ctx.execute("DELETE FROM users WHERE id = $1", &[owner.as_uuid()]);

    assert!(
        ctx.block_on(ctx.materials().list_for_user(owner))
            .expect("materials")
            .is_empty()
    );
    assert!(
        ctx.block_on(ctx.quizzes().list_for_user(owner))
            .expect("quizzes")
            .is_empty()
    );
}

#[rstest]
fn session_store_round_trips_and_sweeps_expired_rows(db: Option<TestContext>) {
    let Some(ctx) = db else {
        eprintln!("SKIP-TEST-CLUSTER: session_store_round_trips_and_sweeps_expired_rows skipped");
        return;
    };
    ctx.execute(
        "INSERT INTO sessions (session_key, state, expires_at) \
         VALUES ('abandoned', '{}'::jsonb, now() - interval '1 hour')",
        &[],
    );
    let store = ctx.sessions();
    let abandoned = SessionKey::try_from("abandoned".to_owned()).expect("session key");
    assert!(
        ctx.block_on(store.load(&abandoned))
            .expect("load expired")
            .is_none()
    );

    let state = HashMap::from([("user_id".to_owned(), "\"42\"".to_owned())]);
    let key = ctx
        .block_on(store.save(state.clone(), &Duration::hours(1)))
        .expect("save");

    assert_eq!(ctx.count("SELECT count(*) FROM sessions", &[]), 1);
    assert_eq!(
        ctx.block_on(store.load(&key)).expect("load"),
        Some(state)
    );

    ctx.block_on(store.delete(&key)).expect("delete");
    assert!(ctx.block_on(store.load(&key)).expect("load deleted").is_none());
}
