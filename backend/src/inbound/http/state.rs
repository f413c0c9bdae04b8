//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use super::auth::AuthStrategy;
use crate::domain::ports::{
    AccountService, ConversationService, MaterialService, MindMapService, QuizService,
};

/// Upload ceiling applied when the server configuration does not set one.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Parameter object bundling all service ports for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountService>,
    pub materials: Arc<dyn MaterialService>,
    pub conversations: Arc<dyn ConversationService>,
    pub mind_maps: Arc<dyn MindMapService>,
    pub quizzes: Arc<dyn QuizService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub materials: Arc<dyn MaterialService>,
    pub conversations: Arc<dyn ConversationService>,
    pub mind_maps: Arc<dyn MindMapService>,
    pub quizzes: Arc<dyn QuizService>,
    pub auth: Arc<dyn AuthStrategy>,
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Construct state from the service ports and the active auth strategy.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use study_assistant::inbound::http::auth::SessionAuth;
    /// use study_assistant::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// fn build(ports: HttpStatePorts) -> HttpState {
    ///     HttpState::new(ports, Arc::new(SessionAuth)).with_max_upload_bytes(1024)
    /// }
    /// ```
    pub fn new(ports: HttpStatePorts, auth: Arc<dyn AuthStrategy>) -> Self {
        let HttpStatePorts {
            accounts,
            materials,
            conversations,
            mind_maps,
            quizzes,
        } = ports;
        Self {
            accounts,
            materials,
            conversations,
            mind_maps,
            quizzes,
            auth,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the multipart upload ceiling.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
