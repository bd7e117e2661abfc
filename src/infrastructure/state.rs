//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    BookRepository, CategoryRepository, KeyValueRepository, OrderRepository, SessionRepository,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::{
    SeaOrmBookRepository, SeaOrmCategoryRepository, SeaOrmContentRepository,
    SeaOrmOrderRepository, SeaOrmSessionRepository, SeaOrmSettingsRepository,
};
use crate::services::mail_service::{Mailer, mailer_from_config};
use crate::services::vision_service::VisionClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub config: Arc<Config>,
    pub book_repo: Arc<dyn BookRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub order_repo: Arc<dyn OrderRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub settings_repo: Arc<dyn KeyValueRepository>,
    pub content_repo: Arc<dyn KeyValueRepository>,
    /// Outgoing email, a no-op when SMTP is not configured
    pub mailer: Arc<dyn Mailer>,
    /// Vision API client, `None` without an API key
    pub vision: Option<Arc<VisionClient>>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let mailer = mailer_from_config(&config);
        let vision = config
            .vision
            .clone()
            .map(|vision| Arc::new(VisionClient::new(vision)));

        Self {
            book_repo: Arc::new(SeaOrmBookRepository::new(db.clone())),
            category_repo: Arc::new(SeaOrmCategoryRepository::new(db.clone())),
            order_repo: Arc::new(SeaOrmOrderRepository::new(db.clone())),
            session_repo: Arc::new(SeaOrmSessionRepository::new(db.clone())),
            settings_repo: Arc::new(SeaOrmSettingsRepository::new(db.clone())),
            content_repo: Arc::new(SeaOrmContentRepository::new(db.clone())),
            config: Arc::new(config),
            mailer,
            vision,
            db,
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn with_vision(mut self, vision: VisionClient) -> Self {
        self.vision = Some(Arc::new(vision));
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
