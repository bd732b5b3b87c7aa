//! Server State
//!
//! Clone-able handle to every shared service. Cloning is shallow: each
//! field is either `Arc`-backed or a cheap handle around one.

use std::sync::Arc;

use shared::message::ChangeAction;

use crate::auth::{JwtConfig, JwtService};
use crate::cache::ResponseCache;
use crate::core::Config;
use crate::db::DbService;
use crate::notifications::Notifier;
use crate::orders::OrderService;
use crate::services::ImageStore;
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub jwt: Arc<JwtService>,
    pub notifier: Notifier,
    pub cache: Arc<ResponseCache>,
    pub images: ImageStore,
    pub orders: OrderService,
}

impl ServerState {
    /// Wire up all services for the given config.
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::Internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.database_path).await?;
        let jwt = Arc::new(JwtService::new(config.jwt.clone()));
        let notifier = Notifier::new();
        let cache = Arc::new(ResponseCache::default());
        let images = ImageStore::new(config.upload_path())?;
        let orders = OrderService::new(db.clone(), notifier.clone());

        Ok(Self {
            config,
            db,
            jwt,
            notifier,
            cache,
            images,
            orders,
        })
    }

    /// Build a state for tests: temp directories, fixed JWT secret.
    pub async fn for_tests(work_dir: &std::path::Path) -> Result<Self, AppError> {
        let config = Config {
            work_dir: work_dir.display().to_string(),
            http_port: 0,
            database_path: work_dir.join("funko.db").display().to_string(),
            upload_dir: "uploads".into(),
            jwt: JwtConfig {
                secret: "test-secret-test-secret-test-secret!".into(),
                expiration_minutes: 60,
                issuer: "funko-server".into(),
                audience: "funko-clients".into(),
            },
            environment: "test".into(),
        };
        Self::initialize(config).await
    }

    /// Publish a change event and drop the resource's cached responses.
    pub fn broadcast_change(
        &self,
        resource: &str,
        action: ChangeAction,
        id: impl ToString,
        data: Option<serde_json::Value>,
    ) {
        self.cache.invalidate(resource);
        self.notifier.publish(resource, action, id, data);
    }
}
