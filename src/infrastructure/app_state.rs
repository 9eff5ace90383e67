use std::sync::Arc;

use sqlx::SqlitePool;

use crate::application::RoomCommandLocks;
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::{self, repositories::SqliteRoomRepository};
use crate::infrastructure::services::RoomHub;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    pub config: AppConfig,

    /// Bearer token verification
    pub jwt_service: Arc<JwtService>,

    /// Room aggregate store
    pub room_repo: Arc<SqliteRoomRepository>,

    /// Per-room event fan-out for SSE subscribers
    pub room_hub: Arc<RoomHub>,

    /// Serializes mutating commands per room
    pub room_locks: Arc<RoomCommandLocks>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        tracing::info!("Connecting to database: {}", config.database_url);

        let db = database::connect(&config.database_url, config.db_max_connections).await?;
        database::migrate(&db).await?;

        let jwt_service = Arc::new(JwtService::new(config.jwt_secret.clone()));
        let room_repo = Arc::new(SqliteRoomRepository::new(db.clone()));
        let room_hub = Arc::new(RoomHub::new(config.event_channel_capacity));
        let room_locks = Arc::new(RoomCommandLocks::new());

        Ok(Self {
            db,
            config,
            jwt_service,
            room_repo,
            room_hub,
            room_locks,
        })
    }

    /// Tear down long-lived resources once the server has stopped serving
    pub async fn shutdown(&self) {
        self.room_hub.shutdown();
        self.db.close().await;
        tracing::info!("Application state shut down");
    }
}
