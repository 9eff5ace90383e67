/// Runtime configuration read from the environment (and `.env` via dotenvy)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub port: u16,
    /// Per-room broadcast buffer; slower subscribers lose the oldest events
    pub event_channel_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/syncroom.db".to_string(),
            db_max_connections: 5,
            jwt_secret: "syncroom-secret-key-change-in-production".to_string(),
            port: 9999,
            event_channel_capacity: 256,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // Get database path from environment
        let db_path = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("DB_PATH"))
            .unwrap_or(defaults.database_url);

        Self {
            database_url: normalize_sqlite_url(&db_path),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(defaults.db_max_connections),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            port: env_parse("PORT").unwrap_or(defaults.port),
            event_channel_capacity: env_parse("EVENT_CHANNEL_CAPACITY")
                .unwrap_or(defaults.event_channel_capacity),
        }
    }

    /// Throwaway in-memory configuration for tests
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            jwt_secret: jwt_secret.to_string(),
            ..Self::default()
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Ensure path has sqlite: prefix
fn normalize_sqlite_url(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paths_get_sqlite_prefix() {
        assert_eq!(normalize_sqlite_url("./data/db.sqlite"), "sqlite:./data/db.sqlite");
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn test_in_memory_config() {
        let config = AppConfig::in_memory("secret");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.event_channel_capacity, 256);
    }
}
