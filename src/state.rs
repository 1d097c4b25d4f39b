use crate::auth::{jwt::JwtKeys, repo::UserStore};
use crate::config::AppConfig;
use crate::store::{MemoryStore, PgStore};
use crate::tasks::repo::TaskStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let jwt = JwtKeys::new(&config.jwt);

        let Some(database_url) = config.database_url.as_deref() else {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            return Ok(Self::in_memory(config, jwt));
        };

        let store = Arc::new(PgStore::connect(database_url, config.max_connections).await?);
        store.migrate().await?;
        tracing::info!("database connected and migrated");

        Ok(Self {
            config,
            jwt,
            users: store.clone(),
            tasks: store,
        })
    }

    fn in_memory(config: Arc<AppConfig>, jwt: JwtKeys) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config,
            jwt,
            users: store.clone(),
            tasks: store,
        }
    }

    /// In-memory state with fixed test keys.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
        });
        let jwt = JwtKeys::new(&config.jwt);
        Self::in_memory(config, jwt)
    }
}
