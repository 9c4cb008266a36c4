use crate::auth::{jwt::JwtKeys, password::PasswordHasher, AuthService};
use crate::config::AppConfig;
use crate::users::UserStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub auth: AuthService,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config)
    }

    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(config.hash)?;
        let keys = JwtKeys::from(&config.jwt);
        let users = Arc::new(UserStore::new());
        let auth = AuthService::new(users, hasher, keys.clone())?;
        Ok(Self {
            config: Arc::new(config),
            keys,
            auth,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{HashConfig, JwtConfig};

        let config = AppConfig {
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            hash: HashConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        };
        Self::from_config(config).expect("test config is valid")
    }
}
