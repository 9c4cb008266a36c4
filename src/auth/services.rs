use std::sync::Arc;

use anyhow::Context;
use tracing::{info, instrument, warn};

use super::{
    dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    jwt::JwtKeys,
    password::PasswordHasher,
};
use crate::{
    error::AppError,
    users::{normalize_email, NewUser, PublicUser, UpdateUserRequest, UserChanges, UserStore},
};

pub use crate::users::EMAIL_TAKEN;

pub const INVALID_CREDENTIALS: &str = "invalid credentials";
pub const INACTIVE_USER: &str = "inactive user";

/// Registration, login and account operations over the user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<UserStore>,
    hasher: PasswordHasher,
    keys: JwtKeys,
    // Verified against on unknown emails so both login paths cost one Argon2 run
    dummy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(
        users: Arc<UserStore>,
        hasher: PasswordHasher,
        keys: JwtKeys,
    ) -> anyhow::Result<Self> {
        let dummy_hash = hasher.hash("userauth-unknown-account")?.into();
        Ok(Self {
            users,
            hasher,
            keys,
            dummy_hash,
        })
    }

    async fn hash(&self, plain: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .context("hash task panicked")??;
        Ok(hash)
    }

    async fn verify(&self, plain: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .context("verify task panicked")??;
        Ok(ok)
    }

    #[instrument(skip_all)]
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AppError> {
        let email = normalize_email(&req.email);

        // Cheap check before the expensive hash
        if self.users.find_by_email(&email).await.is_some() {
            warn!(%email, "email already registered");
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }

        let password_hash = self.hash(req.password).await?;

        let user = self
            .users
            .create_unique(NewUser {
                first_name: req.first_name,
                last_name: req.last_name,
                username: req.username,
                email,
                password_hash,
            })
            .await
            .ok_or_else(|| AppError::Conflict(EMAIL_TAKEN.into()))?;

        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(RegisterResponse {
            message: "user registered successfully".into(),
            user,
        })
    }

    #[instrument(skip_all)]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let email = normalize_email(&req.email);

        let Some(user) = self.users.find_by_email(&email).await else {
            self.verify(req.password, self.dummy_hash.to_string()).await?;
            warn!(%email, "login unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !self.verify(req.password, user.password_hash.clone()).await? {
            warn!(user_id = user.id, "login invalid password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        // Only reported to callers who proved the password
        if !user.is_active {
            warn!(user_id = user.id, "login inactive user");
            return Err(AppError::unauthorized(INACTIVE_USER));
        }

        let access_token = self.keys.sign(&user)?;

        info!(user_id = user.id, "user logged in");
        Ok(LoginResponse {
            access_token,
            user: PublicUser::from(&user),
        })
    }

    pub async fn get_profile(&self, user_id: u64) -> Result<PublicUser, AppError> {
        self.users.find_by_id(user_id).await
    }

    pub async fn list_users(&self) -> Vec<PublicUser> {
        self.users.find_all().await
    }

    #[instrument(skip(self, req))]
    pub async fn update_account(
        &self,
        user_id: u64,
        req: UpdateUserRequest,
    ) -> Result<PublicUser, AppError> {
        req.validate()?;

        // Fail on unknown ids before hashing
        self.users.find_by_id(user_id).await?;

        // Fast path; the store re-checks under its write lock
        let email = req.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            if let Some(other) = self.users.find_by_email(email).await {
                if other.id != user_id {
                    warn!(%email, "email already registered");
                    return Err(AppError::Conflict(EMAIL_TAKEN.into()));
                }
            }
        }

        let password_hash = match req.password {
            Some(plain) => Some(self.hash(plain).await?),
            None => None,
        };

        let user = self
            .users
            .update(
                user_id,
                UserChanges {
                    first_name: req.first_name,
                    last_name: req.last_name,
                    username: req.username,
                    email,
                    password_hash,
                },
            )
            .await?;

        info!(user_id, "user updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn deactivate_account(&self, user_id: u64) -> Result<(), AppError> {
        self.users.deactivate(user_id).await?;
        info!(user_id, "user deactivated");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_service() -> (AuthService, JwtKeys) {
    let keys = super::jwt::test_keys("test-secret", "test-issuer", "test-aud");
    let service = AuthService::new(
        Arc::new(UserStore::new()),
        super::password::cheap_hasher(),
        keys.clone(),
    )
    .expect("cheap hasher works");
    (service, keys)
}
