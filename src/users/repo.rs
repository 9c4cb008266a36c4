use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;

use super::repo_types::{normalize_email, NewUser, PublicUser, User, UserChanges};
use crate::error::AppError;

#[derive(Debug)]
struct Inner {
    users: Vec<User>,
    next_id: u64,
}

/// In-memory user store. Contents live as long as the process.
#[derive(Debug)]
pub struct UserStore {
    inner: RwLock<Inner>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

pub const EMAIL_TAKEN: &str = "email already registered";

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("user with id {id} not found"))
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Insert a new user. Duplicate emails are the caller's concern.
    pub async fn create(&self, new: NewUser) -> PublicUser {
        let mut inner = self.inner.write().await;
        Self::insert(&mut inner, new)
    }

    /// Insert a new user unless the email is already taken.
    ///
    /// The check and the insert happen under one write lock, so concurrent
    /// registrations of the same address cannot both succeed.
    pub async fn create_unique(&self, new: NewUser) -> Option<PublicUser> {
        let mut inner = self.inner.write().await;
        let email = normalize_email(&new.email);
        if inner.users.iter().any(|u| u.email == email) {
            return None;
        }
        Some(Self::insert(&mut inner, new))
    }

    fn insert(inner: &mut Inner, new: NewUser) -> PublicUser {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: inner.next_id,
            first_name: new.first_name,
            last_name: new.last_name,
            username: new.username,
            email: normalize_email(&new.email),
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
            is_active: true,
        };
        inner.next_id += 1;
        debug!(user_id = user.id, "user stored");
        let public = PublicUser::from(&user);
        inner.users.push(user);
        public
    }

    pub async fn find_by_id(&self, id: u64) -> Result<PublicUser, AppError> {
        let inner = self.inner.read().await;
        inner
            .users
            .iter()
            .find(|u| u.id == id)
            .map(PublicUser::from)
            .ok_or_else(|| not_found(id))
    }

    /// Full record, hash included. `None` is a normal outcome.
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        let inner = self.inner.read().await;
        inner.users.iter().find(|u| u.email == email).cloned()
    }

    pub async fn find_all(&self) -> Vec<PublicUser> {
        let inner = self.inner.read().await;
        inner.users.iter().map(PublicUser::from).collect()
    }

    /// Applies the provided fields. A new email must not belong to any other
    /// user; the check runs under the same write lock as the change.
    pub async fn update(&self, id: u64, changes: UserChanges) -> Result<PublicUser, AppError> {
        let mut inner = self.inner.write().await;
        let idx = inner
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| not_found(id))?;

        let email = changes.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            if inner.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(AppError::Conflict(EMAIL_TAKEN.into()));
            }
        }

        let user = &mut inner.users[idx];

        if let Some(v) = changes.first_name {
            user.first_name = v;
        }
        if let Some(v) = changes.last_name {
            user.last_name = v;
        }
        if let Some(v) = changes.username {
            user.username = v;
        }
        if let Some(v) = email {
            user.email = v;
        }
        if let Some(v) = changes.password_hash {
            user.password_hash = v;
        }
        user.updated_at = OffsetDateTime::now_utc();

        Ok(PublicUser::from(&*user))
    }

    /// Logical delete.
    pub async fn deactivate(&self, id: u64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found(id))?;
        user.is_active = false;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}
