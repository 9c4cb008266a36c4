use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
mod repo;
mod repo_types;

pub use dto::UpdateUserRequest;
pub use repo::{UserStore, EMAIL_TAKEN};
pub use repo_types::{normalize_email, NewUser, PublicUser, User, UserChanges};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
