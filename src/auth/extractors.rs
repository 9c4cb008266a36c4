use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{claims::Claims, jwt::JwtKeys};
use crate::error::AppError;

/// Extracts and validates the bearer JWT, yielding its claims.
pub struct AuthUser(pub Claims);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    // Read Authorization header
    let auth = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("invalid Authorization header"))?;

    // Expect "Bearer <token>"
    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("invalid Authorization header"))?;

    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).inspect_err(|e| warn!(reason = %e, "rejected request"))?;
        let claims = JwtKeys::from_ref(state).verify(token)?;
        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::test_keys;
    use crate::users::User;
    use axum::http::Request;
    use time::OffsetDateTime;

    #[derive(Clone)]
    struct TestState(JwtKeys);

    impl FromRef<TestState> for JwtKeys {
        fn from_ref(state: &TestState) -> Self {
            state.0.clone()
        }
    }

    fn parts(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/auth/profile");
        if let Some(v) = auth {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(()).expect("request").into_parts().0
    }

    fn reject_message(res: Result<AuthUser, AppError>) -> String {
        match res {
            Err(AppError::Unauthorized(m)) => m,
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("expected rejection"),
        }
    }

    fn token(keys: &JwtKeys) -> String {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: 3,
            first_name: "Ana".into(),
            last_name: "Diaz".into(),
            username: "anad".into(),
            email: "ana@test.com".into(),
            password_hash: "unused".into(),
            created_at: now,
            updated_at: now,
            is_active: true,
        };
        keys.sign(&user).expect("sign")
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let state = TestState(test_keys("s", "i", "a"));
        let mut p = parts(None);
        let msg = reject_message(AuthUser::from_request_parts(&mut p, &state).await);
        assert_eq!(msg, "missing Authorization header");
    }

    #[tokio::test]
    async fn wrong_scheme_or_empty_token_is_rejected() {
        let state = TestState(test_keys("s", "i", "a"));
        for header in ["Basic abc", "Bearer ", "Bearer    ", "Token x"] {
            let mut p = parts(Some(header));
            let msg = reject_message(AuthUser::from_request_parts(&mut p, &state).await);
            assert_eq!(msg, "invalid Authorization header", "header {header:?}");
        }
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let keys = test_keys("s", "i", "a");
        let header = format!("Bearer {}", token(&keys));
        let state = TestState(keys);
        let mut p = parts(Some(&header));
        let AuthUser(claims) = AuthUser::from_request_parts(&mut p, &state)
            .await
            .unwrap_or_else(|e| panic!("rejected: {e}"));
        assert_eq!(claims.sub, 3);
        assert_eq!(claims.name, "Ana Diaz");
    }

    #[tokio::test]
    async fn lowercase_scheme_is_accepted() {
        let keys = test_keys("s", "i", "a");
        let header = format!("bearer {}", token(&keys));
        let state = TestState(keys);
        let mut p = parts(Some(&header));
        assert!(AuthUser::from_request_parts(&mut p, &state).await.is_ok());
    }

    #[tokio::test]
    async fn token_from_other_secret_is_invalid() {
        let other = test_keys("other", "i", "a");
        let header = format!("Bearer {}", token(&other));
        let state = TestState(test_keys("s", "i", "a"));
        let mut p = parts(Some(&header));
        let msg = reject_message(AuthUser::from_request_parts(&mut p, &state).await);
        assert_eq!(msg, "invalid token");
    }
}
