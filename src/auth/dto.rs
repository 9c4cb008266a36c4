use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, users::PublicUser};

pub(crate) const NAME_LEN: (usize, usize) = (2, 80);
pub(crate) const USERNAME_LEN: (usize, usize) = (3, 40);
pub(crate) const EMAIL_MAX: usize = 150;
pub(crate) const PASSWORD_LEN: (usize, usize) = (6, 50);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn check_len(
    field: &str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<(), AppError> {
    let n = value.chars().count();
    if n < min || n > max {
        return Err(AppError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

pub(crate) fn check_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.chars().count() > EMAIL_MAX {
        return Err(AppError::Validation(format!(
            "email must be at most {EMAIL_MAX} characters"
        )));
    }
    if !is_valid_email(email) {
        return Err(AppError::Validation("email must be a valid email".into()));
    }
    Ok(())
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_len("firstName", &self.first_name, NAME_LEN)?;
        check_len("lastName", &self.last_name, NAME_LEN)?;
        check_len("username", &self.username, USERNAME_LEN)?;
        check_email(&self.email)?;
        check_len("password", &self.password, PASSWORD_LEN)
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AppError::Validation("password must not be empty".into()));
        }
        Ok(())
    }
}

/// Response returned after registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: PublicUser,
}

/// Identity taken from a validated token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: u64,
    pub email: String,
    pub display_name: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse<T> {
    pub message: String,
    pub user: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedResponse {
    pub message: String,
    pub timestamp: String,
    pub user_id: u64,
}
