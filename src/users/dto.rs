use serde::{Deserialize, Serialize};

use crate::{
    auth::dto::{check_email, check_len, NAME_LEN, PASSWORD_LEN, USERNAME_LEN},
    error::AppError,
};

/// Request body for `PATCH /users/me`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(v) = &self.first_name {
            check_len("firstName", v, NAME_LEN)?;
        }
        if let Some(v) = &self.last_name {
            check_len("lastName", v, NAME_LEN)?;
        }
        if let Some(v) = &self.username {
            check_len("username", v, USERNAME_LEN)?;
        }
        if let Some(v) = &self.email {
            check_email(v)?;
        }
        if let Some(v) = &self.password {
            check_len("password", v, PASSWORD_LEN)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
