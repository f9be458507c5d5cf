use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Role, UserModel};
use crate::patch::Patch;

/// Request payload for `POST /users` and `POST /auth/register`
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Partial update payload for `PUT /users/:id`
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub username: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
    #[serde(default)]
    pub role: Patch<Role>,
}

/// A user as returned by the API; the password hash is never exposed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Row to insert; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Column changes handed to the repository after authorization and hashing
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Patch<String>,
    pub email: Patch<String>,
    pub password_hash: Patch<String>,
    pub role: Patch<Role>,
}
