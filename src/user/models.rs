use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};

/// Role carried by every account. Parsing ignores ASCII case so `"estudante"`
/// and `"Estudante"` are the same role; serialization always uses the
/// capitalized form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Admin,
    Professor,
    Estudante,
}

impl TryFrom<String> for Role {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

/// Database model for the users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub password: String, // bcrypt hash, never serialized
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserModel {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
