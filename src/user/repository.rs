use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::{
    models::UserModel,
    types::{NewUser, UserChanges},
};
use crate::db::{constraint_error, database_error, memory::MemoryDatabase, UpdateBuilder};
use crate::shared::{AppError, Pagination};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError>;
    async fn get_user(&self, user_id: i32) -> Result<Option<UserModel>, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
    /// Any other user holding the given username or the given email
    async fn find_conflicting_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_user_id: Option<i32>,
    ) -> Result<Option<UserModel>, AppError>;
    async fn list_users(&self, pagination: Pagination) -> Result<Vec<UserModel>, AppError>;
    async fn update_user(&self, user_id: i32, changes: UserChanges)
        -> Result<UserModel, AppError>;
    /// Deletes the user together with its professor and student profiles
    async fn delete_user(&self, user_id: i32) -> Result<(), AppError>;
}

fn conflicts(
    user: &UserModel,
    username: Option<&str>,
    email: Option<&str>,
    exclude_user_id: Option<i32>,
) -> bool {
    if exclude_user_id == Some(user.user_id) {
        return false;
    }
    username.is_some_and(|u| user.username == u) || email.is_some_and(|e| user.email == e)
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    db: MemoryDatabase,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new(MemoryDatabase::new())
    }
}

impl InMemoryUserRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        let mut tables = self.db.lock()?;

        if tables.users.any(|existing| {
            conflicts(
                existing,
                Some(user.username.as_str()),
                Some(user.email.as_str()),
                None,
            )
        }) {
            warn!("Username or email already taken in memory");
            return Err(AppError::Conflict(
                "Username or email already registered".to_string(),
            ));
        }

        let user_id = tables.users.next_id();
        let now = Utc::now();
        let created = tables.users.insert(
            user_id,
            UserModel {
                user_id,
                username: user.username.clone(),
                email: user.email.clone(),
                password: user.password_hash.clone(),
                role: user.role,
                created_at: now,
                updated_at: now,
            },
        );

        debug!(user_id, "User created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i32) -> Result<Option<UserModel>, AppError> {
        Ok(self.db.lock()?.users.get(user_id))
    }

    #[instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        Ok(self.db.lock()?.users.find(|u| u.username == username))
    }

    #[instrument(skip(self))]
    async fn find_conflicting_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_user_id: Option<i32>,
    ) -> Result<Option<UserModel>, AppError> {
        Ok(self
            .db
            .lock()?
            .users
            .find(|u| conflicts(u, username, email, exclude_user_id)))
    }

    #[instrument(skip(self))]
    async fn list_users(&self, pagination: Pagination) -> Result<Vec<UserModel>, AppError> {
        Ok(self.db.lock()?.users.page(&pagination))
    }

    #[instrument(skip(self, changes))]
    async fn update_user(
        &self,
        user_id: i32,
        changes: UserChanges,
    ) -> Result<UserModel, AppError> {
        let mut tables = self.db.lock()?;

        let username = changes.username.as_set().map(String::as_str);
        let email = changes.email.as_set().map(String::as_str);
        if tables
            .users
            .any(|u| conflicts(u, username, email, Some(user_id)))
        {
            warn!(user_id, "Username or email already taken in memory");
            return Err(AppError::Conflict(
                "Username or email already in use".to_string(),
            ));
        }

        let user = tables.users.get_mut(user_id).ok_or_else(|| {
            warn!(user_id, "User not found for update in memory");
            AppError::NotFound("User not found".to_string())
        })?;

        changes.username.apply_to(&mut user.username);
        changes.email.apply_to(&mut user.email);
        changes.password_hash.apply_to(&mut user.password);
        changes.role.apply_to(&mut user.role);
        user.updated_at = Utc::now();

        debug!(user_id, "User updated in memory");
        Ok(user.clone())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i32) -> Result<(), AppError> {
        if !self.db.lock()?.delete_user(user_id) {
            warn!(user_id, "User not found for deletion in memory");
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        let created = sqlx::query_as::<_, UserModel>(
            "INSERT INTO users (username, email, password, role) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "Username or email already registered", "User not found"))?;

        debug!(user_id = created.user_id, "User created in database");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i32) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to fetch user from database"))
    }

    #[instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to fetch user by username"))
    }

    #[instrument(skip(self))]
    async fn find_conflicting_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_user_id: Option<i32>,
    ) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT * FROM users WHERE (username = $1 OR email = $2) \
             AND ($3::INTEGER IS NULL OR user_id <> $3) ORDER BY user_id LIMIT 1",
        )
        .bind(username)
        .bind(email)
        .bind(exclude_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to check user uniqueness"))
    }

    #[instrument(skip(self))]
    async fn list_users(&self, pagination: Pagination) -> Result<Vec<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT * FROM users ORDER BY user_id OFFSET $1 LIMIT $2",
        )
        .bind(pagination.skip)
        .bind(pagination.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, "Failed to list users"))
    }

    #[instrument(skip(self, changes))]
    async fn update_user(
        &self,
        user_id: i32,
        changes: UserChanges,
    ) -> Result<UserModel, AppError> {
        let mut update = UpdateBuilder::new("users");
        update
            .set("username", changes.username)
            .set("email", changes.email)
            .set("password", changes.password_hash)
            .set("role", changes.role.map(|role| role.to_string()));
        let mut query = update.finish("user_id", user_id);

        query
            .build_query_as::<UserModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "Username or email already in use", "User not found"))?
            .ok_or_else(|| {
                warn!(user_id, "User not found for update");
                AppError::NotFound("User not found".to_string())
            })
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(e, "Failed to delete user"))?;

        if result.rows_affected() == 0 {
            warn!(user_id, "User not found for deletion");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        debug!(user_id, "User deleted from database");
        Ok(())
    }
}
