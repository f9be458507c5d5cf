use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    repository::UserRepository,
    types::{NewUser, UserChanges, UserCreate, UserResponse, UserUpdate},
};
use crate::auth::{password::PasswordHasher, CurrentUser};
use crate::patch::Patch;
use crate::shared::{require_email, require_non_blank, AppError, Pagination};

/// Service for handling user accounts
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    password_hasher: PasswordHasher,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    /// Registers a new account. Open to anyone, with any role.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create_user(&self, request: UserCreate) -> Result<UserResponse, AppError> {
        require_non_blank("username", &request.username)?;
        require_email(&request.email)?;
        require_non_blank("password", &request.password)?;

        if self
            .repository
            .find_conflicting_user(
                Some(request.username.as_str()),
                Some(request.email.as_str()),
                None,
            )
            .await?
            .is_some()
        {
            warn!("Registration with taken username or email");
            return Err(AppError::BadRequest(
                "Username or email already registered".to_string(),
            ));
        }

        let password_hash = self.password_hasher.hash(&request.password).await?;
        let user = self
            .repository
            .create_user(&NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                role: request.role,
            })
            .await?;

        info!(user_id = user.user_id, role = %user.role, "User created");
        Ok(user.into())
    }

    #[instrument(skip(self, current), fields(current_user = current.user_id()))]
    pub async fn list_users(
        &self,
        current: &CurrentUser,
        pagination: Pagination,
    ) -> Result<Vec<UserResponse>, AppError> {
        current.ensure_admin("list users")?;
        let pagination = pagination.validate()?;

        let users = self.repository.list_users(pagination).await?;
        debug!(user_count = users.len(), "Users listed");
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self, current), fields(current_user = current.user_id()))]
    pub async fn get_user(
        &self,
        current: &CurrentUser,
        user_id: i32,
    ) -> Result<UserResponse, AppError> {
        current.ensure_self_or_admin(user_id, "view this user")?;

        self.repository
            .get_user(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Applies the supplied fields. A role change requested by a non-admin is dropped.
    #[instrument(skip(self, current, update), fields(current_user = current.user_id()))]
    pub async fn update_user(
        &self,
        current: &CurrentUser,
        user_id: i32,
        update: UserUpdate,
    ) -> Result<UserResponse, AppError> {
        current.ensure_self_or_admin(user_id, "update this user")?;

        if let Some(username) = update.username.as_set() {
            require_non_blank("username", username)?;
        }
        if let Some(email) = update.email.as_set() {
            require_email(email)?;
        }

        if update.username.is_set() || update.email.is_set() {
            let taken = self
                .repository
                .find_conflicting_user(
                    update.username.as_set().map(String::as_str),
                    update.email.as_set().map(String::as_str),
                    Some(user_id),
                )
                .await?;
            if taken.is_some() {
                warn!(user_id, "Update to a taken username or email");
                return Err(AppError::BadRequest(
                    "Username or email already in use".to_string(),
                ));
            }
        }

        let password_hash = match update.password {
            Patch::Set(password) => {
                require_non_blank("password", &password)?;
                Patch::Set(self.password_hasher.hash(&password).await?)
            }
            Patch::Absent => Patch::Absent,
        };

        let role = if update.role.is_set() && !current.is_admin() {
            debug!(user_id, "Ignoring role change requested by non-admin");
            Patch::Absent
        } else {
            update.role
        };

        let user = self
            .repository
            .update_user(
                user_id,
                UserChanges {
                    username: update.username,
                    email: update.email,
                    password_hash,
                    role,
                },
            )
            .await?;

        info!(user_id, "User updated");
        Ok(user.into())
    }

    #[instrument(skip(self, current), fields(current_user = current.user_id()))]
    pub async fn delete_user(&self, current: &CurrentUser, user_id: i32) -> Result<(), AppError> {
        current.ensure_self_or_admin(user_id, "delete this user")?;

        self.repository.delete_user(user_id).await?;
        info!(user_id, "User deleted");
        Ok(())
    }
}
