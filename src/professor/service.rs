use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::ProfessorModel,
    repository::ProfessorRepository,
    types::{ProfessorCreate, ProfessorUpdate},
};
use crate::auth::CurrentUser;
use crate::shared::{require_non_blank, AppError, Pagination};
use crate::user::repository::UserRepository;

/// Service for professor profiles. Mutations are limited to the profile's user and admins.
pub struct ProfessorService {
    repository: Arc<dyn ProfessorRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl ProfessorService {
    pub fn new(
        repository: Arc<dyn ProfessorRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            user_repository,
        }
    }

    #[instrument(skip(self, current, request), fields(user_id = request.user_id))]
    pub async fn create_professor(
        &self,
        current: &CurrentUser,
        request: ProfessorCreate,
    ) -> Result<ProfessorModel, AppError> {
        current.ensure_self_or_admin(request.user_id, "create a professor profile for this user")?;
        require_non_blank("full_name", &request.full_name)?;

        if self.user_repository.get_user(request.user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if self
            .repository
            .get_professor_by_user(request.user_id)
            .await?
            .is_some()
        {
            warn!("User already owns a professor profile");
            return Err(AppError::BadRequest(
                "User already has a professor profile".to_string(),
            ));
        }

        let professor = self.repository.create_professor(&request).await?;
        info!(professor_id = professor.professor_id, "Professor created");
        Ok(professor)
    }

    #[instrument(skip(self))]
    pub async fn list_professores(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<ProfessorModel>, AppError> {
        self.repository
            .list_professores(pagination.validate()?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_professor(&self, professor_id: i32) -> Result<ProfessorModel, AppError> {
        self.repository
            .get_professor(professor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Professor not found".to_string()))
    }

    #[instrument(skip(self, current, update))]
    pub async fn update_professor(
        &self,
        current: &CurrentUser,
        professor_id: i32,
        update: ProfessorUpdate,
    ) -> Result<ProfessorModel, AppError> {
        let professor = self.get_professor(professor_id).await?;
        current.ensure_self_or_admin(professor.user_id, "update this professor")?;

        if let Some(full_name) = update.full_name.as_set() {
            require_non_blank("full_name", full_name)?;
        }

        let updated = self.repository.update_professor(professor_id, update).await?;
        info!(professor_id, "Professor updated");
        Ok(updated)
    }

    #[instrument(skip(self, current))]
    pub async fn delete_professor(
        &self,
        current: &CurrentUser,
        professor_id: i32,
    ) -> Result<(), AppError> {
        let professor = self.get_professor(professor_id).await?;
        current.ensure_self_or_admin(professor.user_id, "delete this professor")?;

        self.repository.delete_professor(professor_id).await?;
        info!(professor_id, "Professor deleted");
        Ok(())
    }
}
