use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::EstudanteModel,
    repository::EstudanteRepository,
    types::{EstudanteCreate, EstudanteUpdate},
};
use crate::auth::CurrentUser;
use crate::shared::{require_non_blank, AppError, Pagination};
use crate::user::repository::UserRepository;

/// Service for student profiles
pub struct EstudanteService {
    repository: Arc<dyn EstudanteRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl EstudanteService {
    pub fn new(
        repository: Arc<dyn EstudanteRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            user_repository,
        }
    }

    #[instrument(skip(self, current, request), fields(user_id = request.user_id))]
    pub async fn create_estudante(
        &self,
        current: &CurrentUser,
        request: EstudanteCreate,
    ) -> Result<EstudanteModel, AppError> {
        current.ensure_self_or_admin(request.user_id, "create a student profile for this user")?;
        require_non_blank("full_name", &request.full_name)?;

        if self.user_repository.get_user(request.user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if self
            .repository
            .get_estudante_by_user(request.user_id)
            .await?
            .is_some()
        {
            warn!("User already owns a student profile");
            return Err(AppError::BadRequest(
                "User already has a student profile".to_string(),
            ));
        }

        let estudante = self.repository.create_estudante(&request).await?;
        info!(student_id = estudante.student_id, "Estudante created");
        Ok(estudante)
    }

    #[instrument(skip(self))]
    pub async fn list_estudantes(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<EstudanteModel>, AppError> {
        self.repository
            .list_estudantes(pagination.validate()?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_estudante(&self, student_id: i32) -> Result<EstudanteModel, AppError> {
        self.repository
            .get_estudante(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Estudante not found".to_string()))
    }

    #[instrument(skip(self, current, update))]
    pub async fn update_estudante(
        &self,
        current: &CurrentUser,
        student_id: i32,
        update: EstudanteUpdate,
    ) -> Result<EstudanteModel, AppError> {
        let estudante = self.get_estudante(student_id).await?;
        current.ensure_self_or_admin(estudante.user_id, "update this estudante")?;

        if let Some(full_name) = update.full_name.as_set() {
            require_non_blank("full_name", full_name)?;
        }

        let updated = self.repository.update_estudante(student_id, update).await?;
        info!(student_id, "Estudante updated");
        Ok(updated)
    }

    #[instrument(skip(self, current))]
    pub async fn delete_estudante(
        &self,
        current: &CurrentUser,
        student_id: i32,
    ) -> Result<(), AppError> {
        let estudante = self.get_estudante(student_id).await?;
        current.ensure_self_or_admin(estudante.user_id, "delete this estudante")?;

        self.repository.delete_estudante(student_id).await?;
        info!(student_id, "Estudante deleted");
        Ok(())
    }
}
