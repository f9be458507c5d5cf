use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::OngModel,
    repository::OngRepository,
    types::{OngCreate, OngUpdate},
};
use crate::auth::CurrentUser;
use crate::shared::{require_email, require_non_blank, AppError, Pagination};

/// Service for NGOs. An ONG has no owning user, so only admins may change them.
pub struct OngService {
    repository: Arc<dyn OngRepository + Send + Sync>,
}

impl OngService {
    pub fn new(repository: Arc<dyn OngRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, current, request), fields(ngo_name = %request.ngo_name))]
    pub async fn create_ong(
        &self,
        current: &CurrentUser,
        request: OngCreate,
    ) -> Result<OngModel, AppError> {
        current.ensure_admin("create ONGs")?;
        require_non_blank("ngo_name", &request.ngo_name)?;
        if let Some(email) = &request.email {
            require_email(email)?;
        }

        let ong = self.repository.create_ong(&request).await?;
        info!(ngo_id = ong.ngo_id, "ONG created");
        Ok(ong)
    }

    pub async fn list_ongs(&self, pagination: Pagination) -> Result<Vec<OngModel>, AppError> {
        self.repository.list_ongs(pagination.validate()?).await
    }

    pub async fn get_ong(&self, ngo_id: i32) -> Result<OngModel, AppError> {
        self.repository
            .get_ong(ngo_id)
            .await?
            .ok_or_else(|| AppError::NotFound("ONG not found".to_string()))
    }

    #[instrument(skip(self, current, update))]
    pub async fn update_ong(
        &self,
        current: &CurrentUser,
        ngo_id: i32,
        update: OngUpdate,
    ) -> Result<OngModel, AppError> {
        current.ensure_admin("update ONGs")?;
        if let Some(ngo_name) = update.ngo_name.as_set() {
            require_non_blank("ngo_name", ngo_name)?;
        }
        if let Some(Some(email)) = update.email.as_set() {
            require_email(email)?;
        }

        let ong = self.repository.update_ong(ngo_id, update).await?;
        info!(ngo_id, "ONG updated");
        Ok(ong)
    }

    #[instrument(skip(self, current))]
    pub async fn delete_ong(&self, current: &CurrentUser, ngo_id: i32) -> Result<(), AppError> {
        current.ensure_admin("delete ONGs")?;
        self.repository.delete_ong(ngo_id).await?;
        info!(ngo_id, "ONG deleted");
        Ok(())
    }
}
