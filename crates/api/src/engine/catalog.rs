//! Catalog writes that must be checked against stored reservations.

use mindak_core::catalog::{first_missing_id, normalize_bulk_ids};
use mindak_core::error::CoreError;
use mindak_core::types::DbId;
use mindak_db::models::service::Service;
use mindak_db::repositories::ServiceRepo;
use mindak_db::DbPool;

use crate::error::AppResult;

/// Delete a service unless any reservation requested it.
///
/// The service row is locked before the reference check. Submissions
/// share-lock the services they request, so a reservation for this service
/// either commits before the check sees it or waits until the delete is
/// done and then finds the service gone.
pub async fn delete_service(pool: &DbPool, id: DbId) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    if !ServiceRepo::lock_by_id(&mut *tx, id).await? {
        return Err(CoreError::NotFound {
            entity: "Service",
            id,
        }
        .into());
    }
    if ServiceRepo::is_referenced(&mut *tx, id).await? {
        return Err(CoreError::Conflict(format!(
            "Service {id} is referenced by existing reservations; deactivate it instead"
        ))
        .into());
    }
    ServiceRepo::delete(&mut *tx, id).await?;
    tx.commit().await?;

    tracing::info!(service_id = id, "Service deleted");
    Ok(())
}

/// Set the active flag on several services. Every id must exist; nothing is
/// changed otherwise.
pub async fn bulk_set_status(pool: &DbPool, ids: &[DbId], is_active: bool) -> AppResult<Vec<Service>> {
    let ids = normalize_bulk_ids(ids)?;

    let mut tx = pool.begin().await?;
    let found = ServiceRepo::find_existing_ids(&mut *tx, &ids).await?;
    if let Some(missing) = first_missing_id(&ids, &found) {
        return Err(CoreError::NotFound {
            entity: "Service",
            id: missing,
        }
        .into());
    }
    let services = ServiceRepo::bulk_set_status(&mut *tx, &ids, is_active).await?;
    tx.commit().await?;

    tracing::info!(count = services.len(), is_active, "Service status bulk-updated");
    Ok(services)
}
