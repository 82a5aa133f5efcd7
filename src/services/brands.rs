use crate::{
    common::{deserialize_loose_estado, deserialize_present, non_blank_name, normalize_name},
    entities::brand,
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Brand service
#[derive(Clone)]
pub struct BrandService {
    db: Arc<DatabaseConnection>,
}

impl BrandService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All brands ordered by name
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<brand::Model>, ServiceError> {
        Ok(brand::Entity::find()
            .order_by_asc(brand::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<brand::Model, ServiceError> {
        brand::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Marca {} no encontrada", id)))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<brand::Model>, ServiceError> {
        Ok(brand::Entity::find()
            .filter(brand::Column::Name.eq(name))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: CreateBrandInput,
    ) -> Result<brand::Model, ServiceError> {
        let name = non_blank_name(input.name.as_deref())
            .ok_or_else(|| ServiceError::ValidationError("El nombre es obligatorio.".into()))?;

        if self.find_by_name(&name).await?.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "La marca \"{}\" ya existe.",
                name
            )));
        }

        let created = brand::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(input.description),
            active: Set(input.active.unwrap_or(true)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(brand_id = %created.id, "Created brand");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateBrandInput,
    ) -> Result<brand::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: brand::ActiveModel = existing.clone().into();

        if let Some(raw) = input.name.as_deref() {
            let name = normalize_name(raw);
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "El nombre es obligatorio.".into(),
                ));
            }
            if let Some(other) = self.find_by_name(&name).await? {
                if other.id != id {
                    return Err(ServiceError::ValidationError(format!(
                        "Ya existe otra marca con el nombre \"{}\".",
                        name
                    )));
                }
            }
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(estado) = input.active {
            active.active = Set(estado);
        }

        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_active(&self, id: Uuid, estado: bool) -> Result<brand::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: brand::ActiveModel = existing.into();
        active.active = Set(estado);
        let updated = active.update(&*self.db).await?;
        info!(brand_id = %id, estado, "Changed brand state");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = brand::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Marca {} no encontrada",
                id
            )));
        }
        info!(brand_id = %id, "Deleted brand");
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBrandInput {
    #[serde(rename = "nombre")]
    #[schema(example = "Makita")]
    pub name: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "estado", default, deserialize_with = "deserialize_loose_estado")]
    #[schema(value_type = Option<bool>)]
    pub active: Option<bool>,
}

/// Partial update; absent keys leave the column untouched
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateBrandInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "descripcion", default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(rename = "estado", default, deserialize_with = "deserialize_loose_estado")]
    #[schema(value_type = Option<bool>)]
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrated_memory_pool;
    use assert_matches::assert_matches;
    use serde_json::json;

    async fn service() -> BrandService {
        BrandService::new(Arc::new(migrated_memory_pool().await))
    }

    #[tokio::test]
    async fn duplicate_brand_names_are_rejected_after_normalization() {
        let svc = service().await;
        let makita = svc
            .create(serde_json::from_value(json!({"nombre": "Makita", "estado": "true"})).unwrap())
            .await
            .unwrap();
        assert_eq!(makita.name, "MAKITA");
        assert!(makita.active);

        let err = svc
            .create(serde_json::from_value(json!({"nombre": " makita"})).unwrap())
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) if msg == "La marca \"MAKITA\" ya existe.");
    }

    #[tokio::test]
    async fn rename_onto_another_brand_fails() {
        let svc = service().await;
        svc.create(serde_json::from_value(json!({"nombre": "Bosch"})).unwrap())
            .await
            .unwrap();
        let stihl = svc
            .create(serde_json::from_value(json!({"nombre": "Stihl"})).unwrap())
            .await
            .unwrap();

        assert_matches!(
            svc.update(stihl.id, serde_json::from_value(json!({"nombre": "bosch"})).unwrap())
                .await,
            Err(ServiceError::ValidationError(msg)) if msg.starts_with("Ya existe otra marca")
        );
    }

    #[tokio::test]
    async fn state_change_and_delete() {
        let svc = service().await;
        let brand = svc
            .create(serde_json::from_value(json!({"nombre": "Dewalt"})).unwrap())
            .await
            .unwrap();

        let off = svc.set_active(brand.id, false).await.unwrap();
        assert!(!off.active);

        svc.delete(brand.id).await.unwrap();
        assert_matches!(svc.get(brand.id).await, Err(ServiceError::NotFound(_)));
        assert_matches!(svc.delete(brand.id).await, Err(ServiceError::NotFound(_)));
    }
}
