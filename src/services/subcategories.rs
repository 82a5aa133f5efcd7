use crate::{
    common::{deserialize_loose_estado, deserialize_present, non_blank_name, normalize_name},
    entities::subcategory,
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

/// Subcategories belong (optionally) to a category and share its name rules.
#[derive(Clone)]
pub struct SubcategoryService {
    db: Arc<DatabaseConnection>,
}

impl SubcategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<subcategory::Model>, ServiceError> {
        Ok(subcategory::Entity::find()
            .order_by_asc(subcategory::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<subcategory::Model, ServiceError> {
        subcategory::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Subcategoría {} no encontrada", id)))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<subcategory::Model>, ServiceError> {
        Ok(subcategory::Entity::find()
            .filter(subcategory::Column::Name.eq(name))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: CreateSubcategoryInput,
    ) -> Result<subcategory::Model, ServiceError> {
        let name = non_blank_name(input.name.as_deref())
            .ok_or_else(|| ServiceError::ValidationError("El nombre es obligatorio.".into()))?;

        if self.find_by_name(&name).await?.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "La subcategoría \"{}\" ya existe.",
                name
            )));
        }

        let created = subcategory::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(input.description),
            category_id: Set(input.category_id),
            active: Set(input.active.unwrap_or(true)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(subcategory_id = %created.id, "Created subcategory");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateSubcategoryInput,
    ) -> Result<subcategory::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: subcategory::ActiveModel = existing.clone().into();

        if let Some(raw) = input.name.as_deref() {
            let name = normalize_name(raw);
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "El nombre es obligatorio.".into(),
                ));
            }
            match self.find_by_name(&name).await? {
                Some(other) if other.id != id => {
                    return Err(ServiceError::ValidationError(format!(
                        "Ya existe otra subcategoría con el nombre \"{}\".",
                        name
                    )));
                }
                _ => active.name = Set(name),
            }
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
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
    pub async fn set_active(
        &self,
        id: Uuid,
        estado: bool,
    ) -> Result<subcategory::Model, ServiceError> {
        let mut active: subcategory::ActiveModel = self.get(id).await?.into();
        active.active = Set(estado);
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = subcategory::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Subcategoría {} no encontrada",
                id
            )));
        }
        info!(subcategory_id = %id, "Deleted subcategory");
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSubcategoryInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "idcategoria")]
    pub category_id: Option<Uuid>,
    #[serde(rename = "estado", default, deserialize_with = "deserialize_loose_estado")]
    #[schema(value_type = Option<bool>)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSubcategoryInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "descripcion", default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(rename = "idcategoria", default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
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

    async fn service() -> SubcategoryService {
        SubcategoryService::new(Arc::new(migrated_memory_pool().await))
    }

    #[tokio::test]
    async fn create_keeps_category_reference() {
        let svc = service().await;
        let category_id = Uuid::new_v4();
        let created = svc
            .create(
                serde_json::from_value(json!({
                    "nombre": "taladros",
                    "descripcion": "Percutores y atornilladores",
                    "idcategoria": category_id,
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(created.name, "TALADROS");
        assert_eq!(created.category_id, Some(category_id));
        assert!(created.active);
    }

    #[tokio::test]
    async fn update_can_detach_category_and_rename() {
        let svc = service().await;
        let created = svc
            .create(
                serde_json::from_value(json!({"nombre": "Sierras", "idcategoria": Uuid::new_v4()}))
                    .unwrap(),
            )
            .await
            .unwrap();

        let updated = svc
            .update(
                created.id,
                serde_json::from_value(json!({"nombre": " sierras circulares", "idcategoria": null}))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "SIERRAS CIRCULARES");
        assert_eq!(updated.category_id, None);
    }

    #[tokio::test]
    async fn duplicates_are_validation_errors() {
        let svc = service().await;
        svc.create(serde_json::from_value(json!({"nombre": "Lijas"})).unwrap())
            .await
            .unwrap();
        let other = svc
            .create(serde_json::from_value(json!({"nombre": "Brocas"})).unwrap())
            .await
            .unwrap();

        assert_matches!(
            svc.create(serde_json::from_value(json!({"nombre": "LIJAS"})).unwrap())
                .await,
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            svc.update(other.id, serde_json::from_value(json!({"nombre": "lijas"})).unwrap())
                .await,
            Err(ServiceError::ValidationError(_))
        );
    }
}
