use crate::{
    common::{deserialize_loose_estado, deserialize_present, non_blank_name, normalize_name},
    entities::category,
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

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All categories ordered by name
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<category::Model>, ServiceError> {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<category::Model, ServiceError> {
        category::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Categoría {} no encontrada", id)))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<category::Model>, ServiceError> {
        Ok(category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<category::Model, ServiceError> {
        let name = non_blank_name(input.name.as_deref())
            .ok_or_else(|| ServiceError::ValidationError("El nombre es obligatorio.".into()))?;

        if self.find_by_name(&name).await?.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "La categoría \"{}\" ya existe.",
                name
            )));
        }

        let created = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(input.description),
            active: Set(input.active.unwrap_or(true)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(category_id = %created.id, "Created category");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<category::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: category::ActiveModel = existing.clone().into();

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
                        "Ya existe otra categoría con el nombre \"{}\".",
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
    pub async fn set_active(&self, id: Uuid, estado: bool) -> Result<category::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: category::ActiveModel = existing.into();
        active.active = Set(estado);
        let updated = active.update(&*self.db).await?;
        info!(category_id = %id, estado, "Changed category state");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = category::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Categoría {} no encontrada",
                id
            )));
        }
        info!(category_id = %id, "Deleted category");
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCategoryInput {
    #[serde(rename = "nombre")]
    #[schema(example = "Ambientes")]
    pub name: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "estado", default, deserialize_with = "deserialize_loose_estado")]
    #[schema(value_type = Option<bool>)]
    pub active: Option<bool>,
}

/// Partial update; absent keys leave the column untouched
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryInput {
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

    async fn service() -> CategoryService {
        CategoryService::new(Arc::new(migrated_memory_pool().await))
    }

    fn create_input(value: serde_json::Value) -> CreateCategoryInput {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn create_normalizes_name_and_defaults_estado() {
        let svc = service().await;
        let created = svc
            .create(create_input(json!({"nombre": "  ambientes "})))
            .await
            .unwrap();
        assert_eq!(created.name, "AMBIENTES");
        assert!(created.active);
    }

    #[tokio::test]
    async fn create_rejects_missing_and_duplicate_names() {
        let svc = service().await;
        assert_matches!(
            svc.create(create_input(json!({"nombre": "   "}))).await,
            Err(ServiceError::ValidationError(msg)) if msg == "El nombre es obligatorio."
        );

        svc.create(create_input(json!({"nombre": "Ambientes"})))
            .await
            .unwrap();
        assert_matches!(
            svc.create(create_input(json!({"nombre": "AMBIENTES "}))).await,
            Err(ServiceError::ValidationError(msg)) if msg.contains("ya existe")
        );
    }

    #[tokio::test]
    async fn update_checks_duplicates_against_other_rows_only() {
        let svc = service().await;
        let first = svc
            .create(create_input(json!({"nombre": "Ambientes"})))
            .await
            .unwrap();
        let second = svc
            .create(create_input(json!({"nombre": "Herramientas"})))
            .await
            .unwrap();

        // Renaming to its own name is fine.
        let same = svc
            .update(
                first.id,
                serde_json::from_value(json!({"nombre": "ambientes", "estado": 0})).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(same.name, "AMBIENTES");
        assert!(!same.active);

        assert_matches!(
            svc.update(
                second.id,
                serde_json::from_value(json!({"nombre": "Ambientes"})).unwrap()
            )
            .await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn update_without_changes_returns_row() {
        let svc = service().await;
        let created = svc
            .create(create_input(json!({"nombre": "Ambientes", "descripcion": "x"})))
            .await
            .unwrap();
        let unchanged = svc
            .update(created.id, UpdateCategoryInput::default())
            .await
            .unwrap();
        assert_eq!(unchanged, created);

        let cleared = svc
            .update(
                created.id,
                serde_json::from_value(json!({"descripcion": null})).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let svc = service().await;
        let id = Uuid::new_v4();
        assert_matches!(svc.get(id).await, Err(ServiceError::NotFound(_)));
        assert_matches!(svc.set_active(id, false).await, Err(ServiceError::NotFound(_)));
        assert_matches!(svc.delete(id).await, Err(ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let svc = service().await;
        for name in ["Zapatos", "Ambientes", "Motores"] {
            svc.create(create_input(json!({ "nombre": name })))
                .await
                .unwrap();
        }
        let names: Vec<String> = svc.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["AMBIENTES", "MOTORES", "ZAPATOS"]);
    }
}
