use crate::{
    common::{deserialize_loose_estado, deserialize_present},
    entities::vehicle,
    errors::ServiceError,
    services::coded_items::{
        create_item, delete_item, find_item, list_items, set_item_active, update_item, ItemDraft,
        ItemPatch,
    },
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Vehicle catalog service. Mirrors products, but stock must be given on create.
#[derive(Clone)]
pub struct VehicleService {
    db: Arc<DatabaseConnection>,
    max_code_attempts: u32,
}

impl VehicleService {
    pub fn new(db: Arc<DatabaseConnection>, max_code_attempts: u32) -> Self {
        Self {
            db,
            max_code_attempts,
        }
    }

    /// All vehicles, oldest first
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<vehicle::Model>, ServiceError> {
        list_items::<vehicle::Entity, _>(&*self.db).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<vehicle::Model, ServiceError> {
        find_item::<vehicle::Entity, _>(&*self.db, id).await
    }

    /// Validates, normalizes and inserts a vehicle under a freshly generated code.
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateVehicleInput) -> Result<vehicle::Model, ServiceError> {
        let created =
            create_item::<vehicle::Entity, _>(&*self.db, input.into(), self.max_code_attempts)
                .await?;
        info!(vehicle_id = %created.id, code = %created.code, "Created vehicle");
        Ok(created)
    }

    /// Partial update. Any attempt to send `codigovehic` is refused before touching the store.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateVehicleInput,
    ) -> Result<vehicle::Model, ServiceError> {
        update_item::<vehicle::Entity, _>(&*self.db, id, input.into()).await
    }

    #[instrument(skip(self))]
    pub async fn set_active(&self, id: Uuid, estado: bool) -> Result<vehicle::Model, ServiceError> {
        let updated = set_item_active::<vehicle::Entity, _>(&*self.db, id, estado).await?;
        info!(vehicle_id = %id, estado, "Changed vehicle state");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_item::<vehicle::Entity, _>(&*self.db, id).await?;
        info!(vehicle_id = %id, "Deleted vehicle");
        Ok(())
    }
}

/// Body of `POST /api/vehiculos`. A `codigovehic` key, if sent, is ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateVehicleInput {
    #[serde(rename = "nombre")]
    #[schema(example = "Camioneta Andina")]
    pub name: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "urlimagen")]
    pub image_url: Option<String>,
    #[serde(rename = "estado", default, deserialize_with = "deserialize_loose_estado")]
    #[schema(value_type = Option<bool>)]
    pub active: Option<bool>,
    #[serde(rename = "idcategoria")]
    pub category_id: Option<Uuid>,
    #[serde(rename = "idsubcategoria")]
    pub subcategory_id: Option<Uuid>,
    #[serde(rename = "idmarca")]
    pub brand_id: Option<Uuid>,
    pub stock: Option<i32>,
}

/// Body of `PUT /api/vehiculos/{id}`; only present keys are written.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateVehicleInput {
    /// Never accepted. Present only so the request can be refused.
    #[serde(rename = "codigovehic", default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub code: Option<Value>,
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "urlimagen", default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(rename = "estado", default, deserialize_with = "deserialize_loose_estado")]
    #[schema(value_type = Option<bool>)]
    pub active: Option<bool>,
    #[serde(rename = "idcategoria")]
    pub category_id: Option<Uuid>,
    #[serde(rename = "idsubcategoria")]
    pub subcategory_id: Option<Uuid>,
    #[serde(rename = "idmarca")]
    pub brand_id: Option<Uuid>,
    pub stock: Option<i32>,
}

impl From<CreateVehicleInput> for ItemDraft {
    fn from(input: CreateVehicleInput) -> Self {
        ItemDraft {
            name: input.name,
            description: input.description,
            image_url: input.image_url,
            active: input.active,
            category_id: input.category_id,
            subcategory_id: input.subcategory_id,
            brand_id: input.brand_id,
            stock: input.stock,
        }
    }
}

impl From<UpdateVehicleInput> for ItemPatch {
    fn from(input: UpdateVehicleInput) -> Self {
        ItemPatch {
            code: input.code,
            name: input.name,
            description: input.description,
            image_url: input.image_url,
            active: input.active,
            category_id: input.category_id,
            subcategory_id: input.subcategory_id,
            brand_id: input.brand_id,
            stock: input.stock,
        }
    }
}
