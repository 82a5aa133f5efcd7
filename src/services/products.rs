use crate::{
    common::{deserialize_loose_estado, deserialize_present},
    entities::product,
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

/// Product catalog service. Codes (`codigoprod`) are issued here and never changed.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    max_code_attempts: u32,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, max_code_attempts: u32) -> Self {
        Self {
            db,
            max_code_attempts,
        }
    }

    /// All products, oldest first
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        list_items::<product::Entity, _>(&*self.db).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        find_item::<product::Entity, _>(&*self.db, id).await
    }

    /// Validates, normalizes and inserts a product under a freshly generated code.
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateProductInput) -> Result<product::Model, ServiceError> {
        let created =
            create_item::<product::Entity, _>(&*self.db, input.into(), self.max_code_attempts)
                .await?;
        info!(product_id = %created.id, code = %created.code, "Created product");
        Ok(created)
    }

    /// Partial update. Any attempt to send `codigoprod` is refused before touching the store.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        update_item::<product::Entity, _>(&*self.db, id, input.into()).await
    }

    #[instrument(skip(self))]
    pub async fn set_active(&self, id: Uuid, estado: bool) -> Result<product::Model, ServiceError> {
        let updated = set_item_active::<product::Entity, _>(&*self.db, id, estado).await?;
        info!(product_id = %id, estado, "Changed product state");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_item::<product::Entity, _>(&*self.db, id).await?;
        info!(product_id = %id, "Deleted product");
        Ok(())
    }
}

/// Body of `POST /api/productos`. A `codigoprod` key, if sent, is ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductInput {
    #[serde(rename = "nombre")]
    #[schema(example = "Taladro Andino")]
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

/// Body of `PUT /api/productos/{id}`; only present keys are written.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProductInput {
    /// Never accepted. Present only so the request can be refused.
    #[serde(rename = "codigoprod", default, deserialize_with = "deserialize_present")]
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

impl From<CreateProductInput> for ItemDraft {
    fn from(input: CreateProductInput) -> Self {
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

impl From<UpdateProductInput> for ItemPatch {
    fn from(input: UpdateProductInput) -> Self {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::migrated_memory_pool,
        services::{brands::BrandService, categories::CategoryService},
    };
    use assert_matches::assert_matches;
    use serde_json::json;

    struct Fixture {
        products: ProductService,
        category_id: Uuid,
        brand_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(migrated_memory_pool().await);
        let category = CategoryService::new(db.clone())
            .create(serde_json::from_value(json!({"nombre": "Ambientes"})).unwrap())
            .await
            .unwrap();
        let brand = BrandService::new(db.clone())
            .create(serde_json::from_value(json!({"nombre": "Makita"})).unwrap())
            .await
            .unwrap();
        Fixture {
            products: ProductService::new(db, 5),
            category_id: category.id,
            brand_id: brand.id,
        }
    }

    fn body(f: &Fixture, extra: Value) -> CreateProductInput {
        let mut base = json!({
            "nombre": "Taladro Andino",
            "idcategoria": f.category_id,
            "idsubcategoria": Uuid::new_v4(),
            "idmarca": f.brand_id,
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[tokio::test]
    async fn create_issues_taamma_codes_in_sequence() {
        let f = fixture().await;

        let first = f.products.create(body(&f, json!({}))).await.unwrap();
        assert_eq!(first.code, "TAAMMA-1");
        assert_eq!(first.name, "TALADRO ANDINO");
        assert_eq!(first.description, "");
        assert_eq!(first.image_url, None);
        assert_eq!(first.stock, 0);
        assert!(first.active);

        let second = f
            .products
            .create(body(&f, json!({"nombre": "tabla", "stock": 4})))
            .await
            .unwrap();
        assert_eq!(second.code, "TAAMMA-2");
        assert_eq!(second.stock, 4);
    }

    #[tokio::test]
    async fn client_supplied_code_is_discarded() {
        let f = fixture().await;
        let created = f
            .products
            .create(body(&f, json!({"codigoprod": "HACK-99"})))
            .await
            .unwrap();
        assert_eq!(created.code, "TAAMMA-1");
    }

    #[tokio::test]
    async fn create_validates_required_fields() {
        let f = fixture().await;

        assert_matches!(
            f.products.create(body(&f, json!({"nombre": null}))).await,
            Err(ServiceError::ValidationError(msg)) if msg == "El nombre es obligatorio."
        );
        assert_matches!(
            f.products.create(body(&f, json!({"idmarca": null}))).await,
            Err(ServiceError::ValidationError(msg))
                if msg == "Categoría, subcategoría y marca son obligatorias."
        );
        assert_matches!(
            f.products.create(body(&f, json!({"stock": -1}))).await,
            Err(ServiceError::ValidationError(_))
        );
        assert!(f.products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_brand_aborts_before_insert() {
        let f = fixture().await;
        let err = f
            .products
            .create(body(&f, json!({"idmarca": Uuid::new_v4()})))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::LookupFailure(_));
        assert!(f.products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_refuses_code_even_when_null() {
        let f = fixture().await;
        let created = f.products.create(body(&f, json!({}))).await.unwrap();

        for code in [json!("OTRO-1"), Value::Null] {
            let input: UpdateProductInput =
                serde_json::from_value(json!({ "codigoprod": code, "stock": 3 })).unwrap();
            assert_matches!(
                f.products.update(created.id, input).await,
                Err(ServiceError::ValidationError(msg))
                    if msg == "El código del producto (codigoprod) no se puede modificar."
            );
        }
        assert_eq!(f.products.get(created.id).await.unwrap(), created);

        // Refused before the row is even looked up.
        let input: UpdateProductInput =
            serde_json::from_value(json!({ "codigoprod": "X" })).unwrap();
        assert_matches!(
            f.products.update(Uuid::new_v4(), input).await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn update_patches_only_present_fields() {
        let f = fixture().await;
        let created = f
            .products
            .create(body(&f, json!({"urlimagen": "http://img/1.png", "descripcion": "18V"})))
            .await
            .unwrap();

        let updated = f
            .products
            .update(
                created.id,
                serde_json::from_value(json!({"nombre": " martillo ", "stock": 12})).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "MARTILLO");
        assert_eq!(updated.stock, 12);
        assert_eq!(updated.description, "18V");
        assert_eq!(updated.image_url.as_deref(), Some("http://img/1.png"));
        assert_eq!(updated.code, "TAAMMA-1");

        let cleared = f
            .products
            .update(
                created.id,
                serde_json::from_value(json!({"urlimagen": null})).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(cleared.image_url, None);
    }

    #[tokio::test]
    async fn deleting_a_middle_code_leaves_a_gap() {
        let f = fixture().await;
        let mut codes = Vec::new();
        for _ in 0..3 {
            codes.push(f.products.create(body(&f, json!({}))).await.unwrap());
        }
        f.products.delete(codes[1].id).await.unwrap();

        let next = f.products.create(body(&f, json!({}))).await.unwrap();
        assert_eq!(next.code, "TAAMMA-4");

        let listed: Vec<String> = f
            .products
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.code)
            .collect();
        assert_eq!(listed, vec!["TAAMMA-1", "TAAMMA-3", "TAAMMA-4"]);
    }

    #[tokio::test]
    async fn state_change_round_trip() {
        let f = fixture().await;
        let created = f.products.create(body(&f, json!({}))).await.unwrap();
        assert!(!f.products.set_active(created.id, false).await.unwrap().active);
        assert!(f.products.set_active(created.id, true).await.unwrap().active);
        assert_matches!(
            f.products.set_active(Uuid::new_v4(), true).await,
            Err(ServiceError::NotFound(_))
        );
    }
}
