//! Store operations shared by products and vehicles.
//!
//! Both tables have the same shape and differ only in their code column and
//! their messages, so the column handles are supplied by [`CodedItem`] and the
//! rows are written through `ActiveModelTrait::set`.

use crate::{
    common::{non_blank_name, normalize_name},
    entities::{product, vehicle},
    errors::ServiceError,
    services::code_generator::{insert_with_generated_code, CodeInput, CodedEntity},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Value as DbValue,
};
use serde_json::Value;
use uuid::Uuid;

/// Column handles of a coded item table.
#[derive(Clone, Copy, Debug)]
pub struct ItemColumns<C> {
    pub id: C,
    pub code: C,
    pub name: C,
    pub description: C,
    pub image_url: C,
    pub active: C,
    pub category_id: C,
    pub subcategory_id: C,
    pub brand_id: C,
    pub stock: C,
    pub created_at: C,
}

/// A catalog table whose rows carry a generated code.
pub trait CodedItem: CodedEntity {
    /// Capitalized label used in not-found messages.
    const LABEL: &'static str;
    const NAME_REQUIRED: &'static str;
    const CODE_IMMUTABLE: &'static str;
    /// Message for a create without `stock`, or `None` when stock defaults to 0.
    const STOCK_REQUIRED: Option<&'static str>;

    fn columns() -> ItemColumns<Self::Column>;
}

impl CodedItem for product::Entity {
    const LABEL: &'static str = "Producto";
    const NAME_REQUIRED: &'static str = "El nombre es obligatorio.";
    const CODE_IMMUTABLE: &'static str =
        "El código del producto (codigoprod) no se puede modificar.";
    const STOCK_REQUIRED: Option<&'static str> = None;

    fn columns() -> ItemColumns<Self::Column> {
        use product::Column;
        ItemColumns {
            id: Column::Id,
            code: Column::Code,
            name: Column::Name,
            description: Column::Description,
            image_url: Column::ImageUrl,
            active: Column::Active,
            category_id: Column::CategoryId,
            subcategory_id: Column::SubcategoryId,
            brand_id: Column::BrandId,
            stock: Column::Stock,
            created_at: Column::CreatedAt,
        }
    }
}

impl CodedItem for vehicle::Entity {
    const LABEL: &'static str = "Vehículo";
    const NAME_REQUIRED: &'static str = "El nombre del vehículo es obligatorio.";
    const CODE_IMMUTABLE: &'static str =
        "El código del vehículo (codigovehic) no se puede modificar.";
    const STOCK_REQUIRED: Option<&'static str> = Some("El stock del vehículo es obligatorio.");

    fn columns() -> ItemColumns<Self::Column> {
        use vehicle::Column;
        ItemColumns {
            id: Column::Id,
            code: Column::Code,
            name: Column::Name,
            description: Column::Description,
            image_url: Column::ImageUrl,
            active: Column::Active,
            category_id: Column::CategoryId,
            subcategory_id: Column::SubcategoryId,
            brand_id: Column::BrandId,
            stock: Column::Stock,
            created_at: Column::CreatedAt,
        }
    }
}

/// Create body after deserialization, before validation.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub stock: Option<i32>,
}

/// Update body; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    /// Any value here, `null` included, refuses the update.
    pub code: Option<Value>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<Option<String>>,
    pub active: Option<bool>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub stock: Option<i32>,
}

fn check_stock(stock: i32) -> Result<(), ServiceError> {
    if stock < 0 {
        return Err(ServiceError::ValidationError(
            "El stock no puede ser negativo.".into(),
        ));
    }
    Ok(())
}

fn not_found<E: CodedItem>(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("{} {} no encontrado", E::LABEL, id))
}

pub async fn list_items<E, C>(db: &C) -> Result<Vec<E::Model>, ServiceError>
where
    E: CodedItem,
    C: ConnectionTrait,
{
    let cols = E::columns();
    Ok(E::find()
        .order_by_asc(cols.created_at)
        .order_by_asc(cols.code)
        .all(db)
        .await?)
}

pub async fn find_item<E, C>(db: &C, id: Uuid) -> Result<E::Model, ServiceError>
where
    E: CodedItem,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::columns().id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| not_found::<E>(id))
}

/// Validates `draft`, then inserts it under a freshly generated code.
///
/// A missing name wins over missing references, which win over a missing stock.
pub async fn create_item<E, C>(
    db: &C,
    draft: ItemDraft,
    max_code_attempts: u32,
) -> Result<E::Model, ServiceError>
where
    E: CodedItem,
    E::ActiveModel: Send + 'static,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: ConnectionTrait,
{
    let name = non_blank_name(draft.name.as_deref())
        .ok_or_else(|| ServiceError::ValidationError(E::NAME_REQUIRED.into()))?;

    let (category_id, subcategory_id, brand_id) =
        match (draft.category_id, draft.subcategory_id, draft.brand_id) {
            (Some(c), Some(s), Some(b)) => (c, s, b),
            _ => {
                return Err(ServiceError::ValidationError(
                    "Categoría, subcategoría y marca son obligatorias.".into(),
                ))
            }
        };

    let stock = match (draft.stock, E::STOCK_REQUIRED) {
        (Some(stock), _) => stock,
        (None, Some(message)) => return Err(ServiceError::ValidationError(message.into())),
        (None, None) => 0,
    };
    check_stock(stock)?;

    // Everything but the code is fixed across retries. The code slot is
    // type-checked here so the per-attempt `set` below cannot fail.
    let cols = E::columns();
    let mut template = <E::ActiveModel as ActiveModelTrait>::default();
    template.try_set(cols.id, Uuid::new_v4().into())?;
    template.try_set(cols.code, DbValue::from(String::new()))?;
    template.try_set(cols.name, name.clone().into())?;
    template.try_set(cols.description, draft.description.unwrap_or_default().into())?;
    template.try_set(cols.image_url, draft.image_url.into())?;
    template.try_set(cols.active, draft.active.unwrap_or(true).into())?;
    template.try_set(cols.category_id, category_id.into())?;
    template.try_set(cols.subcategory_id, subcategory_id.into())?;
    template.try_set(cols.brand_id, brand_id.into())?;
    template.try_set(cols.stock, stock.into())?;
    template.try_set(cols.created_at, Utc::now().into())?;

    insert_with_generated_code(
        db,
        CodeInput {
            name: &name,
            category_id,
            brand_id,
        },
        max_code_attempts,
        |code| {
            let mut row = template.clone();
            row.set(cols.code, code.into());
            row
        },
    )
    .await
}

/// Applies the present fields of `patch`. A patch naming the code column is
/// refused before the row is read.
pub async fn update_item<E, C>(db: &C, id: Uuid, patch: ItemPatch) -> Result<E::Model, ServiceError>
where
    E: CodedItem,
    E::ActiveModel: Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: ConnectionTrait,
{
    if patch.code.is_some() {
        return Err(ServiceError::ValidationError(E::CODE_IMMUTABLE.into()));
    }
    if let Some(stock) = patch.stock {
        check_stock(stock)?;
    }

    let existing = find_item::<E, C>(db, id).await?;
    let cols = E::columns();
    let mut row = existing.clone().into_active_model();

    if let Some(raw) = patch.name.as_deref() {
        let name = normalize_name(raw);
        if name.is_empty() {
            return Err(ServiceError::ValidationError(E::NAME_REQUIRED.into()));
        }
        row.try_set(cols.name, name.into())?;
    }
    if let Some(description) = patch.description {
        row.try_set(cols.description, description.into())?;
    }
    if let Some(image_url) = patch.image_url {
        row.try_set(cols.image_url, image_url.into())?;
    }
    if let Some(estado) = patch.active {
        row.try_set(cols.active, estado.into())?;
    }
    if let Some(category_id) = patch.category_id {
        row.try_set(cols.category_id, category_id.into())?;
    }
    if let Some(subcategory_id) = patch.subcategory_id {
        row.try_set(cols.subcategory_id, subcategory_id.into())?;
    }
    if let Some(brand_id) = patch.brand_id {
        row.try_set(cols.brand_id, brand_id.into())?;
    }
    if let Some(stock) = patch.stock {
        row.try_set(cols.stock, stock.into())?;
    }

    if !row.is_changed() {
        return Ok(existing);
    }
    Ok(row.update(db).await?)
}

pub async fn set_item_active<E, C>(db: &C, id: Uuid, estado: bool) -> Result<E::Model, ServiceError>
where
    E: CodedItem,
    E::ActiveModel: Send,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: ConnectionTrait,
{
    let mut row = find_item::<E, C>(db, id).await?.into_active_model();
    row.try_set(E::columns().active, estado.into())?;
    Ok(row.update(db).await?)
}

pub async fn delete_item<E, C>(db: &C, id: Uuid) -> Result<(), ServiceError>
where
    E: CodedItem,
    C: ConnectionTrait,
{
    let result = E::delete_many()
        .filter(E::columns().id.eq(id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(not_found::<E>(id));
    }
    Ok(())
}
