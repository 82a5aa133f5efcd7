use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A catalog product. `code` is generated once at creation and never rewritten.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "productos")]
#[schema(as = Producto)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "idproducto")]
    #[serde(rename = "idproducto")]
    pub id: Uuid,

    #[sea_orm(column_name = "codigoprod", unique)]
    #[serde(rename = "codigoprod")]
    #[schema(example = "TAAMMA-1")]
    pub code: String,

    #[sea_orm(column_name = "nombre")]
    #[serde(rename = "nombre")]
    pub name: String,

    #[sea_orm(column_name = "descripcion", column_type = "Text")]
    #[serde(rename = "descripcion")]
    pub description: String,

    #[sea_orm(column_name = "urlimagen", nullable)]
    #[serde(rename = "urlimagen")]
    pub image_url: Option<String>,

    #[sea_orm(column_name = "estado")]
    #[serde(rename = "estado")]
    pub active: bool,

    #[sea_orm(column_name = "idcategoria")]
    #[serde(rename = "idcategoria")]
    pub category_id: Uuid,

    #[sea_orm(column_name = "idsubcategoria")]
    #[serde(rename = "idsubcategoria")]
    pub subcategory_id: Uuid,

    #[sea_orm(column_name = "idmarca")]
    #[serde(rename = "idmarca")]
    pub brand_id: Uuid,

    pub stock: i32,

    #[sea_orm(column_name = "creado_en")]
    #[serde(rename = "creado_en")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id"
    )]
    Brand,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
