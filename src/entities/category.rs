use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "categorias")]
#[schema(as = Categoria)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "idcategoria")]
    #[serde(rename = "idcategoria")]
    pub id: Uuid,

    #[sea_orm(column_name = "nombre")]
    #[serde(rename = "nombre")]
    pub name: String,

    #[sea_orm(column_name = "descripcion", column_type = "Text", nullable)]
    #[serde(rename = "descripcion")]
    pub description: Option<String>,

    #[sea_orm(column_name = "estado")]
    #[serde(rename = "estado")]
    pub active: bool,

    #[sea_orm(column_name = "creado_en")]
    #[serde(rename = "creado_en")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subcategory::Entity")]
    Subcategories,
}

impl Related<super::subcategory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
