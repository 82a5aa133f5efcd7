use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "subcategorias")]
#[schema(as = Subcategoria)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "idsubcategoria")]
    #[serde(rename = "idsubcategoria")]
    pub id: Uuid,

    #[sea_orm(column_name = "nombre")]
    #[serde(rename = "nombre")]
    pub name: String,

    #[sea_orm(column_name = "descripcion", column_type = "Text", nullable)]
    #[serde(rename = "descripcion")]
    pub description: Option<String>,

    #[sea_orm(column_name = "idcategoria", nullable)]
    #[serde(rename = "idcategoria")]
    pub category_id: Option<Uuid>,

    #[sea_orm(column_name = "estado")]
    #[serde(rename = "estado")]
    pub active: bool,

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
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
