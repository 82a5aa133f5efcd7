use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::{error, info};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_categorias_table::Migration),
            Box::new(m20250101_000002_create_marcas_table::Migration),
            Box::new(m20250101_000003_create_subcategorias_table::Migration),
            Box::new(m20250101_000004_create_productos_table::Migration),
            Box::new(m20250101_000005_create_vehiculos_table::Migration),
        ]
    }
}

mod m20250101_000001_create_categorias_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_categorias_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categorias::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categorias::Idcategoria)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categorias::Nombre).string().not_null())
                        .col(ColumnDef::new(Categorias::Descripcion).text().null())
                        .col(
                            ColumnDef::new(Categorias::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Categorias::CreadoEn)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_categorias_nombre")
                        .table(Categorias::Table)
                        .col(Categorias::Nombre)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Categorias::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Categorias {
        Table,
        Idcategoria,
        Nombre,
        Descripcion,
        Estado,
        CreadoEn,
    }
}

mod m20250101_000002_create_marcas_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_marcas_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Marcas::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Marcas::Idmarca)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Marcas::Nombre).string().not_null())
                        .col(ColumnDef::new(Marcas::Descripcion).text().null())
                        .col(
                            ColumnDef::new(Marcas::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Marcas::CreadoEn)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_marcas_nombre")
                        .table(Marcas::Table)
                        .col(Marcas::Nombre)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Marcas::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Marcas {
        Table,
        Idmarca,
        Nombre,
        Descripcion,
        Estado,
        CreadoEn,
    }
}

mod m20250101_000003_create_subcategorias_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_subcategorias_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Subcategorias::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Subcategorias::Idsubcategoria)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Subcategorias::Nombre).string().not_null())
                        .col(ColumnDef::new(Subcategorias::Descripcion).text().null())
                        .col(ColumnDef::new(Subcategorias::Idcategoria).uuid().null())
                        .col(
                            ColumnDef::new(Subcategorias::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Subcategorias::CreadoEn)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_subcategorias_nombre")
                        .table(Subcategorias::Table)
                        .col(Subcategorias::Nombre)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_subcategorias_idcategoria")
                        .table(Subcategorias::Table)
                        .col(Subcategorias::Idcategoria)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Subcategorias::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Subcategorias {
        Table,
        Idsubcategoria,
        Nombre,
        Descripcion,
        Idcategoria,
        Estado,
        CreadoEn,
    }
}

mod m20250101_000004_create_productos_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_productos_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Productos::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Productos::Idproducto)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Productos::Codigoprod).string().not_null())
                        .col(ColumnDef::new(Productos::Nombre).string().not_null())
                        .col(
                            ColumnDef::new(Productos::Descripcion)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Productos::Urlimagen).string().null())
                        .col(
                            ColumnDef::new(Productos::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Productos::Idcategoria).uuid().not_null())
                        .col(ColumnDef::new(Productos::Idsubcategoria).uuid().not_null())
                        .col(ColumnDef::new(Productos::Idmarca).uuid().not_null())
                        .col(
                            ColumnDef::new(Productos::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Productos::CreadoEn)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Losing side of a concurrent create fails here instead of double-issuing.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_productos_codigoprod")
                        .table(Productos::Table)
                        .col(Productos::Codigoprod)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_productos_creado_en")
                        .table(Productos::Table)
                        .col(Productos::CreadoEn)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Productos::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Productos {
        Table,
        Idproducto,
        Codigoprod,
        Nombre,
        Descripcion,
        Urlimagen,
        Estado,
        Idcategoria,
        Idsubcategoria,
        Idmarca,
        Stock,
        CreadoEn,
    }
}

mod m20250101_000005_create_vehiculos_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_vehiculos_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vehiculos::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vehiculos::Idvehiculo)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Vehiculos::Codigovehic).string().not_null())
                        .col(ColumnDef::new(Vehiculos::Nombre).string().not_null())
                        .col(
                            ColumnDef::new(Vehiculos::Descripcion)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Vehiculos::Urlimagen).string().null())
                        .col(
                            ColumnDef::new(Vehiculos::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Vehiculos::Idcategoria).uuid().not_null())
                        .col(ColumnDef::new(Vehiculos::Idsubcategoria).uuid().not_null())
                        .col(ColumnDef::new(Vehiculos::Idmarca).uuid().not_null())
                        .col(ColumnDef::new(Vehiculos::Stock).integer().not_null())
                        .col(
                            ColumnDef::new(Vehiculos::CreadoEn)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_vehiculos_codigovehic")
                        .table(Vehiculos::Table)
                        .col(Vehiculos::Codigovehic)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vehiculos_creado_en")
                        .table(Vehiculos::Table)
                        .col(Vehiculos::CreadoEn)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vehiculos::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Vehiculos {
        Table,
        Idvehiculo,
        Codigovehic,
        Nombre,
        Descripcion,
        Urlimagen,
        Estado,
        Idcategoria,
        Idsubcategoria,
        Idmarca,
        Stock,
        CreadoEn,
    }
}

/// Connects to `db_url` and applies pending migrations (all of them when
/// `steps` is `None`)
pub async fn run_migration(db_url: &str, steps: Option<u32>) -> Result<()> {
    info!("Setting up database connection for migrations");

    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(2)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;

    info!("Running database migrations");

    match Migrator::up(&db, steps).await {
        Ok(_) => {
            info!("Migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Migration failed: {}", e);
            Err(e.into())
        }
    }
}
