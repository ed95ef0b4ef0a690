use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ZoneSerial::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ZoneSerial::Zone)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ZoneSerial::Serial).big_integer().not_null())
                    .col(ColumnDef::new(ZoneSerial::PublishedAt).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ZoneSerial::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ZoneSerial {
    #[sea_orm(iden = "zone_serials")]
    Table,
    Zone,
    Serial,
    PublishedAt,
}
