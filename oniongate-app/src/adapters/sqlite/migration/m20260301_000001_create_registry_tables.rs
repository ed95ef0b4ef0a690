use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // domains
        manager
            .create_table(
                Table::create()
                    .table(Domain::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Domain::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Domain::DomainName).string_len(255).not_null())
                    .col(ColumnDef::new(Domain::Zone).string_len(255).not_null())
                    .col(ColumnDef::new(Domain::OnionAddress).string_len(80).null())
                    .col(ColumnDef::new(Domain::Public).integer().not_null().default(1))
                    .col(ColumnDef::new(Domain::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Domain::UpdatedAt).string().not_null())
                    .col(ColumnDef::new(Domain::Dirty).integer().not_null().default(1))
                    .col(ColumnDef::new(Domain::ServiceLastOnline).string().null())
                    .col(
                        ColumnDef::new(Domain::ServiceOnline)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Domain::Deleted).integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        // Names are unique among live rows only; soft-deleted names may be registered again.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_domains_live_name \
                 ON domains (domain_name) WHERE deleted = 0",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_domains_zone")
                    .table(Domain::Table)
                    .col(Domain::Zone)
                    .to_owned(),
            )
            .await?;

        // records
        manager
            .create_table(
                Table::create()
                    .table(Record::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Record::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Record::DomainId).big_integer().not_null())
                    .col(ColumnDef::new(Record::Label).string_len(255).not_null())
                    .col(ColumnDef::new(Record::Ttl).big_integer().null())
                    .col(ColumnDef::new(Record::RecordType).string_len(10).not_null())
                    .col(ColumnDef::new(Record::Value).text().not_null())
                    .col(ColumnDef::new(Record::IsOnionMapping).string_len(80).null())
                    .col(ColumnDef::new(Record::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Record::Dirty).integer().not_null().default(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_records_domain")
                            .from(Record::Table, Record::DomainId)
                            .to(Domain::Table, Domain::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_records_domain")
                    .table(Record::Table)
                    .col(Record::DomainId)
                    .to_owned(),
            )
            .await?;

        // proxies
        manager
            .create_table(
                Table::create()
                    .table(Proxy::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Proxy::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Proxy::IpAddress)
                            .string_len(45)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Proxy::IpType).integer().not_null())
                    .col(ColumnDef::new(Proxy::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Proxy::LastChecked).string().null())
                    .col(ColumnDef::new(Proxy::LastSuccessfulCheck).string().null())
                    .col(ColumnDef::new(Proxy::Online).integer().not_null().default(0))
                    .col(ColumnDef::new(Proxy::Dirty).integer().not_null().default(1))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Proxy::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Record::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domain::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Domain {
    #[sea_orm(iden = "domains")]
    Table,
    Id,
    DomainName,
    Zone,
    OnionAddress,
    Public,
    CreatedAt,
    UpdatedAt,
    Dirty,
    ServiceLastOnline,
    ServiceOnline,
    Deleted,
}

#[derive(DeriveIden)]
enum Record {
    #[sea_orm(iden = "records")]
    Table,
    Id,
    DomainId,
    Label,
    Ttl,
    RecordType,
    Value,
    IsOnionMapping,
    CreatedAt,
    Dirty,
}

#[derive(DeriveIden)]
enum Proxy {
    #[sea_orm(iden = "proxies")]
    Table,
    Id,
    IpAddress,
    IpType,
    CreatedAt,
    LastChecked,
    LastSuccessfulCheck,
    Online,
    Dirty,
}
