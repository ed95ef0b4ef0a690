//! `SeaORM` entity for the `proxies` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "proxies")]
/// Database row model for an entry proxy.
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub ip_address: String,
    /// 4 or 6.
    pub ip_type: i32,
    pub created_at: String,
    pub last_checked: Option<String>,
    pub last_successful_check: Option<String>,
    /// 0/1 flag.
    pub online: i32,
    /// 0/1 flag.
    pub dirty: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
