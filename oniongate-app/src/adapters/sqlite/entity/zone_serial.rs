//! `SeaORM` entity for the `zone_serials` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "zone_serials")]
/// Last published SOA serial of one zone.
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub zone: String,
    pub serial: i64,
    pub published_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
