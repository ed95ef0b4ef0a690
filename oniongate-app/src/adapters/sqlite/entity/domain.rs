//! `SeaORM` entity for the `domains` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "domains")]
/// Database row model for a registered domain.
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub domain_name: String,
    pub zone: String,
    pub onion_address: Option<String>,
    /// 0/1 flag.
    pub public: i32,
    pub created_at: String,
    pub updated_at: String,
    /// 0/1 flag.
    pub dirty: i32,
    pub service_last_online: Option<String>,
    /// 0/1 flag.
    pub service_online: i32,
    /// 0/1 soft-delete flag.
    pub deleted: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::record::Entity")]
    Record,
}

impl Related<super::record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Record.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
