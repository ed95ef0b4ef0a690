//! `SeaORM` entities for the registry tables.

pub mod domain;
pub mod proxy;
pub mod record;
pub mod zone_serial;
