//! OnionGate Core Library
//!
//! Zone synthesis and domain ownership for a resolver that maps DNS names to onion
//! services through a pool of entry proxies:
//! - Validation of domain names, onion addresses and proxy addresses
//! - Domain / record / proxy registry traits and an in-memory registry
//! - HS256 ownership tokens scoped to one domain
//! - Zone-file synthesis from seed templates and registry snapshots
//!
//! Storage is abstracted through traits; the application crate provides `SQLite`.

pub mod auth;
pub mod config;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;
pub mod validation;
pub mod zone;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use auth::TokenSigner;
pub use config::{ResolverConfig, SerialPolicy};
pub use error::{CoreError, CoreResult};
pub use services::ServiceContext;
pub use traits::{
    DomainRepository, InMemoryRegistry, ProxyRepository, RecordRepository, ZoneSnapshotSource,
    ZoneWriter,
};
