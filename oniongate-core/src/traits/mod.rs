//! Storage layer abstraction trait definition

mod domain_repository;
mod in_memory_registry;
mod proxy_repository;
mod zone_source;

pub use domain_repository::{DomainRepository, RecordRepository};
pub use in_memory_registry::InMemoryRegistry;
pub use proxy_repository::ProxyRepository;
pub use zone_source::{ZoneSnapshotSource, ZoneWriter};
