//! Storage and filesystem adapters for the application frontends.

mod fs_templates;
mod fs_zone_writer;

pub use fs_templates::{FsTemplateLoader, BASE_TEMPLATE_FILE};
pub use fs_zone_writer::FsZoneWriter;

#[cfg(feature = "sqlite-store")]
mod sqlite;

#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteStore;
