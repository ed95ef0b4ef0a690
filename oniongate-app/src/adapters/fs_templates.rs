//! Seed templates read from a directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use oniongate_core::error::{CoreError, CoreResult};
use oniongate_core::zone::{TemplateKind, ZoneTemplateLoader};

use super::fs_zone_writer::checked_zone_name;

/// File name of the template shared by every zone.
pub const BASE_TEMPLATE_FILE: &str = "base_zone.j2";

/// Loads `base_zone.j2` and `<zone>.zone.j2` from one directory.
///
/// A missing file is reported as an absent fragment, not an error.
#[derive(Debug, Clone)]
pub struct FsTemplateLoader {
    dir: PathBuf,
}

impl FsTemplateLoader {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, zone: &str, kind: TemplateKind) -> CoreResult<PathBuf> {
        Ok(match kind {
            TemplateKind::Base => self.dir.join(BASE_TEMPLATE_FILE),
            TemplateKind::Zone => self
                .dir
                .join(format!("{}.zone.j2", checked_zone_name(zone)?)),
        })
    }
}

#[async_trait]
impl ZoneTemplateLoader for FsTemplateLoader {
    async fn load(&self, zone: &str, kind: TemplateKind) -> CoreResult<Option<String>> {
        let path = self.path_for(zone, kind)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No template at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(CoreError::IoError(format!(
                "Failed to read template {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_files_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FsTemplateLoader::new(dir.path());
        assert_eq!(loader.load("example.com", TemplateKind::Base).await.unwrap(), None);
        assert_eq!(loader.load("example.com", TemplateKind::Zone).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reads_base_and_zone_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(BASE_TEMPLATE_FILE), "base").unwrap();
        std::fs::write(dir.path().join("example.com.zone.j2"), "extra").unwrap();

        let loader = FsTemplateLoader::new(dir.path());
        assert_eq!(
            loader.load("Example.com", TemplateKind::Base).await.unwrap(),
            Some("base".to_string())
        );
        assert_eq!(
            loader.load("Example.com", TemplateKind::Zone).await.unwrap(),
            Some("extra".to_string())
        );
    }

    #[tokio::test]
    async fn path_like_zone_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FsTemplateLoader::new(dir.path());
        let err = loader
            .load("../etc/passwd", TemplateKind::Zone)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}
