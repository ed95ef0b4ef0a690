//! Zone files written to a directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use oniongate_core::error::{CoreError, CoreResult};
use oniongate_core::traits::ZoneWriter;
use oniongate_core::zone::ZoneFile;

/// Lowercased zone name, rejected if it could escape the target directory.
pub(crate) fn checked_zone_name(zone: &str) -> CoreResult<String> {
    let name = zone.trim_end_matches('.').to_lowercase();
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.contains("..")
    {
        return Err(CoreError::ValidationError(format!(
            "'{zone}' cannot be used as a zone file name"
        )));
    }
    Ok(name)
}

/// Writes `<dir>/<zone>.zone`, replacing any previous file atomically.
#[derive(Debug, Clone)]
pub struct FsZoneWriter {
    dir: PathBuf,
}

impl FsZoneWriter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the zone is written to.
    pub fn zone_path(&self, zone: &str) -> CoreResult<PathBuf> {
        Ok(self.dir.join(format!("{}.zone", checked_zone_name(zone)?)))
    }
}

#[async_trait]
impl ZoneWriter for FsZoneWriter {
    async fn write_zone(&self, zone: &ZoneFile) -> CoreResult<()> {
        let path = self.zone_path(&zone.zone)?;
        let tmp = path.with_extension("zone.tmp");

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CoreError::IoError(format!("Failed to create {}: {e}", self.dir.display()))
        })?;
        tokio::fs::write(&tmp, zone.text.as_bytes())
            .await
            .map_err(|e| CoreError::IoError(format!("Failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            CoreError::IoError(format!("Failed to replace {}: {e}", path.display()))
        })?;

        log::debug!(
            "Wrote zone {} (serial {}) to {}",
            zone.zone,
            zone.serial,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_replaces_zone_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FsZoneWriter::new(dir.path().join("zones"));

        let mut zone = ZoneFile {
            zone: "oniongate.com".into(),
            serial: 1,
            text: "first".into(),
        };
        writer.write_zone(&zone).await.unwrap();
        zone.text = "second".into();
        writer.write_zone(&zone).await.unwrap();

        let path = dir.path().join("zones").join("oniongate.com.zone");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "second");
        assert!(!dir.path().join("zones").join("oniongate.com.zone.tmp").exists());
    }

    #[test]
    fn zone_names_are_checked() {
        assert_eq!(checked_zone_name("Example.COM.").unwrap(), "example.com");
        assert!(checked_zone_name("a/b").is_err());
        assert!(checked_zone_name("..").is_err());
        assert!(checked_zone_name("").is_err());
    }
}
