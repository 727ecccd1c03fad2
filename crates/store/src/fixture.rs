//! Resource fixture files

use serde::{Deserialize, Serialize};
use shared::Resource;
use std::path::Path;

/// On-disk list of resources
///
/// ```json
/// { "resources": [ { "id": {"area": "town", "x": 0, "y": 0}, "world": "survival", "createdAt": "..." } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceFile {
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl ResourceFile {
    pub fn from_file(path: &Path) -> shared::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_file(&self, path: &Path) -> shared::Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::ResourceId;
    use std::io::Write;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plots.json");
        let file = ResourceFile {
            resources: vec![Resource::new(ResourceId::new("town", 1, 2), "survival", Utc::now())],
        };

        file.to_file(&path).unwrap();
        let loaded = ResourceFile::from_file(&path).unwrap();
        assert_eq!(loaded.resources, file.resources);
    }

    #[test]
    fn test_missing_resources_key_is_empty() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "{{}}").unwrap();
        assert!(ResourceFile::from_file(tmp.path()).unwrap().resources.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "not json").unwrap();
        assert!(matches!(
            ResourceFile::from_file(tmp.path()),
            Err(shared::Error::Json(_))
        ));
    }
}
