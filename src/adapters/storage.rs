use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes output files below a base directory. Existing files are
/// overwritten.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(display_path(&full_path))
    }
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_directory_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        tokio_test::block_on(async {
            storage
                .write_file("Templates/a.json", b"{\"v\":1}")
                .await
                .unwrap();
            let stored = storage
                .write_file("Templates/a.json", b"{\"v\":2}")
                .await
                .unwrap();
            assert!(stored.ends_with("a.json"));
            let data = storage.read_file("Templates/a.json").await.unwrap();
            assert_eq!(data, b"{\"v\":2}");
        });
    }

    #[test]
    fn test_relative_base_is_shown_without_dot_prefix() {
        assert_eq!(
            display_path(Path::new("./Uploaded_plans/x.json")),
            Path::new("Uploaded_plans/x.json").display().to_string()
        );
    }
}
