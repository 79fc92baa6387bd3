//! Filesystem persistence for harvested pages

use crate::output::PageRecord;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Writes page content into one directory per site
#[derive(Debug, Clone)]
pub struct PageStore {
    directory: PathBuf,
}

impl PageStore {
    /// Opens `<root>/<site>/`, creating it if absent
    ///
    /// # Arguments
    ///
    /// * `root` - Storage root (e.g. `public`)
    /// * `site` - Site identifier; must be a single path component
    ///
    /// # Returns
    ///
    /// * `Ok(PageStore)` - The directory exists
    /// * `Err(io::Error)` - Invalid site identifier or directory creation failed
    pub async fn create(root: &Path, site: &str) -> io::Result<Self> {
        let mut components = Path::new(site).components();
        let is_single_component = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !is_single_component {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("site identifier '{}' is not a valid directory name", site),
            ));
        }

        let directory = root.join(site);
        tokio::fs::create_dir_all(&directory).await?;
        tracing::debug!("Using output directory {}", directory.display());

        Ok(Self { directory })
    }

    /// Directory pages are written to
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Full path a file name is stored under
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }

    /// Writes a page record, replacing any previous file of the same name
    pub async fn write(&self, record: &PageRecord) -> io::Result<PathBuf> {
        let path = self.path_for(&record.target_filename);
        tokio::fs::write(&path, record.content.as_bytes()).await?;
        Ok(path)
    }
}
