use super::BackgroundSource;
use crate::error::{CompositeError, Result};
use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loads backgrounds from image files under a root directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Absolute names are used as-is, anything else is joined to the root
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl BackgroundSource for DirectorySource {
    fn load(&self, name: &str) -> Result<Arc<DynamicImage>> {
        let path = self.resolve(name);
        if !path.is_file() {
            return Err(CompositeError::background_unavailable(
                name,
                format!("no file at {}", path.display()),
            ));
        }

        let image = image::open(&path)
            .map_err(|e| CompositeError::background_unavailable(name, e))?;

        tracing::info!(
            "Loaded background {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Arc::new(image))
    }
}

/// Serves preloaded backgrounds by name
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    images: HashMap<String, Arc<DynamicImage>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, image: DynamicImage) {
        self.images.insert(name.into(), Arc::new(image));
    }

    pub fn with(mut self, name: impl Into<String>, image: DynamicImage) -> Self {
        self.insert(name, image);
        self
    }
}

impl BackgroundSource for MemorySource {
    fn load(&self, name: &str) -> Result<Arc<DynamicImage>> {
        self.images
            .get(name)
            .cloned()
            .ok_or_else(|| CompositeError::background_unavailable(name, "not registered"))
    }
}
