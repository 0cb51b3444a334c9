use std::path::Path;
use std::sync::Arc;

use crate::config::ResolveOptions;
use crate::error::{Result, SceneError};
use crate::gfx::scene::document::SceneDocument;
use crate::gfx::scene::scene::{assemble, Resolution};
use crate::vars::loader::{load_with_timeout, normalize_path, DocumentLoader, FsLoader};

/// Entry point for drivers: loads a root scene document and resolves it.
///
/// The resolver holds no per-scene state and can resolve any number of
/// documents, each one independently.
pub struct SceneResolver {
    loader: Arc<dyn DocumentLoader>,
    options: ResolveOptions,
}

impl Default for SceneResolver {
    /// Filesystem loader with default options
    fn default() -> Self {
        Self::new(Arc::new(FsLoader::new()), ResolveOptions::default())
    }
}

impl SceneResolver {
    /// Create a resolver reading documents through `loader`
    pub fn new(loader: Arc<dyn DocumentLoader>, options: ResolveOptions) -> Self {
        Self { loader, options }
    }

    /// Builder pattern: Replace the resolution options
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Loads the document at `path` through the loader and resolves it.
    ///
    /// The root load is bounded by the same timeout as imports.
    pub fn resolve_file(&self, path: impl AsRef<Path>) -> Result<Resolution> {
        let origin = normalize_path(path.as_ref());
        log::info!("resolving scene {}", origin.display());

        let text = load_with_timeout(&self.loader, &origin, self.options.load_timeout)?;
        self.resolve_str(&text, &origin)
    }

    /// Parses `text` as a root document located at `origin` and resolves it
    pub fn resolve_str(&self, text: &str, origin: impl AsRef<Path>) -> Result<Resolution> {
        let origin = origin.as_ref();
        let document = SceneDocument::from_json_str(text).map_err(|source| SceneError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        self.resolve_document(document, origin)
    }

    /// Resolves an already parsed root document
    pub fn resolve_document(
        &self,
        document: SceneDocument,
        origin: impl AsRef<Path>,
    ) -> Result<Resolution> {
        assemble(
            document,
            origin.as_ref(),
            Arc::clone(&self.loader),
            &self.options,
        )
    }
}
