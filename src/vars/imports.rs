//! Import resolution: loads imported documents depth-first and merges their
//! variables into one table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ResolveOptions;
use crate::error::{ResolveWarning, Result, SceneError};
use crate::gfx::scene::document::{MaterialsSection, VarsSection};
use crate::vars::constants::ConstantTable;
use crate::vars::loader::{load_with_timeout, resolve_import_path, DocumentLoader, PendingLoad};

/// A `materials` section together with the document that declared it
#[derive(Debug, Clone)]
pub struct MaterialDeclarations {
    pub origin: PathBuf,
    pub section: MaterialsSection,
}

/// Result of merging a document with everything it imports
#[derive(Debug, Default)]
pub struct MergedVars {
    pub constants: ConstantTable,
    /// Material sections in processing order, imports before importers
    pub materials: Vec<MaterialDeclarations>,
    /// Collision warnings in processing order
    pub warnings: Vec<ResolveWarning>,
}

/// Walks the import graph of one root document.
///
/// Imports are processed in listed order. Each imported document has its own
/// imports merged first, then its constants. The root's constants are merged
/// last. Documents on the current import stack may not be imported again.
pub struct ImportResolver<'a> {
    loader: Arc<dyn DocumentLoader>,
    options: &'a ResolveOptions,
    stack: Vec<PathBuf>,
    merged: MergedVars,
}

impl<'a> ImportResolver<'a> {
    pub fn new(loader: Arc<dyn DocumentLoader>, options: &'a ResolveOptions) -> Self {
        Self {
            loader,
            options,
            stack: Vec::new(),
            merged: MergedVars::default(),
        }
    }

    /// Resolves `vars` (declared by the document at `origin`) and its imports
    pub fn resolve(mut self, vars: VarsSection, origin: &Path) -> Result<MergedVars> {
        self.visit(vars, origin.to_path_buf())?;
        log::debug!(
            "merged {} constants and {} material sections",
            self.merged.constants.len(),
            self.merged.materials.len()
        );
        Ok(self.merged)
    }

    fn visit(&mut self, vars: VarsSection, origin: PathBuf) -> Result<()> {
        self.options.cancel.check()?;
        self.stack.push(origin.clone());

        let VarsSection {
            constants,
            imports,
            materials,
        } = vars;

        let targets: Vec<PathBuf> = imports
            .iter()
            .map(|import| resolve_import_path(&origin, import))
            .collect();

        let prefetched = self.prefetch(&targets)?;

        for (target, pending) in targets.into_iter().zip(prefetched) {
            self.options.cancel.check()?;

            if let Some(start) = self.stack.iter().position(|doc| *doc == target) {
                let mut cycle = self.stack[start..].to_vec();
                cycle.push(target);
                return Err(SceneError::CyclicImport { cycle });
            }

            let text = match pending {
                Some(load) => load.wait(self.options.load_timeout)?,
                None => load_with_timeout(&self.loader, &target, self.options.load_timeout)?,
            };
            let fragment: VarsSection =
                serde_json::from_str(&text).map_err(|source| SceneError::Parse {
                    path: target.clone(),
                    source,
                })?;

            log::debug!("importing {} into {}", target.display(), origin.display());
            self.visit(fragment, target)?;
        }

        let own = ConstantTable::from_declarations(&constants, &origin)?;
        let collisions = self.merged.constants.merge(own);
        self.merged
            .warnings
            .extend(collisions.into_iter().map(ResolveWarning::ConstantCollision));

        if !materials.is_empty() {
            self.merged.materials.push(MaterialDeclarations {
                origin: origin.clone(),
                section: materials,
            });
        }

        self.stack.pop();
        Ok(())
    }

    /// Starts background loads for the direct imports of a document.
    ///
    /// Imports that would close a cycle are not fetched; they are rejected
    /// when their turn comes so errors keep declaration order.
    fn prefetch(&self, targets: &[PathBuf]) -> Result<Vec<Option<PendingLoad>>> {
        if !self.options.concurrent_loads {
            return Ok(targets.iter().map(|_| None).collect());
        }

        targets
            .iter()
            .map(|target| {
                if self.stack.contains(target) {
                    Ok(None)
                } else {
                    PendingLoad::spawn(Arc::clone(&self.loader), target.clone()).map(Some)
                }
            })
            .collect()
    }
}
