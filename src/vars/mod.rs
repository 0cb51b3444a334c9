//! # Scene Variables
//!
//! Constants and imports. Every document may declare constants and import
//! other documents; the [`ImportResolver`] walks the import graph and merges
//! all declarations into a single [`ConstantTable`].

pub mod constants;
pub mod imports;
pub mod loader;

pub use constants::ConstantTable;
pub use imports::{ImportResolver, MaterialDeclarations, MergedVars};
pub use loader::{DocumentLoader, FsLoader, MemoryLoader};
