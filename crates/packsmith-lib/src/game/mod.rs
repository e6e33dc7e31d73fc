pub mod installer;
pub mod modpack;

// Re-export commonly used types
pub use installer::core::modpack_installer::{extract_modpack, ExtractReport};
pub use installer::types::{ExtractSpec, ProgressReporter, Severity};
pub use modpack::{CurseForgeManifest, FileReference, LoaderSelection};
