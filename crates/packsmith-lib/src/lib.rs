//! CurseForge modpack to MultiMC instance conversion.
//!
//! The entry point is [`game::installer::core::modpack_installer::extract_modpack`],
//! which runs the whole pipeline for one archive.

pub mod error;
pub mod game;

pub use error::{ModpackError, Result};
