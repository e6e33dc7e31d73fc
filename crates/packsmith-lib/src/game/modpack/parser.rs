use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::error::{ModpackError, Result};
use crate::game::installer::types::Severity;
use crate::game::modpack::types::{CurseForgeManifest, LoaderSelection, NO_LOADER_SENTINEL};

/// File name of the CurseForge metadata document inside an unpacked pack.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Resolves the directory the pack is unpacked into and, unless
/// `skip_extract` is set, unzips the archive there.
///
/// The working directory is `work_dir` when given, otherwise the directory
/// that contains the archive.
pub fn prepare_working_dir(
    archive_path: &Path,
    work_dir: Option<&Path>,
    skip_extract: bool,
) -> Result<PathBuf> {
    let dir = match work_dir {
        Some(dir) => dir.to_path_buf(),
        None => archive_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    // `Path::parent` of a bare file name is ""
    let dir = if dir.as_os_str().is_empty() { PathBuf::from(".") } else { dir };

    if skip_extract {
        log::info!("Skipping extraction, using already unpacked files in {:?}", dir);
        return Ok(dir);
    }

    log::info!("Unzipping modpack download");
    let count = extract_archive(archive_path, &dir)?;
    log::info!("Done unzipping ({} files)", count);
    Ok(dir)
}

/// Extracts every entry of the zip at `archive_path` into `destination`,
/// overwriting existing files. Returns the number of files written.
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(|e| ModpackError::io(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ModpackError::archive(archive_path, e))?;
    log::debug!("Archive {:?} contains {} entries", archive_path, archive.len());

    std::fs::create_dir_all(destination).map_err(|e| ModpackError::io(destination, e))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ModpackError::archive(archive_path, e))?;

        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping archive entry with unsafe path: {}", entry.name());
            continue;
        };
        let outpath = destination.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| ModpackError::io(&outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModpackError::io(parent, e))?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| ModpackError::io(&outpath, e))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| ModpackError::io(&outpath, e))?;
        written += 1;
    }

    Ok(written)
}

/// Reads and decodes `<dir>/manifest.json`.
pub async fn load_manifest(dir: &Path) -> Result<CurseForgeManifest> {
    log::info!("Parsing manifest");
    let path = dir.join(MANIFEST_FILE_NAME);
    if !path.is_file() {
        return Err(ModpackError::ManifestNotFound(path));
    }

    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ModpackError::io(&path, e))?;
    let manifest: CurseForgeManifest = serde_json::from_str(&content)
        .map_err(|source| ModpackError::ManifestMalformed { path: path.clone(), source })?;

    log::info!(
        "Required Minecraft version: {}",
        manifest.minecraft_version().unwrap_or("unknown")
    );
    Ok(manifest)
}

/// Picks the loader the instance is built for.
///
/// The first non-empty loader id is canonical. A manifest without any usable
/// id is rejected; several ids only produce a warning.
pub fn select_loader(manifest: &CurseForgeManifest) -> Result<LoaderSelection> {
    let all: Vec<String> = manifest
        .loader_ids()
        .into_iter()
        .filter(|id| !id.is_empty())
        .collect();

    let usable = all.first().is_some_and(|first| first != NO_LOADER_SENTINEL);
    if !usable {
        log::warn!("Do we have a mod loader version? No");
        return Err(ModpackError::NoModLoader);
    }

    let selection = LoaderSelection { canonical: all[0].clone(), all };
    if selection.is_ambiguous() {
        Severity::Warn.log(&format!(
            "Found multiple mod loader versions! Make sure the one you want is installed in MultiMC: {}",
            selection.all.join(",")
        ));
    }
    log::info!("Do we have a mod loader version? Yes, it's {}", selection.canonical);
    Ok(selection)
}
