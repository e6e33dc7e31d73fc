use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ModpackError, Result};
use crate::game::modpack::parser::MANIFEST_FILE_NAME;

/// Files the extraction step leaves in the working directory.
const TRANSIENT_DIRS: &[&str] = &["overrides"];
const TRANSIENT_FILES: &[&str] = &["modlist.html", MANIFEST_FILE_NAME];

/// Zips `output_dir` into `<parent>/<name> <suffix>.zip`.
///
/// Entries are stored relative to `output_dir`, so importing the archive
/// yields the instance directly rather than a wrapping folder.
pub fn package_instance(output_dir: &Path, suffix: &str) -> Result<PathBuf> {
    let (Some(parent), Some(name)) = (output_dir.parent(), output_dir.file_name()) else {
        return Err(ModpackError::NoOutputParent(output_dir.to_path_buf()));
    };

    let archive_path = parent.join(format!("{} {}.zip", name.to_string_lossy(), suffix));
    log::info!("Output path: {:?}", output_dir);
    log::info!("Packaging instance into {:?}", archive_path);

    let file = File::create(&archive_path).map_err(|e| ModpackError::io(&archive_path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let zip_err = |e| ModpackError::archive(&archive_path, e);
    for entry in WalkDir::new(output_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| output_dir.to_path_buf());
            ModpackError::io(path, e.into())
        })?;
        let Ok(relative) = entry.path().strip_prefix(output_dir) else {
            continue;
        };
        let entry_name = relative.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", entry_name), options).map_err(zip_err)?;
        } else {
            zip.start_file(entry_name, options).map_err(zip_err)?;
            let mut f = File::open(entry.path()).map_err(|e| ModpackError::io(entry.path(), e))?;
            std::io::copy(&mut f, &mut zip).map_err(|e| ModpackError::io(&archive_path, e))?;
        }
    }

    zip.finish().map_err(zip_err)?;
    Ok(archive_path)
}

/// Removes the files unpacked from the source archive. Best effort.
pub fn cleanup_working_dir(work_dir: &Path) {
    for dir in TRANSIENT_DIRS {
        let path = work_dir.join(dir);
        if let Err(e) = std::fs::remove_dir_all(&path) {
            if e.kind() != ErrorKind::NotFound {
                log::warn!("Failed to remove {:?}: {}", path, e);
            }
        }
    }
    for file in TRANSIENT_FILES {
        let path = work_dir.join(file);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != ErrorKind::NotFound {
                log::warn!("Failed to remove {:?}: {}", path, e);
            }
        }
    }
}
