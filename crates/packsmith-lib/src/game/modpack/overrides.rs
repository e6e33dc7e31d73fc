use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What happened while layering the overrides tree onto an instance.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverridesReport {
    /// Paths relative to the game directory that were written.
    pub copied: Vec<PathBuf>,
    /// Paths that already existed in the game directory and were left alone.
    pub skipped: Vec<PathBuf>,
    /// Paths that could not be copied, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

/// Copies `<work_dir>/<overrides_path>` into `game_dir`, keeping relative
/// paths and never replacing a file that already exists.
///
/// Per-file failures are logged and recorded; they never stop the merge.
pub fn merge_overrides(
    overrides_path: Option<&str>,
    work_dir: &Path,
    game_dir: &Path,
) -> OverridesReport {
    log::info!("Copying modpack overrides");
    let mut report = OverridesReport::default();

    let Some(overrides_path) = overrides_path else {
        log::info!("Manifest has no overrides, nothing to copy");
        return report;
    };

    let source_root = work_dir.join(overrides_path);
    if !source_root.is_dir() {
        log::warn!("Overrides directory {:?} does not exist, skipping", source_root);
        return report;
    }

    for entry in WalkDir::new(&source_root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| source_root.clone());
                log::error!("Error reading override {:?}: {}", path, e);
                report.failed.push((path, e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(&source_root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };
        let target = game_dir.join(&relative);
        log::info!("Override: {}", relative.display());

        match copy_no_clobber(entry.path(), &target) {
            Ok(true) => report.copied.push(relative),
            Ok(false) => {
                log::debug!("Override {} already present, leaving it", relative.display());
                report.skipped.push(relative);
            }
            Err(e) => {
                log::error!("Error copying {}: {} ({:?})", relative.display(), e, e.kind());
                report.failed.push((relative, e.to_string()));
            }
        }
    }

    log::info!(
        "Done copying overrides ({} copied, {} kept, {} failed)",
        report.copied.len(),
        report.skipped.len(),
        report.failed.len()
    );
    report
}

/// Returns `Ok(false)` when `target` already exists.
fn copy_no_clobber(source: &Path, target: &Path) -> std::io::Result<bool> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut out = match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };

    let copied = File::open(source).and_then(|mut src| std::io::copy(&mut src, &mut out));
    if let Err(e) = copied {
        drop(out);
        let _ = std::fs::remove_file(target);
        return Err(e);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seed_overrides(work: &Path) {
        let root = work.join("overrides");
        std::fs::create_dir_all(root.join("config/sub")).unwrap();
        std::fs::write(root.join("options.txt"), "fov:1.0").unwrap();
        std::fs::write(root.join("config/sub/mod.toml"), "enabled=true").unwrap();
    }

    #[test]
    fn copies_nested_tree() {
        let work = tempdir().unwrap();
        let game = tempdir().unwrap();
        seed_overrides(work.path());

        let report = merge_overrides(Some("overrides"), work.path(), game.path());

        assert_eq!(report.copied.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(
            std::fs::read_to_string(game.path().join("config/sub/mod.toml")).unwrap(),
            "enabled=true"
        );
        assert!(game.path().join("options.txt").is_file());
    }

    #[test]
    fn second_run_leaves_destination_untouched() {
        let work = tempdir().unwrap();
        let game = tempdir().unwrap();
        seed_overrides(work.path());

        merge_overrides(Some("overrides"), work.path(), game.path());
        std::fs::write(game.path().join("options.txt"), "fov:0.5").unwrap();

        let report = merge_overrides(Some("overrides"), work.path(), game.path());
        assert!(report.copied.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(
            std::fs::read_to_string(game.path().join("options.txt")).unwrap(),
            "fov:0.5"
        );
    }

    #[test]
    fn no_overrides_path_is_a_no_op() {
        let work = tempdir().unwrap();
        let game = tempdir().unwrap();
        seed_overrides(work.path());

        let report = merge_overrides(None, work.path(), game.path());
        assert_eq!(report, OverridesReport::default());
        assert_eq!(std::fs::read_dir(game.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_overrides_directory_is_a_no_op() {
        let work = tempdir().unwrap();
        let game = tempdir().unwrap();

        let report = merge_overrides(Some("overrides"), work.path(), game.path());
        assert_eq!(report, OverridesReport::default());
    }
}
