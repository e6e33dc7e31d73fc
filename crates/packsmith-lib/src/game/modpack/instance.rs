use std::path::{Path, PathBuf};

use crate::error::{ModpackError, Result};
use crate::game::modpack::types::{CurseForgeManifest, LoaderSelection};

pub const INSTANCE_CFG_FILE_NAME: &str = "instance.cfg";

/// Renders the MultiMC `instance.cfg` for a pack.
pub fn render_instance_cfg(manifest: &CurseForgeManifest, loader: &LoaderSelection) -> String {
    let entries: [(&str, String); 14] = [
        ("InstanceType", "OneSix".to_string()),
        ("IntendedVersion", manifest.minecraft_version().unwrap_or_default().to_string()),
        ("LogPrePostOutput", "true".to_string()),
        ("OverrideCommands", "false".to_string()),
        ("OverrideConsole", "false".to_string()),
        ("OverrideJavaArgs", "false".to_string()),
        ("OverrideJavaLocation", "false".to_string()),
        ("OverrideMemory", "false".to_string()),
        ("OverrideWindow", "false".to_string()),
        ("iconKey", "default".to_string()),
        ("lastLaunchTime", "0".to_string()),
        ("name", manifest.display_name()),
        (
            "notes",
            format!(
                "Modpack by {}. Generated by packsmith. Using {}.",
                manifest.author_or_unknown(),
                loader.canonical
            ),
        ),
        ("totalTimePlayed", "0".to_string()),
    ];

    entries
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
}

/// Writes `instance.cfg` into `output_dir` and returns its path.
pub async fn write_instance_cfg(
    manifest: &CurseForgeManifest,
    loader: &LoaderSelection,
    output_dir: &Path,
) -> Result<PathBuf> {
    log::info!("Setting up MultiMC info");
    let path = output_dir.join(INSTANCE_CFG_FILE_NAME);
    tokio::fs::write(&path, render_instance_cfg(manifest, loader))
        .await
        .map_err(|e| ModpackError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> (CurseForgeManifest, LoaderSelection) {
        let manifest: CurseForgeManifest = serde_json::from_str(
            r#"{ "minecraft": { "version": "1.12.2", "modLoaders": [{ "id": "forge-14.23.5.2847", "primary": true }] },
                 "name": "Skyfactory", "version": "4.2.4", "author": "Darkosto", "files": [] }"#,
        )
        .unwrap();
        let loader = LoaderSelection {
            canonical: "forge-14.23.5.2847".to_string(),
            all: vec!["forge-14.23.5.2847".to_string()],
        };
        (manifest, loader)
    }

    #[test]
    fn renders_fixed_schema() {
        let (manifest, loader) = sample();
        let cfg = render_instance_cfg(&manifest, &loader);
        let lines: Vec<&str> = cfg.lines().collect();

        assert_eq!(lines.len(), 14);
        assert_eq!(lines[0], "InstanceType=OneSix");
        assert_eq!(lines[1], "IntendedVersion=1.12.2");
        assert!(lines.contains(&"name=Skyfactory 4.2.4"));
        assert!(lines.contains(&"notes=Modpack by Darkosto. Generated by packsmith. Using forge-14.23.5.2847."));
        assert!(lines.contains(&"OverrideMemory=false"));
        assert!(lines.contains(&"iconKey=default"));
        assert_eq!(lines[13], "totalTimePlayed=0");
    }

    #[tokio::test]
    async fn writes_into_output_dir() {
        let tmp = tempdir().unwrap();
        let (manifest, loader) = sample();
        let path = write_instance_cfg(&manifest, &loader, tmp.path()).await.unwrap();
        assert_eq!(path, tmp.path().join("instance.cfg"));
        assert!(std::fs::read_to_string(path).unwrap().contains("lastLaunchTime=0"));
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let tmp = tempdir().unwrap();
        let (manifest, loader) = sample();
        let err = write_instance_cfg(&manifest, &loader, &tmp.path().join("does/not/exist"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModpackError::Io { .. }));
    }
}
