use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Loader identifier reported when a manifest carries no loader data at all.
pub const NO_LOADER_SENTINEL: &str = "N/A";

/// CurseForge modpack manifest (manifest.json)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeManifest {
    #[serde(default)]
    pub minecraft: Option<CurseForgeMinecraft>,
    #[serde(default = "default_modpack")]
    pub manifest_type: String,
    #[serde(default = "default_manifest_version")]
    pub manifest_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "projectID")]
    pub project_id: Option<u32>,
    /// `None` when the manifest has no `files` key at all, which is fatal for
    /// the download stage. An empty list is valid.
    #[serde(default)]
    pub files: Option<Vec<FileReference>>,
    /// Path of the overrides tree, relative to the unpacked archive root.
    #[serde(default)]
    pub overrides: Option<String>,
}

fn default_manifest_version() -> u32 { 1 }
fn default_modpack() -> String { "minecraftModpack".to_string() }

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeMinecraft {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mod_loaders: Vec<CurseForgeModLoader>,
    #[serde(default)]
    pub recommended_ram: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeModLoader {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary: bool,
}

/// Exporters write `null` where they have no loader data; treat it as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One remote mod artifact, addressed by CurseForge project and file id.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    #[serde(alias = "projectID")]
    pub project_id: u32,
    #[serde(alias = "fileID")]
    pub file_id: u32,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool { true }

impl FileReference {
    pub fn new(project_id: u32, file_id: u32) -> Self {
        Self { project_id, file_id, required: true }
    }

    /// Name used for the downloaded jar when the server does not supply one.
    pub fn default_file_name(&self) -> String {
        format!("{}-{}.jar", self.project_id, self.file_id)
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project_id, self.file_id)
    }
}

impl CurseForgeManifest {
    /// Every loader id in manifest order, or `["N/A"]` when no loader is listed.
    pub fn loader_ids(&self) -> Vec<String> {
        match &self.minecraft {
            Some(mc) if !mc.mod_loaders.is_empty() => {
                mc.mod_loaders.iter().map(|l| l.id.clone()).collect()
            }
            _ => vec![NO_LOADER_SENTINEL.to_string()],
        }
    }

    pub fn minecraft_version(&self) -> Option<&str> {
        self.minecraft.as_ref().and_then(|mc| mc.version.as_deref())
    }

    /// `"<name> <version>"`, skipping whichever half is missing.
    pub fn display_name(&self) -> String {
        [self.name.as_deref(), self.version.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn author_or_unknown(&self) -> &str {
        match self.author.as_deref() {
            Some(author) if !author.is_empty() => author,
            _ => "Unknown",
        }
    }
}

/// Result of validating a manifest's loader list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSelection {
    /// Loader used for instance notes and the closing notice.
    pub canonical: String,
    /// All usable loader ids in manifest order; `canonical` is the first.
    pub all: Vec<String>,
}

impl LoaderSelection {
    pub fn is_ambiguous(&self) -> bool {
        self.all.len() > 1
    }
}
