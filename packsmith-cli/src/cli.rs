use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use packsmith_lib::game::installer::types::{
    ExtractSpec, DEFAULT_API_BASE, DEFAULT_ARCHIVE_SUFFIX,
};

/// Turn a CurseForge modpack zip into a MultiMC instance.
#[derive(Debug, Parser)]
#[command(name = "packsmith", version, about)]
pub struct Args {
    /// The modpack zip downloaded from CurseForge
    pub archive: PathBuf,

    /// Directory that receives the instance folder and the packaged zip
    /// [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Unpack the modpack here instead of next to the archive
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Use already unpacked files. Implied, with the current directory as
    /// the working directory, when ./overrides exists.
    #[arg(long)]
    pub skip_extract: bool,

    /// Base URL of the mod download service
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Per-download timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 3)]
    pub timeout_secs: u64,

    /// Number of downloads in flight at once
    #[arg(long, value_name = "N", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=32))]
    pub concurrency: u16,

    /// Text appended to the packaged zip's name
    #[arg(long, value_name = "TEXT", default_value = DEFAULT_ARCHIVE_SUFFIX)]
    pub suffix: String,

    /// Open the instance folder in the file browser when done
    #[arg(long)]
    pub open: bool,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Maps the arguments onto an [`ExtractSpec`], resolving defaults
    /// against `cwd`.
    pub fn to_spec(&self, cwd: &Path) -> ExtractSpec {
        let output_root = self.output_root.clone().unwrap_or_else(|| cwd.to_path_buf());

        let mut spec = ExtractSpec::new(self.archive.clone(), output_root);
        spec.work_dir = self.work_dir.clone();
        spec.skip_extract = self.skip_extract;

        // An unpacked pack in the current directory is used as is
        if !self.skip_extract && cwd.join("overrides").is_dir() {
            spec.skip_extract = true;
            if spec.work_dir.is_none() {
                spec.work_dir = Some(cwd.to_path_buf());
            }
        }
        spec.api_base = self.api_base.clone();
        spec.timeout = Duration::from_secs(self.timeout_secs);
        spec.concurrency = self.concurrency as usize;
        spec.archive_suffix = self.suffix.clone();
        spec
    }
}
