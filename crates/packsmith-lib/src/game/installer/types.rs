use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://www.curseforge.com";

/// CurseForge rejects requests that do not look like a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Ubuntu Chromium/53.0.2785.143 Chrome/53.0.2785.143 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

pub const DEFAULT_ARCHIVE_SUFFIX: &str = "MultiMC";

/// Progress reporter trait for extraction runs
pub trait ProgressReporter: Send + Sync {
    /// Start a new step with optional total steps
    fn start_step(&self, name: &str, total_steps: Option<u32>);

    /// Set a short status message
    fn set_message(&self, message: &str);

    /// Set a numeric step count for the current step (e.g. "3/12").
    fn set_step_count(&self, current: u32, total: Option<u32>);

    /// Mark operation as complete
    fn done(&self, success: bool, message: Option<&str>);
}

/// A progress reporter that does nothing (silent).
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_step(&self, _name: &str, _total_steps: Option<u32>) {}
    fn set_message(&self, _message: &str) {}
    fn set_step_count(&self, _current: u32, _total: Option<u32>) {}
    fn done(&self, _success: bool, _message: Option<&str>) {}
}

/// Forwards progress to the `log` facade. Stage changes go out at info,
/// everything else at debug so it does not drown the per-mod lines.
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn start_step(&self, name: &str, total_steps: Option<u32>) {
        match total_steps {
            Some(total) => log::info!("==> {} ({} items)", name, total),
            None => log::info!("==> {}", name),
        }
    }

    fn set_message(&self, message: &str) {
        log::debug!("{}", message);
    }

    fn set_step_count(&self, current: u32, total: Option<u32>) {
        match total {
            Some(total) => log::debug!("progress {}/{}", current, total),
            None => log::debug!("progress {}", current),
        }
    }

    /// Failures are logged by the pipeline itself, so they only show up here
    /// at debug.
    fn done(&self, success: bool, message: Option<&str>) {
        let message = message.unwrap_or(if success { "Complete" } else { "Failed" });
        if success {
            log::info!("{}", message);
        } else {
            log::debug!("{}", message);
        }
    }
}

/// Operator-facing severity of a diagnostic.
///
/// `Fatal` marks the most severe diagnostics; whether the run actually stops
/// is decided by the caller, not by the severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    pub fn log(self, message: &str) {
        match self {
            Severity::Info => log::info!("{}", message),
            Severity::Warn => log::warn!("{}", message),
            Severity::Error => log::error!("{}", message),
            Severity::Fatal => log::error!("[FATAL] {}", message),
        }
    }
}

/// Everything one extraction run needs to know.
#[derive(Debug, Clone)]
pub struct ExtractSpec {
    /// The CurseForge modpack zip
    pub archive_path: PathBuf,

    /// Where the pack is unpacked. Defaults to the archive's directory.
    pub work_dir: Option<PathBuf>,

    /// Directory that receives the instance folder and the final zip
    pub output_root: PathBuf,

    /// Treat the working directory as already unpacked
    pub skip_extract: bool,

    /// Scheme and host of the mod download service
    pub api_base: String,

    /// Per-request timeout; there are no retries
    pub timeout: Duration,

    pub user_agent: String,

    /// Downloads in flight at once. 1 keeps them strictly sequential.
    pub concurrency: usize,

    /// Appended to the instance name for the packaged zip
    pub archive_suffix: String,
}

impl ExtractSpec {
    pub fn new(archive_path: PathBuf, output_root: PathBuf) -> Self {
        Self {
            archive_path,
            work_dir: None,
            output_root,
            skip_extract: false,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 1,
            archive_suffix: DEFAULT_ARCHIVE_SUFFIX.to_string(),
        }
    }

    /// Name of the instance folder: the archive's file stem, URL-decoded
    /// since browsers save CurseForge downloads with escaped names.
    ///
    /// Decoding happens before the stem is taken, so an escaped separator
    /// can never turn the name into a path.
    pub fn output_name(&self) -> String {
        let raw = self
            .archive_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let decoded = match urlencoding::decode(&raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.clone(),
        };

        let last = decoded.rsplit(|c| c == '/' || c == '\\').next().unwrap_or_default();
        match Path::new(last).file_stem().and_then(|s| s.to_str()) {
            Some(stem) if !stem.trim().is_empty() && stem != "." && stem != ".." => stem.to_string(),
            _ => "modpack".to_string(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(self.output_name())
    }

    /// The `.minecraft` equivalent MultiMC looks for inside an instance
    pub fn game_dir(&self) -> PathBuf {
        self.output_dir().join("minecraft")
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.game_dir().join("mods")
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_curseforge_client() {
        let spec = ExtractSpec::new(PathBuf::from("pack.zip"), PathBuf::from("/out"));
        assert_eq!(spec.api_base, "https://www.curseforge.com");
        assert_eq!(spec.timeout, Duration::from_secs(3));
        assert_eq!(spec.concurrency, 1);
        assert_eq!(spec.archive_suffix, "MultiMC");
        assert!(!spec.skip_extract);
    }

    #[test]
    fn output_paths_derive_from_archive_name() {
        let spec = ExtractSpec::new(
            PathBuf::from("/downloads/All%20the%20Mods%203-5.10.zip"),
            PathBuf::from("/out"),
        );
        assert_eq!(spec.output_name(), "All the Mods 3-5.10");
        assert_eq!(spec.output_dir(), PathBuf::from("/out/All the Mods 3-5.10"));
        assert_eq!(spec.mods_dir(), PathBuf::from("/out/All the Mods 3-5.10/minecraft/mods"));
    }

    #[test]
    fn escaped_separators_stay_inside_output_root() {
        let spec = ExtractSpec::new(
            PathBuf::from("/dl/..%2F..%2Fetc%2Fpack.zip"),
            PathBuf::from("/out"),
        );
        assert_eq!(spec.output_name(), "pack");
        assert_eq!(spec.output_dir(), PathBuf::from("/out/pack"));

        let windows = ExtractSpec::new(PathBuf::from("/dl/a%5Cb%5CMy%20Pack.zip"), PathBuf::from("/out"));
        assert_eq!(windows.output_name(), "My Pack");
    }

    #[test]
    fn unusable_names_fall_back_to_modpack() {
        for name in ["%2E%2E", "..%2F", "%2F"] {
            let spec = ExtractSpec::new(PathBuf::from("/dl").join(name), PathBuf::from("/out"));
            assert_eq!(spec.output_name(), "modpack", "archive name {:?}", name);
            assert_eq!(spec.output_dir().parent(), Some(Path::new("/out")));
        }
    }

    #[test]
    fn severity_orders_by_gravity() {
        assert!(Severity::Fatal > Severity::Error);
        assert!(Severity::Error > Severity::Warn);
        assert!(Severity::Warn > Severity::Info);
    }
}
