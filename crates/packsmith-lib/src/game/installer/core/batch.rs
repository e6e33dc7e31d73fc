use crate::error::{ModpackError, Result};
use crate::game::installer::core::downloader::{fetch_mod, FetchOutcome};
use crate::game::installer::types::{ExtractSpec, ProgressReporter};
use crate::game::modpack::types::{CurseForgeManifest, FileReference};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A mod that could not be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMod {
    pub reference: FileReference,
    /// Best known file name at the time of failure
    pub file_name: String,
    pub reason: String,
}

/// Outcome of the download stage for a whole manifest.
#[derive(Debug, Clone, Default)]
pub struct RetrievalReport {
    /// Written artifacts, in manifest order
    pub written: Vec<PathBuf>,
    /// Failed references, in manifest order
    pub missing: Vec<MissingMod>,
    /// Items processed, successful or not
    pub processed: usize,
    pub total: usize,
}

impl RetrievalReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Downloads every file of a manifest from the CurseForge download endpoint.
pub struct ModRetriever {
    client: Client,
    api_base: String,
    concurrency: usize,
}

impl ModRetriever {
    pub fn new(client: Client, api_base: impl Into<String>, concurrency: usize) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            concurrency: concurrency.max(1),
        }
    }

    /// Builds the HTTP client with the run's timeout and User-Agent.
    /// Redirects are followed; there are no retries.
    pub fn from_spec(spec: &ExtractSpec) -> Result<Self> {
        let client = Client::builder()
            .timeout(spec.timeout)
            .user_agent(&spec.user_agent)
            .build()?;
        Ok(Self::new(client, spec.api_base.clone(), spec.concurrency))
    }

    /// Downloads the manifest's files into `mods_dir`.
    ///
    /// Fails only when the manifest has no file list, in which case nothing
    /// is created on disk. Individual download failures end up in
    /// [`RetrievalReport::missing`].
    pub async fn retrieve_manifest(
        &self,
        manifest: &CurseForgeManifest,
        mods_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<RetrievalReport> {
        let Some(files) = manifest.files.as_deref() else {
            return Err(ModpackError::MissingFileList);
        };

        tokio::fs::create_dir_all(mods_dir)
            .await
            .map_err(|e| ModpackError::io(mods_dir, e))?;

        Ok(self.retrieve_all(files, mods_dir, reporter).await)
    }

    /// Fetches `files` into `mods_dir`, at most `concurrency` at a time.
    /// Outcomes are collected in input order whatever order they finish in.
    pub async fn retrieve_all(
        &self,
        files: &[FileReference],
        mods_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> RetrievalReport {
        let total = files.len();
        log::info!("Downloading modpack from manifest");
        log::info!("Manifest contains {} files to download", total);
        reporter.start_step("Downloading mods", Some(total as u32));

        let started = AtomicUsize::new(0);
        let finished = AtomicUsize::new(0);
        let (started, finished) = (&started, &finished);

        let outcomes: Vec<(FileReference, FetchOutcome)> = stream::iter(files.iter().copied())
            .map(|file| async move {
                let position = started.fetch_add(1, Ordering::SeqCst) + 1;
                reporter.set_message(&format!("Downloading {} ({}/{})", file, position, total));
                let outcome =
                    fetch_mod(&self.client, &self.api_base, &file, mods_dir, position, total).await;

                let count = finished.fetch_add(1, Ordering::SeqCst) + 1;
                reporter.set_step_count(count as u32, Some(total as u32));
                (file, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = RetrievalReport {
            total,
            processed: finished.load(Ordering::SeqCst),
            ..Default::default()
        };
        for (reference, outcome) in outcomes {
            match outcome {
                FetchOutcome::Written { path, .. } => report.written.push(path),
                FetchOutcome::Missing { file_name, reason, .. } => report.missing.push(MissingMod {
                    reference,
                    file_name,
                    reason,
                }),
            }
        }

        log::info!(
            "Mod downloads complete ({} written, {} missing)",
            report.written.len(),
            report.missing.len()
        );
        report
    }
}
