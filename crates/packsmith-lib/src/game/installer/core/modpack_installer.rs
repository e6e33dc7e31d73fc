use crate::error::Result;
use crate::game::installer::core::batch::{ModRetriever, RetrievalReport};
use crate::game::installer::types::{ExtractSpec, ProgressReporter, Severity};
use crate::game::modpack::exporter::{cleanup_working_dir, package_instance};
use crate::game::modpack::instance::write_instance_cfg;
use crate::game::modpack::overrides::{merge_overrides, OverridesReport};
use crate::game::modpack::parser::{load_manifest, prepare_working_dir, select_loader};
use crate::game::modpack::types::LoaderSelection;
use std::path::PathBuf;
use std::sync::Arc;

const BANNER: &str = "################################################################################";

/// Everything a finished extraction produced.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub output_dir: PathBuf,
    pub archive_path: PathBuf,
    pub loader: LoaderSelection,
    pub retrieval: RetrievalReport,
    pub overrides: OverridesReport,
}

impl ExtractReport {
    /// The `minecraft/` folder inside the instance
    pub fn game_dir(&self) -> PathBuf {
        self.output_dir.join("minecraft")
    }
}

/// Converts a CurseForge modpack archive into a MultiMC instance and zips it.
/// This will:
/// 1. Unpack the archive (unless `skip_extract` says it already is)
/// 2. Parse the manifest and validate its mod loader
/// 3. Download every listed mod into `minecraft/mods`
/// 4. Layer the overrides onto `minecraft/`
/// 5. Write `instance.cfg`
/// 6. Zip the instance next to it and clean up the unpacked files
///
/// Any error returned is fatal, already logged at [`Severity::Fatal`], and
/// leaves nothing packaged. Individual mod
/// download failures are reported through [`ExtractReport::retrieval`].
pub async fn extract_modpack(
    spec: &ExtractSpec,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<ExtractReport> {
    log::info!("Modpack filename is {:?}", spec.archive_path);

    let result = run_stages(spec, &*reporter).await;
    match &result {
        Ok(_) => reporter.done(true, Some("Complete")),
        Err(e) => {
            // The one place a fatal error is logged
            Severity::Fatal.log(&e.to_string());
            reporter.done(false, None);
        }
    }
    result
}

async fn run_stages(spec: &ExtractSpec, reporter: &dyn ProgressReporter) -> Result<ExtractReport> {
    // Step 1: Unpack
    reporter.start_step("Extracting modpack", None);
    let work_dir = prepare_working_dir(&spec.archive_path, spec.work_dir(), spec.skip_extract)?;

    // Step 2: Manifest
    reporter.start_step("Reading manifest", None);
    let manifest = load_manifest(&work_dir).await?;
    let loader = select_loader(&manifest)?;

    let output_dir = spec.output_dir();
    let game_dir = spec.game_dir();
    log::info!("Output dir is {:?}", output_dir);

    // Step 3: Mods
    let retriever = ModRetriever::from_spec(spec)?;
    let retrieval = retriever
        .retrieve_manifest(&manifest, &spec.mods_dir(), reporter)
        .await?;

    // Step 4: Overrides
    reporter.start_step("Copying overrides", None);
    let overrides = merge_overrides(manifest.overrides.as_deref(), &work_dir, &game_dir);

    // Step 5: instance.cfg
    reporter.start_step("Writing instance configuration", None);
    write_instance_cfg(&manifest, &loader, &output_dir).await?;

    // Step 6: Package
    reporter.start_step("Packaging instance", None);
    log::info!("And we're done!");
    let archive_path = package_instance(&output_dir, &spec.archive_suffix)?;

    log_summary(&loader, &retrieval);
    cleanup_working_dir(&work_dir);

    Ok(ExtractReport {
        output_dir,
        archive_path,
        loader,
        retrieval,
        overrides,
    })
}

fn log_summary(loader: &LoaderSelection, retrieval: &RetrievalReport) {
    log::info!("{}", BANNER);
    log::warn!("IMPORTANT NOTE: If you want to import this instance to MultiMC, you must install the mod loader manually");
    log::warn!("The mod loader version you need is {}", loader.canonical);
    log::warn!("A later version will probably also work just as fine, but this is the version shipped with the pack");
    log::warn!("This is also added to the instance notes");

    if !retrieval.missing.is_empty() {
        log::warn!("WARNING: Some mods could not be downloaded. Either the specific versions were taken down from CurseForge, or there were errors in the download.");
        log::warn!("The missing mods are the following:");
        for missing in &retrieval.missing {
            log::info!(" - {} ({}): {}", missing.file_name, missing.reference, missing.reason);
        }
        log::warn!("If these mods are crucial to the modpack functioning, try downloading the server version of the pack and pulling them from there.");
    }

    log::info!("{}", BANNER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModpackError;
    use crate::game::installer::types::LogProgressReporter;
    use std::sync::{Mutex, Once};
    use tempfile::tempdir;

    static RECORDS: Mutex<Vec<String>> = Mutex::new(Vec::new());
    static INIT: Once = Once::new();

    struct CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            RECORDS
                .lock()
                .unwrap()
                .push(format!("{} {}", record.level(), record.args()));
        }

        fn flush(&self) {}
    }

    fn capture_logs() {
        INIT.call_once(|| {
            log::set_logger(&CaptureLogger).unwrap();
            log::set_max_level(log::LevelFilter::Trace);
        });
    }

    #[tokio::test]
    async fn fatal_error_is_logged_once() {
        capture_logs();
        let tmp = tempdir().unwrap();
        let mut spec = ExtractSpec::new(tmp.path().join("pack.zip"), tmp.path().join("out"));
        spec.skip_extract = true;

        let err = extract_modpack(&spec, Arc::new(LogProgressReporter))
            .await
            .unwrap_err();
        assert!(matches!(err, ModpackError::ManifestNotFound(_)));

        let marker = tmp.path().to_string_lossy().into_owned();
        let fatal: Vec<String> = RECORDS
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.contains(&marker) && line.contains("[FATAL]"))
            .cloned()
            .collect();
        assert_eq!(fatal.len(), 1, "{:?}", fatal);
        assert!(fatal[0].starts_with("ERROR"));
    }
}
