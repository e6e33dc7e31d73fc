use std::io::Write;

use log::LevelFilter;

/// Installs the console logger.
///
/// Lines look like `[14:03:11] (INFO) >> packsmith_lib::game::... -> message`
/// with the level colored. `RUST_LOG` overrides the level picked here.
pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let level = buf.default_styled_level(record.level());
            writeln!(
                buf,
                "[{}] ({}) >> {} -> {}",
                chrono::Local::now().format("%H:%M:%S"),
                level,
                short_target(record.target()),
                record.args()
            )
        })
        .init();
}

/// Last two path segments of a log target, e.g. `core::downloader`.
fn short_target(target: &str) -> &str {
    match target.rmatch_indices("::").nth(1) {
        Some((idx, _)) => &target[idx + 2..],
        None => target,
    }
}
