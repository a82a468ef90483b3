use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialise logging. In debug mode the default level is `debug` and can be
/// overridden via the `RUST_LOG` environment variable; otherwise the level is
/// pinned to `info`.
///
/// When `log_file` is set, output goes to that file instead of stderr.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // `RUST_LOG` only applies in debug mode.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "chill_pulse.log".into());
            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("failed to create log directory {}: {e}", dir.display());
            }
            let appender = tracing_appender::rolling::never(dir, file_name);
            let _ = builder.with_writer(appender).with_ansi(false).try_init();
        }
        None => {
            let _ = builder.try_init();
        }
    }
}
