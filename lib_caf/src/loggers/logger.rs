use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Creating the log directory or file failed.
    #[error("log file error: {0}")]
    Io(#[from] std::io::Error),

    /// A global logger was already installed.
    #[error("logger already initialized: {0}")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// How a component binary logs.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Component name, used as the log file prefix.
    pub component: String,
    /// Debug mode: everything from `Debug` up goes to stdout. Otherwise only
    /// errors are printed, to stderr.
    pub debug: bool,
    /// Optional directory for a timestamped log file (same level as console).
    pub log_dir: Option<PathBuf>,
}

impl LogOptions {
    fn level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Error
        }
    }
}

/// Installs the global `fern` dispatcher.
pub fn setup_logging(options: &LogOptions) -> Result<(), LoggerError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(options.level());

    dispatch = if options.debug {
        dispatch.chain(std::io::stdout())
    } else {
        dispatch.chain(std::io::stderr())
    };

    if let Some(log_dir) = &options.log_dir {
        dispatch = dispatch.chain(open_log_file(log_dir, &options.component)?);
    }

    dispatch.apply()?;
    Ok(())
}

/// Opens a fresh `<component>_<timestamp>.log` in `log_dir`, then prunes the
/// older ones so only the new file remains.
pub fn open_log_file(log_dir: &Path, component: &str) -> Result<fs::File, LoggerError> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    let log_file_name = format!(
        "{}_{}.log",
        component,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let file = fern::log_file(log_dir.join(log_file_name))?;
    cleanup_old_logs(log_dir, component)?;
    Ok(file)
}

/// Deletes older `<component>_*.log` files in `log_dir`, keeping the newest.
pub fn cleanup_old_logs(log_dir: &Path, component: &str) -> Result<(), LoggerError> {
    let prefix = format!("{}_", component);
    let mut entries: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|res| res.ok())
        .filter(|e| e.path().extension().map_or(false, |ext| ext == "log"))
        .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
        .filter_map(|e| {
            let modified = e.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, e.path()))
        })
        .collect();

    // Newest first
    entries.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, path) in entries.iter().skip(1) {
        if let Err(e) = fs::remove_file(path) {
            eprintln!("Failed to delete old log file {:?}: {}", path, e);
        }
    }

    Ok(())
}
