use crate::utils::error::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Append-only diagnostics file (`LOGFILE`) shared between runs.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens, appends one timestamped line and closes again.
    pub fn append(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{} {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        )?;
        Ok(())
    }
}
