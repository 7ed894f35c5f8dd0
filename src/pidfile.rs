//! PID file written while running daemonized.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Removes its file when dropped.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Write the current process id to `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::write(&path, format!("{}\n", std::process::id()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Error removing PID file {}: {e}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pid_file_lifecycle() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jdd.pid");

        let pid = PidFile::create(&path).unwrap();
        let content = fs::read_to_string(pid.path()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());

        drop(pid);
        assert!(!path.exists());
    }
}
