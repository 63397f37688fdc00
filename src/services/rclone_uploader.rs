//! Report upload via rclone
//!
//! Copies the finished report file to the configured rclone remote by
//! invoking the `rclone` binary. The binary must be installed and the
//! remote configured (`rclone config`) outside of this program.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub struct RcloneUploader {
    remote: String,
    base_dir: String,
}

impl RcloneUploader {
    pub fn new(remote: &str, base_dir: &str) -> Self {
        Self {
            remote: remote.to_string(),
            base_dir: base_dir.trim_end_matches('/').to_string(),
        }
    }

    /// Remote directory the report lands in, e.g.
    /// `report:/Data Collection/My Project`.
    pub fn destination(&self, project_name: &str) -> String {
        format!("{}:{}/{}", self.remote, self.base_dir, project_name)
    }

    /// Upload one local file into the project's remote directory.
    ///
    /// Blocks on the rclone process from a blocking task so the async
    /// runtime is not held up. A non-zero exit status is an error carrying
    /// rclone's stderr.
    pub async fn upload(&self, local_path: &Path, project_name: &str) -> Result<()> {
        let destination = self.destination(project_name);
        let source = PathBuf::from(local_path);
        debug!(source = %source.display(), destination = %destination, "Starting rclone copy");

        let dest = destination.clone();
        let output = tokio::task::spawn_blocking(move || {
            Command::new("rclone")
                .arg("copy")
                .arg(&source)
                .arg(&dest)
                .output()
        })
        .await
        .map_err(|e| Error::Internal(format!("rclone task failed: {}", e)))?
        .map_err(|e| Error::Upload(format!("Failed to run rclone: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Upload(format!(
                "rclone copy to {} exited with {}: {}",
                destination,
                output.status,
                stderr.trim()
            )));
        }

        info!(destination = %destination, "Report uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_joins_remote_and_project() {
        let uploader = RcloneUploader::new("report", "/Data Collection");
        assert_eq!(
            uploader.destination("Western Cape Speech"),
            "report:/Data Collection/Western Cape Speech"
        );
    }

    #[test]
    fn test_trailing_slash_in_base_dir_is_dropped() {
        let uploader = RcloneUploader::new("backup", "/reports/");
        assert_eq!(uploader.destination("p1"), "backup:/reports/p1");
    }
}
