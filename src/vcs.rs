use std::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git rev-parse exited with {status}: {stderr}")]
    Git {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// The checked-out commit of the working directory, via `git rev-parse HEAD`.
///
/// Only the CodeBuild commit rule uses this; no environment variable carries
/// the value there. Fails if git is unavailable or the directory is not a
/// repository.
pub fn head_commit() -> Result<String, VcsError> {
    let output = Command::new("git").args(["rev-parse", "HEAD"]).output()?;
    if !output.status.success() {
        return Err(VcsError::Git {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
