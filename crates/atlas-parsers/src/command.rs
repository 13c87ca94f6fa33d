//! Running external tools such as `helm`.

use std::process::Output;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with status {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

async fn output(cmd: &mut Command, program: &str) -> Result<Output, CommandError> {
    cmd.output().await.map_err(|source| CommandError::Spawn {
        program: program.to_string(),
        source,
    })
}

/// Run a command to completion and return its stdout.
///
/// A non-zero exit becomes [`CommandError::Failed`] carrying the trimmed stderr.
pub async fn run_command(cmd: &mut Command, program: &str) -> Result<String, CommandError> {
    let output = output(cmd, program).await?;
    if !output.status.success() {
        return Err(CommandError::Failed {
            program: program.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a command and return only its exit code, for tools that answer
/// yes/no through the status. `None` means it was killed by a signal.
pub async fn run_command_status(
    cmd: &mut Command,
    program: &str,
) -> Result<Option<i32>, CommandError> {
    Ok(output(cmd, program).await?.status.code())
}
