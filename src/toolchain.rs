//! Running the external assembler and linker over generated assembly.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("`{tool}` not found in PATH")]
    NotFound {
        tool: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to start `{tool}`")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
    },
}

/// External programs used to turn assembly into an executable.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub assembler: String,
    pub linker: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            assembler: "nasm".to_string(),
            linker: "ld".to_string(),
        }
    }
}

impl Toolchain {
    /// `nasm -felf64 <asm> -o <obj>`
    pub fn assemble(&self, asm: &Path, obj: &Path) -> Result<(), ToolchainError> {
        let mut cmd = Command::new(resolve(&self.assembler)?);
        cmd.arg("-felf64").arg(asm).arg("-o").arg(obj);
        run(&self.assembler, cmd)
    }

    /// `ld -o <exe> <obj>`
    pub fn link(&self, obj: &Path, exe: &Path) -> Result<(), ToolchainError> {
        let mut cmd = Command::new(resolve(&self.linker)?);
        cmd.arg("-o").arg(exe).arg(obj);
        run(&self.linker, cmd)
    }

    /// Whether both tools can be found.
    pub fn available(&self) -> bool {
        resolve(&self.assembler).is_ok() && resolve(&self.linker).is_ok()
    }
}

fn resolve(tool: &str) -> Result<PathBuf, ToolchainError> {
    which::which(tool).map_err(|source| ToolchainError::NotFound {
        tool: tool.to_string(),
        source,
    })
}

fn run(tool: &str, mut cmd: Command) -> Result<(), ToolchainError> {
    let command = format!("{:?}", cmd);
    debug!(%command, "running");
    let status = cmd.status().map_err(|source| ToolchainError::Spawn {
        tool: tool.to_string(),
        source,
    })?;
    if !status.success() {
        error!(%command, %status, "external tool failed");
        return Err(ToolchainError::Failed { command, status });
    }
    Ok(())
}
