//! CLI entry point for the repo-local architecture lint.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use architecture_lint::{CLIENT_CRATE, lint_client_sources};
use camino::Utf8PathBuf;
use thiserror::Error;

fn main() -> ExitCode {
    let outcome = workspace_root()
        .map_err(|err| err.to_string())
        .and_then(|root| {
            lint_client_sources(&root.join(CLIENT_CRATE)).map_err(|err| err.to_string())
        });
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            let _ = writeln!(io::stderr().lock(), "{message}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, Error)]
enum RootError {
    #[error("unable to locate workspace root (directory containing a workspace Cargo.toml)")]
    NotFound,
    #[error("workspace root {0} is not valid UTF-8")]
    NotUtf8(String),
}

fn workspace_root() -> Result<Utf8PathBuf, RootError> {
    let found = locate_root().ok_or(RootError::NotFound)?;
    Utf8PathBuf::from_path_buf(found).map_err(|path| RootError::NotUtf8(path.display().to_string()))
}

fn locate_root() -> Option<PathBuf> {
    let from_env = std::env::var("CARGO_WORKSPACE_DIR").ok().map(PathBuf::from);
    let from_cwd = std::env::current_dir().ok();
    let from_manifest = Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")));

    from_env
        .as_deref()
        .and_then(find_workspace_root)
        .or_else(|| from_cwd.as_deref().and_then(find_workspace_root))
        .or_else(|| from_manifest.as_deref().and_then(find_workspace_root))
}

fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let manifest = dir.join("Cargo.toml");
        if manifest.is_file() && cargo_toml_declares_workspace(&manifest) {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

fn cargo_toml_declares_workspace(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .is_some_and(|contents| contents.contains("[workspace]"))
}
