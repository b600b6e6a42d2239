//! Repo-local lint keeping the client's ports-and-adapters layout honest.
//!
//! The client crate is split into `domain` (state, services and ports),
//! `inbound` (driving adapters such as the CLI) and `outbound` (the HTTP
//! gateway and file storage). This lint parses every source file under those
//! directories and reports:
//!
//! - `domain` code that reaches into adapter modules or transport crates
//! - `inbound` code that imports `outbound` modules or storage/HTTP crates
//! - `outbound` code that imports `inbound` modules or CLI crates
//!
//! Run it with `cargo run -p architecture-lint` from anywhere in the workspace.

use std::collections::BTreeSet;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use syn::visit::Visit;
use thiserror::Error;

/// Name of the crate whose sources are linted.
pub const CLIENT_CRATE: &str = "client";

const LAYER_DIRS: [&str; 3] = ["domain", "inbound", "outbound"];

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `client/src`.
    pub file: Utf8PathBuf,
    /// Rule that was broken.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Failure modes returned by the architecture lint.
#[derive(Debug, Error)]
pub enum LintFailure {
    /// Walking or reading the source tree failed.
    #[error("I/O error while linting {path}: {source}")]
    Io {
        /// Path being read.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A file was not valid Rust or sat outside a known layer.
    #[error("cannot lint {file}: {message}")]
    Parse {
        /// Offending file.
        file: Utf8PathBuf,
        /// Parser or layout complaint.
        message: String,
    },
    /// One or more boundary violations were found.
    #[error("architecture boundary violations:\n{}", render_violations(.0))]
    Violations(Vec<Violation>),
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("- {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lint the client crate on disk. `client_dir` is the crate directory.
///
/// # Errors
///
/// Returns [`LintFailure`] when the tree cannot be read, a file does not
/// parse, or any boundary is crossed.
pub fn lint_client_sources(client_dir: &Utf8Path) -> Result<(), LintFailure> {
    let src_dir = client_dir.join("src");
    let root = Dir::open_ambient_dir(&src_dir, ambient_authority()).map_err(|source| {
        LintFailure::Io {
            path: src_dir.clone(),
            source,
        }
    })?;
    let mut sources = Vec::new();
    for layer in LAYER_DIRS {
        match root.open_dir(layer) {
            Ok(dir) => collect_sources(&dir, Utf8Path::new(layer), &mut sources)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(LintFailure::Io {
                    path: src_dir.join(layer),
                    source,
                });
            }
        }
    }
    lint_sources(&sources)
}

/// Lint in-memory sources. Paths are relative to `client/src`.
///
/// # Errors
///
/// See [`lint_client_sources`].
pub fn lint_sources(sources: &[LintSource]) -> Result<(), LintFailure> {
    let mut violations = Vec::new();
    for source in sources {
        let layer = Layer::of(&source.file).ok_or_else(|| LintFailure::Parse {
            file: source.file.clone(),
            message: "file is not under domain/, inbound/ or outbound/".to_owned(),
        })?;
        let parsed = syn::parse_file(&source.contents).map_err(|err| LintFailure::Parse {
            file: source.file.clone(),
            message: err.to_string(),
        })?;
        violations.extend(check_file(&source.file, layer, &parsed));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(LintFailure::Violations(violations))
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `client/src`.
    pub file: Utf8PathBuf,
    /// File contents.
    pub contents: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Inbound,
    Outbound,
}

impl Layer {
    fn of(relative: &Utf8Path) -> Option<Self> {
        match relative.components().next()?.as_str() {
            "domain" => Some(Self::Domain),
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    const fn forbidden_modules(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &["inbound", "outbound"],
            Self::Inbound => &["outbound"],
            Self::Outbound => &["inbound"],
        }
    }

    const fn forbidden_crates(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &[
                "camino",
                "cap_std",
                "clap",
                "color_eyre",
                "ortho_config",
                "reqwest",
                "tracing_subscriber",
                "url",
            ],
            Self::Inbound => &["cap_std", "reqwest"],
            Self::Outbound => &["clap", "ortho_config"],
        }
    }
}

fn check_file(file: &Utf8Path, layer: Layer, parsed: &syn::File) -> Vec<Violation> {
    let mut collector = PathCollector::default();
    collector.visit_file(parsed);

    let mut messages = BTreeSet::new();
    for segments in &collector.paths {
        if let Some(module) = internal_root(segments)
            .filter(|root| layer.forbidden_modules().contains(root))
        {
            messages.insert(format!(
                "{} code must not depend on {CLIENT_CRATE}::{module}",
                layer.name()
            ));
        }
        if let Some(krate) = external_root(segments)
            .filter(|root| layer.forbidden_crates().contains(root))
        {
            messages.insert(format!(
                "{} code must not depend on external crate `{krate}`",
                layer.name()
            ));
        }
    }

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_owned(),
            message,
        })
        .collect()
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// First module below the crate root, for paths that stay inside the crate.
fn internal_root(segments: &[String]) -> Option<&str> {
    let first = segments.first()?.as_str();
    if LAYER_DIRS.contains(&first) {
        return Some(first);
    }
    let start = if is_relative(first) {
        segments.iter().position(|segment| !is_relative(segment))?
    } else if first == CLIENT_CRATE {
        1
    } else {
        return None;
    };
    segments.get(start).map(String::as_str)
}

fn external_root(segments: &[String]) -> Option<&str> {
    let root = segments.first()?.as_str();
    (!is_relative(root) && root != CLIENT_CRATE).then_some(root)
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn record_use_tree(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                prefix.push(name.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, Vec::new());
    }
}

fn collect_sources(
    dir: &Dir,
    relative: &Utf8Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), LintFailure> {
    let io_err = |path: Utf8PathBuf| move |source| LintFailure::Io { path, source };
    for entry in dir.entries().map_err(io_err(relative.to_owned()))? {
        let entry = entry.map_err(io_err(relative.to_owned()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let path = relative.join(name);
        if entry.file_type().map_err(io_err(path.clone()))?.is_dir() {
            let child = entry.open_dir().map_err(io_err(path.clone()))?;
            collect_sources(&child, &path, sources)?;
        } else if path.extension() == Some("rs") {
            let contents = dir.read_to_string(name).map_err(io_err(path.clone()))?;
            sources.push(LintSource {
                file: path,
                contents,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
