//! Linting real directory trees laid out like the client crate.

use std::fs;

use architecture_lint::{LintFailure, lint_client_sources};
use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Tree {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Tree {
    fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join("src").join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write source");
    }
}

#[fixture]
fn tree() -> Tree {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8Path::from_path(temp.path())
        .expect("utf8 temp path")
        .to_owned();
    let tree = Tree { _temp: temp, root };
    tree.write("lib.rs", "pub mod domain;");
    tree.write("main.rs", "use clap::Parser; fn main() {}");
    tree.write(
        "domain/store.rs",
        "use std::sync::Mutex; pub struct Store(Mutex<u8>);",
    );
    tree.write(
        "inbound/cli/mod.rs",
        "use clap::Parser; use crate::domain::GoMateApp; pub fn run() {}",
    );
    tree.write(
        "outbound/storage/file_store.rs",
        "use cap_std::fs::Dir; pub struct Store(Dir);",
    );
    tree
}

#[rstest]
fn clean_tree_passes(tree: Tree) {
    lint_client_sources(&tree.root).expect("clean tree");
}

#[rstest]
fn nested_violations_are_found(tree: Tree) {
    tree.write(
        "domain/ports/gateway.rs",
        "use reqwest::Client; pub struct G(Client);",
    );
    tree.write(
        "inbound/cli/render.rs",
        "use crate::outbound::storage::file_store; pub fn f() {}",
    );

    let Err(LintFailure::Violations(violations)) = lint_client_sources(&tree.root) else {
        panic!("expected violations");
    };
    let mut files: Vec<_> = violations.iter().map(|v| v.file.as_str()).collect();
    files.sort_unstable();
    assert_eq!(files, ["domain/ports/gateway.rs", "inbound/cli/render.rs"]);
}

#[rstest]
fn missing_layers_are_skipped() {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8Path::from_path(temp.path()).expect("utf8 temp path");
    fs::create_dir_all(root.join("src/domain")).expect("create domain");
    lint_client_sources(root).expect("only domain present");
}

#[rstest]
fn missing_src_is_an_io_error() {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8Path::from_path(temp.path()).expect("utf8 temp path");
    assert!(matches!(
        lint_client_sources(root),
        Err(LintFailure::Io { .. })
    ));
}
