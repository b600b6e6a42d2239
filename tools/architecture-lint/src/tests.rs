//! Unit tests for layer inference and boundary rules.

use camino::Utf8PathBuf;
use rstest::rstest;

use super::*;

fn lint_one(file: &str, contents: &str) -> Result<(), LintFailure> {
    lint_sources(&[LintSource {
        file: Utf8PathBuf::from(file),
        contents: contents.to_owned(),
    }])
}

#[rstest]
#[case("domain/store.rs", "use crate::domain::Lifecycle; fn f() { let _ = 1; }", true)]
#[case("domain/store.rs", "use tokio::sync::watch; fn f() {}", true)]
#[case("domain/app.rs", "use crate::outbound::storage::FileKeyValueStore; fn f() {}", false)]
#[case("domain/app.rs", "fn f() { let _ = crate::inbound::cli::run; }", false)]
#[case("domain/ports/catalog_gateway.rs", "use reqwest::Client; fn f() {}", false)]
#[case("domain/theme.rs", "use camino::Utf8Path; fn f() {}", false)]
#[case("inbound/cli/mod.rs", "use clap::Parser; use crate::domain::GoMateApp; fn f() {}", true)]
#[case("inbound/cli/mod.rs", "use client::outbound::dummyjson::DummyJsonGateway; fn f() {}", false)]
#[case("inbound/cli/mod.rs", "use cap_std::fs::Dir; fn f() {}", false)]
#[case("outbound/storage/file_store.rs", "use cap_std::fs::Dir; use crate::domain::ports::KeyValueStore; fn f() {}", true)]
#[case("outbound/storage/file_store.rs", "use super::super::inbound::cli; fn f() {}", false)]
#[case("outbound/dummyjson/http_gateway.rs", "use clap::Parser; fn f() {}", false)]
fn enforces_layer_boundaries(#[case] file: &str, #[case] contents: &str, #[case] ok: bool) {
    let result = lint_one(file, contents);
    assert_eq!(result.is_ok(), ok, "result: {result:?}");
}

#[rstest]
fn violations_name_the_layer_and_dependency() {
    let Err(LintFailure::Violations(violations)) =
        lint_one("domain/app.rs", "use reqwest::Client; use crate::outbound::x; fn f() {}")
    else {
        panic!("expected violations");
    };
    let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "domain code must not depend on client::outbound",
            "domain code must not depend on external crate `reqwest`",
        ]
    );
    assert!(violations.iter().all(|v| v.file == "domain/app.rs"));
}

#[rstest]
#[case("config.rs")]
#[case("main.rs")]
fn files_outside_layers_are_rejected(#[case] file: &str) {
    assert!(matches!(
        lint_one(file, "fn f() {}"),
        Err(LintFailure::Parse { .. })
    ));
}

#[rstest]
fn unparsable_sources_are_reported() {
    let result = lint_one("domain/broken.rs", "fn f( {");
    assert!(matches!(result, Err(LintFailure::Parse { file, .. }) if file == "domain/broken.rs"));
}
