//! `gomate` command-line client.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use ortho_config::OrthoConfig;
use client::config::ClientSettings;
use client::domain::ports::{CatalogGateway, FixtureCatalogGateway, KeyValueStore};
use client::domain::{AppState, GoMateApp};
use client::inbound::cli::{self, CliArgs, render};
use client::outbound::dummyjson::DummyJsonGateway;
use client::outbound::storage::FileKeyValueStore;
use color_eyre::eyre::{Context, Result};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::WARN;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("gomate")])
        .context("load client settings")?;
    init_tracing(settings.log_json);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create Tokio runtime")?;
    runtime.block_on(async_main(args, settings))
}

fn init_tracing(json: bool) {
    let directives = env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, rejected) = log_filter(directives.as_deref());
    let builder = fmt().with_env_filter(filter).with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    match (result, rejected) {
        (Ok(()), Some(problem)) => warn!(%problem, "using the default log filter"),
        (Ok(()), None) => {}
        (Err(e), rejected) => {
            // No subscriber is listening, so report straight to stderr.
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "gomate: tracing init failed: {e}").ok();
            if let Some(problem) = rejected {
                writeln!(stderr, "gomate: {problem}").ok();
            }
        }
    }
}

/// Filter built from `RUST_LOG`, defaulting to `warn` when it is unset or
/// blank. An unparseable value also yields the default, together with a
/// description of what was rejected.
fn log_filter(directives: Option<&str>) -> (EnvFilter, Option<String>) {
    let default = || EnvFilter::default().add_directive(DEFAULT_LOG_LEVEL.into());
    match directives.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => (default(), None),
        Some(raw) => match EnvFilter::try_new(raw) {
            Ok(filter) => (filter, None),
            Err(err) => (
                default(),
                Some(format!("ignoring {}={raw:?}: {err}", EnvFilter::DEFAULT_ENV)),
            ),
        },
    }
}

async fn async_main(args: CliArgs, settings: ClientSettings) -> Result<()> {
    let gateway: Arc<dyn CatalogGateway> = if args.offline {
        Arc::new(FixtureCatalogGateway::default())
    } else {
        Arc::new(
            DummyJsonGateway::new(settings.api_base_url()?, settings.request_timeout())
                .context("build HTTP client")?,
        )
    };
    let storage_dir = settings.storage_dir();
    let storage: Arc<dyn KeyValueStore> = Arc::new(
        FileKeyValueStore::open(&storage_dir)
            .with_context(|| format!("open storage at {storage_dir}"))?,
    );

    let app = GoMateApp::new(
        AppState::default(),
        gateway,
        storage,
        settings.settlement_policy()?,
    );
    let report = app.launch().await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &report.favourites {
        Ok(load) => {
            if let Some(notice) = render::favourites_notice(load) {
                writeln!(out, "{notice}")?;
            }
        }
        Err(err) => writeln!(out, "warning: {err}")?,
    }

    cli::run(&app, args.command, &mut out).await?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unset(None)]
    #[case::blank(Some("  "))]
    fn missing_directives_use_the_default(#[case] directives: Option<&str>) {
        let (filter, rejected) = log_filter(directives);
        assert_eq!(filter.max_level_hint(), Some(DEFAULT_LOG_LEVEL));
        assert_eq!(rejected, None);
    }

    #[rstest]
    fn valid_directives_are_used() {
        let (filter, rejected) = log_filter(Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(rejected, None);
    }

    #[rstest]
    fn invalid_directives_fall_back_and_are_reported() {
        let (filter, rejected) = log_filter(Some("client=loud"));
        assert_eq!(filter.max_level_hint(), Some(DEFAULT_LOG_LEVEL));
        let problem = rejected.expect("rejection described");
        assert!(problem.contains("RUST_LOG"), "{problem}");
        assert!(problem.contains("client=loud"), "{problem}");
    }
}
