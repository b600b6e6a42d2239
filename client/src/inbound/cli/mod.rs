//! Command-line driving adapter.
//!
//! Each subcommand maps onto one [`GoMateApp`] operation and renders the
//! resulting state as plain text.

pub mod render;

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::domain::ports::StorageError;
use crate::domain::{
    DEFAULT_PAGE_LIMIT, EntryId, Error, GoMateApp, LoginValidationError, ThemeMode,
    validate_login_form,
};

/// `gomate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gomate",
    about = "Browse travel destinations, manage favourites and your session",
    version
)]
pub struct CliArgs {
    /// Serve a built-in catalogue instead of calling the API.
    #[arg(long, global = true)]
    pub offline: bool,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Sign in and remember the session.
    Login {
        /// Account name.
        #[arg(long, short)]
        username: String,
        /// Account password.
        #[arg(long, short)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Erase all locally stored data, including an unreadable store file.
    Reset,
    /// Show the signed-in user.
    Status {
        /// Re-fetch the profile from the server.
        #[arg(long)]
        refresh: bool,
    },
    /// List destinations page by page.
    List {
        /// Page size.
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u64,
        /// Entries to skip.
        #[arg(long, default_value_t = 0)]
        skip: u64,
        /// Restrict to one category.
        #[arg(long)]
        category: Option<String>,
    },
    /// Search destinations by text.
    Search {
        /// Search text; blank lists the first page.
        query: String,
    },
    /// Show one destination.
    Show {
        /// Destination identifier.
        id: u64,
    },
    /// List categories.
    Categories,
    /// List favourites.
    Favourites,
    /// Add or remove a destination from favourites.
    Toggle {
        /// Destination identifier.
        id: u64,
    },
    /// Show, set or flip the colour scheme.
    Theme {
        /// `light` or `dark`.
        #[arg(value_parser = parse_theme, conflicts_with = "toggle")]
        mode: Option<ThemeMode>,
        /// Switch to the other scheme.
        #[arg(long)]
        toggle: bool,
    },
}

fn parse_theme(raw: &str) -> Result<ThemeMode, String> {
    raw.parse().map_err(|err: crate::domain::UnknownTheme| err.to_string())
}

/// Failures surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    /// Login input failed validation before any request.
    #[error(transparent)]
    Validation(#[from] LoginValidationError),
    /// A client operation failed.
    #[error(transparent)]
    Domain(#[from] Error),
    /// Persisted state could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Writing output failed.
    #[error("write output: {0}")]
    Io(#[from] io::Error),
}

/// Execute `command` against `app`, writing human-readable output to `out`.
///
/// # Errors
///
/// Returns [`CliError`] when validation, the operation or output fails.
pub async fn run(app: &GoMateApp, command: Command, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        Command::Login { username, password } => {
            let credentials = validate_login_form(&username, &password)?;
            let signed_in = app
                .login(credentials.username(), credentials.password())
                .await?;
            render::write_profile(out, &signed_in.user)?;
        }
        Command::Logout => {
            app.logout().await?;
            writeln!(out, "Signed out.")?;
        }
        Command::Reset => {
            app.reset().await?;
            writeln!(out, "Local data erased.")?;
        }
        Command::Status { refresh } => {
            if refresh {
                app.refresh_profile().await?;
            }
            render::write_session(out, &app.state())?;
        }
        Command::List {
            limit,
            skip,
            category,
        } => {
            let page = match category {
                Some(category) => app.fetch_by_category(&category).await?,
                None => app.fetch_catalog(limit, skip).await?,
            };
            render::write_page(out, &page, |entry| app.is_favourite(entry.id))?;
        }
        Command::Search { query } => {
            let page = app.search_catalog(&query).await?;
            render::write_page(out, &page, |entry| app.is_favourite(entry.id))?;
        }
        Command::Show { id } => {
            let id = EntryId::new(id);
            let entry = app.fetch_entry(id).await?;
            render::write_details(out, &entry, app.is_favourite(id))?;
        }
        Command::Categories => {
            for category in app.fetch_categories().await? {
                writeln!(out, "{category}")?;
            }
        }
        Command::Favourites => {
            render::write_favourites(out, app.state().favourites.items())?;
        }
        Command::Toggle { id } => {
            let entry = app.fetch_entry(EntryId::new(id)).await?;
            let outcome = app.toggle_favourite(entry.clone()).await;
            render::write_toggle(out, &entry, app.is_favourite(entry.id), &outcome)?;
        }
        Command::Theme { mode, toggle } => {
            let mode = match (mode, toggle) {
                (Some(mode), _) => {
                    app.set_theme(mode).await?;
                    mode
                }
                (None, true) => app.toggle_theme().await?,
                (None, false) => app.load_theme().await,
            };
            render::write_theme(out, mode)?;
        }
    }
    Ok(())
}
