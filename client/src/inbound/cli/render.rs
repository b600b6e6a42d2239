//! Plain-text rendering of client state for terminal output.

use std::io::{self, Write};

use crate::domain::{
    AppState, CatalogPage, Destination, FavouritesLoad, PersistOutcome, ThemeMode, UserProfile,
};

/// One catalogue row: id, title, price and favourite marker.
pub fn destination_line(entry: &Destination, favourite: bool) -> String {
    let marker = if favourite { '*' } else { ' ' };
    format!(
        "{marker} {:>4}  {}  ${}  ({:.1})",
        entry.id, entry.title, entry.price, entry.rating
    )
}

/// Write a page of results followed by a paging footer.
pub fn write_page(
    out: &mut impl Write,
    page: &CatalogPage,
    is_favourite: impl Fn(&Destination) -> bool,
) -> io::Result<()> {
    if page.entries.is_empty() {
        return writeln!(out, "No destinations found.");
    }
    for entry in &page.entries {
        writeln!(out, "{}", destination_line(entry, is_favourite(entry)))?;
    }
    let info = page.info();
    let last = info.skip.saturating_add(page.entries.len() as u64);
    writeln!(out, "showing {}-{} of {}", info.skip + 1, last, info.total)?;
    if info.has_more() {
        writeln!(out, "more available with --skip {last}")?;
    }
    Ok(())
}

/// Write the details view for one destination.
pub fn write_details(out: &mut impl Write, entry: &Destination, favourite: bool) -> io::Result<()> {
    writeln!(out, "{}", entry.title)?;
    if let Some(location) = &entry.location {
        writeln!(out, "  location: {location}")?;
    }
    writeln!(out, "  category: {}", entry.category)?;
    writeln!(out, "  price:    ${}", entry.price)?;
    writeln!(out, "  rating:   {:.1}", entry.rating)?;
    if let Some(duration) = &entry.duration {
        writeln!(out, "  duration: {duration}")?;
    }
    if !entry.tags.is_empty() {
        writeln!(out, "  tags:     {}", entry.tags.join(", "))?;
    }
    writeln!(out, "  favourite: {}", if favourite { "yes" } else { "no" })?;
    writeln!(out)?;
    writeln!(out, "{}", entry.description)
}

/// Write the signed-in user, or a hint when nobody is signed in.
pub fn write_session(out: &mut impl Write, state: &AppState) -> io::Result<()> {
    match state.session.user() {
        Some(user) if state.session.is_authenticated() => write_profile(out, user),
        _ => {
            if let Some(error) = state.session.error() {
                writeln!(out, "Not signed in: {error}")
            } else {
                writeln!(out, "Not signed in.")
            }
        }
    }
}

/// Write a user's profile.
pub fn write_profile(out: &mut impl Write, user: &UserProfile) -> io::Result<()> {
    let name = format!("{} {}", user.first_name, user.last_name);
    let name = name.trim();
    if name.is_empty() {
        writeln!(out, "Signed in as {}", user.username)?;
    } else {
        writeln!(out, "Signed in as {} ({name})", user.username)?;
    }
    if !user.email.is_empty() {
        writeln!(out, "  email: {}", user.email)?;
    }
    Ok(())
}

/// Write the favourites list.
pub fn write_favourites(out: &mut impl Write, favourites: &[Destination]) -> io::Result<()> {
    if favourites.is_empty() {
        return writeln!(out, "No favourites yet.");
    }
    for entry in favourites {
        writeln!(out, "{}", destination_line(entry, true))?;
    }
    Ok(())
}

/// Describe a favourites mutation.
pub fn write_toggle(
    out: &mut impl Write,
    entry: &Destination,
    now_favourite: bool,
    outcome: &PersistOutcome,
) -> io::Result<()> {
    let verb = if now_favourite { "Added" } else { "Removed" };
    writeln!(out, "{verb} {} ({})", entry.title, entry.id)?;
    if !outcome.is_persisted() {
        writeln!(out, "warning: favourites could not be saved")?;
    }
    Ok(())
}

/// Describe what launch-time favourites loading found.
pub fn favourites_notice(load: &FavouritesLoad) -> Option<String> {
    match load {
        FavouritesLoad::Recovered { reason } => {
            Some(format!("Stored favourites were unreadable and have been reset ({reason})."))
        }
        FavouritesLoad::Restored(_) | FavouritesLoad::Empty => None,
    }
}

/// Write the theme with its palette.
pub fn write_theme(out: &mut impl Write, mode: ThemeMode) -> io::Result<()> {
    let palette = mode.palette();
    writeln!(out, "theme: {mode}")?;
    writeln!(out, "  background: {}", palette.background)?;
    writeln!(out, "  text:       {}", palette.text)?;
    writeln!(out, "  primary:    {}", palette.primary)
}
