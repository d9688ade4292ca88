//! Slug derivation and collision probing.

use stackassign_core::{DomainError, DomainResult};

/// Cap on sequential collision probes before giving up with a conflict.
///
/// The probing loop in the original ran unbounded; a collision storm (many
/// same-titled entries, or an oracle that always says "taken") must surface
/// an error instead of spinning.
pub const MAX_SLUG_ATTEMPTS: u32 = 64;

/// Derive the deterministic base slug for a title.
///
/// Lowercases, collapses every maximal run of non-alphanumeric characters to
/// a single hyphen, and strips leading/trailing hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Resolve a unique slug for `title` against an existence oracle.
///
/// Probes `base`, `base-1`, `base-2`, ... sequentially, consulting the oracle
/// before each candidate — the oracle is the single source of truth and may
/// change between probes under concurrent writers, so there is no batch
/// lookup. The persistence layer's uniqueness constraint remains the backstop
/// for the race this leaves open; callers must treat a reservation conflict
/// as "re-probe".
pub fn unique_slug<F>(title: &str, mut exists: F) -> DomainResult<String>
where
    F: FnMut(&str) -> bool,
{
    let base = slugify(title);
    if base.is_empty() {
        return Err(DomainError::validation(
            "title does not produce a usable slug",
        ));
    }

    if !exists(&base) {
        return Ok(base);
    }

    for counter in 1..MAX_SLUG_ATTEMPTS {
        let candidate = format!("{base}-{counter}");
        if !exists(&candidate) {
            return Ok(candidate);
        }
    }

    Err(DomainError::conflict(format!(
        "no unique slug for '{base}' within {MAX_SLUG_ATTEMPTS} attempts"
    )))
}
