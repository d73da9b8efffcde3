//! Email canonicalization.
//!
//! One normalization function is shared by everything that compares
//! addresses: invite membership tests, signature dedup, and the
//! bulk-invite parser. Two addresses denote the same participant iff
//! their normalized forms are equal.

/// Normalize an email address for comparison.
///
/// Trims and lowercases, then accepts only a minimal
/// `local@domain.tld` shape: no whitespace, exactly one `@`, and at
/// least one dot in the domain with non-empty pieces around it.
/// Anything else is treated as "not an email".
///
/// # Examples
/// ```
/// use pact_core::email::normalize_email;
///
/// assert_eq!(
///     normalize_email("  Jane@Example.COM "),
///     Some("jane@example.com".to_string())
/// );
/// assert_eq!(normalize_email("not-an-email"), None);
/// ```
pub fn normalize_email(input: &str) -> Option<String> {
    let cleaned = input.trim().to_lowercase();
    if cleaned.is_empty() || cleaned.chars().any(char::is_whitespace) {
        return None;
    }
    let (local, domain) = cleaned.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    let (host, tld) = domain.rsplit_once('.')?;
    if host.is_empty() || tld.is_empty() {
        return None;
    }
    Some(cleaned)
}

/// An entry in a bulk invite list that failed normalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invite email looks off: `{0}`")]
pub struct InvalidInviteEntry(pub String);

/// Parse a pasted invite list (comma or newline separated) into
/// normalized, deduplicated addresses in first-seen order.
///
/// The first entry that fails normalization rejects the whole batch,
/// so a typo never silently drops one invitee from the list.
pub fn parse_invite_list(raw: &str) -> Result<Vec<String>, InvalidInviteEntry> {
    let mut seen = Vec::new();
    for entry in raw.split(['\n', ',']) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let normalized =
            normalize_email(entry).ok_or_else(|| InvalidInviteEntry(entry.to_string()))?;
        if !seen.contains(&normalized) {
            seen.push(normalized);
        }
    }
    Ok(seen)
}
