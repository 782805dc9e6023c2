//! Name checks and parsing shared by connectors.

/// Returns true if every character of `name` is ASCII.
///
/// REST-addressed targets cannot resolve multibyte database or table names,
/// so the driver skips such tables instead of issuing a call.
#[must_use]
pub fn is_addressable_name(name: &str) -> bool {
    name.is_ascii()
}

/// Splits a whitespace-separated list of names, e.g. a database allow-list.
#[must_use]
pub fn split_name_list(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
