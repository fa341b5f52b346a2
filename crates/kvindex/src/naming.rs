//! Key canonicalization and table naming.
//!
//! Index identity must not depend on the order in which keys were given, so
//! every key list is deduplicated and sorted before use.

/// Deduplicate and sort attribute names.
///
/// The result is idempotent and independent of input order.
///
/// # Example
///
/// ```
/// use kvindex::naming::canonicalize;
///
/// assert_eq!(
///     canonicalize(["gamma", "alpha", "beta", "alpha"]),
///     vec!["alpha", "beta", "gamma"],
/// );
/// ```
#[must_use]
pub fn canonicalize<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keys: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
    keys.sort();
    keys.dedup();
    keys
}

/// Pluralize an attribute name for use in a table name.
///
/// Only the trailing word is inflected: `created_at` becomes `created_ats`,
/// `status` becomes `statuses`, `category` becomes `categories`.
#[must_use]
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix(['y', 'Y']) {
        let preceded_by_consonant = stem
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphabetic() && !"aeiouAEIOU".contains(c));
        if preceded_by_consonant {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

/// Build `<namespace>_index_<prefix>_<key1s>_and_<key2s>...`.
#[must_use]
pub fn table_name(namespace: &str, prefix: &str, keys: &[String]) -> String {
    let keys = keys
        .iter()
        .map(|k| pluralize(k))
        .collect::<Vec<_>>()
        .join("_and_");
    format!("{namespace}_index_{prefix}_{keys}")
}
