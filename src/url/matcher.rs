/// Checks if a link ends with any banned suffix, ignoring case
///
/// Suffix entries are expected in lowercase.
///
/// # Examples
///
/// ```
/// use moldweb::url::has_banned_suffix;
///
/// let suffixes = vec![".pdf".to_string(), ".zip".to_string()];
/// assert!(has_banned_suffix("https://example.com/Paper.PDF", &suffixes));
/// assert!(!has_banned_suffix("https://example.com/paper.html", &suffixes));
/// ```
pub fn has_banned_suffix(link: &str, suffixes: &[String]) -> bool {
    let lowered = link.to_lowercase();
    suffixes.iter().any(|suffix| lowered.ends_with(suffix.as_str()))
}

/// Checks if any needle occurs somewhere in `haystack`
///
/// Used for the boring domain and boring word lists, which match anywhere in a
/// link.
pub fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| !needle.is_empty() && haystack.contains(needle.as_str()))
}

/// Checks if `phrase` equals one of the disallowed phrases exactly
///
/// Callers lowercase the phrase; list entries are lowercased at load time.
pub fn is_disallowed_phrase(phrase: &str, disallowed: &[String]) -> bool {
    disallowed.iter().any(|entry| entry == phrase)
}
