//! Locale fallback for language maps.

use crate::model::LanguageMap;

/// Tag used for text with no specific language.
pub const UNDETERMINED: &str = "und";

/// Pick the most appropriate string in `map` for `locale`.
///
/// Tries the exact tag, then the primary subtag (`en` for `en-US`), then the
/// `und` entry, then the first entry. Empty strings are treated as missing.
/// Returns an empty string when nothing qualifies.
pub fn format_language_map<'a>(map: &'a LanguageMap, locale: &str) -> &'a str {
    let lookup = |tag: &str| map.get(tag).map(String::as_str).filter(|s| !s.is_empty());

    if let Some(exact) = lookup(locale) {
        return exact;
    }

    if let Some((primary, _)) = locale.split_once('-') {
        if let Some(base) = lookup(primary) {
            return base;
        }
    }

    lookup(UNDETERMINED)
        .or_else(|| map.values().next().map(String::as_str))
        .unwrap_or("")
}
