use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::transliterate::{Script, Transliterator};

lazy_static! {
    static ref SEPARATORS: Regex =
        Regex::new(r"[ \-,:;—–]").expect("separator regex is valid");
    static ref DISALLOWED: Regex =
        Regex::new(r"[^a-zа-яё0-9_]").expect("disallowed characters regex is valid");
}

/// Turns a free-text title into the lowercase, underscore-delimited token
/// sequence used as the base of a painting slug.
///
/// An all-punctuation title normalizes to the empty string.
pub fn normalize(title: &str, transliterator: &dyn Transliterator) -> String {
    let latin = match transliterator.transliterate(title, Script::Cyrillic, Script::Latin) {
        Ok(latin) => latin,
        Err(err) => {
            debug!("Transliteration failed for {:?}, using raw title: {}", title, err);
            title.to_owned()
        }
    };

    let lowered = latin.to_lowercase();
    let separated = SEPARATORS.replace_all(&lowered, "_");
    DISALLOWED.replace_all(&separated, "").into_owned()
}
