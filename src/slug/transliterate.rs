//! Script transliteration used before slug normalization.

use thiserror::Error;

/// Writing systems the transliterators know about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
    Cyrillic,
    Latin,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransliterationError {
    #[error("unsupported transliteration from {from:?} to {to:?}")]
    UnsupportedScripts { from: Script, to: Script },
}

/// Converts text written in one script into an approximation in another.
///
/// Implementations fail on input they can't handle; callers are expected to
/// fall back to the untouched text in that case.
pub trait Transliterator: Send + Sync {
    fn transliterate(
        &self,
        text: &str,
        from: Script,
        to: Script,
    ) -> Result<String, TransliterationError>;
}

/// Russian Cyrillic to Latin phonetic mapping.
///
/// Characters outside the Russian alphabet pass through unchanged. Hard and
/// soft signs become apostrophes, which slug normalization strips later.
#[derive(Clone, Copy, Debug, Default)]
pub struct RussianTransliterator;

fn latin_for(c: char) -> Option<&'static str> {
    let mapped = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "'",
        'ы' => "y",
        'ю' => "ju",
        'я' => "ja",
        _ => return None,
    };
    Some(mapped)
}

fn capitalize_into(out: &mut String, latin: &str) {
    let mut chars = latin.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}

impl Transliterator for RussianTransliterator {
    fn transliterate(
        &self,
        text: &str,
        from: Script,
        to: Script,
    ) -> Result<String, TransliterationError> {
        if from != Script::Cyrillic || to != Script::Latin {
            return Err(TransliterationError::UnsupportedScripts { from, to });
        }

        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            let is_upper = c.is_uppercase();
            let lower = c.to_lowercase().next().unwrap_or(c);
            match latin_for(lower) {
                Some(latin) if is_upper => capitalize_into(&mut out, latin),
                Some(latin) => out.push_str(latin),
                None => out.push(c),
            }
        }
        Ok(out)
    }
}
