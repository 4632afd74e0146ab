//! Painting slug (`unique_title`) generation.
//!
//! A slug is derived from a painting's title and optional year:
//! transliterate, normalize, append the year, then probe the store for
//! collisions and append a numeric suffix until the candidate is free.

mod normalize;
mod resolver;
mod transliterate;

pub use normalize::normalize;
pub use resolver::{base_candidate, resolve, ResolveError, SlugPolicy, DEFAULT_MAX_SUFFIX_ATTEMPTS};
pub use transliterate::{RussianTransliterator, Script, TransliterationError, Transliterator};

use std::sync::Arc;

/// Transliterator and resolution bounds bundled for the store.
#[derive(Clone)]
pub struct SlugGenerator {
    transliterator: Arc<dyn Transliterator>,
    policy: SlugPolicy,
}

impl SlugGenerator {
    pub fn new(transliterator: Arc<dyn Transliterator>, policy: SlugPolicy) -> Self {
        SlugGenerator {
            transliterator,
            policy,
        }
    }

    pub fn policy(&self) -> SlugPolicy {
        self.policy
    }

    pub fn normalize(&self, title: &str) -> String {
        normalize(title, self.transliterator.as_ref())
    }

    /// Normalizes `title` and resolves it into a slug no other record uses.
    pub fn generate<E, F>(
        &self,
        title: &str,
        year: Option<i32>,
        exists: F,
        exclude_id: Option<i64>,
    ) -> Result<String, ResolveError<E>>
    where
        F: FnMut(&str, Option<i64>) -> Result<bool, E>,
    {
        resolve(&self.normalize(title), year, exists, exclude_id, self.policy)
    }
}

impl Default for SlugGenerator {
    fn default() -> Self {
        SlugGenerator::new(Arc::new(RussianTransliterator), SlugPolicy::default())
    }
}
