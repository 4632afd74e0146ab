use thiserror::Error;

/// Default number of numeric suffixes tried before giving up.
pub const DEFAULT_MAX_SUFFIX_ATTEMPTS: u32 = 100;

/// Bounds for collision resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlugPolicy {
    pub max_attempts: u32,
}

impl Default for SlugPolicy {
    fn default() -> Self {
        SlugPolicy {
            max_attempts: DEFAULT_MAX_SUFFIX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError<E> {
    #[error("no free slug for base {base:?} after {attempts} attempts")]
    Exhausted { base: String, attempts: u32 },
    #[error(transparent)]
    Probe(E),
}

/// Slug candidate before any collision suffix: the normalized title, followed
/// by `_{year}` when a year is present. A year of zero counts as absent.
pub fn base_candidate(normalized_title: &str, year: Option<i32>) -> String {
    match year {
        Some(year) if year != 0 => format!("{}_{}", normalized_title, year),
        _ => normalized_title.to_owned(),
    }
}

/// Finds the first candidate not already taken.
///
/// `exists` is asked whether a candidate collides with a stored record other
/// than `exclude_id`. The bare base is tried first, then `base_1`, `base_2`,
/// and so on up to `policy.max_attempts` suffixes.
pub fn resolve<E, F>(
    normalized_title: &str,
    year: Option<i32>,
    mut exists: F,
    exclude_id: Option<i64>,
    policy: SlugPolicy,
) -> Result<String, ResolveError<E>>
where
    F: FnMut(&str, Option<i64>) -> Result<bool, E>,
{
    let base = base_candidate(normalized_title, year);
    if !exists(&base, exclude_id).map_err(ResolveError::Probe)? {
        return Ok(base);
    }

    for suffix in 1..=policy.max_attempts {
        let candidate = format!("{}_{}", base, suffix);
        if !exists(&candidate, exclude_id).map_err(ResolveError::Probe)? {
            return Ok(candidate);
        }
    }

    Err(ResolveError::Exhausted {
        base,
        attempts: policy.max_attempts,
    })
}
