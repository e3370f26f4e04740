use log::warn;

/// Environment variable consulted for the default concurrency ceiling.
pub const CONCURRENCY_ENV_VAR: &str = "ARNIE_QUOTES_CONCURRENCY";

/// Ceiling applied when the environment does not provide a usable value.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;

/// Runtime settings that control how many requests may be in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyConfig {
    pub limit: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

impl ConcurrencyConfig {
    /// Read the ceiling from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the ceiling through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(CONCURRENCY_ENV_VAR);
        let limit = parse_concurrency_limit(raw.as_deref());

        if let Some(value) = raw.as_deref() {
            if validate_limit(value).is_none() {
                warn!(
                    "Ignoring invalid {}={:?}; using default of {}",
                    CONCURRENCY_ENV_VAR, value, DEFAULT_CONCURRENCY_LIMIT
                );
            }
        }

        Self { limit }
    }
}

/// Parse a raw setting into a concurrency ceiling, falling back to the default
/// for unset, empty, non-numeric, zero or negative values.
pub fn parse_concurrency_limit(raw: Option<&str>) -> usize {
    raw.and_then(validate_limit)
        .unwrap_or(DEFAULT_CONCURRENCY_LIMIT)
}

fn validate_limit(raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(limit) => Some(limit),
    }
}

/// Pick the caller's requested ceiling, treating `None` and zero as unset.
#[inline]
pub fn resolve_limit(requested: Option<usize>, default: usize) -> usize {
    match requested {
        Some(limit) if limit > 0 => limit,
        _ => default.max(1),
    }
}
