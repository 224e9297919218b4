//! Correlation-key (UTM) resolution.
//!
//! Campaign names are authored by marketing operators who embed a tracking
//! identifier inconsistently: sometimes parenthesized, sometimes as a leading
//! numeric token separated by a space or underscore. This cascade recovers the
//! identifier without requiring operator discipline; when nothing matches, the
//! platform-assigned campaign id stands in so the key is always present.

/// Resolve the correlation key for a campaign name, falling back to the
/// platform campaign id. Deterministic, total, no side effects.
///
/// Precedence, first match wins:
/// 1. a numeric parenthesized substring: `"Push (482913) Q4"` -> `"482913"`
/// 2. leading numeric token split on spaces: `"482913 Holiday"` -> `"482913"`
/// 3. leading numeric token split on underscores: `"482913_holiday"` -> `"482913"`
/// 4. the fallback id
pub fn resolve(name: &str, fallback_id: &str) -> String {
    if let Some(open) = name.split_once('(') {
        if let Some((inner, _)) = open.1.split_once(')') {
            if is_numeric(inner) {
                return inner.to_string();
            }
        }
    }

    let spaced: Vec<&str> = name.split(' ').collect();
    if spaced.len() > 1 && is_numeric(spaced[0]) {
        return spaced[0].to_string();
    }

    let scored: Vec<&str> = name.split('_').collect();
    if scored.len() > 1 && is_numeric(scored[0]) {
        return scored[0].to_string();
    }

    fallback_id.to_string()
}

/// True when `s` is non-empty and consists solely of ASCII digits.
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
