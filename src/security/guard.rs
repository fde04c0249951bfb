use crate::errors::ValidationError;
use std::path::Path;

/// Path components that are rejected outright when they appear verbatim in
/// the caller-supplied string.
const DANGEROUS_COMPONENTS: &[&str] = &[".", "..", "~", "$"];

/// Rejects traversal attempts visible in the original, pre-resolution
/// string: a `..` next to a separator in either convention, or any
/// component that is exactly `.`, `..`, `~`, or `$`. Runs before any
/// filesystem work so the most common attack strings are denied cheaply.
pub fn lexical_check(original: &str) -> Result<(), ValidationError> {
    let deny = || ValidationError::PathTraversal {
        path: original.to_string(),
    };
    for pattern in ["../", "..\\", "/..", "\\.."] {
        if original.contains(pattern) {
            return Err(deny());
        }
    }
    for component in original.split(['/', '\\']) {
        if DANGEROUS_COMPONENTS.contains(&component) {
            return Err(deny());
        }
    }
    Ok(())
}

/// Component-wise containment: `resolved` must be `root` itself or a true
/// descendant. `Path::starts_with` compares whole components, so
/// `/home/alice-evil` is not inside `/home/alice`.
pub fn check_containment(
    original: &str,
    resolved: &Path,
    root: &Path,
) -> Result<(), ValidationError> {
    if resolved.starts_with(root) {
        Ok(())
    } else {
        // Echo only the caller's string; the resolved path may name
        // something outside the root.
        Err(ValidationError::PathTraversal {
            path: original.to_string(),
        })
    }
}

/// Both guards in sequence. Lexical rejection is fast and auditable;
/// containment on the resolved path is the authoritative check and covers
/// strings the lexical filter cannot see (absolute overrides, mixed
/// separators).
pub fn check(original: &str, resolved: &Path, root: &Path) -> Result<(), ValidationError> {
    lexical_check(original)?;
    check_containment(original, resolved, root)
}
