//! URL/path utilities shared by the route trie and the dispatchers.

use crate::error::{HubError, HubResult};

/// Lower-cases `path`, strips one leading `/`, and collapses redundant separators
/// (`.`, `..`, and repeated `/`). Returns `""` iff the input is empty.
pub fn canonicalise(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let lowered = path.to_lowercase();
    let stripped = lowered.strip_prefix('/').unwrap_or(&lowered);
    clean(stripped)
}

/// Collapses `.`, `..`, and repeated `/` the way a standard path cleaner would, without
/// resolving against a filesystem root (this is a pure string operation over path segments).
fn clean(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}

/// Splits `path` into lower-cased, non-empty fragments. Rejects empty input.
pub fn fragments(path: &str) -> HubResult<Vec<String>> {
    if path.is_empty() {
        return Err(HubError::NotFound);
    }
    let frags: Vec<String> = path
        .to_lowercase()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    if frags.is_empty() {
        return Err(HubError::NotFound);
    }
    Ok(frags)
}

/// True iff `fragment`'s first byte is `:`.
pub fn is_param(fragment: &str) -> bool {
    fragment.starts_with(':')
}

/// Produces `":<n>"`, the listen-address suffix form used by the server wrapper.
pub fn format_port(n: u16) -> String {
    format!(":{}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalise_lowercases_and_strips_leading_slash() {
        assert_eq!(canonicalise("/Customers/42/Balances"), "customers/42/balances");
    }

    #[test]
    fn canonicalise_collapses_separators() {
        assert_eq!(canonicalise("//a//b/./c/../d"), "a/b/d");
    }

    #[test]
    fn canonicalise_empty_is_empty() {
        assert_eq!(canonicalise(""), "");
    }

    #[test]
    fn fragments_rejects_empty() {
        assert!(fragments("").is_err());
    }

    #[test]
    fn fragments_lowercases() {
        assert_eq!(fragments("Customers/42").unwrap(), vec!["customers", "42"]);
    }

    #[test]
    fn is_param_detects_colon_prefix() {
        assert!(is_param(":id"));
        assert!(!is_param("id"));
    }

    #[test]
    fn format_port_produces_colon_prefixed_string() {
        assert_eq!(format_port(8080), ":8080");
    }
}
