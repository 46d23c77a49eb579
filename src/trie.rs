//! Parameterised route trie: registration, resolution, and ambiguity rules.
//!
//! A node is a pure tree keyed by fragment text (including the leading `:` for parameter
//! children); ownership is unique parent-to-child, lookups never follow back-edges, so a plain
//! owned-tree representation suffices — no `Rc`/`Arc` needed for the structure itself.

use std::collections::HashMap;

use crate::error::{HubError, HubResult};
use crate::url;

#[derive(Default)]
struct TrieNode {
    complete: bool,
    children: HashMap<String, Box<TrieNode>>,
}

impl TrieNode {
    fn new() -> Self {
        Self::default()
    }
}

/// A captured `name -> value` mapping produced by a successful resolution.
pub type PathParams = HashMap<String, String>;

/// Parameterised route trie over canonical paths.
#[derive(Default)]
pub struct RouteTrie {
    root: TrieNode,
}

impl RouteTrie {
    pub fn new() -> Self {
        Self { root: TrieNode::new() }
    }

    /// Registers `template`, returning its canonical form.
    ///
    /// Rejects empty templates, templates that repeat a parameter name, and templates that are
    /// already registered (including ones structurally equal after parameter renaming — those
    /// resolve to the same complete terminal as the original).
    pub fn add(&mut self, template: &str) -> HubResult<String> {
        let frags = url::fragments(template).map_err(|_| HubError::NotFound)?;
        reject_empty(template, &frags)?;
        check_duplicate_params(template, &frags)?;

        if self.resolve(template).is_ok() {
            return Err(HubError::RouteAlreadyRegistered { template: template.to_string() });
        }

        let mut node = &mut self.root;
        for frag in &frags {
            node = node.children.entry(frag.clone()).or_insert_with(|| Box::new(TrieNode::new()));
        }
        node.complete = true;

        Ok(frags.join("/"))
    }

    /// Resolves a concrete request path against the trie.
    ///
    /// Returns the matched template (parameter fragments still `:NAME`) and the captured
    /// parameter map. Literal children take priority over parameter children; among parameter
    /// children, iteration order is deterministic for a given trie state but unspecified.
    pub fn resolve(&self, path: &str) -> HubResult<(String, PathParams)> {
        let frags = url::fragments(path).map_err(|_| HubError::NotFound)?;
        let (template_frags, params) = resolve_node(&self.root, &frags)?;
        Ok((template_frags.join("/"), params))
    }
}

fn reject_empty(template: &str, frags: &[String]) -> HubResult<()> {
    if template.is_empty() || frags.is_empty() {
        return Err(HubError::NotFound);
    }
    Ok(())
}

fn check_duplicate_params(template: &str, frags: &[String]) -> HubResult<()> {
    let mut seen = std::collections::HashSet::new();
    for frag in frags {
        if url::is_param(frag) {
            let name = &frag[1..];
            if !seen.insert(name.to_string()) {
                return Err(HubError::DuplicateParamInRoute {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Recursive depth-first resolution with backtracking: try the literal child first, then each
/// parameter child in insertion order, returning on the first success.
fn resolve_node(node: &TrieNode, remaining: &[String]) -> HubResult<(Vec<String>, PathParams)> {
    let Some((head, tail)) = remaining.split_first() else {
        return if node.complete {
            Ok((Vec::new(), PathParams::new()))
        } else {
            Err(HubError::NotFound)
        };
    };

    if let Some(child) = node.children.get(head) {
        if let Ok((mut template, params)) = resolve_node(child, tail) {
            template.insert(0, head.clone());
            return Ok((template, params));
        }
    }

    for (key, child) in &node.children {
        if !url::is_param(key) {
            continue;
        }
        if let Ok((mut template, mut params)) = resolve_node(child, tail) {
            template.insert(0, key.clone());
            params.insert(key[1..].to_string(), head.clone());
            return Ok((template, params));
        }
    }

    Err(HubError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_register_and_resolve_with_capture() {
        let mut trie = RouteTrie::new();
        trie.add("customers/:id/balances").unwrap();
        let (template, params) = trie.resolve("CUSTOMERS/42/balances").unwrap();
        assert_eq!(template, "customers/:id/balances");
        assert_eq!(params.get("id"), Some(&"42".to_string()));
    }

    #[test]
    fn s2_literal_and_param_siblings() {
        let mut trie = RouteTrie::new();
        trie.add("students/:id").unwrap();
        trie.add("students/active").unwrap();

        let (template, params) = trie.resolve("students/active").unwrap();
        assert_eq!(template, "students/active");
        assert!(params.is_empty());

        let (template, params) = trie.resolve("students/99").unwrap();
        assert_eq!(template, "students/:id");
        assert_eq!(params.get("id"), Some(&"99".to_string()));
    }

    #[test]
    fn s3_duplicate_param_in_one_template_rejected() {
        let mut trie = RouteTrie::new();
        let err = trie.add("a/:x/:x").unwrap_err();
        assert!(matches!(err, HubError::DuplicateParamInRoute { .. }));
        // trie unchanged: any path that would've matched must still 404.
        assert!(trie.resolve("a/1/2").is_err());
    }

    #[test]
    fn registering_same_template_twice_fails() {
        let mut trie = RouteTrie::new();
        trie.add("a/b").unwrap();
        let err = trie.add("a/b").unwrap_err();
        assert!(matches!(err, HubError::RouteAlreadyRegistered { .. }));
    }

    #[test]
    fn structurally_equal_after_renaming_is_rejected() {
        let mut trie = RouteTrie::new();
        trie.add("a/:x/b").unwrap();
        let err = trie.add("a/:y/b").unwrap_err();
        assert!(matches!(err, HubError::RouteAlreadyRegistered { .. }));
    }

    #[test]
    fn literal_route_sharing_shape_with_param_route_is_allowed() {
        // Grounded on original_source/route/route_test.go TestGetRoute.
        let mut trie = RouteTrie::new();
        trie.add("another/:param/route").unwrap();
        trie.add("another/param/route").unwrap();

        let (template, params) = trie.resolve("another/43434/route").unwrap();
        assert_eq!(template, "another/:param/route");
        assert_eq!(params.get("param"), Some(&"43434".to_string()));

        // A concrete value of "3" still falls through to the param branch, not the literal one.
        let (template, params) = trie.resolve("another/3/route").unwrap();
        assert_eq!(template, "another/:param/route");
        assert_eq!(params.get("param"), Some(&"3".to_string()));

        // The exact literal path takes the literal branch.
        let (template, params) = trie.resolve("another/param/route").unwrap();
        assert_eq!(template, "another/param/route");
        assert!(params.is_empty());
    }

    #[test]
    fn s5_all_parameter_template_is_legal() {
        let mut trie = RouteTrie::new();
        trie.add(":a/:b/:c").unwrap();
        let (template, params) = trie.resolve("1/2/3").unwrap();
        assert_eq!(template, ":a/:b/:c");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn unresolved_path_is_not_found() {
        let mut trie = RouteTrie::new();
        trie.add("a/b").unwrap();
        assert!(matches!(trie.resolve("a/c").unwrap_err(), HubError::NotFound));
        assert!(matches!(trie.resolve("a").unwrap_err(), HubError::NotFound));
    }

    #[test]
    fn idempotent_canonicalisation() {
        let mut trie = RouteTrie::new();
        let canonical = trie.add("A/:id/B").unwrap();
        assert_eq!(canonical, "a/:id/b");

        // Resolving the template text itself (still containing ":id") matches the literal
        // child key verbatim and yields no captured params.
        let (resolved, params) = trie.resolve(&canonical).unwrap();
        assert_eq!(resolved, canonical);
        assert!(params.is_empty());

        // A concrete value resolves to the same template with the value captured.
        let (resolved, params) = trie.resolve(&canonical.replace(":id", "7")).unwrap();
        assert_eq!(resolved, "a/:id/b");
        assert_eq!(params.get("id"), Some(&"7".to_string()));
    }
}
