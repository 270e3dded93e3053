//! Decorator pattern matching shared across language extractors (C1).
//!
//! A decorator expression like `@app.route("/users", methods=["GET"])` is
//! decomposed into a `(decorator_name, object_name)` pair and matched
//! against configured patterns to derive `decorator_argument` edges and
//! entry-point flags.

use regex::Regex;

/// The decomposed shape of a decorator expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorName {
    pub name: String,
    pub object: Option<String>,
}

/// Decompose a decorator's callee text (already stripped of `@` and any
/// call-argument list) into `(name, object)`:
/// - `foo` -> `(foo, None)`
/// - `a.b` -> `(b, Some(a))`
/// - `x.y.z` -> `(z, Some(x.y))`
pub fn decompose_decorator(callee: &str) -> DecoratorName {
    match callee.rsplit_once('.') {
        Some((object, name)) => DecoratorName {
            name: name.to_string(),
            object: Some(object.to_string()),
        },
        None => DecoratorName {
            name: callee.to_string(),
            object: None,
        },
    }
}

/// A pattern that, when a decorator matches, emits `decorator_argument`
/// edges for each of `argument_names` found as a keyword argument in the
/// decorator call.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    pub decorator_name: Regex,
    pub object_name: Option<Regex>,
    pub argument_names: Vec<String>,
}

impl ReferencePattern {
    pub fn matches(&self, decorator: &DecoratorName) -> bool {
        if !self.decorator_name.is_match(&decorator.name) {
            return false;
        }
        match (&self.object_name, &decorator.object) {
            (None, _) => true,
            (Some(pattern), Some(object)) => pattern.is_match(object),
            (Some(_), None) => false,
        }
    }
}

/// A pattern that, when a decorator matches, flags the decorated symbol as
/// an entry point.
#[derive(Debug, Clone)]
pub struct EntryPointPattern {
    pub decorator_name: Regex,
    pub object_name: Option<Regex>,
}

impl EntryPointPattern {
    pub fn matches(&self, decorator: &DecoratorName) -> bool {
        if !self.decorator_name.is_match(&decorator.name) {
            return false;
        }
        match (&self.object_name, &decorator.object) {
            (None, _) => true,
            (Some(pattern), Some(object)) => pattern.is_match(object),
            (Some(_), None) => false,
        }
    }
}

/// The default patterns recognizing common web-framework route decorators
/// and CLI command decorators as entry points, and route/argument
/// decorators as configuration references.
pub fn default_entry_point_patterns() -> Vec<EntryPointPattern> {
    vec![
        EntryPointPattern {
            decorator_name: Regex::new(r"^(route|get|post|put|patch|delete|websocket)$").unwrap(),
            object_name: None,
        },
        EntryPointPattern {
            decorator_name: Regex::new(r"^(command|main|cli)$").unwrap(),
            object_name: None,
        },
    ]
}

pub fn default_reference_patterns() -> Vec<ReferencePattern> {
    vec![ReferencePattern {
        decorator_name: Regex::new(r"^(route|get|post|put|patch|delete)$").unwrap(),
        object_name: None,
        argument_names: vec!["methods".to_string(), "name".to_string()],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_bare_decorator() {
        let decorator = decompose_decorator("staticmethod");
        assert_eq!(decorator.name, "staticmethod");
        assert_eq!(decorator.object, None);
    }

    #[test]
    fn decomposes_attribute_decorator() {
        let decorator = decompose_decorator("app.route");
        assert_eq!(decorator.name, "route");
        assert_eq!(decorator.object, Some("app".to_string()));
    }

    #[test]
    fn decomposes_deep_attribute_decorator() {
        let decorator = decompose_decorator("api.v1.get");
        assert_eq!(decorator.name, "get");
        assert_eq!(decorator.object, Some("api.v1".to_string()));
    }

    #[test]
    fn entry_point_pattern_matches_route_decorator() {
        let patterns = default_entry_point_patterns();
        let decorator = decompose_decorator("app.route");
        assert!(patterns.iter().any(|p| p.matches(&decorator)));
    }
}
