//! Keyspace and function paths, and query-context handling.
//!
//! A path is either short (`namespace:keyspace`) or long
//! (`namespace:bucket.scope.keyspace`). A query context names the bucket and
//! scope that unqualified names resolve against.

use thiserror::Error;

/// Reasons a query context is rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum QueryContextError {
    #[error("invalid use of back ticks")]
    InvalidBackTicks,
    #[error("back tick not terminated")]
    UnterminatedBackTick,
    #[error("repeated namespace")]
    RepeatedNamespace,
    #[error("missing bucket")]
    MissingBucket,
    #[error("missing scope")]
    MissingScope,
    #[error("too many context elements")]
    TooManyElements,
}

/// A resolved keyspace or function path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    elements: Vec<String>,
}

impl Path {
    /// `namespace:keyspace`
    #[must_use]
    pub fn short(namespace: impl Into<String>, keyspace: impl Into<String>) -> Self {
        Self {
            elements: vec![namespace.into(), keyspace.into()],
        }
    }

    /// `namespace:bucket.scope.keyspace`
    #[must_use]
    pub fn long(
        namespace: impl Into<String>,
        bucket: impl Into<String>,
        scope: impl Into<String>,
        keyspace: impl Into<String>,
    ) -> Self {
        Self {
            elements: vec![
                namespace.into(),
                bucket.into(),
                scope.into(),
                keyspace.into(),
            ],
        }
    }

    /// Resolves an unqualified name against a query context.
    ///
    /// A blank context yields `namespace:name`. Otherwise the context
    /// supplies the bucket and scope, and its namespace when it has one.
    #[must_use]
    pub fn with_context(name: impl Into<String>, namespace: &str, query_context: &str) -> Self {
        if query_context.is_empty() {
            return Self::short(namespace, name);
        }
        let mut elements = parse_query_context(query_context);
        if elements.first().is_some_and(String::is_empty) {
            elements[0] = namespace.to_string();
        }
        elements.push(name.into());
        Self { elements }
    }

    /// The namespace element.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.elements.first().map_or("", String::as_str)
    }

    /// The bucket of a long path.
    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        self.is_long().then(|| self.elements[1].as_str())
    }

    /// The scope of a long path.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.is_long().then(|| self.elements[2].as_str())
    }

    /// The last element: the keyspace or function name.
    #[must_use]
    pub fn keyspace(&self) -> &str {
        self.elements.last().map_or("", String::as_str)
    }

    /// Default alias of a keyspace reference.
    #[must_use]
    pub fn alias(&self) -> &str {
        self.keyspace()
    }

    /// Whether this path names a collection inside a scope.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.elements.len() == 4
    }

    /// All elements, namespace first.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.elements
    }

    /// The query context this path lives in, e.g. `ns:bucket.scope`.
    #[must_use]
    pub fn query_context(&self) -> String {
        self.render(true)
    }

    fn render(&self, context: bool) -> String {
        let last = if context {
            self.elements.len().saturating_sub(2)
        } else {
            self.elements.len().saturating_sub(1)
        };
        let mut out = String::new();
        for (i, element) in self.elements.iter().enumerate().take(last + 1) {
            if i == 0 && element.is_empty() {
                continue;
            }
            if element.contains('.') {
                out.push('`');
                out.push_str(element);
                out.push('`');
            } else {
                out.push_str(element);
            }
            if i < last {
                out.push(if i == 0 { ':' } else { '.' });
            } else if context && i == 0 {
                out.push(':');
            }
        }
        out
    }
}

impl core::fmt::Display for Path {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// Splits a query context into its elements. The namespace comes first
/// and is empty when the context leaves it implied.
#[must_use]
pub fn parse_query_context(query_context: &str) -> Vec<String> {
    if query_context.is_empty() || query_context == ":" {
        return vec![String::new()];
    }
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut has_namespace = false;
    let mut quoted = false;
    for c in query_context.chars() {
        match c {
            '`' => quoted = !quoted,
            ':' if !quoted => {
                elements.push(core::mem::take(&mut current));
                has_namespace = true;
            }
            '.' if !quoted => {
                if !has_namespace {
                    elements.push(String::new());
                    has_namespace = true;
                }
                elements.push(core::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !has_namespace {
        elements.push(String::new());
    }
    if !current.is_empty() {
        elements.push(current);
    }
    elements
}

/// Checks that a query context is blank, `namespace:`, or names a scope.
///
/// # Errors
///
/// Returns the first structural problem found.
pub fn validate_query_context(query_context: &str) -> Result<(), QueryContextError> {
    let mut has_namespace = false;
    let mut parts = 0usize;
    let mut count_part = true;
    let mut last_terminator: Option<usize> = None;
    let mut last_back_tick: Option<usize> = None;
    let mut quoted = false;

    for (i, c) in query_context.char_indices() {
        match c {
            '`' => {
                quoted = !quoted;
                if quoted {
                    if last_terminator.is_some_and(|t| t + 1 != i) {
                        return Err(QueryContextError::InvalidBackTicks);
                    }
                } else {
                    last_back_tick = Some(i);
                }
            }
            ':' if !quoted => {
                if has_namespace {
                    return Err(QueryContextError::RepeatedNamespace);
                }
                if last_back_tick.is_some_and(|b| b + 1 != i) {
                    return Err(QueryContextError::InvalidBackTicks);
                }
                if parts == 0 {
                    parts = 1;
                }
                has_namespace = true;
                count_part = true;
                last_terminator = Some(i);
            }
            '.' if !quoted => {
                if count_part {
                    return Err(QueryContextError::MissingBucket);
                }
                if last_back_tick.is_some_and(|b| b + 1 != i) {
                    return Err(QueryContextError::InvalidBackTicks);
                }
                if !has_namespace {
                    parts += 1;
                    has_namespace = true;
                }
                count_part = true;
                last_terminator = Some(i);
            }
            _ => {
                if count_part {
                    parts += 1;
                    count_part = false;
                }
            }
        }
    }

    if quoted {
        return Err(QueryContextError::UnterminatedBackTick);
    }
    match parts {
        2 => Err(QueryContextError::MissingScope),
        p if p > 3 => Err(QueryContextError::TooManyElements),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_context_gives_short_path() {
        let path = Path::with_context("orders", "default", "");
        assert_eq!(path.parts(), &["default", "orders"]);
        assert_eq!(path.to_string(), "default:orders");
        assert!(!path.is_long());
        assert_eq!(path.bucket(), None);
    }

    #[test]
    fn test_scope_context_gives_long_path() {
        let path = Path::with_context("orders", "default", "ns:travel.inventory");
        assert_eq!(path.parts(), &["ns", "travel", "inventory", "orders"]);
        assert_eq!(path.bucket(), Some("travel"));
        assert_eq!(path.scope(), Some("inventory"));
        assert_eq!(path.query_context(), "ns:travel.inventory");
    }

    #[test]
    fn test_context_without_namespace_uses_default() {
        let path = Path::with_context("k", "default", "b.s");
        assert_eq!(path.parts(), &["default", "b", "s", "k"]);
        let path = Path::with_context("k", "default", ":b.s");
        assert_eq!(path.parts(), &["default", "b", "s", "k"]);
    }

    #[test]
    fn test_namespace_only_context() {
        let path = Path::with_context("k", "default", "system:");
        assert_eq!(path.parts(), &["system", "k"]);
        assert_eq!(path.query_context(), "system:");
    }

    #[test]
    fn test_dotted_elements_are_quoted() {
        let path = Path::long("default", "my.bucket", "s", "k");
        assert_eq!(path.to_string(), "default:`my.bucket`.s.k");
        assert_eq!(parse_query_context("default:`my.bucket`.s"), vec!["default", "my.bucket", "s"]);
    }

    #[test]
    fn test_validate_query_context() {
        assert_eq!(validate_query_context(""), Ok(()));
        assert_eq!(validate_query_context("default:"), Ok(()));
        assert_eq!(validate_query_context("default:b.s"), Ok(()));
        assert_eq!(validate_query_context("b.s"), Ok(()));
        assert_eq!(validate_query_context(":b.s"), Ok(()));
        assert_eq!(
            validate_query_context("default:b"),
            Err(QueryContextError::MissingScope)
        );
        assert_eq!(
            validate_query_context("a:b:c"),
            Err(QueryContextError::RepeatedNamespace)
        );
        assert_eq!(
            validate_query_context("default:b.s.c"),
            Err(QueryContextError::TooManyElements)
        );
        assert_eq!(
            validate_query_context("default:.s"),
            Err(QueryContextError::MissingBucket)
        );
        assert_eq!(
            validate_query_context("default:`b"),
            Err(QueryContextError::UnterminatedBackTick)
        );
        assert_eq!(
            validate_query_context("default:`b`x.s"),
            Err(QueryContextError::InvalidBackTicks)
        );
    }
}
