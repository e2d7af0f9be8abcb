//! Parser configuration and the process-wide namespace registry.
//!
//! The free entry points ([`crate::parse_statement`] and friends) read the
//! registry that [`set_namespaces`] replaces. A [`ParserConfig`] carries its
//! own namespace set and limits and never touches the registry.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::ast::{Expr, Statement};
use crate::error::Result;
use crate::parser::{DEFAULT_SNIPPET_WIDTH, Settings, expression, statement};

/// Namespace used when the caller names none.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Default parser stack limit.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Namespaces recognised in `ns:keyspace` before any configuration.
pub const DEFAULT_NAMESPACES: [&str; 2] = ["default", "system"];

fn default_namespaces() -> HashSet<String> {
    DEFAULT_NAMESPACES.iter().map(ToString::to_string).collect()
}

fn registry() -> &'static RwLock<Arc<HashSet<String>>> {
    static REGISTRY: OnceLock<RwLock<Arc<HashSet<String>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Arc::new(default_namespaces())))
}

/// Replaces the namespaces recognised by the free entry points.
///
/// Parses already running keep the set they started with.
pub fn set_namespaces<I, S>(names: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: HashSet<String> = names.into_iter().map(Into::into).collect();
    debug!(count = names.len(), "namespace registry replaced");
    let mut guard = registry().write().unwrap_or_else(PoisonError::into_inner);
    *guard = Arc::new(names);
}

/// A snapshot of the registered namespaces.
#[must_use]
pub fn registered_namespaces() -> Arc<HashSet<String>> {
    Arc::clone(&registry().read().unwrap_or_else(PoisonError::into_inner))
}

/// Configuration for a parser that does not use the global registry.
///
/// # Example
///
/// ```rust
/// use oxide_n1ql::ParserConfig;
///
/// let config = ParserConfig::default()
///     .with_namespaces(["default", "archive"])
///     .with_max_depth(500);
/// let stmt = config.parse_statement("SELECT a FROM archive:orders").unwrap();
/// assert_eq!(stmt.param_count, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserConfig {
    /// Names recognised before `:` in keyspace references.
    pub namespaces: HashSet<String>,
    /// Namespace of unqualified keyspaces in [`ParserConfig::parse_statement`].
    pub default_namespace: String,
    /// Parser stack limit.
    pub max_depth: usize,
    /// Bytes of context shown before a syntax error.
    pub snippet_width: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            namespaces: default_namespaces(),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            snippet_width: DEFAULT_SNIPPET_WIDTH,
        }
    }
}

impl ParserConfig {
    /// Replaces the namespace set.
    #[must_use]
    pub fn with_namespaces<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the namespace of unqualified keyspaces.
    #[must_use]
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Sets the parser stack limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the snippet width of syntax errors.
    #[must_use]
    pub const fn with_snippet_width(mut self, snippet_width: usize) -> Self {
        self.snippet_width = snippet_width;
        self
    }

    fn settings(&self) -> Settings<'_> {
        Settings {
            namespaces: &self.namespaces,
            max_depth: self.max_depth,
            snippet_width: self.snippet_width,
        }
    }

    /// Parses a statement in the default namespace.
    ///
    /// # Errors
    ///
    /// See [`crate::parse_statement`].
    pub fn parse_statement(&self, text: &str) -> Result<Statement> {
        statement(&self.settings(), text, &self.default_namespace, "")
    }

    /// Parses a statement in the given namespace and query context.
    ///
    /// # Errors
    ///
    /// See [`crate::parse_statement_in`].
    pub fn parse_statement_in(
        &self,
        text: &str,
        namespace: &str,
        query_context: &str,
    ) -> Result<Statement> {
        statement(&self.settings(), text, namespace, query_context)
    }

    /// Parses a standalone expression.
    ///
    /// # Errors
    ///
    /// See [`crate::parse_expression`].
    pub fn parse_expression(&self, text: &str) -> Result<Expr> {
        expression(&self.settings(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert!(config.namespaces.contains("default"));
        assert!(config.namespaces.contains("system"));
        assert_eq!(config.default_namespace, "default");
        assert_eq!(config.max_depth, 200);
        assert_eq!(config.snippet_width, 40);
    }

    #[test]
    fn test_builders() {
        let config = ParserConfig::default()
            .with_namespaces(["ns1"])
            .with_default_namespace("ns1")
            .with_max_depth(10)
            .with_snippet_width(8);
        assert_eq!(config.namespaces.len(), 1);
        assert_eq!(config.default_namespace, "ns1");
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.snippet_width, 8);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_fills_missing_fields() {
        let config: ParserConfig = serde_json::from_str(r#"{"max_depth": 50}"#).unwrap();
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.default_namespace, "default");
    }
}
