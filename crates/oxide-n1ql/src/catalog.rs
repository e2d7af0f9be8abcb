//! Built-in scalar functions and aggregates.
//!
//! The parser consults this catalog when it reduces a call expression: the
//! name decides whether the call is a scalar function or an aggregate, and
//! the arity bounds decide whether the argument list is acceptable.
//! Lookups ignore case.

/// Marks a function that takes any number of arguments past its minimum.
pub const VARIADIC: usize = usize::MAX;

/// Whether a catalog entry is evaluated per row or per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Scalar,
    Aggregate,
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Canonical upper case name.
    pub name: &'static str,
    pub min_args: usize,
    /// Upper bound, or [`VARIADIC`].
    pub max_args: usize,
    pub kind: FunctionKind,
}

impl FunctionInfo {
    const fn scalar(name: &'static str, min_args: usize, max_args: usize) -> Self {
        Self {
            name,
            min_args,
            max_args,
            kind: FunctionKind::Scalar,
        }
    }

    const fn aggregate(name: &'static str) -> Self {
        Self {
            name,
            min_args: 1,
            max_args: 1,
            kind: FunctionKind::Aggregate,
        }
    }

    /// Whether `count` arguments are within bounds.
    #[must_use]
    pub const fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && count <= self.max_args
    }
}

static SCALARS: &[FunctionInfo] = &[
    FunctionInfo::scalar("ABS", 1, 1),
    FunctionInfo::scalar("ARRAY_APPEND", 2, VARIADIC),
    FunctionInfo::scalar("ARRAY_AVG", 1, 1),
    FunctionInfo::scalar("ARRAY_CONCAT", 2, VARIADIC),
    FunctionInfo::scalar("ARRAY_CONTAINS", 2, 2),
    FunctionInfo::scalar("ARRAY_COUNT", 1, 1),
    FunctionInfo::scalar("ARRAY_DISTINCT", 1, 1),
    FunctionInfo::scalar("ARRAY_LENGTH", 1, 1),
    FunctionInfo::scalar("ARRAY_MAX", 1, 1),
    FunctionInfo::scalar("ARRAY_MIN", 1, 1),
    FunctionInfo::scalar("ARRAY_SUM", 1, 1),
    FunctionInfo::scalar("CEIL", 1, 1),
    FunctionInfo::scalar("CONTAINS", 2, 2),
    FunctionInfo::scalar("FLOOR", 1, 1),
    FunctionInfo::scalar("IFMISSING", 2, VARIADIC),
    FunctionInfo::scalar("IFMISSINGORNULL", 2, VARIADIC),
    FunctionInfo::scalar("IFNULL", 2, VARIADIC),
    FunctionInfo::scalar("LENGTH", 1, 1),
    FunctionInfo::scalar("LOWER", 1, 1),
    FunctionInfo::scalar("LTRIM", 1, 2),
    FunctionInfo::scalar("META", 0, 1),
    FunctionInfo::scalar("NOW_MILLIS", 0, 0),
    FunctionInfo::scalar("NOW_STR", 0, 1),
    FunctionInfo::scalar("OBJECT_LENGTH", 1, 1),
    FunctionInfo::scalar("OBJECT_NAMES", 1, 1),
    FunctionInfo::scalar("POWER", 2, 2),
    FunctionInfo::scalar("REGEXP_LIKE", 2, 2),
    FunctionInfo::scalar("ROUND", 1, 2),
    FunctionInfo::scalar("RTRIM", 1, 2),
    FunctionInfo::scalar("SQRT", 1, 1),
    FunctionInfo::scalar("SUBSTR", 2, 3),
    FunctionInfo::scalar("TO_NUMBER", 1, 1),
    FunctionInfo::scalar("TO_STRING", 1, 1),
    FunctionInfo::scalar("TRIM", 1, 2),
    FunctionInfo::scalar("TRUNC", 1, 2),
    FunctionInfo::scalar("TYPE", 1, 1),
    FunctionInfo::scalar("UPPER", 1, 1),
    FunctionInfo::scalar("UUID", 0, 0),
];

static AGGREGATES: &[FunctionInfo] = &[
    FunctionInfo::aggregate("ARRAY_AGG"),
    FunctionInfo::aggregate("AVG"),
    FunctionInfo::aggregate("COUNT"),
    FunctionInfo::aggregate("MAX"),
    FunctionInfo::aggregate("MIN"),
    FunctionInfo::aggregate("SUM"),
];

fn find(entries: &'static [FunctionInfo], name: &str) -> Option<&'static FunctionInfo> {
    entries
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
}

/// Looks up a scalar function.
#[must_use]
pub fn function(name: &str) -> Option<&'static FunctionInfo> {
    find(SCALARS, name)
}

/// Looks up an aggregate. Every aggregate accepts `DISTINCT`.
#[must_use]
pub fn aggregate(name: &str) -> Option<&'static FunctionInfo> {
    find(AGGREGATES, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let lower = function("lower").unwrap();
        assert_eq!(lower.name, "LOWER");
        assert_eq!(function("LoWeR"), Some(lower));
        assert!(function("no_such_function").is_none());
    }

    #[test]
    fn test_arity_bounds() {
        let substr = function("substr").unwrap();
        assert!(!substr.accepts(1));
        assert!(substr.accepts(2));
        assert!(substr.accepts(3));
        assert!(!substr.accepts(4));

        let append = function("array_append").unwrap();
        assert!(append.accepts(17));
        assert!(!append.accepts(1));

        assert!(function("uuid").unwrap().accepts(0));
    }

    #[test]
    fn test_aggregates_are_separate() {
        let count = aggregate("count").unwrap();
        assert_eq!(count.kind, FunctionKind::Aggregate);
        assert!(count.accepts(1));
        assert!(function("count").is_none());
        assert!(aggregate("lower").is_none());
    }

    #[test]
    fn test_tables_are_sorted_and_unique() {
        for table in [SCALARS, AGGREGATES] {
            for pair in table.windows(2) {
                assert!(pair[0].name < pair[1].name, "{} out of order", pair[1].name);
            }
        }
    }
}
