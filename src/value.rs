use std::fmt;
use std::sync::Arc;

/// Represents a single data value stored in a row.
///
/// Only two kinds exist: signed integers and strings. A string value may be
/// absent (a genuine SQL-style `NULL`); an integer has no absent state and
/// defaults to `0` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer value.
    Int(i64),
    /// A UTF-8 string value, wrapped in an [Arc] for cheap cloning, or
    /// `None` when the cell holds no string at all.
    Str(Option<Arc<str>>),
}

/// The integer-vs-string tag of a [Value].
///
/// Comparison and update decisions are gated on kind equality: values of
/// different kinds never compare equal and never overwrite one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Int,
    Str,
}

impl Value {
    /// Builds a present string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Self::Str(Some(s.into()))
    }

    /// Returns the [Kind] of this value. An absent string is still
    /// string-kinded.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Int(_) => Kind::Int,
            Self::Str(_) => Kind::Str,
        }
    }

    /// Returns `true` if this is a string value holding no string.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Str(None))
    }

    /// Returns the inner integer if this is a [Value::Int].
    /// Otherwise, returns `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns a reference to the inner string slice if this is a present
    /// [Value::Str]. Otherwise, returns `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(Some(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value the way the console output contract expects:
    /// integers as decimal digits, strings verbatim, absent strings as
    /// `NULL`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(Some(s)) => write!(f, "{s}"),
            Self::Str(None) => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────
    // Test 1 : kind
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_kind() {
        assert_eq!(Value::Int(1).kind(), Kind::Int);
        assert_eq!(Value::string("x").kind(), Kind::Str);
        assert_eq!(Value::Str(None).kind(), Kind::Str);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : is_absent
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_is_absent() {
        assert!(Value::Str(None).is_absent());
        assert!(!Value::string("").is_absent());
        assert!(!Value::Int(0).is_absent());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : as_int
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_as_int() {
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::Int(-7).as_int(), Some(-7));
        assert_eq!(Value::string("42").as_int(), None);
        assert_eq!(Value::Str(None).as_int(), None);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : as_str
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_as_str() {
        let v = Value::string("hello");

        assert_eq!(v.as_str(), Some("hello"));
        assert_eq!(Value::Str(None).as_str(), None);
        assert_eq!(Value::Int(1).as_str(), None);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : display
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::string("abc").to_string(), "abc");
        assert_eq!(Value::Str(None).to_string(), "NULL");
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6 : equality and clone
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Int(10), Value::Int(10));
        assert_ne!(Value::Int(10), Value::Int(20));
        assert_eq!(Value::string("abc"), Value::string("abc"));
        assert_ne!(Value::string("abc"), Value::Str(None));
        assert_ne!(Value::Int(0), Value::Str(None));

        let v1 = Value::string("hello");
        let v2 = v1.clone();
        assert_eq!(v1, v2);
    }
}
