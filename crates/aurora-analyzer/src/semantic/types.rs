use std::fmt;

/// Type of a value as far as the analyzer can tell.
///
/// Types are compared by name only; class names are not checked for
/// existence when they appear in annotations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    // -- Primitives --
    Int,
    Double,
    Bool,
    String,
    Void,
    Null,

    // -- User-defined class (or any unrecognized name) --
    Named(std::string::String),

    // -- `T?` --
    Optional(Box<Type>),
}

impl Type {
    /// Map a type name as written in source (`int`, `Point?`) to a `Type`.
    pub fn from_name(name: &str) -> Self {
        if let Some(inner) = name.strip_suffix('?') {
            return Type::Optional(Box::new(Type::from_name(inner)));
        }
        match name {
            "int" => Type::Int,
            "double" => Type::Double,
            "bool" => Type::Bool,
            "string" => Type::String,
            "void" => Type::Void,
            "null" => Type::Null,
            other => Type::Named(other.to_string()),
        }
    }

    /// Whether this type is numeric (`int` or `double`).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Double)
    }

    /// Whether a value of type `self` may be used where `expected` is
    /// required: identical types, `int`/`double` in either direction, and
    /// `null` for any optional type.
    pub fn is_compatible_with(&self, expected: &Type) -> bool {
        if self == expected {
            return true;
        }
        match (self, expected) {
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (Type::Null, Type::Optional(_)) => true,
            _ => false,
        }
    }

    /// The type exactly as it would be written in source.
    pub fn display_name(&self) -> std::string::String {
        match self {
            Type::Int => "int".into(),
            Type::Double => "double".into(),
            Type::Bool => "bool".into(),
            Type::String => "string".into(),
            Type::Void => "void".into(),
            Type::Null => "null".into(),
            Type::Named(n) => n.clone(),
            Type::Optional(inner) => format!("{}?", inner.display_name()),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Infer the type of an expression from its text alone.
///
/// Only literals are recognized: integers, decimals, `true`/`false`, a
/// text that starts and ends with a quote, and `null`. Everything else
/// (identifiers, calls, operators) is assumed to be `double`.
pub fn infer_type(expr: &str) -> Type {
    let expr = expr.trim();

    if is_int_literal(expr) {
        return Type::Int;
    }
    if is_double_literal(expr) {
        return Type::Double;
    }
    match expr {
        "true" | "false" => return Type::Bool,
        "null" => return Type::Null,
        _ => {}
    }
    if expr.len() >= 2 && expr.starts_with('"') && expr.ends_with('"') {
        return Type::String;
    }

    Type::Double
}

fn is_int_literal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `1.`, `1.5` or `.5`
fn is_double_literal(s: &str) -> bool {
    match s.split_once('.') {
        Some((whole, frac)) if !whole.is_empty() => {
            is_int_literal(whole) && frac.bytes().all(|b| b.is_ascii_digit())
        }
        Some((_, frac)) => is_int_literal(frac),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_round_trips_display() {
        for name in ["int", "double", "bool", "string", "void", "Point", "int?", "Point?"] {
            assert_eq!(Type::from_name(name).display_name(), name);
        }
        assert_eq!(
            Type::from_name("int?"),
            Type::Optional(Box::new(Type::Int))
        );
    }

    #[test]
    fn infer_literals() {
        assert_eq!(infer_type("42"), Type::Int);
        assert_eq!(infer_type(" 3.14 "), Type::Double);
        assert_eq!(infer_type("3."), Type::Double);
        assert_eq!(infer_type(".5"), Type::Double);
        assert_eq!(infer_type("true"), Type::Bool);
        assert_eq!(infer_type("\"hi\""), Type::String);
        assert_eq!(infer_type("null"), Type::Null);
    }

    #[test]
    fn infer_falls_back_to_double() {
        assert_eq!(infer_type("x"), Type::Double);
        assert_eq!(infer_type("f(1)"), Type::Double);
        assert_eq!(infer_type("1 + 2"), Type::Double);
        assert_eq!(infer_type("."), Type::Double);
        assert_eq!(infer_type("\""), Type::Double);
        assert_eq!(infer_type(""), Type::Double);
    }

    #[test]
    fn quoted_text_is_string_even_with_operators() {
        assert_eq!(infer_type("\"a\" + \"b\""), Type::String);
    }

    #[test]
    fn compatibility_rules() {
        let opt_point = Type::from_name("Point?");
        assert!(Type::Int.is_compatible_with(&Type::Double));
        assert!(Type::Double.is_compatible_with(&Type::Int));
        assert!(Type::Null.is_compatible_with(&opt_point));
        assert!(Type::Named("Point".into()).is_compatible_with(&Type::Named("Point".into())));
        assert!(!Type::String.is_compatible_with(&Type::Double));
        assert!(!Type::Null.is_compatible_with(&Type::Named("Point".into())));
        assert!(!Type::Int.is_compatible_with(&Type::from_name("int?")));
    }
}
