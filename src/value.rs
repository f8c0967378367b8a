//! Runtime values: the three inhabitants of LATIN's tagged `Value` type
//! plus the arithmetic/string/comparison operations the execution engine
//! dispatches to.

use std::collections::HashMap;
use std::fmt;

use crate::error::RuntimeError;
use crate::roman;

/// A runtime value. Records are created lazily, on first field
/// assignment; `V EST U` where `U` is a `Record` performs a deep copy of
/// the field map, which falls out of `Value` deriving `Clone` — records
/// never alias across variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Str(String),
    Record(HashMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Str(_) => "String",
            Value::Record(_) => "Record",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// `SCRIBE`/`AVDI`/`NOTA` rendering: integers print as Roman numerals
/// (`NIHIL` for non-positive), strings print verbatim. Records have no
/// direct print form; callers always print a field, never a whole record.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", roman::format(*n)),
            Value::Str(s) => write!(f, "{s}"),
            Value::Record(_) => write!(f, "<record>"),
        }
    }
}

fn require_integers(a: &Value, b: &Value) -> Result<(i64, i64), RuntimeError> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok((*x, *y)),
        _ => Err(RuntimeError::TypeMismatch {
            expected: "Integer",
            found: if matches!(a, Value::Integer(_)) {
                b.type_name()
            } else {
                a.type_name()
            },
        }),
    }
}

/// `ADDE a b`.
pub fn add(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let (x, y) = require_integers(a, b)?;
    Ok(Value::Integer(x.wrapping_add(y)))
}

/// `DEME a b`.
pub fn sub(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let (x, y) = require_integers(a, b)?;
    Ok(Value::Integer(x.wrapping_sub(y)))
}

/// `MVLTIPLICA a b`.
pub fn mul(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let (x, y) = require_integers(a, b)?;
    Ok(Value::Integer(x.wrapping_mul(y)))
}

/// `DVCE a b`: integer floor division. Division by zero is the one
/// catchable arithmetic error; callers translate this variant into
/// either the `ERROR` exception or a fatal error depending on whether a
/// handler is active.
pub fn div(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let (x, y) = require_integers(a, b)?;
    if y == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(Value::Integer(x.div_euclid(y)))
}

/// `IVNGE a b`: string concatenation. Integer operands are formatted via
/// the Roman codec first.
pub fn concat(a: &Value, b: &Value) -> Value {
    Value::Str(format!("{a}{b}"))
}

fn as_display_string(v: &Value) -> String {
    match v {
        Value::Str(s) => s.clone(),
        Value::Integer(n) => roman::format(*n),
        Value::Record(_) => String::new(),
    }
}

/// `INCIPITCVM a b`.
pub fn starts_with(a: &Value, b: &Value) -> Value {
    let (s, prefix) = (as_display_string(a), as_display_string(b));
    Value::Integer(i64::from(s.starts_with(&prefix)))
}

/// `FINITVRCVM a b`.
pub fn ends_with(a: &Value, b: &Value) -> Value {
    let (s, suffix) = (as_display_string(a), as_display_string(b));
    Value::Integer(i64::from(s.ends_with(&suffix)))
}

/// `CONTINET a b`.
pub fn contains(a: &Value, b: &Value) -> Value {
    let (s, needle) = (as_display_string(a), as_display_string(b));
    Value::Integer(i64::from(s.contains(&needle)))
}

/// `INDICEDE a b`: index of `b` within `a`, or 0 for "not found". This
/// preserves the original prototype's conflation of "absent" with
/// "found at index 0" rather than inventing a sentinel value.
pub fn index_of(a: &Value, b: &Value) -> Value {
    let (s, needle) = (as_display_string(a), as_display_string(b));
    let idx = s.find(&needle).map(|byte_idx| {
        // Byte offset is fine here: identifiers, keywords and Roman
        // numerals are all ASCII uppercase.
        byte_idx as i64
    });
    Value::Integer(idx.unwrap_or(0))
}

/// `AEQUAT`: equality, valid for Integer-Integer or String-String pairs.
pub fn equals(a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(x == y),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        _ => Err(RuntimeError::TypeMismatch {
            expected: "matching Integer or String operands",
            found: "mismatched types",
        }),
    }
}

/// `MAIVS` / `MINOR`: both operands must be Integer.
pub fn compare(a: &Value, b: &Value) -> Result<std::cmp::Ordering, RuntimeError> {
    let (x, y) = require_integers(a, b)?;
    Ok(x.cmp(&y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_integer_roman() {
        assert_eq!(Value::Integer(5).to_string(), "V");
        assert_eq!(Value::Integer(0).to_string(), "NIHIL");
    }

    #[test]
    fn test_display_string() {
        assert_eq!(Value::Str("MARCUS".to_string()).to_string(), "MARCUS");
    }

    #[test]
    fn test_arithmetic_type_mismatch() {
        let a = Value::Integer(1);
        let b = Value::Str("X".to_string());
        assert!(add(&a, &b).is_err());
    }

    #[test]
    fn test_div_by_zero() {
        let a = Value::Integer(10);
        let b = Value::Integer(0);
        assert!(matches!(div(&a, &b), Err(RuntimeError::DivisionByZero)));
    }

    #[test]
    fn test_div_floor() {
        let a = Value::Integer(7);
        let b = Value::Integer(2);
        assert_eq!(div(&a, &b).unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_index_of_conflates_absent_and_zero() {
        let a = Value::Str("MARCUS".to_string());
        let missing = Value::Str("Z".to_string());
        let at_zero = Value::Str("M".to_string());
        assert_eq!(index_of(&a, &missing), Value::Integer(0));
        assert_eq!(index_of(&a, &at_zero), Value::Integer(0));
    }

    #[test]
    fn test_concat_formats_integers_as_roman() {
        let a = Value::Str("NVMERVS ".to_string());
        let b = Value::Integer(5);
        assert_eq!(concat(&a, &b), Value::Str("NVMERVS V".to_string()));
    }

    #[test]
    fn test_equals_requires_matching_types() {
        let a = Value::Integer(1);
        let b = Value::Str("I".to_string());
        assert!(equals(&a, &b).is_err());
    }

    #[test]
    fn test_record_clone_is_deep() {
        let mut fields = HashMap::new();
        fields.insert("NOMEN".to_string(), Value::Str("MARCUS".to_string()));
        let original = Value::Record(fields);
        let mut copy = original.clone();
        if let Value::Record(map) = &mut copy {
            map.insert("NOMEN".to_string(), Value::Str("IVLIA".to_string()));
        }
        assert_eq!(original, Value::Record({
            let mut m = HashMap::new();
            m.insert("NOMEN".to_string(), Value::Str("MARCUS".to_string()));
            m
        }));
    }
}
