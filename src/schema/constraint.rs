//! Validation rules attachable to a field.
//!
//! Checks run on a value that already coerced to the field's type. Missing
//! values and coercion failures are handled by the engine before this point
//! and short-circuit everything here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::reject::ViolationKind;
use crate::value::Value;

/// Local part, `@`, and a domain with at least one dot.
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("email pattern is valid")
});

/// Shape predicates for string values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Email,
}

impl Format {
    pub fn matches(self, s: &str) -> bool {
        match self {
            Self::Email => EMAIL.is_match(s),
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::Email => "value is not a valid email address",
        }
    }
}

/// Bounds and predicates on one field. Unset rules do not apply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Constraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub gt: Option<i64>,
    pub ge: Option<i64>,
    pub lt: Option<i64>,
    pub le: Option<i64>,
    pub one_of: Option<Vec<String>>,
    pub format: Option<Format>,
}

impl Constraints {
    /// Every rule `value` breaks, in precedence order: numeric bounds, length
    /// bounds, value set, format.
    pub fn check(&self, value: &Value) -> Vec<(ViolationKind, String)> {
        let mut out = Vec::new();
        match value {
            Value::Int(n) => self.check_bounds(*n, &mut out),
            Value::Str(s) => self.check_str(s, &mut out),
            _ => {}
        }
        out
    }

    fn check_bounds(&self, n: i64, out: &mut Vec<(ViolationKind, String)>) {
        if let Some(gt) = self.gt {
            if n <= gt {
                out.push((ViolationKind::BelowMin, format!("ensure this value is greater than {gt}")));
            }
        }
        if let Some(ge) = self.ge {
            if n < ge {
                out.push((ViolationKind::BelowMin, format!("ensure this value is greater than or equal to {ge}")));
            }
        }
        if let Some(lt) = self.lt {
            if n >= lt {
                out.push((ViolationKind::AboveMax, format!("ensure this value is less than {lt}")));
            }
        }
        if let Some(le) = self.le {
            if n > le {
                out.push((ViolationKind::AboveMax, format!("ensure this value is less than or equal to {le}")));
            }
        }
    }

    fn check_str(&self, s: &str, out: &mut Vec<(ViolationKind, String)>) {
        let len = s.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                out.push((ViolationKind::BelowMin, format!("ensure this value has at least {min} characters")));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                out.push((ViolationKind::AboveMax, format!("ensure this value has at most {max} characters")));
            }
        }
        if let Some(values) = &self.one_of {
            if !values.iter().any(|v| v == s) {
                out.push((ViolationKind::NotInEnum, format!("value is not one of: {}", values.join(", "))));
            }
        }
        if let Some(format) = self.format {
            if !format.matches(s) {
                out.push((ViolationKind::FormatInvalid, format.message().to_owned()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(c: &Constraints, v: Value) -> Vec<ViolationKind> {
        c.check(&v).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn numeric_bounds_are_exclusive_or_inclusive_as_named() {
        let age = Constraints { gt: Some(0), le: Some(115), ..Default::default() };
        assert_eq!(kinds(&age, Value::Int(0)), [ViolationKind::BelowMin]);
        assert_eq!(kinds(&age, Value::Int(116)), [ViolationKind::AboveMax]);
        assert!(kinds(&age, Value::Int(1)).is_empty());
        assert!(kinds(&age, Value::Int(115)).is_empty());
    }

    #[test]
    fn every_failing_bound_is_reported() {
        let odd = Constraints { ge: Some(10), lt: Some(5), ..Default::default() };
        assert_eq!(kinds(&odd, Value::Int(7)), [ViolationKind::BelowMin, ViolationKind::AboveMax]);
    }

    #[test]
    fn lengths_count_characters_inclusively() {
        let name = Constraints { min_length: Some(1), max_length: Some(3), ..Default::default() };
        assert_eq!(kinds(&name, Value::Str(String::new())), [ViolationKind::BelowMin]);
        assert_eq!(kinds(&name, Value::Str("abcd".into())), [ViolationKind::AboveMax]);
        assert!(kinds(&name, Value::Str("a".into())).is_empty());
        assert!(kinds(&name, Value::Str("ñün".into())).is_empty());
    }

    #[test]
    fn value_sets_are_case_sensitive() {
        let c = Constraints { one_of: Some(vec!["asc".into(), "desc".into()]), ..Default::default() };
        assert!(kinds(&c, Value::Str("asc".into())).is_empty());
        assert_eq!(kinds(&c, Value::Str("ASC".into())), [ViolationKind::NotInEnum]);
    }

    #[test]
    fn email_shape() {
        assert!(Format::Email.matches("cristian@example.com"));
        assert!(Format::Email.matches("a.b+c@mail.co.uk"));
        assert!(!Format::Email.matches("cristian@localhost"));
        assert!(!Format::Email.matches("no-at-sign.com"));
        assert!(!Format::Email.matches("two@@example.com"));
        assert!(!Format::Email.matches("trailing@example."));
    }

    #[test]
    fn format_comes_after_length() {
        let c = Constraints { min_length: Some(30), format: Some(Format::Email), ..Default::default() };
        assert_eq!(kinds(&c, Value::Str("nope".into())), [ViolationKind::BelowMin, ViolationKind::FormatInvalid]);
    }
}
