//! Raw input to typed values.
//!
//! Numbers never truncate and enum tags never change case. File parts pass
//! through untouched. Nested models are bound by the engine, not here.

use crate::bind::locate::Raw;
use crate::schema::field::{EnumType, FieldType};
use crate::value::Value;

const TRUTHY: [&str; 6] = ["1", "true", "t", "yes", "y", "on"];
const FALSY: [&str; 6] = ["0", "false", "f", "no", "n", "off"];

/// Converts `raw` to `ty`, or explains why it cannot.
pub fn coerce(raw: Raw<'_>, ty: &FieldType) -> Result<Value, String> {
    if let Raw::Undecodable = raw {
        return Err("value is not valid UTF-8 once percent-decoded".to_owned());
    }
    match ty {
        FieldType::Integer => integer(raw).map(Value::Int),
        FieldType::Boolean => boolean(raw).map(Value::Bool),
        FieldType::Str => string(raw).map(Value::Str),
        FieldType::Enum(e) => tag(raw, e).map(Value::Enum),
        FieldType::File => match raw {
            Raw::File(file) => Ok(Value::File(file.clone())),
            _ => Err("expected an uploaded file".to_owned()),
        },
        FieldType::Model(schema) => Err(format!("{} is bound from a JSON object", schema.name())),
    }
}

fn integer(raw: Raw<'_>) -> Result<i64, String> {
    const MSG: &str = "value is not a valid integer";
    match raw {
        // i64's FromStr takes exactly an optional sign and ASCII digits.
        Raw::Text(s) => s.parse().map_err(|_| MSG.to_owned()),
        Raw::Json(serde_json::Value::String(s)) => s.parse().map_err(|_| MSG.to_owned()),
        Raw::Json(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is strict.
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| MSG.to_owned()),
        _ => Err(MSG.to_owned()),
    }
}

fn boolean(raw: Raw<'_>) -> Result<bool, String> {
    const MSG: &str = "value could not be parsed to a boolean";
    fn literal(s: &str) -> Result<bool, String> {
        let s = s.to_ascii_lowercase();
        if TRUTHY.contains(&s.as_str()) {
            Ok(true)
        } else if FALSY.contains(&s.as_str()) {
            Ok(false)
        } else {
            Err(MSG.to_owned())
        }
    }
    match raw {
        Raw::Text(s) => literal(&s),
        Raw::Json(serde_json::Value::Bool(b)) => Ok(*b),
        Raw::Json(serde_json::Value::String(s)) => literal(s),
        Raw::Json(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(MSG.to_owned()),
        },
        _ => Err(MSG.to_owned()),
    }
}

fn string(raw: Raw<'_>) -> Result<String, String> {
    match raw {
        Raw::Text(s) => Ok(s.into_owned()),
        Raw::Json(serde_json::Value::String(s)) => Ok(s.clone()),
        _ => Err("str type expected".to_owned()),
    }
}

fn tag(raw: Raw<'_>, ty: &EnumType) -> Result<String, String> {
    let candidate = match &raw {
        Raw::Text(s) => Some(&**s),
        Raw::Json(serde_json::Value::String(s)) => Some(s.as_str()),
        _ => None,
    };
    match candidate {
        Some(s) if ty.contains(s) => Ok(s.to_owned()),
        _ => {
            let permitted: Vec<String> = ty.tags().iter().map(|t| format!("'{t}'")).collect();
            Err(format!(
                "value is not a valid {} member; permitted: {}",
                ty.name(),
                permitted.join(", ")
            ))
        }
    }
}
