/// Common types and utilities shared across handlers and services
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Display names are stored trimmed and upper-cased.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Returns the normalized name, or `None` if nothing is left after trimming.
pub fn non_blank_name(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_name).filter(|name| !name.is_empty())
}

/// Loose truthiness used for `estado` on the endpoints that accept any JSON value.
///
/// Strings only count as true when they spell `true` or `1`.
pub fn coerce_estado(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Records that a field was present in the body, even when its value is `null`.
///
/// Pair with `#[serde(default)]`: an absent key stays `None`, while any
/// present value (including `null` for `Option<Option<T>>` or `Value`)
/// becomes `Some(..)`.
pub fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Deserializes an optional `estado` with [`coerce_estado`] semantics.
pub fn deserialize_loose_estado<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| Some(coerce_estado(&v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!(null), false)]
    #[case(json!(0), false)]
    #[case(json!(2), true)]
    #[case(json!(-0.5), true)]
    #[case(json!("TRUE"), true)]
    #[case(json!("1"), true)]
    #[case(json!("false"), false)]
    #[case(json!("si"), false)]
    #[case(json!([]), true)]
    #[case(json!({}), true)]
    fn estado_coercion(#[case] input: Value, #[case] expected: bool) {
        assert_eq!(coerce_estado(&input), expected);
    }

    #[test]
    fn names_are_trimmed_and_uppercased() {
        assert_eq!(normalize_name("  taladro andino "), "TALADRO ANDINO");
        assert_eq!(normalize_name("óscar"), "ÓSCAR");
        assert_eq!(non_blank_name(Some("   ")), None);
        assert_eq!(non_blank_name(None), None);
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_present")]
        code: Option<Value>,
        #[serde(default, deserialize_with = "deserialize_present")]
        url: Option<Option<String>>,
        #[serde(default, deserialize_with = "deserialize_loose_estado")]
        estado: Option<bool>,
    }

    #[test]
    fn presence_is_distinguished_from_absence() {
        let absent: Probe = serde_json::from_value(json!({})).unwrap();
        assert!(absent.code.is_none());
        assert!(absent.url.is_none());
        assert!(absent.estado.is_none());

        let nulls: Probe =
            serde_json::from_value(json!({"code": null, "url": null, "estado": null})).unwrap();
        assert_eq!(nulls.code, Some(Value::Null));
        assert_eq!(nulls.url, Some(None));
        assert_eq!(nulls.estado, Some(false));

        let set: Probe =
            serde_json::from_value(json!({"url": "http://x", "estado": 1})).unwrap();
        assert_eq!(set.url, Some(Some("http://x".to_string())));
        assert_eq!(set.estado, Some(true));
    }
}
