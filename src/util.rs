use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Canonical form used when comparing login emails with profile emails.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Names of the required fields whose value is missing or blank, in order.
pub fn blank_fields<'a>(fields: &[(&'a str, Option<&str>)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect()
}

/// Parses a strictly positive decimal typed into a form field.
pub fn parse_positive(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// Id-like field the backend sends either as a string or as a number.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Flag sent as a JSON bool, a `"true"`/`"false"` string or `1`/`0`.
/// Anything else reads as absent.
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_i64().map(|n| n != 0),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("  A@B.Com "), "a@b.com");
    }

    #[test]
    fn blank_fields_reports_missing_and_whitespace() {
        let fields = [("crop", None), ("market", Some("m1")), ("quantity", Some("  "))];
        assert_eq!(blank_fields(&fields), vec!["crop", "quantity"]);
    }

    #[derive(serde::Deserialize)]
    struct Flags {
        #[serde(default, deserialize_with = "flexible_bool")]
        verified: Option<bool>,
        #[serde(default, deserialize_with = "string_or_number")]
        id: Option<String>,
    }

    #[test]
    fn lenient_fields_accept_backend_variants() {
        let flags: Flags = serde_json::from_str(r#"{"verified":"true","id":42}"#).unwrap();
        assert_eq!(flags.verified, Some(true));
        assert_eq!(flags.id.as_deref(), Some("42"));

        let flags: Flags = serde_json::from_str(r#"{"verified":0}"#).unwrap();
        assert_eq!(flags.verified, Some(false));
        assert!(flags.id.is_none());

        let flags: Flags = serde_json::from_str(r#"{"verified":"maybe","id":null}"#).unwrap();
        assert!(flags.verified.is_none());
    }

    #[test]
    fn parse_positive_rejects_non_numbers() {
        assert_eq!(parse_positive("12.5"), Some(12.5));
        assert_eq!(parse_positive(" 3 "), Some(3.0));
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("-4"), None);
        assert_eq!(parse_positive("ten"), None);
        assert_eq!(parse_positive("NaN"), None);
    }
}
