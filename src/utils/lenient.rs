//! Serde helpers for form-style numeric fields: accept either a JSON number or a numeric string.
//! Blank strings and `null` count as absent so that required-field checks can report them.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum FloatOrText {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrText {
    Number(i64),
    Text(String),
}

/// Deserialize `Option<f64>` from null, a number, or a string such as "10.5".
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FloatOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FloatOrText::Number(n)) => Ok(Some(n)),
        Some(FloatOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(FloatOrText::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(de::Error::custom),
    }
}

/// Deserialize `Option<i64>` from null, an integer, or a string such as "5".
pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrText::Number(n)) => Ok(Some(n)),
        Some(IntOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(IntOrText::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "super::opt_f64")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "super::opt_i64")]
        stock: Option<i64>,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let form: Form = serde_json::from_str(r#"{"price": "10.5", "stock": 3}"#).unwrap();
        assert_eq!(form.price, Some(10.5));
        assert_eq!(form.stock, Some(3));
    }

    #[test]
    fn blank_and_missing_are_absent() {
        let form: Form = serde_json::from_str(r#"{"price": " "}"#).unwrap();
        assert_eq!(form.price, None);
        assert_eq!(form.stock, None);
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert!(serde_json::from_str::<Form>(r#"{"stock": "lots"}"#).is_err());
    }
}
