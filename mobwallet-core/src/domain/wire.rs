//! Serde helpers for server payloads
//!
//! The wallet server encodes 64-bit integers as JSON strings so that
//! JavaScript clients do not lose precision. Older builds send plain numbers.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Str(String),
    Num(u64),
}

fn to_u64<E: de::Error>(value: StrOrNum) -> Result<u64, E> {
    match value {
        StrOrNum::Num(n) => Ok(n),
        StrOrNum::Str(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| E::custom(format!("expected unsigned integer, got '{}'", s))),
    }
}

pub fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    to_u64(StrOrNum::deserialize(deserializer)?)
}

pub fn opt_u64_from_str_or_num<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StrOrNum>::deserialize(deserializer)? {
        Some(StrOrNum::Str(s)) if s.is_empty() => Ok(None),
        Some(value) => to_u64(value).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "u64_from_str_or_num")]
        required: u64,
        #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
        optional: Option<u64>,
    }

    #[test]
    fn test_accepts_strings_and_numbers() {
        let s: Sample = serde_json::from_str(r#"{"required": "18446744073709551615", "optional": 3}"#).unwrap();
        assert_eq!(s.required, u64::MAX);
        assert_eq!(s.optional, Some(3));

        let s: Sample = serde_json::from_str(r#"{"required": 7, "optional": null}"#).unwrap();
        assert_eq!(s.required, 7);
        assert_eq!(s.optional, None);

        let s: Sample = serde_json::from_str(r#"{"required": 7}"#).unwrap();
        assert_eq!(s.optional, None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Sample>(r#"{"required": "ten"}"#).is_err());
    }
}
