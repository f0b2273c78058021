// src/common/payload.rs
//
// Payloads chegam como JSON "solto" (corpo ou query string). Os campos são
// tolerantes: strings são aparadas, números podem vir como texto.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::common::error::AppError;

/// Desserializa e valida o payload de uma rota.
pub fn parse<T>(payload: &Value) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
{
    let value = match payload {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };

    let parsed: T =
        serde_json::from_value(value).map_err(|e| AppError::InvalidPayload(e.to_string()))?;
    parsed.validate()?;
    Ok(parsed)
}

pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(de::Error::custom("esperado texto")),
    }
}

/// Texto opcional; vazio depois do trim vira `None`.
pub fn optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = trimmed(deserializer)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

pub fn id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    optional_id(deserializer)?.ok_or_else(|| de::Error::custom("identificador obrigatório"))
}

pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom("identificador inválido")),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| de::Error::custom("identificador inválido")),
        _ => Err(de::Error::custom("identificador inválido")),
    }
}

pub fn count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_count(deserializer)?.unwrap_or(0))
}

pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| de::Error::custom("número inválido")),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom("número inválido")),
        _ => Err(de::Error::custom("número inválido")),
    }
}

/// Booleano tolerante: `true`, `1`, `"true"`, `"sim"`, `"on"`...
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_flag(deserializer)?.unwrap_or(false))
}

pub fn optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::Number(n) => Ok(Some(n.as_i64().unwrap_or(0) != 0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "sim" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "nao" | "não" | "no" | "off" => Ok(Some(false)),
            _ => Err(de::Error::custom("booleano inválido")),
        },
        _ => Err(de::Error::custom("booleano inválido")),
    }
}

pub fn date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    optional_date(deserializer)?.ok_or_else(|| de::Error::custom("data obrigatória"))
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = optional_trimmed(deserializer)? else {
        return Ok(None);
    };
    // Aceita também "YYYY-MM-DD HH:MM:SS", guardando só a data.
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| de::Error::custom("data inválida, use YYYY-MM-DD"))
}

pub fn datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    optional_datetime(deserializer)?.ok_or_else(|| de::Error::custom("data/hora obrigatória"))
}

pub fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = optional_trimmed(deserializer)? else {
        return Ok(None);
    };
    parse_datetime(&raw)
        .map(Some)
        .ok_or_else(|| de::Error::custom("data/hora inválida, use YYYY-MM-DD HH:MM:SS"))
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let raw = raw.trim().trim_end_matches('Z');
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[serde(deserialize_with = "trimmed")]
        #[validate(length(min = 1, message = "obrigatório"))]
        name: String,
        #[serde(default, deserialize_with = "optional_id")]
        family_id: Option<u64>,
        #[serde(default, deserialize_with = "flag")]
        accepted: bool,
        #[serde(default, deserialize_with = "optional_datetime")]
        at: Option<NaiveDateTime>,
    }

    #[test]
    fn lenient_fields_accept_strings() {
        let sample: Sample = parse(&json!({
            "name": "  Maria  ",
            "family_id": "12",
            "accepted": "1",
            "at": "2026-01-10 14:00:00"
        }))
        .unwrap();

        assert_eq!(sample.name, "Maria");
        assert_eq!(sample.family_id, Some(12));
        assert!(sample.accepted);
        assert_eq!(sample.at, parse_datetime("2026-01-10T14:00:00"));
    }

    #[test]
    fn blank_required_field_fails_validation() {
        let err = parse::<Sample>(&json!({ "name": "   " })).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(err.code(), "invalid_payload");
    }

    #[test]
    fn null_payload_behaves_like_empty_object() {
        let err = parse::<Sample>(&Value::Null).unwrap_err();
        assert_eq!(err.code(), "invalid_payload");
    }

    #[test]
    fn malformed_id_is_rejected() {
        let err = parse::<Sample>(&json!({ "name": "x", "family_id": "abc" })).unwrap_err();
        assert!(matches!(err, AppError::InvalidPayload(_)));
    }
}
