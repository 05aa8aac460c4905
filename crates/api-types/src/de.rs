//! Lenient field decoders for spreadsheet and form payloads, where cells may
//! arrive as strings, numbers or booleans.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(cell.map(|cell| match cell {
        Cell::Text(text) => text,
        Cell::Integer(value) => value.to_string(),
        Cell::Float(value) => value.to_string(),
        Cell::Bool(value) => value.to_string(),
    }))
}

pub fn opt_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    let value = match cell {
        None => None,
        Some(Cell::Integer(value)) => Some(value),
        Some(Cell::Float(value)) if value.fract() == 0.0 => Some(value as i64),
        Some(Cell::Text(text)) if text.trim().is_empty() => None,
        Some(Cell::Text(text)) => Some(text.trim().parse::<i64>().map_err(|_| {
            serde::de::Error::custom(format!("expected an integer, found \"{text}\""))
        })?),
        Some(_) => return Err(serde::de::Error::custom("expected an integer")),
    };
    Ok(value)
}
