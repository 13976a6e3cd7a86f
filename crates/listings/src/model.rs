use foundation::math::{LngLat, Located};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single geocoded property listing.
///
/// Read-only to the viewer core. Identity never changes after creation; the
/// active set is replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(deserialize_with = "de_id")]
    pub id: i64,
    /// Human-facing reference. Not guaranteed unique across data sources.
    #[serde(default, deserialize_with = "de_text")]
    pub listing_number: String,
    #[serde(deserialize_with = "de_coordinate")]
    pub latitude: f64,
    #[serde(deserialize_with = "de_coordinate")]
    pub longitude: f64,
    #[serde(default, deserialize_with = "de_i64_or_zero")]
    pub price: i64,
    #[serde(default, deserialize_with = "de_text")]
    pub property_type: String,
    /// Room layout label such as `"3+1"`.
    #[serde(default, deserialize_with = "de_text")]
    pub room_count: String,
    #[serde(default, deserialize_with = "de_f64_or_zero")]
    pub gross_area: f64,
    #[serde(default, deserialize_with = "de_f64_or_zero")]
    pub net_area: f64,
    #[serde(default, deserialize_with = "de_text")]
    pub address: String,
    #[serde(default, deserialize_with = "de_text")]
    pub neighborhood: String,
    #[serde(default, deserialize_with = "de_text")]
    pub district: String,
    #[serde(default, deserialize_with = "de_text")]
    pub city: String,
}

impl Listing {
    /// Minimal listing at a position; descriptive fields left empty.
    pub fn at(id: i64, position: LngLat) -> Self {
        Self {
            id,
            listing_number: id.to_string(),
            latitude: position.lat,
            longitude: position.lng,
            price: 0,
            property_type: String::new(),
            room_count: String::new(),
            gross_area: 0.0,
            net_area: 0.0,
            address: String::new(),
            neighborhood: String::new(),
            district: String::new(),
            city: String::new(),
        }
    }
}

impl Located for Listing {
    fn position(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }
}

// Relational backends commonly serialize NUMERIC/BIGINT columns as strings and
// COALESCE optional numbers to ''. Accept both shapes.

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let v = Value::deserialize(d)?;
    match &v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| D::Error::custom(format!("invalid listing id: {v}")))
}

fn de_coordinate<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    number_from(&v)
        .filter(|f| f.is_finite())
        .ok_or_else(|| D::Error::custom(format!("invalid coordinate: {v}")))
}

fn de_f64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(number_from(&v).unwrap_or(0.0))
}

fn de_i64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(number_from(&v).map(|f| f.round() as i64).unwrap_or(0))
}

fn de_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
