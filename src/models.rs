// Data models for GroceryTracker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One grocery entry: a completed purchase or an item on the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    /// Unit price
    #[serde(deserialize_with = "lenient_number")]
    pub price: f64,
    #[serde(rename = "qty", deserialize_with = "lenient_number")]
    pub quantity: f64,
    pub unit: Unit,
    /// `price * quantity` as of creation; never recomputed
    #[serde(deserialize_with = "lenient_number")]
    pub total: f64,
    pub status: Status,
    /// Creation instant, or the instant the item was marked bought
    pub date: DateTime<Utc>,
}

impl Item {
    pub fn is_planned(&self) -> bool {
        self.status == Status::Planned
    }

    pub fn is_bought(&self) -> bool {
        self.status == Status::Bought
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Planned,
    Bought,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Planned => "planned",
            Status::Bought => "bought",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planned" => Ok(Status::Planned),
            "bought" => Ok(Status::Bought),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Measuring unit for a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "L", alias = "l")]
    Litre,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Count => "count",
            Unit::Litre => "L",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilo" | "kilogram" | "kilograms" => Ok(Unit::Kilogram),
            "g" | "gm" | "gram" | "grams" => Ok(Unit::Gram),
            "count" | "pc" | "pcs" | "piece" | "pieces" => Ok(Unit::Count),
            "l" | "ltr" | "litre" | "litres" | "liter" | "liters" => Ok(Unit::Litre),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Returned when a status or unit string is not in the vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized value: {:?}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// Accepts numbers, numeric strings, and null or unparsable strings (as 0).
///
/// Blobs written by the browser version stored the quantity as the raw form
/// string, possibly empty, and a `NaN` total serializes as `null`.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::Text(s)) => Ok(s.trim().parse().unwrap_or(0.0)),
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
