// Raw input bundles and the defaults used to normalize them

use crate::error::LedgerError;
use crate::models::{Status, Unit};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Field values as an input source delivers them, before normalization.
///
/// Every front end (CLI form, speech transcript) produces one of these and
/// hands it to the ledger unmodified; filling in defaults is the ledger's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub status: Option<String>,
}

impl ItemFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Values substituted for missing or unusable input fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub price: f64,
    pub quantity: f64,
    pub unit: Unit,
    pub status: Status,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            price: 0.0,
            quantity: 1.0,
            unit: Unit::Kilogram,
            status: Status::Bought,
        }
    }
}

/// Field values after defaults have been applied
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: Unit,
    pub status: Status,
}

impl Normalized {
    pub fn total(&self) -> f64 {
        self.price * self.quantity
    }
}

impl Defaults {
    /// Apply defaults to a raw bundle.
    ///
    /// Only an empty name is rejected. Unparsable, negative or non-finite
    /// prices fall back to `self.price`; quantities that are not strictly
    /// positive fall back to `self.quantity`. A pair whose product overflows
    /// is treated as a malformed price.
    pub fn normalize(&self, fields: &ItemFields) -> Result<Normalized, LedgerError> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(LedgerError::MissingName);
        }

        let mut price = parse_number(fields.price.as_deref())
            .filter(|p| *p >= 0.0)
            .unwrap_or_else(|| {
                debug!(raw = ?fields.price, default = self.price, "Using default price");
                self.price
            });

        let mut quantity = parse_number(fields.quantity.as_deref())
            .filter(|q| *q > 0.0)
            .unwrap_or_else(|| {
                debug!(raw = ?fields.quantity, default = self.quantity, "Using default quantity");
                self.quantity
            });

        // The total must stay finite or it cannot be stored as JSON
        if !(price * quantity).is_finite() {
            debug!(price, quantity, "Total overflows, using default price");
            price = self.price;
            if !(price * quantity).is_finite() {
                quantity = self.quantity;
            }
        }

        let unit = fields
            .unit
            .as_deref()
            .and_then(|u| u.parse().ok())
            .unwrap_or(self.unit);

        let status = fields
            .status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.status);

        Ok(Normalized {
            name: name.to_string(),
            price,
            quantity,
            unit,
            status,
        })
    }

    /// Reject defaults that would break the item invariants
    pub fn validate(&self) -> eyre::Result<()> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(eyre::eyre!("Default price must be a non-negative number, got {}", self.price));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(eyre::eyre!("Default quantity must be positive, got {}", self.quantity));
        }
        Ok(())
    }
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let normalized = Defaults::default().normalize(&ItemFields::new("Bread")).unwrap();
        assert_eq!(normalized.name, "Bread");
        assert_eq!(normalized.price, 0.0);
        assert_eq!(normalized.quantity, 1.0);
        assert_eq!(normalized.unit, Unit::Kilogram);
        assert_eq!(normalized.status, Status::Bought);
    }

    #[test]
    fn test_valid_fields_are_parsed() {
        let fields = ItemFields::new("  Milk ")
            .price("60")
            .quantity(" 2 ")
            .unit("L")
            .status("planned");
        let normalized = Defaults::default().normalize(&fields).unwrap();
        assert_eq!(normalized.name, "Milk");
        assert_eq!(normalized.price, 60.0);
        assert_eq!(normalized.quantity, 2.0);
        assert_eq!(normalized.unit, Unit::Litre);
        assert_eq!(normalized.status, Status::Planned);
        assert_eq!(normalized.total(), 120.0);
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let fields = ItemFields::new("Eggs").price("abc").quantity("-3");
        let normalized = Defaults::default().normalize(&fields).unwrap();
        assert_eq!(normalized.price, 0.0);
        assert_eq!(normalized.quantity, 1.0);

        let fields = ItemFields::new("Eggs").price("-1").quantity("0");
        let normalized = Defaults::default().normalize(&fields).unwrap();
        assert_eq!(normalized.price, 0.0);
        assert_eq!(normalized.quantity, 1.0);

        let fields = ItemFields::new("Eggs").price("inf").quantity("NaN");
        let normalized = Defaults::default().normalize(&fields).unwrap();
        assert_eq!(normalized.price, 0.0);
        assert_eq!(normalized.quantity, 1.0);
    }

    #[test]
    fn test_overflowing_total_falls_back_to_default_price() {
        let fields = ItemFields::new("Gold").price("1e308").quantity("10");
        let normalized = Defaults::default().normalize(&fields).unwrap();
        assert_eq!(normalized.price, 0.0);
        assert_eq!(normalized.quantity, 10.0);
        assert!(normalized.total().is_finite());
    }

    #[test]
    fn test_unknown_unit_and_status_fall_back() {
        let fields = ItemFields::new("Oil").unit("barrel").status("stolen");
        let normalized = Defaults::default().normalize(&fields).unwrap();
        assert_eq!(normalized.unit, Unit::Kilogram);
        assert_eq!(normalized.status, Status::Bought);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(
            Defaults::default().normalize(&ItemFields::new("   ")),
            Err(LedgerError::MissingName)
        );
    }

    #[test]
    fn test_custom_defaults() {
        let defaults = Defaults {
            price: 10.0,
            quantity: 2.0,
            unit: Unit::Count,
            status: Status::Planned,
        };
        let normalized = defaults.normalize(&ItemFields::new("Soap").price("oops")).unwrap();
        assert_eq!(normalized.price, 10.0);
        assert_eq!(normalized.quantity, 2.0);
        assert_eq!(normalized.unit, Unit::Count);
        assert_eq!(normalized.status, Status::Planned);
    }

    #[test]
    fn test_validate_defaults() {
        assert!(Defaults::default().validate().is_ok());

        let bad = Defaults {
            quantity: 0.0,
            ..Defaults::default()
        };
        assert!(bad.validate().is_err());

        let bad = Defaults {
            price: -1.0,
            ..Defaults::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_defaults_deserialize_partially() {
        let defaults: Defaults = serde_yaml::from_str("unit: count\n").unwrap();
        assert_eq!(defaults.unit, Unit::Count);
        assert_eq!(defaults.quantity, 1.0);
        assert_eq!(defaults.status, Status::Bought);
    }
}
