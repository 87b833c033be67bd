// Derived statistics over ledger items

use crate::models::{Item, Status};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Assumed markup of the previous period's spend over the current one
pub const BASELINE_MARKUP: f64 = 1.15;

/// Baseline used when nothing has been bought yet
pub const FALLBACK_BASELINE: f64 = 5000.0;

/// Aggregates over the bought items of a ledger
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub total_spend: f64,
    pub item_count: usize,
    pub estimated_savings: f64,
}

impl Totals {
    /// Compute totals from any sequence of items; planned items are ignored.
    ///
    /// `estimated_savings` is a placeholder heuristic, not a measurement: no
    /// history is consulted. The previous period is assumed to have cost 15%
    /// more than the current spend, or a flat 5000 when nothing was bought.
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let (total_spend, item_count) = items
            .into_iter()
            .filter(|item| item.status == Status::Bought)
            .fold((0.0, 0), |(spend, count), item| (spend + item.total, count + 1));

        Self {
            total_spend,
            item_count,
            estimated_savings: baseline(total_spend) - total_spend,
        }
    }

    /// Whether the heuristic shows spending below the baseline
    pub fn is_saving(&self) -> bool {
        self.estimated_savings > 0.0
    }
}

/// Heuristic spend of the previous period
pub fn baseline(total_spend: f64) -> f64 {
    if total_spend > 0.0 {
        total_spend * BASELINE_MARKUP
    } else {
        FALLBACK_BASELINE
    }
}

/// Bought spend per UTC calendar day, oldest first
pub fn daily_spend<'a, I>(items: I) -> Vec<(NaiveDate, f64)>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for item in items.into_iter().filter(|item| item.is_bought()) {
        *by_day.entry(item.date.date_naive()).or_insert(0.0) += item.total;
    }
    by_day.into_iter().collect()
}

/// Format an amount with a fixed currency symbol prefix and no grouping
pub fn format_amount(symbol: &str, amount: f64) -> String {
    if amount < 0.0 {
        format!("-{}{}", symbol, -amount)
    } else {
        format!("{}{}", symbol, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    fn item(total: f64, status: Status, date: &str) -> Item {
        Item {
            id: 0,
            name: "x".to_string(),
            price: total,
            quantity: 1.0,
            unit: Unit::Count,
            total,
            status,
            date: date.parse().unwrap(),
        }
    }

    #[test]
    fn test_empty_totals_use_fallback_baseline() {
        let totals = Totals::from_items(&Vec::<Item>::new());
        assert_eq!(totals.total_spend, 0.0);
        assert_eq!(totals.item_count, 0);
        assert_eq!(totals.estimated_savings, 5000.0);
        assert!(totals.is_saving());
    }

    #[test]
    fn test_totals_ignore_planned() {
        let items = vec![
            item(120.0, Status::Bought, "2024-01-01T10:00:00Z"),
            item(60.0, Status::Planned, "2024-01-01T11:00:00Z"),
            item(80.0, Status::Bought, "2024-01-02T10:00:00Z"),
        ];
        let totals = Totals::from_items(&items);
        assert_eq!(totals.total_spend, 200.0);
        assert_eq!(totals.item_count, 2);
        assert!((totals.estimated_savings - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_baseline() {
        assert_eq!(baseline(0.0), FALLBACK_BASELINE);
        assert!((baseline(100.0) - 115.0).abs() < 1e-9);
    }

    #[test]
    fn test_daily_spend_groups_and_sorts() {
        let items = vec![
            item(10.0, Status::Bought, "2024-01-03T23:00:00Z"),
            item(5.0, Status::Bought, "2024-01-01T08:00:00Z"),
            item(7.5, Status::Bought, "2024-01-03T01:00:00Z"),
            item(99.0, Status::Planned, "2024-01-02T08:00:00Z"),
        ];
        let series = daily_spend(&items);
        assert_eq!(
            series,
            vec![
                (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 5.0),
                (NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 17.5),
            ]
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("₹", 120.0), "₹120");
        assert_eq!(format_amount("₹", 1.5), "₹1.5");
        assert_eq!(format_amount("$", -20.0), "-$20");
    }
}
