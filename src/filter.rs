// Query filtering over ledger items

use crate::models::Item;
use eyre::{Result, eyre};
use std::cmp::Ordering;
use std::fmt;

/// Filter for querying items, e.g. `total>=100` or `name~milk`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name to filter on
    pub field: Field,
    /// Comparison operator
    pub op: FilterOp,
    /// Value to compare against
    pub value: FieldValue,
}

/// Item fields that can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Status,
    Unit,
    Price,
    Quantity,
    Total,
}

/// Comparison operators for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,       // =
    Ne,       // !=
    Gt,       // >
    Lt,       // <
    Gte,      // >=
    Lte,      // <=
    Contains, // ~ (case-insensitive substring)
}

/// Value types that can be compared
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl Field {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "status" => Ok(Field::Status),
            "unit" => Ok(Field::Unit),
            "price" => Ok(Field::Price),
            "qty" | "quantity" => Ok(Field::Quantity),
            "total" => Ok(Field::Total),
            other => Err(eyre!("Unknown field: {} (expected name, status, unit, price, qty or total)", other)),
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, Field::Price | Field::Quantity | Field::Total)
    }

    /// Extract this field's value from an item
    pub fn value_of(self, item: &Item) -> FieldValue {
        match self {
            Field::Name => FieldValue::Text(item.name.clone()),
            Field::Status => FieldValue::Text(item.status.as_str().to_string()),
            Field::Unit => FieldValue::Text(item.unit.as_str().to_string()),
            Field::Price => FieldValue::Number(item.price),
            Field::Quantity => FieldValue::Number(item.quantity),
            Field::Total => FieldValue::Number(item.total),
        }
    }
}

impl FilterOp {
    /// Operators in the order they must be tried when scanning an expression
    const TOKENS: [(&'static str, FilterOp); 7] = [
        (">=", FilterOp::Gte),
        ("<=", FilterOp::Lte),
        ("!=", FilterOp::Ne),
        ("=", FilterOp::Eq),
        (">", FilterOp::Gt),
        ("<", FilterOp::Lt),
        ("~", FilterOp::Contains),
    ];

    fn symbol(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::Contains => "~",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Ne => ordering != Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
            FilterOp::Contains => false,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl Filter {
    /// Parse an expression of the form `<field><op><value>`
    pub fn parse(expr: &str) -> Result<Self> {
        let (pos, token, op) = FilterOp::TOKENS
            .iter()
            .filter_map(|(token, op)| expr.find(token).map(|pos| (pos, *token, *op)))
            .min_by_key(|(pos, token, _)| (*pos, std::cmp::Reverse(token.len())))
            .ok_or_else(|| eyre!("Invalid filter expression: {} (expected e.g. total>=100)", expr))?;

        let field = Field::parse(&expr[..pos])?;
        let raw = expr[pos + token.len()..].trim();
        if raw.is_empty() {
            return Err(eyre!("Filter value cannot be empty: {}", expr));
        }

        let value = if field.is_numeric() && op != FilterOp::Contains {
            let n: f64 = raw
                .parse()
                .map_err(|_| eyre!("Expected a number for {:?}, got {}", field, raw))?;
            FieldValue::Number(n)
        } else {
            FieldValue::Text(raw.to_string())
        };

        Ok(Self { field, op, value })
    }

    /// Check whether an item satisfies this filter
    pub fn matches(&self, item: &Item) -> bool {
        let actual = self.field.value_of(item);

        if self.op == FilterOp::Contains {
            return actual
                .to_string()
                .to_lowercase()
                .contains(&self.value.to_string().to_lowercase());
        }

        let ordering = match (&actual, &self.value) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.partial_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.to_lowercase().cmp(&b.to_lowercase())),
            _ => None,
        };

        ordering.is_some_and(|o| self.op.accepts(o))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{}{}", self.field, self.op, self.value)
    }
}
