use serde::{Deserialize, Serialize};

/// A composed price of exactly zero marks an item card whose price block had
/// not rendered yet; such records are never considered valid.
pub const ZERO_PRICE: &str = "$0.00";

/// One catalog item as it goes out to CSV and the run report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub price: String,
}

impl Record {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }

    /// Valid means a non-empty name and a non-zero price of the canonical
    /// `$<dollars>.<cents>` shape.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.price != ZERO_PRICE && has_price_shape(&self.price)
    }
}

fn has_price_shape(price: &str) -> bool {
    let Some(rest) = price.strip_prefix('$') else {
        return false;
    };
    let Some((dollars, cents)) = rest.split_once('.') else {
        return false;
    };
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    all_digits(dollars) && all_digits(cents)
}

/// Field texts read off one item card before price composition. `None` means
/// the selector matched nothing (or only whitespace) inside the card.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawCard {
    pub name: Option<String>,
    pub dollars: Option<String>,
    pub cents: Option<String>,
}

/// The records read from one rendering of one page, in DOM order. `degraded`
/// is set when the snapshot was accepted with invalid records after the
/// extraction retries ran out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageSnapshot {
    pub records: Vec<Record>,
    pub degraded: bool,
}

impl PageSnapshot {
    pub fn invalid_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_valid()).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
