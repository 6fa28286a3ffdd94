use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::models::{PageSnapshot, RawCard, Record};

/// The selectors a rendering session needs to read raw card fields off a
/// listing page. Data only, so any session backend can interpret it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionDescriptor {
    pub card: String,
    pub name: String,
    pub dollars: String,
    pub cents: String,
}

impl From<&ExtractionConfig> for ExtractionDescriptor {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            card: config.card_selector.clone(),
            name: config.name_selector.clone(),
            dollars: config.dollars_selector.clone(),
            cents: config.cents_selector.clone(),
        }
    }
}

/// Turns raw card fields into records with a canonical `$<dollars>.<cents>`
/// price. Store pages render the dollar figure with currency symbols and
/// thousands separators, so both parts are reduced to their digits before
/// composition.
pub struct RecordExtractor {
    non_digits: Regex,
}

impl RecordExtractor {
    pub fn new() -> Self {
        RecordExtractor {
            non_digits: Regex::new(r"[^0-9]").unwrap(),
        }
    }

    fn digit_part(&self, raw: Option<&str>, fallback: &str) -> String {
        match raw {
            Some(text) => {
                let digits = self.non_digits.replace_all(text, "");
                if digits.is_empty() {
                    fallback.to_string()
                } else {
                    digits.into_owned()
                }
            }
            None => fallback.to_string(),
        }
    }

    /// Missing parts fall back to zero, so a card whose price block never
    /// rendered composes to `$0.00` and gets caught by record validation.
    pub fn compose_price(&self, card: &RawCard) -> String {
        let dollars = self.digit_part(card.dollars.as_deref(), "0");
        let cents = self.digit_part(card.cents.as_deref(), "00");
        format!("${}.{}", dollars, cents)
    }

    pub fn record_from(&self, card: &RawCard) -> Record {
        let name = card.name.as_deref().unwrap_or_default().trim().to_string();
        Record::new(name, self.compose_price(card))
    }

    /// Builds a snapshot from the cards of one page rendering, preserving
    /// their on-page order.
    pub fn snapshot_from(&self, cards: &[RawCard]) -> PageSnapshot {
        PageSnapshot {
            records: cards.iter().map(|card| self.record_from(card)).collect(),
            degraded: false,
        }
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}
