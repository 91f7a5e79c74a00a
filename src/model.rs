// Core structs: Listing, Price, per-layer errors
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monthly rent as reported by the source. Listings with masked or
/// negotiable pricing come through as free text; those keep the raw
/// string and are exempt from numeric bounds checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(i64),
    Raw(String),
}

impl Price {
    /// Numeric value for sorting; raw prices rank as 0.
    pub fn numeric(&self) -> i64 {
        match self {
            Price::Amount(n) => *n,
            Price::Raw(_) => 0,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Price::Amount(_))
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::Raw(String::new())
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Price::Amount(n) => write!(f, "{}", group_thousands(*n)),
            Price::Raw(s) => write!(f, "{}", s),
        }
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One canonical rental listing, immutable once built by the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub area_text: String,
    #[serde(default)]
    pub area_value: f64,
    #[serde(default)]
    pub floor_text: String,
    #[serde(default)]
    pub floor_value: u32,
    #[serde(default)]
    pub has_elevator: bool,
    #[serde(default)]
    pub room_label: String,
    #[serde(default)]
    pub kind_label: String,
}

impl Listing {
    /// Recency proxy: 591 ids increase with posting time, so the id itself
    /// doubles as the posted-at ordinal. Non-numeric ids sort oldest.
    pub fn posted_marker(&self) -> u64 {
        crate::utils::id_ordinal(&self.id)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("session bootstrap failed after {attempts} attempts: {reason}")]
    Bootstrap { attempts: u32, reason: String },
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("embedded state not found in page")]
    StateNotFound,
    #[error("embedded state is not valid JSON: {0}")]
    StateDecode(String),
    #[error("search payload missing from state tree")]
    PayloadNotFound,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why a state file could not be loaded. Collapsed to the empty default at
/// the persistence boundary; kept distinct so a corrupt file can be logged
/// while a merely missing one stays silent.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("state file missing")]
    Missing,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("telegram api error: {0}")]
    Api(String),
    #[error("telegram unreachable")]
    Unreachable,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_display_groups_thousands() {
        assert_eq!(Price::Amount(28000).to_string(), "28,000");
        assert_eq!(Price::Amount(900).to_string(), "900");
        assert_eq!(Price::Amount(1234567).to_string(), "1,234,567");
    }

    #[test]
    fn raw_price_displays_verbatim_and_ranks_zero() {
        let p = Price::Raw("面議".to_string());
        assert_eq!(p.to_string(), "面議");
        assert_eq!(p.numeric(), 0);
        assert!(!p.is_numeric());
    }

    #[test]
    fn price_serde_roundtrip_is_untagged() {
        let amount: Price = serde_json::from_str("28000").unwrap();
        assert_eq!(amount, Price::Amount(28000));
        let raw: Price = serde_json::from_str("\"面議\"").unwrap();
        assert_eq!(raw, Price::Raw("面議".to_string()));
        assert_eq!(serde_json::to_string(&amount).unwrap(), "28000");
    }

    #[test]
    fn listing_decodes_with_missing_fields() {
        let l: Listing = serde_json::from_str("{\"id\":\"18664328\"}").unwrap();
        assert_eq!(l.posted_marker(), 18664328);
        assert_eq!(l.price, Price::Raw(String::new()));
        assert_eq!(l.floor_value, 0);
    }

    #[test]
    fn non_numeric_id_sorts_oldest() {
        let l: Listing = serde_json::from_str("{\"id\":\"abc\"}").unwrap();
        assert_eq!(l.posted_marker(), 0);
    }
}
