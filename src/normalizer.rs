// Maps raw source records onto the canonical Listing shape.
//
// The site exposed two record shapes over time: the legacy JSON list API
// and the current server-rendered page state. Each transport tags its
// records with the matching variant, so normalization never has to sniff
// field presence to guess the origin.
use crate::model::{Listing, Price};
use serde::Deserialize;

const ELEVATOR_TAG: &str = "有電梯";
const DEFAULT_KIND: &str = "整層住家";

/// Source value that may arrive as a JSON number or string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Num(f64),
    Str(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Num(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Scalar::Num(n) => format!("{}", n),
            Scalar::Str(s) => s.trim().to_string(),
        }
    }
}

/// Record embedded in the rendered list page state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SsrRecord {
    pub id: Option<Scalar>,
    pub title: String,
    pub price: Option<Scalar>,
    pub address: String,
    pub area: Option<Scalar>,
    pub area_name: Option<String>,
    pub floor_name: String,
    pub kind_name: Option<String>,
    #[serde(rename = "layoutStr")]
    pub layout_str: String,
    pub tags: Vec<String>,
    pub url: Option<String>,
    pub cover: String,
}

/// Record returned by the legacy list API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiRecord {
    pub post_id: Option<Scalar>,
    pub title: String,
    pub price: Option<Scalar>,
    pub section_name: String,
    pub street_name: String,
    pub area: Option<Scalar>,
    pub floor: Option<Scalar>,
    pub allfloor: Option<Scalar>,
    pub kind_name: Option<String>,
    pub room_str: String,
    pub photo_src: String,
    pub tags: Vec<String>,
}

/// Raw record tagged by the transport that produced it.
#[derive(Debug, Clone)]
pub enum RawRecord {
    Ssr(SsrRecord),
    Api(ApiRecord),
}

pub fn normalize(record: &RawRecord) -> Listing {
    match record {
        RawRecord::Ssr(r) => normalize_ssr(r),
        RawRecord::Api(r) => normalize_api(r),
    }
}

fn normalize_ssr(r: &SsrRecord) -> Listing {
    let id = r.id.as_ref().map(Scalar::as_text).unwrap_or_default();
    let area_text = match &r.area_name {
        Some(name) => name.clone(),
        None => r.area.as_ref().map(Scalar::as_text).unwrap_or_default(),
    };
    Listing {
        url: r.url.clone().unwrap_or_else(|| listing_url(&id)),
        title: r.title.trim().to_string(),
        address: r.address.trim().to_string(),
        photo_url: r.cover.clone(),
        price: parse_price(r.price.as_ref()),
        area_text,
        area_value: parse_area(r.area.as_ref()),
        floor_value: parse_floor(&r.floor_name),
        floor_text: r.floor_name.clone(),
        has_elevator: r.tags.iter().any(|t| t == ELEVATOR_TAG),
        room_label: r.layout_str.clone(),
        kind_label: r.kind_name.clone().unwrap_or_else(|| DEFAULT_KIND.to_string()),
        id,
    }
}

fn normalize_api(r: &ApiRecord) -> Listing {
    let id = r.post_id.as_ref().map(Scalar::as_text).unwrap_or_default();
    let floor = r.floor.as_ref().map(Scalar::as_text).unwrap_or_default();
    let allfloor = r.allfloor.as_ref().map(Scalar::as_text).unwrap_or_default();
    let floor_text = if floor.is_empty() || allfloor.is_empty() {
        String::new()
    } else {
        format!("{}F/{}F", floor, allfloor)
    };
    let area_text = r.area.as_ref().map(Scalar::as_text).unwrap_or_default();
    Listing {
        url: listing_url(&id),
        title: r.title.trim().to_string(),
        address: format!("{}{}", r.section_name.trim(), r.street_name.trim()),
        photo_url: r.photo_src.clone(),
        price: parse_price(r.price.as_ref()),
        area_value: parse_area(r.area.as_ref()),
        area_text,
        floor_value: parse_floor(&floor_text),
        floor_text,
        has_elevator: r.tags.iter().any(|t| t == ELEVATOR_TAG),
        room_label: r.room_str.clone(),
        kind_label: r.kind_name.clone().unwrap_or_else(|| DEFAULT_KIND.to_string()),
        id,
    }
}

fn listing_url(id: &str) -> String {
    format!("https://rent.591.com.tw/{}", id)
}

/// Strips thousands separators and coerces to an amount. Anything that does
/// not reduce to plain digits stays as the raw sentinel so the selector's
/// numeric double-check skips it.
fn parse_price(value: Option<&Scalar>) -> Price {
    match value {
        None => Price::Raw(String::new()),
        Some(Scalar::Num(n)) => Price::Amount(*n as i64),
        Some(Scalar::Str(s)) => {
            let stripped: String = s.trim().replace(',', "");
            if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
                Price::Amount(stripped.parse().unwrap_or(0))
            } else {
                Price::Raw(s.clone())
            }
        }
    }
}

fn parse_area(value: Option<&Scalar>) -> f64 {
    match value {
        None => 0.0,
        Some(Scalar::Num(n)) => *n,
        Some(Scalar::Str(s)) => {
            let trimmed = s.trim();
            if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.') {
                trimmed.parse().unwrap_or(0.0)
            } else {
                0.0
            }
        }
    }
}

/// Current floor from labels like "4F/8F": token before the separator,
/// non-digits stripped. Basement tokens ("B1F") count as floor 0.
fn parse_floor(floor_name: &str) -> u32 {
    let part = match floor_name.split('/').next() {
        Some(p) => p.trim().to_uppercase(),
        None => return 0,
    };
    if part.starts_with('B') {
        return 0;
    }
    let digits: String = part.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ssr_record(json: &str) -> SsrRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn floor_parsing_edge_cases() {
        assert_eq!(parse_floor("4F/8F"), 4);
        assert_eq!(parse_floor("B1F/5F"), 0);
        assert_eq!(parse_floor(""), 0);
        assert_eq!(parse_floor("RF/10F"), 0);
        assert_eq!(parse_floor("12F"), 12);
    }

    #[test]
    fn price_with_separator_is_coerced() {
        let r = ssr_record(r#"{"id":"1","price":"28,000"}"#);
        assert_eq!(normalize(&RawRecord::Ssr(r)).price, Price::Amount(28000));
    }

    #[test]
    fn missing_price_stays_raw() {
        let r = ssr_record(r#"{"id":"1"}"#);
        let listing = normalize(&RawRecord::Ssr(r));
        assert_eq!(listing.price, Price::Raw(String::new()));
        assert!(!listing.price.is_numeric());
    }

    #[test]
    fn negotiable_price_keeps_source_text() {
        let r = ssr_record(r#"{"id":"1","price":"面議"}"#);
        assert_eq!(
            normalize(&RawRecord::Ssr(r)).price,
            Price::Raw("面議".to_string())
        );
    }

    #[test]
    fn numeric_id_becomes_string() {
        let r = ssr_record(r#"{"id":18664328,"title":" 信義區套房 "}"#);
        let listing = normalize(&RawRecord::Ssr(r));
        assert_eq!(listing.id, "18664328");
        assert_eq!(listing.title, "信義區套房");
    }

    #[test]
    fn url_synthesized_from_id_when_absent() {
        let r = ssr_record(r#"{"id":"12345"}"#);
        assert_eq!(
            normalize(&RawRecord::Ssr(r)).url,
            "https://rent.591.com.tw/12345"
        );
    }

    #[test]
    fn area_string_parses_with_fraction() {
        let r = ssr_record(r#"{"id":"1","area":"18.5"}"#);
        let listing = normalize(&RawRecord::Ssr(r));
        assert_eq!(listing.area_value, 18.5);
        assert_eq!(listing.area_text, "18.5");
    }

    #[test]
    fn malformed_area_defaults_to_zero() {
        let r = ssr_record(r#"{"id":"1","area":"約20坪"}"#);
        assert_eq!(normalize(&RawRecord::Ssr(r)).area_value, 0.0);
    }

    #[test]
    fn area_name_wins_over_numeric_area() {
        let r = ssr_record(r#"{"id":"1","area":18.5,"area_name":"18.5坪"}"#);
        let listing = normalize(&RawRecord::Ssr(r));
        assert_eq!(listing.area_text, "18.5坪");
        assert_eq!(listing.area_value, 18.5);
    }

    #[test]
    fn elevator_tag_sets_flag() {
        let r = ssr_record(r#"{"id":"1","tags":["有電梯","可開伙"]}"#);
        assert!(normalize(&RawRecord::Ssr(r)).has_elevator);
        let r = ssr_record(r#"{"id":"1","tags":["可開伙"]}"#);
        assert!(!normalize(&RawRecord::Ssr(r)).has_elevator);
    }

    #[test]
    fn api_record_synthesizes_floor_text() {
        let r: ApiRecord = serde_json::from_str(
            r#"{"post_id":9876,"title":"大安區兩房","price":"25,000",
                "section_name":"大安區","street_name":"和平東路",
                "area":"22","floor":"4","allfloor":"8",
                "room_str":"2房1廳","tags":["有電梯"]}"#,
        )
        .unwrap();
        let listing = normalize(&RawRecord::Api(r));
        assert_eq!(listing.id, "9876");
        assert_eq!(listing.floor_text, "4F/8F");
        assert_eq!(listing.floor_value, 4);
        assert_eq!(listing.address, "大安區和平東路");
        assert_eq!(listing.price, Price::Amount(25000));
        assert_eq!(listing.url, "https://rent.591.com.tw/9876");
        assert!(listing.has_elevator);
    }

    #[test]
    fn missing_id_yields_empty_string() {
        let r = ssr_record(r#"{"title":"no id"}"#);
        assert_eq!(normalize(&RawRecord::Ssr(r)).id, "");
    }
}
