// Telegram HTML rendering of a listing. Absent fields are dropped
// rather than rendered as blank lines.
use crate::model::{Listing, Price};

pub fn format_listing(listing: &Listing) -> String {
    let mut parts = vec![format!("🏠 <b>{}</b>", escape_html(&listing.title))];

    match &listing.price {
        Price::Amount(_) => parts.push(format!("💰 {} 元/月", listing.price)),
        Price::Raw(s) if !s.trim().is_empty() => {
            parts.push(format!("💰 {} 元/月", escape_html(s)));
        }
        Price::Raw(_) => {}
    }

    if !listing.address.is_empty() {
        parts.push(format!("📍 {}", escape_html(&listing.address)));
    }
    if !listing.area_text.is_empty() {
        parts.push(format!("📐 {}", escape_html(&listing.area_text)));
    }
    if !listing.floor_text.is_empty() {
        let elevator = if listing.has_elevator { "有電梯" } else { "無電梯" };
        parts.push(format!("🏢 {}（{}）", escape_html(&listing.floor_text), elevator));
    }
    if !listing.room_label.is_empty() {
        parts.push(format!("🛏 {}", escape_html(&listing.room_label)));
    }

    parts.push(format!("🔗 <a href=\"{}\">查看詳情</a>", listing.url));
    parts.join("\n")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        serde_json::from_str(
            r#"{"id":"12345","title":"信義區兩房","address":"台北市信義區",
                "url":"https://rent.591.com.tw/12345","price":28000,
                "area_text":"18.5坪","floor_text":"2F/5F","has_elevator":true,
                "room_label":"2房1廳"}"#,
        )
        .unwrap()
    }

    #[test]
    fn full_listing_renders_every_line() {
        let text = format_listing(&listing());
        assert_eq!(
            text,
            "🏠 <b>信義區兩房</b>\n\
             💰 28,000 元/月\n\
             📍 台北市信義區\n\
             📐 18.5坪\n\
             🏢 2F/5F（有電梯）\n\
             🛏 2房1廳\n\
             🔗 <a href=\"https://rent.591.com.tw/12345\">查看詳情</a>"
        );
    }

    #[test]
    fn absent_fields_are_omitted() {
        let mut l = listing();
        l.price = Price::Raw(String::new());
        l.address.clear();
        l.area_text.clear();
        l.floor_text.clear();
        l.room_label.clear();
        let text = format_listing(&l);
        assert_eq!(
            text,
            "🏠 <b>信義區兩房</b>\n🔗 <a href=\"https://rent.591.com.tw/12345\">查看詳情</a>"
        );
    }

    #[test]
    fn no_elevator_is_labelled() {
        let mut l = listing();
        l.has_elevator = false;
        assert!(format_listing(&l).contains("🏢 2F/5F（無電梯）"));
    }

    #[test]
    fn raw_price_text_is_shown_verbatim() {
        let mut l = listing();
        l.price = Price::Raw("面議".to_string());
        assert!(format_listing(&l).contains("💰 面議 元/月"));
    }

    #[test]
    fn markup_in_titles_is_escaped() {
        let mut l = listing();
        l.title = "1F<頂樓> & 加蓋".to_string();
        assert!(format_listing(&l).contains("<b>1F&lt;頂樓&gt; &amp; 加蓋</b>"));
    }
}
