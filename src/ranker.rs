// Deterministic ordering of matched listings before delivery.
use crate::model::Listing;
use std::cmp::Ordering;

/// Newest first (id as recency proxy), then larger, then cheaper.
/// The sort is stable, so equal keys keep their merge order.
pub fn rank(listings: &mut [Listing]) {
    listings.sort_by(compare);
}

fn compare(a: &Listing, b: &Listing) -> Ordering {
    b.posted_marker()
        .cmp(&a.posted_marker())
        .then_with(|| b.area_value.total_cmp(&a.area_value))
        .then_with(|| a.price.numeric().cmp(&b.price.numeric()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Price;

    fn listing(id: &str, area: f64, price: i64) -> Listing {
        Listing {
            area_value: area,
            price: Price::Amount(price),
            ..serde_json::from_str(&format!(r#"{{"id":"{}"}}"#, id)).unwrap()
        }
    }

    #[test]
    fn newest_largest_cheapest_in_that_order() {
        let mut listings = vec![
            listing("100", 20.0, 10000),
            listing("100", 25.0, 9000),
            listing("90", 30.0, 5000),
        ];
        rank(&mut listings);
        let keys: Vec<(u64, f64)> = listings
            .iter()
            .map(|l| (l.posted_marker(), l.area_value))
            .collect();
        assert_eq!(keys, vec![(100, 25.0), (100, 20.0), (90, 30.0)]);
    }

    #[test]
    fn price_breaks_full_ties_cheaper_first() {
        let mut listings = vec![
            listing("100", 20.0, 12000),
            listing("100", 20.0, 9000),
        ];
        rank(&mut listings);
        assert_eq!(listings[0].price, Price::Amount(9000));
    }

    #[test]
    fn non_numeric_ids_sort_last() {
        let mut listings = vec![listing("abc", 40.0, 5000), listing("1", 16.0, 20000)];
        rank(&mut listings);
        assert_eq!(listings[0].id, "1");
    }

    #[test]
    fn ranking_is_deterministic() {
        let mut a = vec![
            listing("300", 18.0, 15000),
            listing("100", 25.0, 9000),
            listing("200", 30.0, 5000),
        ];
        let mut b = a.clone();
        b.reverse();
        rank(&mut a);
        rank(&mut b);
        let ids_a: Vec<&str> = a.iter().map(|l| l.id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids_a, vec!["300", "200", "100"]);
        assert_eq!(ids_a, ids_b);
    }
}
