// Dedup & filter engine: drops already-notified listings, then applies the
// livability checks the search query cannot express server-side.
use crate::model::{Listing, Price};
use crate::normalizer::{self, RawRecord};
use std::collections::HashSet;
use tracing::debug;

/// Rent ceiling re-checked against the normalized price.
const MAX_MONTHLY_RENT: i64 = 30000;
/// Highest acceptable floor for a building without an elevator.
const MAX_WALKUP_FLOOR: u32 = 3;
/// Layout marker excluding studio-style open plans.
const OPEN_PLAN_MARKER: &str = "開放式";
/// Minimum size in ping.
const MIN_AREA: f64 = 15.0;

/// Normalizes raw records and keeps the ones worth notifying about.
/// Every survivor's id is added to `seen_ids` on the spot, so a listing
/// matched by two overlapping profiles in one run is kept only once.
pub fn select(records: &[RawRecord], seen_ids: &mut HashSet<String>) -> Vec<Listing> {
    let mut picked = Vec::new();
    for record in records {
        let listing = normalizer::normalize(record);
        if listing.id.is_empty() {
            continue;
        }
        if seen_ids.contains(&listing.id) {
            continue;
        }
        if !price_in_bounds(&listing) {
            debug!(id = %listing.id, price = %listing.price, "rejected: price out of bounds");
            continue;
        }
        if !floor_reachable(&listing) {
            debug!(id = %listing.id, floor = listing.floor_value, "rejected: walk-up too high");
            continue;
        }
        if is_open_plan(&listing) {
            debug!(id = %listing.id, "rejected: open-plan layout");
            continue;
        }
        if !meets_min_area(&listing) {
            debug!(id = %listing.id, area = listing.area_value, "rejected: too small");
            continue;
        }
        seen_ids.insert(listing.id.clone());
        picked.push(listing);
    }
    picked
}

/// Double-check of the search query's rent ceiling. Only applies to prices
/// that parsed numerically; masked prices pass through untouched.
pub fn price_in_bounds(listing: &Listing) -> bool {
    match listing.price {
        Price::Amount(p) => p > 0 && p <= MAX_MONTHLY_RENT,
        Price::Raw(_) => true,
    }
}

/// Without an elevator the unit must be on floor 3 or below.
pub fn floor_reachable(listing: &Listing) -> bool {
    listing.has_elevator || listing.floor_value <= MAX_WALKUP_FLOOR
}

pub fn is_open_plan(listing: &Listing) -> bool {
    !listing.room_label.is_empty() && listing.room_label.contains(OPEN_PLAN_MARKER)
}

pub fn meets_min_area(listing: &Listing) -> bool {
    listing.area_value >= MIN_AREA
}
