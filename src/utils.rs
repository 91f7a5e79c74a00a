// Utility functions
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Treats a listing id as an integer ordinal. Non-numeric ids map to 0,
/// which sorts them below every real id.
pub fn id_ordinal(id: &str) -> u64 {
    id.parse::<u64>().unwrap_or(0)
}

/// Politeness delay between requests, jittered inside a fixed range.
/// `Pacing::none()` turns the wait into a no-op for tests.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    min_ms: u64,
    max_ms: u64,
}

impl Pacing {
    /// Between result pages of one region.
    pub fn pages() -> Self {
        Self { min_ms: 2000, max_ms: 4000 }
    }

    /// Between region profiles.
    pub fn regions() -> Self {
        Self { min_ms: 2000, max_ms: 3000 }
    }

    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    pub async fn wait(&self) {
        if self.max_ms == 0 {
            return;
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        sleep(Duration::from_millis(ms)).await;
    }
}
