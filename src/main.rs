mod config;
mod model;
mod normalizer;
mod notifier;
mod parser;
mod ranker;
mod crawler;
mod selector;
mod storage;
mod utils;

use chrono::{FixedOffset, Utc};
use config::{AppConfig, TransportKind, load_config};
use crawler::{ApiTransport, PaginatedFetcher, RetryPolicy, SsrTransport, Transport};
use model::{StoreError, TransportError};
use notifier::{DeliveryBatcher, TelegramNotifier};
use std::sync::Arc;
use storage::StateStore;
use tracing::{error, info, warn};
use utils::Pacing;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let notifier = TelegramNotifier::new(&config.telegram);
    if !notifier.is_enabled() {
        warn!("Telegram credentials missing, notifications will only be logged");
    }

    let taipei = FixedOffset::east_opt(8 * 3600).expect("valid offset");
    let now = Utc::now().with_timezone(&taipei);
    info!("=== 591 rent watch started ({}) ===", now.format("%Y-%m-%d %H:%M"));

    // Transport/session failure is fatal: nothing has been decided yet,
    // so abort with a single alert.
    let transport = match connect_transport(config.transport, &RetryPolicy::bootstrap()).await {
        Ok(t) => t,
        Err(e) => {
            error!("Transport bootstrap failed: {}", e);
            if let Err(e) = notifier
                .notify_text(&format!("🚨 591 爬蟲故障：無法連線來源網站\n{}", e))
                .await
            {
                warn!("Alert notification failed: {:?}", e);
            }
            return;
        }
    };

    match run(&config, transport, &notifier).await {
        Ok(()) => info!("=== Run finished ==="),
        Err(e) => {
            error!("Run failed: {:?}", e);
            if let Err(e) = notifier
                .notify_text(&format!("🚨 591 爬蟲執行錯誤\n{}", e))
                .await
            {
                warn!("Alert notification failed: {:?}", e);
            }
        }
    }
}

async fn connect_transport(
    kind: TransportKind,
    retry: &RetryPolicy,
) -> Result<Arc<dyn Transport>, TransportError> {
    match kind {
        TransportKind::Ssr => Ok(Arc::new(SsrTransport::connect(retry).await?)),
        TransportKind::Api => Ok(Arc::new(ApiTransport::connect(retry).await?)),
    }
}

/// One full pipeline pass: fetch every region profile, select the fresh
/// matches, merge with last run's overflow, rank, deliver a batch, and
/// persist the new state. Sequential by design; the only suspensions are
/// pacing sleeps.
async fn run(
    config: &AppConfig,
    transport: Arc<dyn Transport>,
    notifier: &TelegramNotifier,
) -> Result<(), StoreError> {
    let store = StateStore::new(&config.seen_file, &config.pending_file);
    let mut seen_ids = store.load_seen();
    info!(count = seen_ids.len(), "Loaded seen listing history");

    let fetcher = PaginatedFetcher::new(transport);
    let region_pacing = Pacing::regions();

    let mut fresh = Vec::new();
    for (i, profile) in config.profiles.iter().enumerate() {
        if i > 0 {
            region_pacing.wait().await;
        }
        let records = fetcher.fetch(profile, &config.filter).await;
        let picked = selector::select(&records, &mut seen_ids);
        info!(
            label = %profile.label,
            fetched = records.len(),
            matched = picked.len(),
            "Profile processed"
        );
        fresh.extend(picked);
    }

    let pending = store.load_pending();
    if !pending.is_empty() {
        info!(count = pending.len(), "Loaded pending listings from last run");
    }

    let new_count = fresh.len();
    let mut queue = pending;
    queue.extend(fresh);

    if queue.is_empty() {
        info!("No new listings");
        store.save_pending(&[])?;
        store.save_seen(&seen_ids)?;
        return Ok(());
    }

    ranker::rank(&mut queue);
    info!(
        total = queue.len(),
        new = new_count,
        carried = queue.len() - new_count,
        "Listings queued for delivery"
    );

    let remainder = DeliveryBatcher::new().deliver(notifier, queue).await;
    if !remainder.is_empty() {
        info!(count = remainder.len(), "Carrying overflow to next run");
    }

    // Save both even if one write fails: seen ids already reflect decisions
    // made this run, and losing them would re-notify next time.
    let pending_result = store.save_pending(&remainder);
    let seen_result = store.save_seen(&seen_ids);
    pending_result?;
    seen_result?;
    Ok(())
}
