// Notifier module: Telegram delivery of matched listings.

pub mod batcher;
pub mod message;
pub mod telegram;

pub use batcher::DeliveryBatcher;
pub use telegram::TelegramNotifier;
