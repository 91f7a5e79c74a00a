// Storage module: durable seen-id and pending-queue state.

pub mod json_store;

pub use json_store::StateStore;
