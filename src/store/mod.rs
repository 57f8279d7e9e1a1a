//! Layout Slot Store
//!
//! Persists up to [`NUM_SLOTS`](crate::config::NUM_SLOTS) layouts as JSON text,
//! together with a parallel array of usage counters used for menu ordering.
//! Slots that are empty or fail to decode are treated as empty, never as errors.

pub mod debounce;
pub mod slots;

pub use debounce::Debouncer;
pub use slots::{SlotEntry, SlotStore, StoreEvent};

#[cfg(test)]
mod store_tests;
