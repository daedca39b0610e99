pub mod order_tracker;

pub use order_tracker::{ActiveOrderSource, OrderTracker};
