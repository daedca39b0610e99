pub mod types;
pub mod events;

pub use events::{Event, EventKind};
pub use types::{
    Exchange, LogData, LogLevel, OrderData, OrderRequest, OrderType, Side, Status, TradeData,
};
