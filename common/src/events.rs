use serde::{Deserialize, Serialize};
use crate::types::{LogData, OrderData, TradeData};

/// 事件总线上的通知类型（封闭集合，按变体分发）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    Trade(TradeData),
    Order(OrderData),
    Timer,
    Log(LogData),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Trade,
    Order,
    Timer,
    Log,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Trade(_) => EventKind::Trade,
            Event::Order(_) => EventKind::Order,
            Event::Timer => EventKind::Timer,
            Event::Log(_) => EventKind::Log,
        }
    }
}
