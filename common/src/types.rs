use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    Binance,
    OKX,
    Bybit,
    Bitget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    PostOnly,
}

/// 订单状态（网关推送）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Submitting,   // 提交中
    NotTraded,    // 未成交
    PartTraded,   // 部分成交
    AllTraded,    // 全部成交
    Cancelled,    // 已撤销
    Rejected,     // 拒单
}

impl Status {
    /// 是否为活动委托（未终结）
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Submitting | Status::NotTraded | Status::PartTraded)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Submitting => write!(f, "Submitting"),
            Status::NotTraded => write!(f, "NotTraded"),
            Status::PartTraded => write!(f, "PartTraded"),
            Status::AllTraded => write!(f, "AllTraded"),
            Status::Cancelled => write!(f, "Cancelled"),
            Status::Rejected => write!(f, "Rejected"),
        }
    }
}

/// 委托请求 - 发往网关前需经过风控检查
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub exchange: Exchange,
    pub side: Side,
    pub order_type: OrderType,
    pub volume: i64,                 // 委托数量（非正数会被风控拒绝）
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub reference: String,           // 策略/来源标识
}

impl OrderRequest {
    pub fn new(symbol: impl Into<String>, exchange: Exchange, side: Side, volume: i64) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            side,
            order_type: OrderType::Limit,
            volume,
            price: Decimal::ZERO,
            reference: String::new(),
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }
}

/// 成交回报
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeData {
    pub symbol: String,
    pub exchange: Exchange,
    pub trade_id: String,
    pub order_id: String,
    pub side: Side,
    pub price: Decimal,
    pub volume: u64,
    #[serde(default = "Utc::now")]
    pub datetime: DateTime<Utc>,
}

/// 委托状态回报
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderData {
    pub symbol: String,
    pub exchange: Exchange,
    pub order_id: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Decimal,
    pub volume: u64,
    #[serde(default)]
    pub traded: u64,
    pub status: Status,
    #[serde(default = "Utc::now")]
    pub datetime: DateTime<Utc>,
}

impl OrderData {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

/// 日志消息（经事件总线发布）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogData {
    pub msg: String,
    pub level: LogLevel,
    pub gateway_name: String,
    pub datetime: DateTime<Utc>,
}

impl LogData {
    pub fn new(msg: impl Into<String>, level: LogLevel, gateway_name: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            level,
            gateway_name: gateway_name.into(),
            datetime: Utc::now(),
        }
    }
}
