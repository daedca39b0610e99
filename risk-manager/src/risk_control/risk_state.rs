use std::collections::HashMap;
use serde::Serialize;
use tracing::{debug, trace};

use common::types::{OrderData, Status, TradeData};

/// 风控计数状态 - 进程内存活，不持久化
///
/// 所有字段由 `RiskEngine` 的同一把互斥锁保护，
/// 这里的方法只做纯粹的状态变更。
#[derive(Debug, Clone, Default)]
pub struct RiskState {
    order_flow_count: u64,                     // 当前流控窗口内已放行委托数
    order_flow_timer: u64,                     // 距上次流控清空的定时器次数
    trade_count: u64,                          // 今日累计成交数量
    order_cancel_counts: HashMap<String, u64>, // 品种 -> 撤单次数
}

impl RiskState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_flow_count(&self) -> u64 {
        self.order_flow_count
    }

    pub fn order_flow_timer(&self) -> u64 {
        self.order_flow_timer
    }

    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    /// 撤单次数，未出现过的品种视为0
    pub fn cancel_count(&self, symbol: &str) -> u64 {
        self.order_cancel_counts.get(symbol).copied().unwrap_or(0)
    }

    /// 处理成交回报 - 累加成交数量
    pub fn process_trade(&mut self, trade: &TradeData) {
        self.trade_count = self.trade_count.saturating_add(trade.volume);
        trace!("Trade {} on {}: +{} -> {}", trade.trade_id, trade.symbol, trade.volume, self.trade_count);
    }

    /// 处理委托回报 - 仅统计撤单，返回是否计数
    pub fn process_order(&mut self, order: &OrderData) -> bool {
        if order.status != Status::Cancelled {
            return false;
        }

        let count = self.order_cancel_counts
            .entry(order.symbol.clone())
            .or_insert(0);
        *count += 1;
        debug!("Cancel count for {}: {}", order.symbol, count);
        true
    }

    /// 处理定时器 - 达到清空间隔时重置流控计数，返回被清空前的流控数
    pub fn process_timer(&mut self, flow_clear_interval: u64) -> Option<u64> {
        self.order_flow_timer += 1;

        if self.order_flow_timer >= flow_clear_interval {
            let cleared = self.order_flow_count;
            self.reset_order_flow();
            trace!("Order flow window elapsed, cleared {}", cleared);
            return Some(cleared);
        }

        None
    }

    /// 放行一笔委托
    pub fn add_order_flow(&mut self) {
        self.order_flow_count += 1;
    }

    /// 流控计数与定时器一起清零
    pub fn reset_order_flow(&mut self) {
        self.order_flow_count = 0;
        self.order_flow_timer = 0;
    }

    pub fn reset_trade_count(&mut self) {
        self.trade_count = 0;
    }

    pub fn get_summary(&self) -> RiskSummary {
        RiskSummary {
            order_flow_count: self.order_flow_count,
            order_flow_timer: self.order_flow_timer,
            trade_count: self.trade_count,
            order_cancel_counts: self.order_cancel_counts.clone(),
        }
    }
}

/// 风控计数摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskSummary {
    pub order_flow_count: u64,
    pub order_flow_timer: u64,
    pub trade_count: u64,
    pub order_cancel_counts: HashMap<String, u64>,
}
