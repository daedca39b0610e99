use dashmap::DashMap;
use tracing::debug;

use common::types::OrderData;

/// 活动委托数量查询接口（风控检查中同步调用）
///
/// 调用发生在风控计数锁内，实现不能回调 `RiskEngine`。
pub trait ActiveOrderSource: Send + Sync {
    fn active_order_count(&self) -> anyhow::Result<usize>;
}

impl<F> ActiveOrderSource for F
where
    F: Fn() -> anyhow::Result<usize> + Send + Sync,
{
    fn active_order_count(&self) -> anyhow::Result<usize> {
        self()
    }
}

/// 活动委托跟踪器 - 根据委托回报维护未终结委托
pub struct OrderTracker {
    active_orders: DashMap<String, OrderData>,
}

impl OrderTracker {
    pub fn new() -> Self {
        Self {
            active_orders: DashMap::new(),
        }
    }

    /// 处理委托回报
    pub fn update_order(&self, order: &OrderData) {
        if order.is_active() {
            self.active_orders.insert(order.order_id.clone(), order.clone());
        } else if self.active_orders.remove(&order.order_id).is_some() {
            debug!("Order {} finished with status {}", order.order_id, order.status);
        }
    }

    pub fn get_all_active_orders(&self) -> Vec<OrderData> {
        self.active_orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.active_orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_orders.is_empty()
    }
}

impl Default for OrderTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveOrderSource for OrderTracker {
    fn active_order_count(&self) -> anyhow::Result<usize> {
        Ok(self.active_orders.len())
    }
}
