use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 风控阈值集合 - 持久化字段名与配置文件保持一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRules {
    #[serde(rename = "active")]
    pub enabled: bool,                      // 风控开关

    #[serde(rename = "order_size_limit")]
    pub max_order_size: u64,                // 单笔委托上限

    #[serde(rename = "trade_limit")]
    pub max_daily_volume: u64,              // 日内总成交上限

    #[serde(rename = "order_flow_limit")]
    pub max_flow_count: u64,                // 流控窗口内委托上限

    #[serde(rename = "order_flow_clear")]
    pub flow_clear_interval_ticks: u64,     // 流控清空间隔（定时器次数）

    #[serde(rename = "active_order_limit")]
    pub max_open_orders: u64,               // 活动委托上限

    #[serde(rename = "order_cancel_limit")]
    pub max_cancels_per_symbol: u64,        // 单品种撤单上限
}

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            enabled: false,
            max_order_size: 100,
            max_daily_volume: 1000,
            max_flow_count: 50,
            flow_clear_interval_ticks: 1,
            max_open_orders: 20,
            max_cancels_per_symbol: 10,
        }
    }
}

/// 阈值存储 - 读多写少，写入对下一次检查立即可见
#[derive(Debug)]
pub struct RiskRuleStore {
    rules: RwLock<RiskRules>,
}

impl RiskRuleStore {
    pub fn new(rules: RiskRules) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }

    /// 获取当前阈值快照
    pub fn snapshot(&self) -> RiskRules {
        self.rules.read().clone()
    }

    /// 整体替换阈值
    pub fn replace(&self, rules: RiskRules) {
        *self.rules.write() = rules;
    }

    pub fn is_enabled(&self) -> bool {
        self.rules.read().enabled
    }

    /// 切换风控开关，返回切换后的状态
    pub fn switch_enabled(&self) -> bool {
        let mut rules = self.rules.write();
        rules.enabled = !rules.enabled;
        rules.enabled
    }

    pub fn order_size_limit(&self) -> u64 {
        self.rules.read().max_order_size
    }

    pub fn trade_limit(&self) -> u64 {
        self.rules.read().max_daily_volume
    }

    pub fn order_flow_limit(&self) -> u64 {
        self.rules.read().max_flow_count
    }

    pub fn order_flow_clear(&self) -> u64 {
        self.rules.read().flow_clear_interval_ticks
    }

    pub fn active_order_limit(&self) -> u64 {
        self.rules.read().max_open_orders
    }

    pub fn order_cancel_limit(&self) -> u64 {
        self.rules.read().max_cancels_per_symbol
    }

    pub fn set_order_size_limit(&self, n: u64) {
        self.rules.write().max_order_size = n;
        debug!("order_size_limit set to {}", n);
    }

    pub fn set_trade_limit(&self, n: u64) {
        self.rules.write().max_daily_volume = n;
        debug!("trade_limit set to {}", n);
    }

    pub fn set_order_flow_limit(&self, n: u64) {
        self.rules.write().max_flow_count = n;
        debug!("order_flow_limit set to {}", n);
    }

    pub fn set_order_flow_clear(&self, n: u64) {
        self.rules.write().flow_clear_interval_ticks = n;
        debug!("order_flow_clear set to {}", n);
    }

    pub fn set_active_order_limit(&self, n: u64) {
        self.rules.write().max_open_orders = n;
        debug!("active_order_limit set to {}", n);
    }

    pub fn set_order_cancel_limit(&self, n: u64) {
        self.rules.write().max_cancels_per_symbol = n;
        debug!("order_cancel_limit set to {}", n);
    }
}
