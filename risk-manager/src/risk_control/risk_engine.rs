use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use common::events::Event;
use common::types::{LogData, LogLevel, OrderData, OrderRequest, TradeData};

use crate::event_engine::EventSender;
use crate::order::ActiveOrderSource;
use super::risk_rules::{RiskRuleStore, RiskRules};
use super::risk_setting::SettingStore;
use super::risk_state::{RiskState, RiskSummary};

pub const APP_NAME: &str = "RiskManager";

/// 委托被风控拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RiskReject {
    #[error("order volume must be positive, got {volume}")]
    NonPositiveVolume { volume: i64 },

    #[error("order volume {volume} exceeds order size limit {limit}")]
    OrderSize { volume: i64, limit: u64 },

    #[error("daily traded volume {traded} reached trade limit {limit}")]
    TradeLimit { traded: u64, limit: u64 },

    #[error("order flow count {count} reached limit {limit} per {interval} ticks")]
    OrderFlow { count: u64, limit: u64, interval: u64 },

    #[error("active order count {count} reached limit {limit}")]
    ActiveOrders { count: usize, limit: u64 },

    #[error("active order count unavailable: {reason}")]
    ActiveOrderQuery { reason: String },

    #[error("cancel count {count} for {symbol} reached limit {limit}")]
    CancelLimit { symbol: String, count: u64, limit: u64 },
}

impl RiskReject {
    /// 触发的阈值名称
    pub fn rule(&self) -> &'static str {
        match self {
            RiskReject::NonPositiveVolume { .. } => "order_volume",
            RiskReject::OrderSize { .. } => "order_size_limit",
            RiskReject::TradeLimit { .. } => "trade_limit",
            RiskReject::OrderFlow { .. } => "order_flow_limit",
            RiskReject::ActiveOrders { .. } | RiskReject::ActiveOrderQuery { .. } => "active_order_limit",
            RiskReject::CancelLimit { .. } => "order_cancel_limit",
        }
    }
}

/// 风控引擎 - 委托发送前的准入检查
///
/// 阈值放在读写锁里，计数放在一把互斥锁里。
/// 准入检查从成交量检查到流控计数加一全程持有计数锁，
/// 因此并发检查与定时清零不会导致流控超发。
pub struct RiskEngine {
    rules: RiskRuleStore,
    state: Mutex<RiskState>,
    active_orders: Arc<dyn ActiveOrderSource>,
    event_sender: EventSender,
    setting_store: Option<Box<dyn SettingStore>>,
}

impl RiskEngine {
    pub fn new(
        rules: RiskRules,
        active_orders: Arc<dyn ActiveOrderSource>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            rules: RiskRuleStore::new(rules),
            state: Mutex::new(RiskState::new()),
            active_orders,
            event_sender,
            setting_store: None,
        }
    }

    /// 从配置存储加载阈值并创建引擎，加载失败直接返回错误
    pub fn from_setting_store(
        setting_store: Box<dyn SettingStore>,
        active_orders: Arc<dyn ActiveOrderSource>,
        event_sender: EventSender,
    ) -> Result<Self, super::risk_setting::SettingError> {
        let rules = setting_store.load()?;
        let mut engine = Self::new(rules, active_orders, event_sender);
        engine.setting_store = Some(setting_store);
        Ok(engine)
    }

    /// 风控检查，返回是否允许发送委托
    pub fn check_risk(&self, req: &OrderRequest, gateway_name: &str) -> bool {
        self.check_risk_with_reason(req, gateway_name).is_ok()
    }

    /// 风控检查，拒绝时写风控日志并返回原因
    #[instrument(skip_all, fields(symbol = %req.symbol, volume = req.volume, gateway = gateway_name))]
    pub fn check_risk_with_reason(&self, req: &OrderRequest, gateway_name: &str) -> Result<(), RiskReject> {
        match self.evaluate(req) {
            Ok(()) => {
                debug!("Order passed risk check");
                Ok(())
            }
            Err(reject) => {
                self.write_risk_log(LogLevel::Warn, reject.to_string());
                Err(reject)
            }
        }
    }

    /// 按固定顺序执行各项检查，不产生日志
    pub fn evaluate(&self, req: &OrderRequest) -> Result<(), RiskReject> {
        let rules = self.rules.snapshot();
        if !rules.enabled {
            return Ok(());
        }

        // 委托数量
        if req.volume <= 0 {
            return Err(RiskReject::NonPositiveVolume { volume: req.volume });
        }
        if req.volume as u64 > rules.max_order_size {
            return Err(RiskReject::OrderSize {
                volume: req.volume,
                limit: rules.max_order_size,
            });
        }

        let mut state = self.state.lock();

        // 今日成交量
        if state.trade_count() >= rules.max_daily_volume {
            return Err(RiskReject::TradeLimit {
                traded: state.trade_count(),
                limit: rules.max_daily_volume,
            });
        }

        // 流控
        if state.order_flow_count() >= rules.max_flow_count {
            return Err(RiskReject::OrderFlow {
                count: state.order_flow_count(),
                limit: rules.max_flow_count,
                interval: rules.flow_clear_interval_ticks,
            });
        }

        // 活动委托，查询失败按拒绝处理
        let active_count = self.active_orders
            .active_order_count()
            .map_err(|e| RiskReject::ActiveOrderQuery {
                reason: format!("{:#}", e),
            })?;
        if active_count as u64 >= rules.max_open_orders {
            return Err(RiskReject::ActiveOrders {
                count: active_count,
                limit: rules.max_open_orders,
            });
        }

        // 品种撤单次数
        let cancel_count = state.cancel_count(&req.symbol);
        if cancel_count >= rules.max_cancels_per_symbol {
            return Err(RiskReject::CancelLimit {
                symbol: req.symbol.clone(),
                count: cancel_count,
                limit: rules.max_cancels_per_symbol,
            });
        }

        state.add_order_flow();
        Ok(())
    }

    pub fn process_trade_event(&self, trade: &TradeData) {
        self.state.lock().process_trade(trade);
    }

    pub fn process_order_event(&self, order: &OrderData) {
        self.state.lock().process_order(order);
    }

    pub fn process_timer_event(&self) {
        let interval = self.rules.order_flow_clear();
        let cleared = self.state.lock().process_timer(interval);

        // 每个清零周期都发布日志，空窗口用Debug级别
        if let Some(count) = cleared {
            let level = if count > 0 { LogLevel::Info } else { LogLevel::Debug };
            self.write_risk_log(level, format!("order flow count {} cleared", count));
        }
    }

    /// 手动清空流控计数
    pub fn clear_order_flow_count(&self) {
        self.state.lock().reset_order_flow();
        self.write_risk_log(LogLevel::Info, "order flow count cleared".to_string());
    }

    /// 手动清空今日成交计数
    pub fn clear_trade_count(&self) {
        self.state.lock().reset_trade_count();
        self.write_risk_log(LogLevel::Info, "trade count cleared".to_string());
    }

    /// 启停风控，返回切换后的状态
    pub fn switch_engine_status(&self) -> bool {
        let enabled = self.rules.switch_enabled();

        if enabled {
            self.write_risk_log(LogLevel::Info, "risk manager started".to_string());
        } else {
            self.write_risk_log(LogLevel::Info, "risk manager stopped".to_string());
        }

        self.save_setting();
        enabled
    }

    pub fn set_order_size_limit(&self, n: u64) {
        self.rules.set_order_size_limit(n);
        self.save_setting();
    }

    pub fn set_trade_limit(&self, n: u64) {
        self.rules.set_trade_limit(n);
        self.save_setting();
    }

    pub fn set_order_flow_limit(&self, n: u64) {
        self.rules.set_order_flow_limit(n);
        self.save_setting();
    }

    pub fn set_order_flow_clear(&self, n: u64) {
        self.rules.set_order_flow_clear(n);
        self.save_setting();
    }

    pub fn set_active_order_limit(&self, n: u64) {
        self.rules.set_active_order_limit(n);
        self.save_setting();
    }

    pub fn set_order_cancel_limit(&self, n: u64) {
        self.rules.set_order_cancel_limit(n);
        self.save_setting();
    }

    /// 整体替换阈值（含开关）
    pub fn set_rules(&self, rules: RiskRules) {
        self.rules.replace(rules);
        self.save_setting();
    }

    pub fn get_rules(&self) -> RiskRules {
        self.rules.snapshot()
    }

    pub fn is_enabled(&self) -> bool {
        self.rules.is_enabled()
    }

    pub fn get_summary(&self) -> RiskSummary {
        self.state.lock().get_summary()
    }

    /// 持久化当前阈值，失败只记录日志
    pub fn save_setting(&self) {
        let Some(store) = &self.setting_store else {
            return;
        };

        if let Err(e) = store.save(&self.rules.snapshot()) {
            error!("Failed to save risk setting: {}", e);
        }
    }

    /// 退出时保存配置
    pub fn stop(&self) {
        self.save_setting();
        info!("Risk manager stopped, setting saved");
    }

    fn write_risk_log(&self, level: LogLevel, msg: String) {
        match level {
            LogLevel::Debug => debug!("{}", msg),
            LogLevel::Info => info!("{}", msg),
            LogLevel::Warn => warn!("{}", msg),
        }
        self.event_sender.put(Event::Log(LogData::new(msg, level, APP_NAME)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use chrono::Utc;
    use tokio::sync::mpsc::UnboundedReceiver;

    use common::types::{Exchange, OrderType, Side, Status};
    use rust_decimal_macros::dec;

    use crate::event_engine;
    use crate::risk_control::JsonSettingStore;

    fn scenario_rules() -> RiskRules {
        RiskRules {
            enabled: true,
            max_order_size: 100,
            max_daily_volume: 1000,
            max_flow_count: 50,
            flow_clear_interval_ticks: 1,
            max_open_orders: 20,
            max_cancels_per_symbol: 10,
        }
    }

    fn make_engine_with(
        rules: RiskRules,
        active: Arc<dyn ActiveOrderSource>,
    ) -> (RiskEngine, UnboundedReceiver<Event>) {
        let (sender, rx) = event_engine::channel();
        (RiskEngine::new(rules, active, sender), rx)
    }

    fn make_engine(rules: RiskRules) -> (RiskEngine, UnboundedReceiver<Event>) {
        make_engine_with(rules, Arc::new(|| -> anyhow::Result<usize> { Ok(0) }))
    }

    fn request(symbol: &str, volume: i64) -> OrderRequest {
        OrderRequest::new(symbol, Exchange::Binance, Side::Buy, volume).with_price(dec!(10))
    }

    fn trade(volume: u64) -> TradeData {
        TradeData {
            symbol: "X".to_string(),
            exchange: Exchange::Binance,
            trade_id: "t".to_string(),
            order_id: "o".to_string(),
            side: Side::Buy,
            price: dec!(10),
            volume,
            datetime: Utc::now(),
        }
    }

    fn cancelled(symbol: &str) -> OrderData {
        OrderData {
            symbol: symbol.to_string(),
            exchange: Exchange::Binance,
            order_id: "o".to_string(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            price: dec!(10),
            volume: 1,
            traded: 0,
            status: Status::Cancelled,
            datetime: Utc::now(),
        }
    }

    fn drain_logs(rx: &mut UnboundedReceiver<Event>) -> Vec<LogData> {
        let mut logs = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let Event::Log(log) = event {
                logs.push(log);
            }
        }
        logs
    }

    #[test]
    fn test_scenario_admit_increments_flow() {
        let (engine, mut rx) = make_engine(scenario_rules());

        assert!(engine.check_risk(&request("X", 50), "BINANCE"));
        assert_eq!(engine.get_summary().order_flow_count, 1);
        assert!(drain_logs(&mut rx).is_empty());
    }

    #[test]
    fn test_scenario_order_size_denied() {
        let (engine, mut rx) = make_engine(scenario_rules());

        assert!(!engine.check_risk(&request("X", 150), "BINANCE"));
        assert_eq!(engine.get_summary().order_flow_count, 0);

        let logs = drain_logs(&mut rx);
        assert_eq!(logs.len(), 1);
        assert!(logs[0].msg.contains("150"));
        assert!(logs[0].msg.contains("100"));
        assert_eq!(logs[0].level, LogLevel::Warn);
    }

    #[test]
    fn test_order_size_boundary_admits() {
        let (engine, _rx) = make_engine(scenario_rules());
        assert!(engine.check_risk(&request("X", 100), "BINANCE"));
        assert_eq!(
            engine.evaluate(&request("X", 101)),
            Err(RiskReject::OrderSize { volume: 101, limit: 100 })
        );
    }

    #[test]
    fn test_non_positive_volume_denied() {
        let (engine, mut rx) = make_engine(scenario_rules());

        assert!(!engine.check_risk(&request("X", 0), "BINANCE"));
        assert!(!engine.check_risk(&request("X", -5), "BINANCE"));
        assert_eq!(drain_logs(&mut rx).len(), 2);
        assert_eq!(engine.get_summary().order_flow_count, 0);
    }

    #[test]
    fn test_disabled_bypasses_all_checks() {
        let rules = RiskRules {
            enabled: false,
            ..scenario_rules()
        };
        let failing: Arc<dyn ActiveOrderSource> =
            Arc::new(|| -> anyhow::Result<usize> { anyhow::bail!("oms offline") });
        let (engine, mut rx) = make_engine_with(rules, failing);

        assert!(engine.check_risk(&request("X", -1), "BINANCE"));
        assert!(engine.check_risk(&request("X", 1_000_000), "BINANCE"));

        let summary = engine.get_summary();
        assert_eq!(summary.order_flow_count, 0);
        assert_eq!(summary.trade_count, 0);
        assert!(drain_logs(&mut rx).is_empty());
    }

    #[test]
    fn test_trade_limit_denied() {
        let (engine, _rx) = make_engine(scenario_rules());
        engine.process_trade_event(&trade(999));
        assert!(engine.check_risk(&request("X", 1), "BINANCE"));

        engine.process_trade_event(&trade(1));
        assert_eq!(
            engine.check_risk_with_reason(&request("X", 1), "BINANCE"),
            Err(RiskReject::TradeLimit { traded: 1000, limit: 1000 })
        );
    }

    #[test]
    fn test_flow_limit_denied_until_timer() {
        let rules = RiskRules {
            max_flow_count: 2,
            flow_clear_interval_ticks: 3,
            ..scenario_rules()
        };
        let (engine, _rx) = make_engine(rules);

        assert!(engine.check_risk(&request("X", 1), "BINANCE"));
        assert!(engine.check_risk(&request("X", 1), "BINANCE"));
        assert!(matches!(
            engine.evaluate(&request("X", 1)),
            Err(RiskReject::OrderFlow { count: 2, limit: 2, interval: 3 })
        ));

        engine.process_timer_event();
        engine.process_timer_event();
        assert!(!engine.check_risk(&request("X", 1), "BINANCE"));

        engine.process_timer_event();
        assert_eq!(engine.get_summary().order_flow_count, 0);
        assert!(engine.check_risk(&request("X", 1), "BINANCE"));
    }

    #[test]
    fn test_single_tick_resets_flow() {
        let (engine, mut rx) = make_engine(scenario_rules());
        for _ in 0..5 {
            assert!(engine.check_risk(&request("X", 1), "BINANCE"));
        }

        engine.process_timer_event();
        assert_eq!(engine.get_summary().order_flow_count, 0);

        let logs = drain_logs(&mut rx);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].msg, "order flow count 5 cleared");
        assert_eq!(logs[0].level, LogLevel::Info);

        // 空窗口同样发布一条日志
        engine.process_timer_event();
        let logs = drain_logs(&mut rx);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].msg, "order flow count 0 cleared");
        assert_eq!(logs[0].level, LogLevel::Debug);
    }

    #[test]
    fn test_every_reset_tick_publishes_log() {
        let rules = RiskRules {
            flow_clear_interval_ticks: 2,
            ..scenario_rules()
        };
        let (engine, mut rx) = make_engine(rules);

        engine.process_timer_event();
        assert!(drain_logs(&mut rx).is_empty());

        for _ in 0..5 {
            engine.process_timer_event();
        }
        // 第2、4、6个tick清零
        let logs = drain_logs(&mut rx);
        assert_eq!(logs.len(), 3);
        assert!(logs.iter().all(|l| l.msg.contains("cleared")));
    }

    #[test]
    fn test_active_order_limit_denied() {
        let count = Arc::new(AtomicUsize::new(19));
        let source = count.clone();
        let active: Arc<dyn ActiveOrderSource> =
            Arc::new(move || -> anyhow::Result<usize> { Ok(source.load(Ordering::SeqCst)) });
        let (engine, _rx) = make_engine_with(scenario_rules(), active);

        assert!(engine.check_risk(&request("X", 1), "BINANCE"));

        count.store(20, Ordering::SeqCst);
        assert_eq!(
            engine.evaluate(&request("X", 1)),
            Err(RiskReject::ActiveOrders { count: 20, limit: 20 })
        );
    }

    #[test]
    fn test_active_order_query_failure_fails_closed() {
        let failing: Arc<dyn ActiveOrderSource> =
            Arc::new(|| -> anyhow::Result<usize> { anyhow::bail!("oms offline") });
        let (engine, mut rx) = make_engine_with(scenario_rules(), failing);

        let reject = engine.check_risk_with_reason(&request("X", 1), "BINANCE").unwrap_err();
        assert_eq!(reject.rule(), "active_order_limit");
        assert!(reject.to_string().contains("oms offline"));
        assert_eq!(engine.get_summary().order_flow_count, 0);
        assert_eq!(drain_logs(&mut rx).len(), 1);
    }

    #[test]
    fn test_local_checks_skip_active_order_query() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let active: Arc<dyn ActiveOrderSource> = Arc::new(move || -> anyhow::Result<usize> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        });
        let (engine, _rx) = make_engine_with(scenario_rules(), active);

        assert!(!engine.check_risk(&request("X", 500), "BINANCE"));
        engine.process_trade_event(&trade(1000));
        assert!(!engine.check_risk(&request("X", 1), "BINANCE"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_limit_denied_per_symbol() {
        let (engine, mut rx) = make_engine(scenario_rules());
        for _ in 0..10 {
            engine.process_order_event(&cancelled("X"));
        }

        assert!(!engine.check_risk(&request("X", 10), "BINANCE"));
        let logs = drain_logs(&mut rx);
        assert_eq!(logs.len(), 1);
        assert!(logs[0].msg.contains("X"));

        assert!(engine.check_risk(&request("Y", 10), "BINANCE"));
        assert_eq!(engine.get_summary().order_cancel_counts.get("X"), Some(&10));
    }

    #[test]
    fn test_denial_does_not_touch_trade_or_cancel_counters() {
        let (engine, _rx) = make_engine(scenario_rules());
        engine.process_trade_event(&trade(5));
        engine.process_order_event(&cancelled("X"));

        let before = engine.get_summary();
        assert!(!engine.check_risk(&request("X", 500), "BINANCE"));
        assert!(engine.check_risk(&request("X", 5), "BINANCE"));
        let after = engine.get_summary();

        assert_eq!(after.trade_count, before.trade_count);
        assert_eq!(after.order_cancel_counts, before.order_cancel_counts);
        assert_eq!(after.order_flow_count, before.order_flow_count + 1);
    }

    #[test]
    fn test_concurrent_admission_never_exceeds_flow_limit() {
        let rules = RiskRules {
            max_flow_count: 37,
            flow_clear_interval_ticks: 1_000_000,
            ..scenario_rules()
        };
        let (engine, _rx) = make_engine(rules);
        let engine = Arc::new(engine);
        let admitted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                let admitted = admitted.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        if engine.check_risk(&request("X", 1), "BINANCE") {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 37);
        assert_eq!(engine.get_summary().order_flow_count, 37);
    }

    #[test]
    fn test_concurrent_notifications_and_resets_keep_counters_consistent() {
        const TICKS: u64 = 200;
        const INTERVAL: u64 = 3;
        const FLOW_LIMIT: u64 = 5;
        const TRADES: u64 = 300;
        const CANCELS: u64 = 150;

        let rules = RiskRules {
            max_flow_count: FLOW_LIMIT,
            flow_clear_interval_ticks: INTERVAL,
            max_daily_volume: 1_000_000,
            max_cancels_per_symbol: 1_000_000,
            ..scenario_rules()
        };
        let (engine, mut rx) = make_engine(rules);
        let engine = Arc::new(engine);
        let admitted = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..4 {
            let engine = engine.clone();
            let admitted = admitted.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    if engine.check_risk(&request("X", 1), "BINANCE") {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                    assert!(engine.get_summary().order_flow_count <= FLOW_LIMIT);
                }
            }));
        }

        let timer_engine = engine.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..TICKS {
                timer_engine.process_timer_event();
                let summary = timer_engine.get_summary();
                assert!(summary.order_flow_timer < INTERVAL);
                assert!(summary.order_flow_count <= FLOW_LIMIT);
            }
        }));

        let trade_engine = engine.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..TRADES {
                trade_engine.process_trade_event(&trade(2));
            }
        }));

        for symbol in ["X", "Y"] {
            let engine = engine.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..CANCELS {
                    engine.process_order_event(&cancelled(symbol));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let summary = engine.get_summary();
        assert!(summary.order_flow_count <= FLOW_LIMIT);
        assert_eq!(summary.order_flow_timer, TICKS % INTERVAL);
        assert_eq!(summary.trade_count, TRADES * 2);
        assert_eq!(summary.order_cancel_counts.get("X"), Some(&CANCELS));
        assert_eq!(summary.order_cancel_counts.get("Y"), Some(&CANCELS));

        // 每个窗口最多放行FLOW_LIMIT笔
        let windows = TICKS / INTERVAL + 1;
        assert!(admitted.load(Ordering::SeqCst) as u64 <= windows * FLOW_LIMIT);

        let resets = drain_logs(&mut rx)
            .into_iter()
            .filter(|l| l.msg.starts_with("order flow count") && l.msg.ends_with("cleared"))
            .count() as u64;
        assert_eq!(resets, TICKS / INTERVAL);
    }

    #[test]
    fn test_switch_and_manual_clears_emit_logs() {
        let (engine, mut rx) = make_engine(scenario_rules());
        engine.check_risk(&request("X", 1), "BINANCE");
        engine.process_trade_event(&trade(10));

        assert!(!engine.switch_engine_status());
        assert!(engine.switch_engine_status());
        engine.clear_order_flow_count();
        engine.clear_trade_count();

        let msgs: Vec<String> = drain_logs(&mut rx).into_iter().map(|l| l.msg).collect();
        assert_eq!(
            msgs,
            vec![
                "risk manager stopped",
                "risk manager started",
                "order flow count cleared",
                "trade count cleared",
            ]
        );
        let summary = engine.get_summary();
        assert_eq!(summary.order_flow_count, 0);
        assert_eq!(summary.order_flow_timer, 0);
        assert_eq!(summary.trade_count, 0);
    }

    #[test]
    fn test_setters_take_effect_on_next_check() {
        let (engine, _rx) = make_engine(scenario_rules());
        assert!(engine.check_risk(&request("X", 80), "BINANCE"));

        engine.set_order_size_limit(50);
        assert!(!engine.check_risk(&request("X", 80), "BINANCE"));

        engine.set_order_cancel_limit(1);
        engine.process_order_event(&cancelled("X"));
        assert!(!engine.check_risk(&request("X", 10), "BINANCE"));

        engine.set_order_flow_limit(1);
        engine.set_trade_limit(5);
        engine.set_active_order_limit(3);
        engine.set_order_flow_clear(9);
        let rules = engine.get_rules();
        assert_eq!(rules.max_flow_count, 1);
        assert_eq!(rules.max_daily_volume, 5);
        assert_eq!(rules.max_open_orders, 3);
        assert_eq!(rules.flow_clear_interval_ticks, 9);
    }

    #[test]
    fn test_setting_persisted_on_change_and_stop() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingStore::in_dir(dir.path());
        store.save(&scenario_rules()).unwrap();

        let (sender, _rx) = event_engine::channel();
        let engine = RiskEngine::from_setting_store(
            Box::new(store.clone()),
            Arc::new(|| -> anyhow::Result<usize> { Ok(0) }),
            sender,
        )
        .unwrap();
        assert!(engine.is_enabled());

        engine.set_order_size_limit(42);
        assert_eq!(store.load().unwrap().max_order_size, 42);

        engine.switch_engine_status();
        engine.stop();
        let saved = store.load().unwrap();
        assert!(!saved.enabled);
        assert_eq!(saved.max_order_size, 42);
    }

    #[test]
    fn test_from_setting_store_fails_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, _rx) = event_engine::channel();

        let result = RiskEngine::from_setting_store(
            Box::new(JsonSettingStore::in_dir(dir.path())),
            Arc::new(|| -> anyhow::Result<usize> { Ok(0) }),
            sender,
        );
        assert!(result.is_err());
    }
}
