use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use common::events::Event;
use common::types::LogLevel;

use crate::order::OrderTracker;
use crate::risk_control::RiskEngine;

/// 事件发布句柄，可克隆
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// 发布事件（非阻塞）
    pub fn put(&self, event: Event) {
        if let Err(e) = self.tx.send(event) {
            warn!("Event bus closed, dropped {:?}", e.0.kind());
        }
    }
}

/// 创建事件总线
pub fn channel() -> (EventSender, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

/// 事件引擎 - 合并事件队列与定时器
pub struct EventEngine {
    rx: mpsc::UnboundedReceiver<Event>,
    timer: Interval,
}

impl EventEngine {
    pub fn new(rx: mpsc::UnboundedReceiver<Event>, timer_interval: Duration) -> Self {
        let mut timer = interval(timer_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { rx, timer }
    }

    /// 等待下一个事件，队列关闭时返回None
    pub async fn next(&mut self) -> Option<Event> {
        select! {
            event = self.rx.recv() => event,
            _ = self.timer.tick() => Some(Event::Timer),
        }
    }
}

/// 事件分发 - 按事件类型固定映射到处理函数
pub struct EventDispatcher {
    risk_engine: Arc<RiskEngine>,
    order_tracker: Arc<OrderTracker>,
}

impl EventDispatcher {
    pub fn new(risk_engine: Arc<RiskEngine>, order_tracker: Arc<OrderTracker>) -> Self {
        Self {
            risk_engine,
            order_tracker,
        }
    }

    pub fn process_event(&self, event: &Event) {
        match event {
            Event::Trade(trade) => self.risk_engine.process_trade_event(trade),
            Event::Order(order) => {
                self.order_tracker.update_order(order);
                self.risk_engine.process_order_event(order);
            }
            Event::Timer => self.risk_engine.process_timer_event(),
            Event::Log(log) => match log.level {
                LogLevel::Debug => debug!(gateway = %log.gateway_name, "{}", log.msg),
                LogLevel::Info => info!(gateway = %log.gateway_name, "{}", log.msg),
                LogLevel::Warn => warn!(gateway = %log.gateway_name, "{}", log.msg),
            },
        }
        debug!("Processed {:?} event", event.kind());
    }
}
