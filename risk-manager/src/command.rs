use serde::{Deserialize, Serialize};

use common::events::Event;
use common::types::{OrderData, OrderRequest, TradeData};

use crate::event_engine::EventSender;
use crate::risk_control::{RiskEngine, RiskRules, RiskSummary};

/// 运维指令（每行一个JSON）
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    CheckRisk {
        request: OrderRequest,
        #[serde(default)]
        gateway_name: String,
    },
    Trade { trade: TradeData },
    Order { order: OrderData },
    Switch,
    SetOrderSizeLimit { value: u64 },
    SetTradeLimit { value: u64 },
    SetOrderFlowLimit { value: u64 },
    SetOrderFlowClear { value: u64 },
    SetActiveOrderLimit { value: u64 },
    SetOrderCancelLimit { value: u64 },
    SetRules { rules: RiskRules },
    ClearOrderFlowCount,
    ClearTradeCount,
    Status,
}

/// 指令执行结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admitted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<RiskRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<RiskSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}

/// 解析一行指令
pub fn parse_command(line: &str) -> Result<Command, serde_json::Error> {
    serde_json::from_str(line)
}

/// 执行指令；成交/委托回报投递到事件总线，由事件循环异步处理
pub fn execute(cmd: Command, engine: &RiskEngine, event_sender: &EventSender) -> Reply {
    match cmd {
        Command::CheckRisk { request, gateway_name } => {
            let result = engine.check_risk_with_reason(&request, &gateway_name);
            Reply {
                admitted: Some(result.is_ok()),
                reason: result.err().map(|r| r.to_string()),
                ..Reply::ok()
            }
        }
        Command::Trade { trade } => {
            event_sender.put(Event::Trade(trade));
            Reply::ok()
        }
        Command::Order { order } => {
            event_sender.put(Event::Order(order));
            Reply::ok()
        }
        Command::Switch => Reply {
            enabled: Some(engine.switch_engine_status()),
            ..Reply::ok()
        },
        Command::SetOrderSizeLimit { value } => {
            engine.set_order_size_limit(value);
            Reply::ok()
        }
        Command::SetTradeLimit { value } => {
            engine.set_trade_limit(value);
            Reply::ok()
        }
        Command::SetOrderFlowLimit { value } => {
            engine.set_order_flow_limit(value);
            Reply::ok()
        }
        Command::SetOrderFlowClear { value } => {
            engine.set_order_flow_clear(value);
            Reply::ok()
        }
        Command::SetActiveOrderLimit { value } => {
            engine.set_active_order_limit(value);
            Reply::ok()
        }
        Command::SetOrderCancelLimit { value } => {
            engine.set_order_cancel_limit(value);
            Reply::ok()
        }
        Command::SetRules { rules } => {
            engine.set_rules(rules);
            Reply::ok()
        }
        Command::ClearOrderFlowCount => {
            engine.clear_order_flow_count();
            Reply::ok()
        }
        Command::ClearTradeCount => {
            engine.clear_trade_count();
            Reply::ok()
        }
        Command::Status => Reply {
            enabled: Some(engine.is_enabled()),
            rules: Some(engine.get_rules()),
            counters: Some(engine.get_summary()),
            ..Reply::ok()
        },
    }
}
