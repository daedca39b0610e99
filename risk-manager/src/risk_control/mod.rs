pub mod risk_rules;
pub mod risk_state;
pub mod risk_setting;
pub mod risk_engine;

pub use risk_rules::{RiskRules, RiskRuleStore};
pub use risk_state::{RiskState, RiskSummary};
pub use risk_setting::{JsonSettingStore, SettingError, SettingStore, SETTING_FILENAME};
pub use risk_engine::{RiskEngine, RiskReject, APP_NAME};
