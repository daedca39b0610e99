use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};

use crate::risk_control::SETTING_FILENAME;

/// 风控服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskManagerConfig {
    pub setting_path: PathBuf,      // 风控阈值文件
    pub timer_interval_ms: u64,     // 定时器事件周期
    pub stats_interval_secs: u64,   // 统计输出周期
}

impl Default for RiskManagerConfig {
    fn default() -> Self {
        Self {
            setting_path: PathBuf::from(SETTING_FILENAME),
            timer_interval_ms: 1000,
            stats_interval_secs: 60,
        }
    }
}

impl RiskManagerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        Ok(config)
    }

    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms.max(1))
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs.max(1))
    }
}
