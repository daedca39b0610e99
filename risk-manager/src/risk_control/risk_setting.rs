use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::risk_rules::RiskRules;

/// 默认风控配置文件名
pub const SETTING_FILENAME: &str = "risk_manager_setting.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error("failed to read risk setting {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid risk setting {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode risk setting: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write risk setting {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 风控配置持久化接口
pub trait SettingStore: Send + Sync {
    /// 加载配置，文件缺失或字段不全均视为失败
    fn load(&self) -> Result<RiskRules, SettingError>;

    fn save(&self, rules: &RiskRules) -> Result<(), SettingError>;
}

/// 基于JSON文件的配置存储
#[derive(Debug, Clone)]
pub struct JsonSettingStore {
    path: PathBuf,
}

impl JsonSettingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 在指定目录下使用默认文件名
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SETTING_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingStore for JsonSettingStore {
    fn load(&self) -> Result<RiskRules, SettingError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SettingError::Read {
            path: self.path.clone(),
            source,
        })?;

        let rules: RiskRules = serde_json::from_str(&content).map_err(|source| SettingError::Parse {
            path: self.path.clone(),
            source,
        })?;

        info!("Risk setting loaded from {:?}", self.path);
        debug!("{:?}", rules);
        Ok(rules)
    }

    fn save(&self, rules: &RiskRules) -> Result<(), SettingError> {
        let content = serde_json::to_string_pretty(rules).map_err(SettingError::Encode)?;

        fs::write(&self.path, content).map_err(|source| SettingError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!("Risk setting saved to {:?}", self.path);
        Ok(())
    }
}
