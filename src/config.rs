use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_ASSET_BASE: &str = "/static/cards";
const DEFAULT_BACK_IMAGE: &str = "back-blue.svg";
const DEFAULT_NOTIFICATION_TTL_MS: u32 = 3_000;
const DEFAULT_TABLEAU_OVERLAP_PX: i32 = -90;

/// 前端运行配置，由页面以 JSON 传入，缺省字段取默认值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    /// 接口前缀，拼在 `/api/...` 之前；为空时使用同源相对路径。
    pub api_base: String,
    pub asset_base: String,
    pub back_image: String,
    pub notification_ttl_ms: u32,
    /// 桌面牌列中除第一张外每张牌的纵向偏移。
    pub tableau_overlap_px: i32,
    pub debug: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            asset_base: DEFAULT_ASSET_BASE.to_string(),
            back_image: DEFAULT_BACK_IMAGE.to_string(),
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL_MS,
            tableau_overlap_px: DEFAULT_TABLEAU_OVERLAP_PX,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ConfigError {
    InvalidJson { message: String },
    ZeroNotificationTtl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidJson { message } => write!(f, "invalid config json: {message}"),
            ConfigError::ZeroNotificationTtl => f.write_str("notification_ttl_ms must be positive"),
        }
    }
}

impl UiConfig {
    pub fn from_json(json: Option<&str>) -> Result<Self, ConfigError> {
        let config = match json.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => serde_json::from_str(raw).map_err(|error| ConfigError::InvalidJson {
                message: error.to_string(),
            })?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notification_ttl_ms == 0 {
            return Err(ConfigError::ZeroNotificationTtl);
        }
        Ok(())
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_json_yields_defaults() {
        let config = UiConfig::from_json(None).expect("defaults are valid");
        assert_eq!(config, UiConfig::default());
        assert_eq!(config.notification_ttl_ms, 3_000);
        assert_eq!(config.tableau_overlap_px, -90);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = UiConfig::from_json(Some(r#"{"api_base": "http://localhost:5000/", "debug": true}"#))
            .expect("partial config should parse");
        assert!(config.debug);
        assert_eq!(config.asset_base, "/static/cards");
        assert_eq!(config.api_url("/api/undo"), "http://localhost:5000/api/undo");
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let error = UiConfig::from_json(Some(r#"{"notification_ttl_ms": 0}"#)).unwrap_err();
        assert_eq!(error, ConfigError::ZeroNotificationTtl);
    }

    #[test]
    fn malformed_json_is_reported() {
        let error = UiConfig::from_json(Some("{not json")).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidJson { .. }));
    }
}
