//! 引擎配置文件读取

use crate::error::FileError;
use siteplan_core::config::EngineConfig;
use std::path::Path;
use tracing::info;

/// 从 JSON 文件读取引擎配置，缺省字段取默认值
pub fn load_config(path: &Path) -> Result<EngineConfig, FileError> {
    let text = std::fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&text)?;
    info!("Loaded engine config from {}", path.display());
    Ok(config)
}

/// 有路径则读取，否则使用默认配置
pub fn load_config_or_default(path: Option<&Path>) -> Result<EngineConfig, FileError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(EngineConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_gives_default() {
        let config = load_config_or_default(None).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/siteplan-config.json")).unwrap_err();
        assert!(matches!(err, FileError::Io(_)));
    }

    #[test]
    fn test_override_threshold() {
        let path = std::env::temp_dir().join(format!("{}-engine.json", std::process::id()));
        std::fs::write(&path, r#"{ "snap_threshold": 12.5 }"#).unwrap();
        let config = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.snap_threshold, 12.5);
        assert_eq!(config.gap_factor, EngineConfig::default().gap_factor);
    }
}
