pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "CLUSTERFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["clusterflow.local.yaml", "clusterflow.yaml"];

/// clusterflow の設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("clusterflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// アクチュエータの設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 CLUSTERFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: clusterflow.local.yaml, clusterflow.yaml
/// 3. ./.clusterflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/clusterflow/clusterflow.yaml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(path = %path.display(), "{} points to a missing file", CONFIG_PATH_ENV);
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. ./.clusterflow/ ディレクトリで検索
    let local_dir = current_dir.join(".clusterflow");
    if local_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = local_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("clusterflow").join("clusterflow.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// アクチュエータ設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActuatorConfig {
    /// Compute API クライアントの設定
    #[serde(default)]
    pub compute: ComputeSettings,
}

/// Compute API クライアントの設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeSettings {
    /// API エンドポイント (省略時は公式エンドポイント)
    pub endpoint: Option<String>,

    /// OAuth アクセストークン
    pub access_token: Option<String>,

    /// リクエストのタイムアウト秒数
    pub timeout_secs: Option<u64>,

    pub user_agent: Option<String>,
}

impl ActuatorConfig {
    /// YAML ファイルから読み込む
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded actuator config");
        Ok(config)
    }

    /// 設定ファイルを探索して読み込む
    pub fn discover() -> Result<Self> {
        let path = find_config_file()?;
        Self::load(path)
    }

    fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.compute.endpoint {
            if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
                return Err(ConfigError::Invalid(format!(
                    "compute.endpoint must be an http(s) URL: {}",
                    endpoint
                )));
            }
        }
        if self.compute.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "compute.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
