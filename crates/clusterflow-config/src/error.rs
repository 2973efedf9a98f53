use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: clusterflow.local.yaml, clusterflow.yaml\n\
        - ./.clusterflow/ ディレクトリ\n\
        - ~/.config/clusterflow/clusterflow.yaml\n\
        または CLUSTERFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ConfigFileNotFound,

    #[error("設定ファイルの解析に失敗しました ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("設定値が不正です: {0}")]
    Invalid(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
