use anyhow::Context;
use axum::http::HeaderValue;
use serde::Deserialize;
use std::env;
use std::fs;
use std::str::FromStr;

/// 実行環境を表すenum
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(anyhow::anyhow!("Invalid environment: {}", s)),
        }
    }
}

// Serdeでの非直列化をサポート
impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Environment::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub env: Environment,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5050
}

impl ServerConfig {
    /// 環境に応じたallowed_originsをHeaderValueとして取得
    ///
    /// # Errors
    /// プロダクション環境でallowed_originsが設定されていない場合にエラーを返す
    pub fn get_allowed_origins(
        &self,
        addr: &std::net::SocketAddr,
    ) -> anyhow::Result<Vec<HeaderValue>> {
        let origin_strings = match self.env {
            Environment::Production => {
                // プロダクション環境では明示的な指定が必須
                if self.allowed_origins.is_empty() {
                    anyhow::bail!(
                        "Production environment requires explicit ALLOWED_ORIGINS configuration. \
                        Set ALLOWED_ORIGINS environment variable"
                    );
                }
                self.allowed_origins.clone()
            }
            Environment::Development => {
                // 開発環境: ローカルホスト関連のオリジンを許可
                let mut origins = vec![
                    format!("http://localhost:{}", addr.port()),
                    format!("http://127.0.0.1:{}", addr.port()),
                    "http://localhost:3000".to_string(),
                    format!("http://{}", addr),
                ];
                origins.extend(self.allowed_origins.clone());
                origins
            }
        };

        // 変換に失敗したものはログ出力してスキップ
        let headers: Vec<HeaderValue> = origin_strings
            .into_iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(header_value) => {
                    tracing::debug!(%origin, "Allowed origin");
                    Some(header_value)
                }
                Err(e) => {
                    tracing::warn!(%origin, error = %e, "Failed to parse origin");
                    None
                }
            })
            .collect();

        if headers.is_empty() {
            anyhow::bail!("No valid CORS origins configured");
        }

        Ok(headers)
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// 空の場合は要約機能を無効にする
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-001".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

impl GeminiConfig {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Config {
    /// 設定を読み込む。起動時に一度だけ呼ぶ
    pub fn load() -> anyhow::Result<Self> {
        // 環境変数から読み込む場合
        let mut config = if let Ok(database_url) = env::var("DATABASE_URL") {
            Config {
                database: DatabaseConfig {
                    url: database_url,
                    max_connections: default_max_connections(),
                },
                server: ServerConfig {
                    host: default_host(),
                    port: default_port(),
                    env: Environment::default(),
                    allowed_origins: Vec::new(),
                },
                logging: LoggingConfig::default(),
                gemini: GeminiConfig::default(),
            }
        } else {
            // Config.tomlから読み込む場合（ローカル開発）
            let config_str = fs::read_to_string("Config.toml").context(
                "Failed to read Config.toml. Use environment variables or provide Config.toml",
            )?;
            Self::from_toml_str(&config_str)?
        };

        // 環境変数があれば優先する
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse Config.toml")
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(max) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                max.parse().context("Invalid DATABASE_MAX_CONNECTIONS")?;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            self.server.port = port.parse().context("Invalid SERVER_PORT")?;
        }
        if let Ok(environment) = env::var("ENVIRONMENT") {
            self.server.env = environment.parse()?;
        }
        if let Ok(origins) = env::var("ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(api_key) = env::var("GEMINI_API_KEY") {
            self.gemini.api_key = api_key;
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        Ok(())
    }
}
