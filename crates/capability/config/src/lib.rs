//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 历史客户端内置的兜底密钥（Base64）。
///
/// 仅当 `PROTOKOLL_ALLOW_FALLBACK_KEY=1` 且未配置主密钥时生效；
/// 生效时 `key_source` 标记为 Fallback，调用方必须显式告警。
const FALLBACK_KEY_B64: &str = "ZW5vLXByb3Rva29sbC1mYWxsYmFjay0yMDE5LWtleSE=";

/// 密钥来源：区分正常配置与不安全兜底。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Configured,
    /// 内置兜底密钥：不安全，仅供旧部署过渡，必须向操作者告警。
    Fallback,
}

/// 传输通道选择。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSetting {
    Http,
    Socket,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// 密钥材料：Base64 或原始字符串，由 crypto 层解析。
    pub key: String,
    pub key_source: KeySource,
    pub transport: TransportSetting,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub cache_dir: String,
}

impl AppConfig {
    /// 从环境变量读取配置。联网前校验，缺失项快速失败。
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = read_required("PROTOKOLL_HOST")?;
        let port = read_u16("PROTOKOLL_PORT")?;
        if port == 0 {
            return Err(ConfigError::Invalid(
                "PROTOKOLL_PORT".to_string(),
                "0".to_string(),
            ));
        }
        let username = read_required("PROTOKOLL_USER")?;
        let password = read_required("PROTOKOLL_PASSWORD")?;

        let (key, key_source) = match read_optional("PROTOKOLL_KEY") {
            Some(key) => (key, KeySource::Configured),
            None if read_bool_with_default("PROTOKOLL_ALLOW_FALLBACK_KEY", false) => {
                (FALLBACK_KEY_B64.to_string(), KeySource::Fallback)
            }
            None => return Err(ConfigError::Missing("PROTOKOLL_KEY".to_string())),
        };

        let transport = match read_optional("PROTOKOLL_TRANSPORT").as_deref() {
            None | Some("http") => TransportSetting::Http,
            Some("socket") => TransportSetting::Socket,
            Some(other) => {
                return Err(ConfigError::Invalid(
                    "PROTOKOLL_TRANSPORT".to_string(),
                    other.to_string(),
                ));
            }
        };

        // Socket 历史上固定 5s 连接超时，HTTP 为 10s
        let default_connect_ms = match transport {
            TransportSetting::Http => 10_000,
            TransportSetting::Socket => 5_000,
        };
        let connect_timeout_ms =
            read_u64_with_default("PROTOKOLL_CONNECT_TIMEOUT_MS", default_connect_ms)?;
        let read_timeout_ms = read_u64_with_default("PROTOKOLL_READ_TIMEOUT_MS", 45_000)?;

        let cache_dir = cache_dir_from_env();

        Ok(Self {
            host,
            port,
            username,
            password,
            key,
            key_source,
            transport,
            connect_timeout_ms,
            read_timeout_ms,
            cache_dir,
        })
    }
}

/// 缓存目录：纯缓存命令也要用，不要求完整配置。
pub fn cache_dir_from_env() -> String {
    env::var("PROTOKOLL_CACHE_DIR").unwrap_or_else(|_| "protokoll_cache".to_string())
}

/// 读取必填环境变量（空白视为缺失）。
fn read_required(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key.to_string())),
    }
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// 读取 u16 类型环境变量。
fn read_u16(key: &str) -> Result<u16, ConfigError> {
    let value = env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))?;
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
