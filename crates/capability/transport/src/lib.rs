//! 传输能力：两种通道（Socket 帧 / HTTP POST）之上的统一抓取操作。
//!
//! 两条通道共用同一套加密封装，仅容器帧不同；`ProtokollFetcher`
//! 对外只暴露一个操作：按合同号抓取并返回解密（且按需解压）后的
//! 明文字节。核心不做自动重试；失败以类型化错误返回，由调用方
//! 决定是否提示用户重试。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let fetcher = ProtokollFetcher::new(config, key);
//! let plain = fetcher.fetch("VN123456").await?;
//! let env = envelope::decode(std::str::from_utf8(&plain)?)?;
//! ```

mod error;
mod http;
mod socket;
mod types;

pub use error::FetchError;
pub use http::HttpTransport;
pub use socket::SocketTransport;
pub use types::{Credentials, Endpoint, ProtokollRequest, RawReply, TransportKind, normalize_vn};

use async_trait::async_trait;
use flate2::read::GzDecoder;
use protokoll_crypto::AesKey;
use std::io::Read;
use std::time::Duration;
use tracing::info;

/// 应答帧的完整性上限：长度前缀超过它即视为损坏/恶意。
pub const MAX_FRAME_BYTES: u64 = 10 * 1024 * 1024;

/// 一问一答的传输通道。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, endpoint: &Endpoint, request: Vec<u8>) -> Result<RawReply, FetchError>;
}

/// 抓取配置：端点、凭据、通道与超时。
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub endpoint: Endpoint,
    pub credentials: Credentials,
    pub transport: TransportKind,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl FetchConfig {
    /// 联网前校验：任何缺失项都以配置错误快速失败。
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.endpoint.host.trim().is_empty() {
            return Err(FetchError::Config("host is empty".to_string()));
        }
        if self.endpoint.port == 0 {
            return Err(FetchError::Config("port must be in 1..=65535".to_string()));
        }
        if self.credentials.username.trim().is_empty() {
            return Err(FetchError::Config("username is empty".to_string()));
        }
        if self.credentials.password.is_empty() {
            return Err(FetchError::Config("password is empty".to_string()));
        }
        Ok(())
    }
}

/// 统一抓取操作：加密请求、走通道交换、解密并按需解压。
pub struct ProtokollFetcher {
    config: FetchConfig,
    key: AesKey,
}

impl ProtokollFetcher {
    pub fn new(config: FetchConfig, key: AesKey) -> Self {
        Self { config, key }
    }

    /// 按合同号抓取一份协议，返回明文字节。
    ///
    /// 单一挂起点：阻塞时长受配置超时约束。通道资源的获取与释放
    /// 都在本次调用的作用域内，取消时随 drop 关闭。
    pub async fn fetch(&self, vn: &str) -> Result<Vec<u8>, FetchError> {
        self.config.validate()?;
        let vn = vn.trim();
        if vn.is_empty() {
            return Err(FetchError::Config("vertragsnummer is blank".to_string()));
        }

        let (request, transport): (Vec<u8>, Box<dyn Transport>) = match self.config.transport {
            TransportKind::Socket => {
                // 管道分隔的明文载荷，合同号原样透传
                let payload = format!(
                    "{}|{}|{}",
                    self.config.credentials.username, self.config.credentials.password, vn
                );
                (
                    self.key.encrypt(payload.as_bytes()),
                    Box::new(SocketTransport::new(
                        self.config.connect_timeout,
                        self.config.read_timeout,
                    )),
                )
            }
            TransportKind::Http => {
                let body = serde_json::to_string(&ProtokollRequest {
                    username: self.config.credentials.username.clone(),
                    password: self.config.credentials.password.clone(),
                    vn: normalize_vn(vn),
                })
                .map_err(|e| FetchError::Http(e.to_string()))?;
                (
                    self.key.encrypt(body.as_bytes()),
                    Box::new(HttpTransport::new(
                        self.config.connect_timeout,
                        self.config.read_timeout,
                    )?),
                )
            }
        };

        info!(
            vn = %vn,
            transport = ?self.config.transport,
            host = %self.config.endpoint.host,
            port = self.config.endpoint.port,
            "fetching protokoll"
        );

        let reply = transport.exchange(&self.config.endpoint, request).await?;
        if reply.body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        let plain = self.key.decrypt(&reply.body)?;
        let plain = maybe_decompress(plain, reply.header_says_gzip)?;

        info!(vn = %vn, plaintext_bytes = plain.len(), "protokoll payload decrypted");
        Ok(plain)
    }
}

/// 按 header 信号或 gzip 魔数（`0x1F 0x8B`）解压；两者都不命中时
/// 原样返回。
pub fn maybe_decompress(bytes: Vec<u8>, header_says_gzip: bool) -> Result<Vec<u8>, FetchError> {
    let looks_gzip = bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b;
    if !header_says_gzip && !looks_gzip {
        return Ok(bytes);
    }
    let mut out = Vec::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_end(&mut out)
        .map_err(|e| FetchError::Decompress(e.to_string()))?;
    Ok(out)
}
