//! 抓取错误类型定义
//!
//! 错误分类对应调用方的提示策略：配置错误可由用户修正后重试，
//! 传输错误可直接重试，加解密错误应提示检查密钥，解压错误应
//! 附带明文预览辅助排查。

use protokoll_crypto::CryptoError;

/// 抓取过程中的错误。
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// 配置错误（缺失/非法的主机、端口、凭据、合同号），联网前即失败
    #[error("config error: {0}")]
    Config(String),

    /// 连接错误
    #[error("connection error: {0}")]
    Connection(String),

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 超时错误
    #[error("timeout: {0}")]
    Timeout(String),

    /// 非 2xx HTTP 状态，附响应体预览
    #[error("http status {status}: {preview}")]
    HttpStatus { status: u16, preview: String },

    /// 其余 HTTP 客户端错误
    #[error("http error: {0}")]
    Http(String),

    /// 长度前缀非法（非正数或超出上限），防御损坏/恶意的长度字段
    #[error("bad frame length: {0}")]
    FrameLength(i64),

    /// 空响应体
    #[error("empty response body")]
    EmptyBody,

    /// 加解密错误（区别于普通传输错误，提示检查密钥）
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// 解密后的 gzip 流非法
    #[error("gzip error: {0}")]
    Decompress(String),
}
