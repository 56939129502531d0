//! 对称加解密能力：密钥解析与 AES-ECB/PKCS7 报文加解密。
//!
//! 服务端固定使用 AES/ECB/PKCS5Padding、无 IV。ECB 模式下相同明文块
//! 产生相同密文块，属于继承自既有服务端的协议约束；本 crate 只用于
//! 该协议的报文封装，不得挪作新数据的加密方案。

mod aes_ecb;

pub use aes_ecb::{AesKey, resolve_key};

/// 加解密相关错误。
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: {0} bytes (expected 16/24/32)")]
    InvalidKeyLength(usize),

    #[error("no usable key material (neither base64 nor raw bytes yield 16/24/32 bytes)")]
    UnusableKey,

    /// 填充校验失败：密钥不对或传输被破坏。可提示用户检查密钥，
    /// 不是致命错误。
    #[error("padding check failed (wrong key or corrupted ciphertext)")]
    Padding,
}
