//! AES-ECB/PKCS7 加解密与灵活密钥解析。

use crate::CryptoError;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

const BLOCK_SIZE: usize = 16;

/// 已解析的 AES 密钥，按长度分 128/192/256 三档。
#[derive(Clone)]
pub enum AesKey {
    Aes128([u8; 16]),
    Aes192([u8; 24]),
    Aes256([u8; 32]),
}

impl AesKey {
    /// 原始字节 → 密钥；长度必须恰为 16/24/32。
    pub fn from_bytes(raw: &[u8]) -> Result<Self, CryptoError> {
        match raw.len() {
            16 => Ok(Self::Aes128(raw.try_into().expect("length checked"))),
            24 => Ok(Self::Aes192(raw.try_into().expect("length checked"))),
            32 => Ok(Self::Aes256(raw.try_into().expect("length checked"))),
            n => Err(CryptoError::InvalidKeyLength(n)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Aes128(_) => 16,
            Self::Aes192(_) => 24,
            Self::Aes256(_) => 32,
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// 明文 → AES-ECB/PKCS7 密文。
    pub fn encrypt(&self, plain: &[u8]) -> Vec<u8> {
        match self {
            Self::Aes128(k) => {
                ecb::Encryptor::<Aes128>::new(&(*k).into()).encrypt_padded_vec_mut::<Pkcs7>(plain)
            }
            Self::Aes192(k) => {
                ecb::Encryptor::<Aes192>::new(&(*k).into()).encrypt_padded_vec_mut::<Pkcs7>(plain)
            }
            Self::Aes256(k) => {
                ecb::Encryptor::<Aes256>::new(&(*k).into()).encrypt_padded_vec_mut::<Pkcs7>(plain)
            }
        }
    }

    /// 密文 → 明文；填充校验失败返回 [`CryptoError::Padding`]。
    pub fn decrypt(&self, cipher: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if cipher.is_empty() || cipher.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::Padding);
        }
        let out = match self {
            Self::Aes128(k) => {
                ecb::Decryptor::<Aes128>::new(&(*k).into()).decrypt_padded_vec_mut::<Pkcs7>(cipher)
            }
            Self::Aes192(k) => {
                ecb::Decryptor::<Aes192>::new(&(*k).into()).decrypt_padded_vec_mut::<Pkcs7>(cipher)
            }
            Self::Aes256(k) => {
                ecb::Decryptor::<Aes256>::new(&(*k).into()).decrypt_padded_vec_mut::<Pkcs7>(cipher)
            }
        };
        out.map_err(|_| CryptoError::Padding)
    }
}

impl std::fmt::Debug for AesKey {
    /// 密钥材料不进日志，只暴露档位。
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AesKey({} bytes)", self.len())
    }
}

/// 密钥材料解析：接受 Base64 或原始字符串。
///
/// 先严格按 Base64 解码，解出的长度合法即采用；否则按原始 UTF-8
/// 字节解释；两条路都不产出 16/24/32 字节时报错。
pub fn resolve_key(input: &str) -> Result<AesKey, CryptoError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(CryptoError::UnusableKey);
    }

    if let Ok(raw) = BASE64.decode(s) {
        if let Ok(key) = AesKey::from_bytes(&raw) {
            return Ok(key);
        }
    }

    AesKey::from_bytes(s.as_bytes()).map_err(|_| CryptoError::UnusableKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_rejects_wrong_lengths() {
        assert!(matches!(
            AesKey::from_bytes(&[0u8; 15]),
            Err(CryptoError::InvalidKeyLength(15))
        ));
        assert!(matches!(
            AesKey::from_bytes(&[0u8; 33]),
            Err(CryptoError::InvalidKeyLength(33))
        ));
        assert!(AesKey::from_bytes(&[0u8; 24]).is_ok());
    }

    #[test]
    fn ciphertext_is_block_aligned_and_padded() {
        let key = AesKey::from_bytes(b"0123456789abcdef").expect("key");
        // PKCS7：恰好整块的明文也追加一个完整填充块
        assert_eq!(key.encrypt(b"").len(), 16);
        assert_eq!(key.encrypt(&[7u8; 16]).len(), 32);
        assert_eq!(key.encrypt(&[7u8; 17]).len(), 32);
    }

    #[test]
    fn decrypt_rejects_unaligned_ciphertext() {
        let key = AesKey::from_bytes(b"0123456789abcdef").expect("key");
        let ct = key.encrypt(b"payload");
        assert!(matches!(key.decrypt(&ct[..15]), Err(CryptoError::Padding)));
        assert!(matches!(key.decrypt(&[]), Err(CryptoError::Padding)));
    }
}
