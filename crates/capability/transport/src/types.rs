//! 传输层共用类型。

use serde::Serialize;

/// 服务端端点。
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// 抓取凭据；在一次抓取期间只读。
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    /// 口令不进日志。
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// 传输通道：长度前缀 Socket 帧或 HTTP POST。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Socket,
    Http,
}

/// HTTP 通道的请求体（加密前的 JSON）。
#[derive(Debug, Serialize)]
pub struct ProtokollRequest {
    pub username: String,
    pub password: String,
    pub vn: String,
}

/// 通道原始应答：密文 + 压缩信号。
#[derive(Debug)]
pub struct RawReply {
    pub body: Vec<u8>,
    /// 响应头是否声明 gzip（Socket 通道恒为 false，仅靠魔数判定）。
    pub header_says_gzip: bool,
}

/// 合同号规范化：去空白，无 VN 前缀（大小写不敏感）时补上。
pub fn normalize_vn(vn: &str) -> String {
    let vn = vn.trim();
    if vn.to_uppercase().starts_with("VN") {
        vn.to_string()
    } else {
        format!("VN{vn}")
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_vn;

    #[test]
    fn normalize_vn_adds_missing_prefix() {
        assert_eq!(normalize_vn("123456"), "VN123456");
        assert_eq!(normalize_vn("  123456 "), "VN123456");
    }

    #[test]
    fn normalize_vn_keeps_existing_prefix() {
        assert_eq!(normalize_vn("VN123456"), "VN123456");
        // 前缀判断大小写不敏感，原样保留
        assert_eq!(normalize_vn("vn123456"), "vn123456");
    }
}
