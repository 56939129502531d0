//! HTTP 通道：POST 密文体到固定路径
//!
//! 请求体与响应体都是 `application/octet-stream` 的 AES-ECB 密文。
//! 响应头（几个历史上用过的名字，大小写不敏感）可声明解密后的
//! 明文为 gzip；没有头时由调用方按魔数判定。非 2xx 状态视为传输
//! 错误，附响应体预览辅助排查。

use crate::error::FetchError;
use crate::types::{Endpoint, RawReply};
use crate::Transport;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::debug;

/// 历史上先后使用过的压缩信号头。
const GZIP_HEADERS: [&str; 3] = ["X-Content-Compressed", "X-Compressed", "Content-Encoding"];

const PREVIEW_CHARS: usize = 300;

/// HTTP POST 通道。
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(&self, endpoint: &Endpoint, request: Vec<u8>) -> Result<RawReply, FetchError> {
        let url = format!("http://{}:{}/get_protokoll", endpoint.host, endpoint.port);

        debug!(url = %url, request_bytes = request.len(), "posting encrypted request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/octet-stream")
            .header("Accept", "application/octet-stream")
            .header("X-Client", "protokoll-cli")
            .body(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let header_says_gzip = response_says_gzip(response.headers());
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let preview: String = String::from_utf8_lossy(&body)
                .chars()
                .take(PREVIEW_CHARS)
                .collect();
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                preview,
            });
        }

        debug!(response_bytes = body.len(), gzip_header = header_says_gzip, "response received");

        Ok(RawReply {
            body: body.to_vec(),
            header_says_gzip,
        })
    }
}

/// 按历史头名顺序取第一个存在的头并判断取值。
fn response_says_gzip(headers: &HeaderMap) -> bool {
    let value = GZIP_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_lowercase();
    value.contains("gzip") || value == "1" || value == "true" || value == "yes"
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else if err.is_connect() {
        FetchError::Connection(err.to_string())
    } else {
        FetchError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::response_says_gzip;
    use reqwest::header::HeaderMap;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, value.parse().unwrap());
        }
        map
    }

    #[test]
    fn detects_each_historic_header() {
        assert!(response_says_gzip(&headers(&[("x-content-compressed", "gzip")])));
        assert!(response_says_gzip(&headers(&[("x-compressed", "1")])));
        assert!(response_says_gzip(&headers(&[("content-encoding", "GZIP")])));
        assert!(response_says_gzip(&headers(&[("x-compressed", "true")])));
        assert!(response_says_gzip(&headers(&[("x-compressed", "yes")])));
    }

    #[test]
    fn absent_or_falsy_headers_do_not_signal() {
        assert!(!response_says_gzip(&headers(&[])));
        assert!(!response_says_gzip(&headers(&[("x-content-compressed", "0")])));
        assert!(!response_says_gzip(&headers(&[("content-encoding", "identity")])));
    }
}
