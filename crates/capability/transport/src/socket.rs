//! Socket 通道：长度前缀帧的一问一答
//!
//! 帧格式：4 字节大端长度 + AES-ECB 密文。应答长度必须为正且
//! 不超过 [`MAX_FRAME_BYTES`](crate::MAX_FRAME_BYTES)，否则在
//! 分配缓冲区之前即拒绝。连接在本次交换的作用域内持有，任何
//! 退出路径（成功、错误、超时、取消）都随 drop 释放。

use crate::error::FetchError;
use crate::types::{Endpoint, RawReply};
use crate::{MAX_FRAME_BYTES, Transport};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// 长度前缀 Socket 通道。
pub struct SocketTransport {
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl SocketTransport {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn exchange(&self, endpoint: &Endpoint, request: Vec<u8>) -> Result<RawReply, FetchError> {
        let addr = format!("{}:{}", endpoint.host, endpoint.port);

        let mut stream = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| FetchError::Timeout(format!("connect to {addr}")))?
            .map_err(|e| FetchError::Connection(format!("{addr}: {e}")))?;

        debug!(addr = %addr, request_bytes = request.len(), "socket connected, sending frame");

        stream.write_i32(request.len() as i32).await?;
        stream.write_all(&request).await?;
        stream.flush().await?;

        let declared = timeout(self.read_timeout, stream.read_i32())
            .await
            .map_err(|_| FetchError::Timeout(format!("read length prefix from {addr}")))??;
        if declared <= 0 || declared as u64 > MAX_FRAME_BYTES {
            return Err(FetchError::FrameLength(declared as i64));
        }

        let mut body = vec![0u8; declared as usize];
        timeout(self.read_timeout, stream.read_exact(&mut body))
            .await
            .map_err(|_| FetchError::Timeout(format!("read {declared} byte frame from {addr}")))??;

        debug!(addr = %addr, response_bytes = body.len(), "socket frame received");

        Ok(RawReply {
            body,
            header_says_gzip: false,
        })
    }
}
