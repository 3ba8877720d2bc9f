//! Control socket sessions: one per connected client

use std::sync::Arc;

use serde::Serialize;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::unix::{OwnedReadHalf, OwnedWriteHalf},
    sync::Mutex,
};

use crate::{
    core::{
        error::{TransportError, TransportResult},
        types::SessionId,
    },
    protocol::{JsonRpcNotification, JsonRpcResponse},
};

/// Write side of a client connection
///
/// Responses and notifications are newline-delimited JSON; writes are
/// serialized so a notification never interleaves with a response.
#[derive(Debug, Clone)]
pub struct UnixSocketSession {
    id: SessionId,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl UnixSocketSession {
    pub fn new(writer: OwnedWriteHalf) -> Self {
        Self {
            id: SessionId::new(),
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub async fn send_response(&self, response: &JsonRpcResponse) -> TransportResult<()> {
        self.send_line(response).await
    }

    pub async fn send_notification(
        &self,
        notification: &JsonRpcNotification,
    ) -> TransportResult<()> {
        self.send_line(notification).await
    }

    async fn send_line<T: Serialize>(&self, message: &T) -> TransportResult<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Longest accepted request line, terminator excluded
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Read side of a client connection
///
/// [`read_line`](Self::read_line) is cancel safe: bytes of an unfinished line
/// stay buffered until the next call.
pub struct SessionReader {
    reader: BufReader<OwnedReadHalf>,
    pending: Vec<u8>,
    max_line_len: usize,
}

impl SessionReader {
    pub fn new(reader: OwnedReadHalf) -> Self {
        Self::with_limit(reader, MAX_LINE_LEN)
    }

    pub fn with_limit(reader: OwnedReadHalf, max_line_len: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            pending: Vec::new(),
            max_line_len,
        }
    }

    /// Next line without its terminator, `None` on EOF
    ///
    /// A line longer than the limit is discarded with
    /// [`TransportError::MessageTooLong`]; the connection is not usable after
    /// that.
    pub async fn read_line(&mut self) -> TransportResult<Option<String>> {
        let budget = (self.max_line_len + 1).saturating_sub(self.pending.len());
        let read = (&mut self.reader)
            .take(budget as u64)
            .read_until(b'\n', &mut self.pending)
            .await?;
        if read == 0 && self.pending.is_empty() {
            return Ok(None);
        }
        if self.pending.last() != Some(&b'\n') && self.pending.len() > self.max_line_len {
            self.pending.clear();
            return Err(TransportError::MessageTooLong(self.max_line_len));
        }

        let mut line = std::mem::take(&mut self.pending);
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }
        String::from_utf8(line)
            .map(Some)
            .map_err(|_| TransportError::InvalidMessageFormat)
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::UnixStream;

    use super::*;
    use crate::{
        core::types::PowerState,
        protocol::{
            AckResponse, JsonRpcRequest, Notification, PowerStateChangedParams, Request,
            RequestId, Response,
        },
    };

    #[tokio::test]
    async fn test_session_ids_unique() {
        let (client, server) = UnixStream::pair().unwrap();
        let a = UnixSocketSession::new(server.into_split().1);
        let b = UnixSocketSession::new(client.into_split().1);

        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_read_request_line() {
        let (client, server) = UnixStream::pair().unwrap();
        let (read_half, _write_half) = server.into_split();
        let mut reader = SessionReader::new(read_half);
        let (_client_read, mut client_write) = client.into_split();

        let request = JsonRpcRequest::new(Request::ListInterfaces, RequestId::Number(1));
        let json = serde_json::to_string(&request).unwrap();
        client_write.write_all(json.as_bytes()).await.unwrap();
        client_write.write_all(b"\r\n").await.unwrap();

        let line = reader.read_line().await.unwrap().unwrap();
        let received: JsonRpcRequest = serde_json::from_str(&line).unwrap();
        assert_eq!(received, request);
    }

    #[tokio::test]
    async fn test_response_and_notification_are_lines() {
        let (client, server) = UnixStream::pair().unwrap();
        let session = UnixSocketSession::new(server.into_split().1);
        let mut reader = SessionReader::new(client.into_split().0);

        session
            .send_response(&JsonRpcResponse::success(
                Response::Ack(AckResponse::ok()),
                RequestId::Number(3),
            ))
            .await
            .unwrap();
        session
            .send_notification(&JsonRpcNotification::from(Notification::PowerStateChanged(
                PowerStateChangedParams {
                    state: PowerState::Sleeping,
                },
            )))
            .await
            .unwrap();

        let first = reader.read_line().await.unwrap().unwrap();
        assert!(first.contains(r#""id":3"#));
        let second = reader.read_line().await.unwrap().unwrap();
        assert!(second.contains(r#""method":"power_state_changed""#));
    }

    #[tokio::test]
    async fn test_invalid_utf8_rejected() {
        let (client, server) = UnixStream::pair().unwrap();
        let mut reader = SessionReader::new(server.into_split().0);
        let (_client_read, mut client_write) = client.into_split();

        client_write.write_all(&[0xff, 0xfe, b'\n']).await.unwrap();
        client_write.write_all(b"{}\n").await.unwrap();

        assert!(matches!(
            reader.read_line().await,
            Err(TransportError::InvalidMessageFormat)
        ));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_overlong_line_rejected() {
        let (client, server) = UnixStream::pair().unwrap();
        let mut reader = SessionReader::with_limit(server.into_split().0, 8);
        let (_client_read, mut client_write) = client.into_split();

        client_write.write_all(b"12345678\n").await.unwrap();
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("12345678"));

        client_write.write_all(b"123456789").await.unwrap();
        assert!(matches!(
            reader.read_line().await,
            Err(TransportError::MessageTooLong(8))
        ));
    }

    #[tokio::test]
    async fn test_session_reader_eof() {
        let (client, server) = UnixStream::pair().unwrap();
        let (read_half, _) = server.into_split();
        let mut reader = SessionReader::new(read_half);

        drop(client);
        assert!(reader.read_line().await.unwrap().is_none());
    }
}
