//! Native messaging host framing: 4-byte native-endian length, then UTF-8 JSON.
//!
//! Used by `catlens serve`, where stdin/stdout carry frames from the browser.
//! Nothing else may write to stdout while serving.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::background::{Background, Response, Sender, INVALID_PAYLOAD};

/// Largest frame accepted from the browser.
pub const MAX_INBOUND_LEN: usize = 64 * 1024 * 1024;
/// Largest frame the browser accepts from a host.
pub const MAX_OUTBOUND_LEN: usize = 1024 * 1024;

pub const RESPONSE_TOO_LARGE: &str = "Response too large";

/// Read one frame. `Ok(None)` on a clean end of input before a new frame.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len = [0u8; 4];
    match reader.read_exact(&mut len).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e).context("read frame length"),
    }
    let n = u32::from_ne_bytes(len) as usize;
    if n > MAX_INBOUND_LEN {
        anyhow::bail!("frame of {} bytes exceeds {} byte limit", n, MAX_INBOUND_LEN);
    }
    let mut body = vec![0u8; n];
    reader
        .read_exact(&mut body)
        .await
        .context("read frame body")?;
    Ok(Some(body))
}

/// Write one response frame. Oversized responses are replaced by an error response.
pub async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<()> {
    let mut body = serde_json::to_vec(response).context("serialize response")?;
    if body.len() > MAX_OUTBOUND_LEN {
        tracing::warn!(bytes = body.len(), "response over native messaging limit");
        body = serde_json::to_vec(&Response::error(RESPONSE_TOO_LARGE))
            .context("serialize response")?;
    }
    writer
        .write_all(&(body.len() as u32).to_ne_bytes())
        .await
        .context("write frame length")?;
    writer.write_all(&body).await.context("write frame body")?;
    writer.flush().await.context("flush frame")?;
    Ok(())
}

/// Answer frames until the input ends. Returns the number of messages handled.
pub async fn serve<R, W>(background: &Background, sender: &Sender, mut reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut handled = 0;
    while let Some(frame) = read_frame(&mut reader).await? {
        let response = match serde_json::from_slice(&frame) {
            Ok(raw) => background.handle(sender, raw).await,
            Err(e) => {
                tracing::warn!("undecodable message: {}", e);
                Response::error(INVALID_PAYLOAD)
            }
        };
        write_response(&mut writer, &response).await?;
        handled += 1;
    }
    tracing::debug!(handled, "input closed");
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::lookup::{BatchLookup, LookupConfig};
    use crate::search::scripted::ScriptedTransport;
    use crate::store::StateStore;

    fn frame(bytes: &[u8]) -> Vec<u8> {
        let mut out = (bytes.len() as u32).to_ne_bytes().to_vec();
        out.extend_from_slice(bytes);
        out
    }

    fn frames(out: &[u8]) -> Vec<Value> {
        let mut values = Vec::new();
        let mut rest = out;
        while rest.len() >= 4 {
            let n = u32::from_ne_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
            values.push(serde_json::from_slice(&rest[4..4 + n]).unwrap());
            rest = &rest[4 + n..];
        }
        values
    }

    fn background() -> Background {
        let lookup = BatchLookup::new(Arc::new(ScriptedTransport::default()), LookupConfig::default());
        Background::new(StateStore::in_memory(), lookup, Some("ext".to_string()))
    }

    #[tokio::test]
    async fn answers_each_frame_in_order() {
        let bg = background();
        let mut input = frame(br#"{"type":"GET_STATE"}"#);
        input.extend(frame(br#"{"type":"NOPE"}"#));
        input.extend(frame(b"not json"));
        let mut output = Vec::new();

        let n = serve(&bg, &Sender::extension("ext"), input.as_slice(), &mut output)
            .await
            .unwrap();
        assert_eq!(n, 3);
        let replies = frames(&output);
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["success"], true);
        assert!(replies[0]["state"]["config"].is_object());
        assert_eq!(replies[1]["error"], "Unknown message type");
        assert_eq!(replies[2]["error"], INVALID_PAYLOAD);
    }

    #[tokio::test]
    async fn wrong_origin_is_unauthorized() {
        let bg = background();
        let input = frame(br#"{"type":"GET_STATE"}"#);
        let mut output = Vec::new();
        serve(&bg, &Sender::extension("other"), input.as_slice(), &mut output)
            .await
            .unwrap();
        assert_eq!(frames(&output)[0]["error"], "Unauthorized sender");
    }

    #[tokio::test]
    async fn empty_input_and_truncated_frames() {
        let mut empty: &[u8] = &[];
        assert!(read_frame(&mut empty).await.unwrap().is_none());

        let mut truncated = frame(b"{}");
        truncated.pop();
        let mut reader = truncated.as_slice();
        assert!(read_frame(&mut reader).await.is_err());

        let huge = ((MAX_INBOUND_LEN + 1) as u32).to_ne_bytes();
        let mut reader: &[u8] = &huge;
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn oversized_response_becomes_error() {
        let mut mappings = crate::cache::MappingCache::new();
        for i in 0..5000 {
            mappings.insert(&format!("id-{i}"), &"x".repeat(400));
        }
        let response = Response {
            success: true,
            labels: Some(mappings),
            ..Default::default()
        };
        let mut out = Vec::new();
        write_response(&mut out, &response).await.unwrap();
        let replies = frames(&out);
        assert_eq!(replies[0], json!({ "success": false, "error": RESPONSE_TOO_LARGE }));
    }
}
