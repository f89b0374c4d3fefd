//! Serving one client connection.
//!
//! The connection owns its [`Session`]; the session detaches when the client
//! closes the socket or the connection fails.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use crate::control::device::Session;
use crate::control::protocol::{decode_request, encode_response, Response};

/// Longest request line accepted, excluding the newline.
pub const MAX_LINE_LEN: usize = 1024;

/// One line read from the client.
enum Line {
    Text(String),
    NotUtf8,
    TooLong,
}

/// Read request lines and answer each one until the client hangs up.
pub async fn serve(stream: UnixStream, session: Session) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    while let Some(line) = next_line(&mut reader).await? {
        let response = match line {
            Line::Text(text) if text.trim().is_empty() => continue,
            Line::Text(text) => match decode_request(&text) {
                Ok(request) => session.execute(request),
                Err(e) => {
                    tracing::debug!(session_id = %session.id(), error = %e, "Unparsable request");
                    Response::Invalid {
                        reason: e.to_string(),
                    }
                }
            },
            Line::NotUtf8 => {
                tracing::debug!(session_id = %session.id(), "Request is not UTF-8");
                Response::Invalid {
                    reason: "request is not valid UTF-8".to_string(),
                }
            }
            Line::TooLong => {
                tracing::debug!(session_id = %session.id(), "Request line too long");
                Response::Invalid {
                    reason: format!("request exceeds {MAX_LINE_LEN} bytes"),
                }
            }
        };

        let bytes = encode_response(&response)?;
        writer.write_all(&bytes).await?;
    }

    tracing::debug!(session_id = %session.id(), "Client closed the channel");
    Ok(())
}

/// Read one line without buffering more than `MAX_LINE_LEN` bytes of it.
async fn next_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Option<Line>> {
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_LEN as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    } else if buf.len() > MAX_LINE_LEN {
        skip_line(reader).await?;
        return Ok(Some(Line::TooLong));
    }

    Ok(Some(match String::from_utf8(buf) {
        Ok(text) => Line::Text(text),
        Err(_) => Line::NotUtf8,
    }))
}

/// Discard input up to and including the next newline.
async fn skip_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(());
        }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn lines(input: &[u8]) -> Vec<Line> {
        let mut reader = BufReader::new(input);
        let mut out = Vec::new();
        while let Some(line) = next_line(&mut reader).await.unwrap() {
            out.push(line);
        }
        out
    }

    #[tokio::test]
    async fn splits_text_and_flags_bad_lines() {
        let mut input = b"{\"command\":\"RESET\"}\n\xff\xfe\n".to_vec();
        input.extend(std::iter::repeat(b'a').take(MAX_LINE_LEN * 3));
        input.extend_from_slice(b"\nlast");

        let got = lines(&input).await;
        assert_eq!(got.len(), 4);
        assert!(matches!(&got[0], Line::Text(t) if t == "{\"command\":\"RESET\"}"));
        assert!(matches!(got[1], Line::NotUtf8));
        assert!(matches!(got[2], Line::TooLong));
        assert!(matches!(&got[3], Line::Text(t) if t == "last"));
    }

    #[tokio::test]
    async fn line_at_the_limit_is_accepted() {
        let mut input = vec![b'x'; MAX_LINE_LEN];
        input.push(b'\n');

        let got = lines(&input).await;
        assert!(matches!(&got[..], [Line::Text(t)] if t.len() == MAX_LINE_LEN));
    }
}
