// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

const HTTP_OK: u16 = 200;

/// Largest response body accepted from the endpoint
pub(crate) const MAX_RESPONSE_LEN: usize = 1024 * 1024;

/// A status code, reason phrase and body read back from the attestation
/// endpoint
#[derive(Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status == HTTP_OK
    }
}

/// A single-use HTTP/1.1 connection to the local attestation endpoint.
///
/// The socket is shut down when the guard is dropped, so it is released on
/// every exit path of the owning call.
pub struct Connection {
    stream: UnixStream,
}

impl Connection {
    /// Connect to the unix socket at `path`, applying `timeout` to reads and
    /// writes
    pub fn open(path: &Path, timeout: Duration) -> Result<Self, Error> {
        let stream = UnixStream::connect(path).map_err(|e| {
            Error::Transport(format!("connecting to {}: {e}", path.display()))
        })?;

        stream
            .set_read_timeout(Some(timeout))
            .and_then(|_| stream.set_write_timeout(Some(timeout)))
            .map_err(|e| Error::Transport(format!("setting socket timeout: {e}")))?;

        tracing::debug!(socket = %path.display(), "connection_open");

        Ok(Self { stream })
    }

    /// Send a JSON `POST` to `target` and read back exactly one response.
    /// Consumes the connection: it is never reused.
    pub fn post_json(mut self, target: &str, body: &[u8]) -> Result<Response, Error> {
        let head = format!(
            "POST {target} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\nUser-Agent: vtpmtoken\r\n\r\n",
            body.len()
        );

        self.stream
            .write_all(head.as_bytes())
            .and_then(|_| self.stream.write_all(body))
            .and_then(|_| self.stream.flush())
            .map_err(|e| Error::Transport(format!("sending request to {target}: {e}")))?;

        let reader = BufReader::new(&self.stream);

        read_response(reader)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // the peer may already have closed its end
        let _ = self.stream.shutdown(Shutdown::Both);

        tracing::debug!("connection_closed");
    }
}

fn io_err(e: std::io::Error) -> Error {
    Error::Transport(format!("reading response: {e}"))
}

fn too_large(len: usize) -> Error {
    Error::Transport(format!(
        "response body of {len} bytes exceeds the {MAX_RESPONSE_LEN} byte limit"
    ))
}

fn parse_status_line(line: &str) -> Result<(u16, String), Error> {
    let line = line.trim_end();
    let mut parts = line.splitn(3, ' ');

    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(Error::Transport(format!(
            "malformed status line: {line:?}"
        )));
    }

    let status = parts
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| Error::Transport(format!("malformed status line: {line:?}")))?;

    let reason = parts.next().unwrap_or_default().to_string();

    Ok((status, reason))
}

/// Read one HTTP/1.x response.  The body is delimited by `Content-Length`,
/// chunked transfer encoding or, failing both, the end of the stream.
pub(crate) fn read_response<R: BufRead>(mut reader: R) -> Result<Response, Error> {
    let mut status_line = String::new();
    reader.read_line(&mut status_line).map_err(io_err)?;

    if status_line.is_empty() {
        return Err(Error::Transport(
            "connection closed before status line".to_string(),
        ));
    }

    let (status, reason) = parse_status_line(&status_line)?;

    let mut content_length: Option<usize> = None;
    let mut chunked = false;

    loop {
        let mut header = String::new();
        let n = reader.read_line(&mut header).map_err(io_err)?;

        if n == 0 || header == "\r\n" || header == "\n" {
            break;
        }

        if let Some((name, value)) = header.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();

            match name.as_str() {
                "content-length" => {
                    let len = value.parse::<usize>().map_err(|e| {
                        Error::Transport(format!("bad content-length {value:?}: {e}"))
                    })?;
                    content_length = Some(len);
                }
                "transfer-encoding" => {
                    chunked = value.to_ascii_lowercase().contains("chunked");
                }
                _ => {}
            }
        }
    }

    let mut body = Vec::new();

    if chunked {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).map_err(io_err)?;

            // chunk extensions follow a ';'
            let size_str = size_line.trim().split(';').next().unwrap_or_default();
            let size = usize::from_str_radix(size_str, 16).map_err(|e| {
                Error::Transport(format!("bad chunk size {size_str:?}: {e}"))
            })?;

            if size == 0 {
                break;
            }

            let start = body.len();
            let end = start
                .checked_add(size)
                .filter(|n| *n <= MAX_RESPONSE_LEN)
                .ok_or_else(|| too_large(start.saturating_add(size)))?;
            body.resize(end, 0);
            reader.read_exact(&mut body[start..]).map_err(io_err)?;

            let mut crlf = [0u8; 2];
            reader.read_exact(&mut crlf).map_err(io_err)?;
        }
    } else if let Some(len) = content_length {
        if len > MAX_RESPONSE_LEN {
            return Err(too_large(len));
        }
        body.resize(len, 0);
        reader.read_exact(&mut body).map_err(io_err)?;
    } else {
        reader
            .take(MAX_RESPONSE_LEN as u64 + 1)
            .read_to_end(&mut body)
            .map_err(io_err)?;

        if body.len() > MAX_RESPONSE_LEN {
            return Err(too_large(body.len()));
        }
    }

    Ok(Response {
        status,
        reason,
        body,
    })
}
