//! Protocol codec
//!
//! Reading and writing the HTTP/1.x subset the server speaks.
//!
//! ## Request
//! ```text
//! GET /get?key=<key> HTTP/1.1\r\n
//! <headers, ignored>\r\n
//! \r\n
//! ```
//!
//! ## Response
//! ```text
//! HTTP/1.1 <code> <reason>\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: <n>\r\n
//! Connection: close\r\n
//! \r\n
//! <body>
//! ```
//!
//! Query strings are form-urlencoded, with `+` standing for a space.

use std::io::{BufRead, Read, Write};

use crate::error::{Result, SnapError};

use super::{Command, Response, Status};

/// Maximum length of a request, status or header line
pub const MAX_LINE_SIZE: usize = 8 * 1024;

/// Maximum number of header lines read before giving up
pub const MAX_HEADERS: usize = 100;

/// Maximum response body size (16 MB)
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// Requests
// =============================================================================

/// Read one request and parse it into a command
///
/// Returns `Io(UnexpectedEof)` if the peer closed before sending anything and
/// `Protocol` for anything the server should answer with 400.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Command> {
    let request_line = read_line(reader)?.ok_or_else(|| {
        SnapError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed before request line",
        ))
    })?;

    // Drain headers first so a rejected request still leaves the stream clean
    skip_headers(reader)?;

    let mut parts = request_line.split_whitespace();
    let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) => (m, t, v),
        _ => {
            return Err(SnapError::Protocol(format!(
                "Malformed request line: {:?}",
                request_line
            )))
        }
    };

    if !version.starts_with("HTTP/") {
        return Err(SnapError::Protocol(format!(
            "Unsupported protocol version: {:?}",
            version
        )));
    }
    if method != "GET" {
        return Err(SnapError::Protocol(format!(
            "Unsupported request method: {}",
            method
        )));
    }

    Command::from_target(target)
}

/// Encode a command as a request for `host`
pub fn encode_request(command: &Command, host: &str) -> Vec<u8> {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        command.to_target(),
        host
    )
    .into_bytes()
}

/// Write a command to a stream
pub fn write_request<W: Write>(writer: &mut W, command: &Command, host: &str) -> Result<()> {
    writer.write_all(&encode_request(command, host))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Responses
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Vec<u8> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status.code(),
        response.status.reason(),
        response.body.len()
    );

    let mut message = Vec::with_capacity(head.len() + response.body.len());
    message.extend_from_slice(head.as_bytes());
    message.extend_from_slice(&response.body);
    message
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let status_line = read_line(reader)?
        .ok_or_else(|| SnapError::Protocol("Empty response".to_string()))?;

    let mut parts = status_line.splitn(3, ' ');
    let code = match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code,
        _ => {
            return Err(SnapError::Protocol(format!(
                "Malformed status line: {:?}",
                status_line
            )))
        }
    };
    let status = code
        .parse::<u16>()
        .ok()
        .and_then(Status::from_code)
        .ok_or_else(|| SnapError::Protocol(format!("Unknown response status: {}", code)))?;

    let mut content_length = None;
    for _ in 0..MAX_HEADERS {
        let line = match read_line(reader)? {
            Some(line) if !line.is_empty() => line,
            _ => break,
        };
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                let len = value.trim().parse::<usize>().map_err(|_| {
                    SnapError::Protocol(format!("Bad Content-Length: {:?}", value.trim()))
                })?;
                content_length = Some(len);
            }
        }
    }

    let body = match content_length {
        Some(len) if len > MAX_BODY_SIZE => {
            return Err(SnapError::Protocol(format!(
                "Response body too large: {} bytes (max {})",
                len, MAX_BODY_SIZE
            )))
        }
        Some(len) => {
            let mut body = vec![0u8; len];
            reader.read_exact(&mut body)?;
            body
        }
        None => {
            let mut body = Vec::new();
            reader
                .by_ref()
                .take(MAX_BODY_SIZE as u64)
                .read_to_end(&mut body)?;
            body
        }
    };

    Ok(Response { status, body })
}

// =============================================================================
// Line and Query Helpers
// =============================================================================

/// Read one CRLF- or LF-terminated line; `None` at end of stream
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_SIZE as u64 + 1)
        .read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }
    if buf.len() > MAX_LINE_SIZE {
        return Err(SnapError::Protocol(format!(
            "Line exceeds {} bytes",
            MAX_LINE_SIZE
        )));
    }

    while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
        buf.pop();
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| SnapError::Protocol("Line is not valid UTF-8".to_string()))
}

fn skip_headers<R: BufRead>(reader: &mut R) -> Result<()> {
    for _ in 0..MAX_HEADERS {
        match read_line(reader)? {
            Some(line) if !line.is_empty() => continue,
            _ => return Ok(()),
        }
    }
    Err(SnapError::Protocol(format!(
        "More than {} header lines",
        MAX_HEADERS
    )))
}
