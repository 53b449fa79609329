//! Tests for the request/response protocol
//!
//! These tests verify:
//! - Request lines parse into commands
//! - Malformed or unsupported requests are protocol errors
//! - Responses encode and read back with their status

use std::io::Cursor;

use snapkv::protocol::{
    encode_request, encode_response, read_request, read_response, Command, CommandType,
    Response, Status,
};
use snapkv::SnapError;

// =============================================================================
// Helper Functions
// =============================================================================

fn parse(raw: &str) -> snapkv::Result<Command> {
    read_request(&mut Cursor::new(raw.as_bytes().to_vec()))
}

// =============================================================================
// Request Parsing Tests
// =============================================================================

#[test]
fn test_parse_get() {
    let command = parse("GET /get?key=somekey HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
    assert_eq!(
        command,
        Command::Get {
            key: "somekey".to_string()
        }
    );
    assert_eq!(command.command_type(), CommandType::Get);
}

#[test]
fn test_parse_set() {
    let command = parse("GET /set?somekey=somevalue HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(
        command,
        Command::Set {
            key: "somekey".to_string(),
            value: "somevalue".to_string()
        }
    );
}

#[test]
fn test_parse_set_uses_first_pair_and_decodes() {
    let command = parse("GET /set?my+key=a%26b&other=x HTTP/1.0\n\n").unwrap();
    assert_eq!(
        command,
        Command::Set {
            key: "my key".to_string(),
            value: "a&b".to_string()
        }
    );
}

#[test]
fn test_parse_set_empty_value() {
    let command = parse("GET /set?k= HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(
        command,
        Command::Set {
            key: "k".to_string(),
            value: String::new()
        }
    );
}

#[test]
fn test_parse_keeps_malformed_escape_literal() {
    let command = parse("GET /set?k=50%2 HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(
        command,
        Command::Set {
            key: "k".to_string(),
            value: "50%2".to_string()
        }
    );
}

#[test]
fn test_parse_skips_empty_pairs() {
    let command = parse("GET /get?&&key=abc HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(
        command,
        Command::Get {
            key: "abc".to_string()
        }
    );
}

#[test]
fn test_encoded_target_uses_plus_for_space() {
    let command = Command::Set {
        key: "a b".to_string(),
        value: "x&y".to_string(),
    };
    assert_eq!(command.to_target(), "/set?a+b=x%26y");
}

#[test]
fn test_unknown_method_rejected() {
    assert!(matches!(
        parse("GET /delete?key=k HTTP/1.1\r\n\r\n"),
        Err(SnapError::Protocol(_))
    ));
}

#[test]
fn test_missing_query_rejected() {
    assert!(matches!(
        parse("GET /get HTTP/1.1\r\n\r\n"),
        Err(SnapError::Protocol(_))
    ));
}

#[test]
fn test_non_get_verb_rejected() {
    assert!(matches!(
        parse("POST /set?k=v HTTP/1.1\r\n\r\n"),
        Err(SnapError::Protocol(_))
    ));
}

#[test]
fn test_malformed_request_line_rejected() {
    assert!(matches!(parse("GET\r\n\r\n"), Err(SnapError::Protocol(_))));
}

#[test]
fn test_empty_stream_is_eof() {
    match parse("") {
        Err(SnapError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("expected EOF, got {:?}", other),
    }
}

#[test]
fn test_encoded_request_parses_back() {
    let command = Command::Set {
        key: "path/key".to_string(),
        value: "hello world=1".to_string(),
    };
    let bytes = encode_request(&command, "localhost:4000");

    assert_eq!(read_request(&mut Cursor::new(bytes)).unwrap(), command);
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_wire_format() {
    let bytes = encode_response(&Response::ok("v1"));
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Type: text/plain\r\n"));
    assert!(text.contains("Content-Length: 2\r\n"));
    assert!(text.ends_with("\r\n\r\nv1"));
}

#[test]
fn test_read_response_statuses() {
    for response in [
        Response::ok("value"),
        Response::empty(),
        Response::bad_request("Unknown method"),
        Response::error("disk full"),
        Response::unavailable(),
    ] {
        let bytes = encode_response(&response);
        let decoded = read_response(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(decoded, response);
    }
}

#[test]
fn test_read_response_without_content_length() {
    let raw = b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nbody".to_vec();
    let response = read_response(&mut Cursor::new(raw)).unwrap();

    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.body, b"body".to_vec());
}

#[test]
fn test_read_response_unknown_status() {
    let raw = b"HTTP/1.1 418 I'm a teapot\r\n\r\n".to_vec();
    assert!(matches!(
        read_response(&mut Cursor::new(raw)),
        Err(SnapError::Protocol(_))
    ));
}
