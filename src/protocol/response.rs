//! Response definitions
//!
//! Represents responses to clients.

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Status {
    Ok = 200,
    BadRequest = 400,
    InternalError = 500,
    ServiceUnavailable = 503,
}

impl Status {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::InternalError => "Internal Server Error",
            Status::ServiceUnavailable => "Service Unavailable",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(Status::Ok),
            400 => Some(Status::BadRequest),
            500 => Some(Status::InternalError),
            503 => Some(Status::ServiceUnavailable),
            _ => None,
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Body (value for GET, error message for errors, empty otherwise)
    pub body: Vec<u8>,
}

impl Response {
    /// Create an OK response carrying `body`
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            body: body.into(),
        }
    }

    /// Create an OK response with no body
    pub fn empty() -> Self {
        Self::ok(Vec::new())
    }

    /// Create a BAD_REQUEST response
    pub fn bad_request(message: &str) -> Self {
        Self {
            status: Status::BadRequest,
            body: message.as_bytes().to_vec(),
        }
    }

    /// Create an INTERNAL_ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::InternalError,
            body: message.as_bytes().to_vec(),
        }
    }

    /// Create a SERVICE_UNAVAILABLE response
    pub fn unavailable() -> Self {
        Self {
            status: Status::ServiceUnavailable,
            body: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}
