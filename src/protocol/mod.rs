//! Protocol Module
//!
//! Defines the request/response format between clients and the server.
//!
//! ## Requests
//! A plain HTTP `GET` whose path names the method and whose first query pair
//! carries the arguments:
//! - `/get?key=<key>`: read a value
//! - `/set?<key>=<value>`: store a value
//!
//! ## Status Codes
//! - 200: OK (a `get` of an absent key is a 200 with an empty body)
//! - 400: Bad request (unknown method, missing arguments, malformed request)
//! - 500: Storage failure during `set`
//! - 503: Connection limit reached

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    encode_request, encode_response, read_request, read_response, write_request,
    write_response,
};
