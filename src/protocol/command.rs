//! Command definitions
//!
//! Represents requests from clients.

use crate::error::{Result, SnapError};

/// Command types, named by their request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Set,
}

impl CommandType {
    /// Path segment that selects this command (`/get`, `/set`)
    pub fn method_name(&self) -> &'static str {
        match self {
            CommandType::Get => "get",
            CommandType::Set => "set",
        }
    }

    /// Look up a command by its path segment
    pub fn from_method_name(name: &str) -> Option<Self> {
        match name {
            "get" => Some(CommandType::Get),
            "set" => Some(CommandType::Set),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key (`/get?key=<key>`)
    Get { key: String },

    /// Set a key-value pair (`/set?<key>=<value>`)
    Set { key: String, value: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
        }
    }

    /// Parse a request target such as `/set?somekey=somevalue`
    ///
    /// The path picks the command and the first query pair carries the
    /// arguments. For `get` the pair's value is the key and its name is not
    /// checked.
    pub fn from_target(target: &str) -> Result<Self> {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let method = path.strip_prefix('/').unwrap_or(path);

        let command_type = CommandType::from_method_name(method).ok_or_else(|| {
            SnapError::Protocol(format!("Unknown method: {:?}", method))
        })?;

        let (name, value) = form_urlencoded::parse(query.as_bytes())
            .next()
            .ok_or_else(|| {
                SnapError::Protocol(format!("{}: missing query arguments", method))
            })?;
        let (name, value) = (name.into_owned(), value.into_owned());

        match command_type {
            CommandType::Get => Ok(Command::Get { key: value }),
            CommandType::Set => {
                if name.is_empty() {
                    return Err(SnapError::Protocol("set: empty key".to_string()));
                }
                Ok(Command::Set { key: name, value })
            }
        }
    }

    /// Request target for this command
    pub fn to_target(&self) -> String {
        match self {
            Command::Get { key } => format!("/get?key={}", encode_component(key)),
            Command::Set { key, value } => format!(
                "/set?{}={}",
                encode_component(key),
                encode_component(value)
            ),
        }
    }
}

/// Form-urlencode one query component (space becomes `+`)
fn encode_component(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes()).collect()
}
