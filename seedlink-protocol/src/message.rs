use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SeedlinkError};

/// Error categories a server may report in an `ERROR` reply.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Command not recognized or not supported.
    Unsupported,
    /// Command not expected in the current session state.
    Unexpected,
    /// Client is not authorized to issue the command.
    Unauthorized,
    /// A server limit was exceeded (e.g. too many STATION or SELECT commands).
    Limit,
    /// Incorrect command arguments.
    Arguments,
    /// Authentication failed.
    Auth,
    /// Internal server failure.
    Internal,
}

impl ErrorType {
    /// Map a wire token to an error type. Matching is exact (upper-case).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNSUPPORTED" => Some(Self::Unsupported),
            "UNEXPECTED" => Some(Self::Unexpected),
            "UNAUTHORIZED" => Some(Self::Unauthorized),
            "LIMIT" => Some(Self::Limit),
            "ARGUMENTS" => Some(Self::Arguments),
            "AUTH" => Some(Self::Auth),
            "INTERNAL" => Some(Self::Internal),
            _ => None,
        }
    }

    /// Returns the token as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsupported => "UNSUPPORTED",
            Self::Unexpected => "UNEXPECTED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Limit => "LIMIT",
            Self::Arguments => "ARGUMENTS",
            Self::Auth => "AUTH",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorType {
    type Err = SeedlinkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| SeedlinkError::UnknownErrorType(s.to_owned()))
    }
}

/// A decoded server reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// Two-line banner sent in answer to HELLO.
    Hello {
        /// Server software line, e.g. `"SeedLink v3.3 (2024.020)"`.
        client_name: String,
        /// Institution running the server, e.g. `"Centro de Sismologia da USP"`.
        institution: String,
    },
    /// The previous command succeeded.
    Ok,
    /// The previous command failed.
    Error {
        error_type: ErrorType,
        /// Free text following the type token; may be empty.
        message: String,
    },
}

impl Message {
    /// Build a HELLO banner from its two raw lines.
    ///
    /// Surrounding whitespace, including any `\r\n`, is trimmed from each line.
    pub fn parse_hello(line1: &str, line2: &str) -> Self {
        Self::Hello {
            client_name: line1.trim().to_owned(),
            institution: line2.trim().to_owned(),
        }
    }

    /// Parse a single-line `OK` / `ERROR <TYPE> [text]` reply.
    ///
    /// Anything starting with `OK` is success. Otherwise the line must split on
    /// single spaces into `ERROR`, a known [`ErrorType`] token, and optional
    /// message words.
    pub fn parse_result(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.starts_with("OK") {
            return Ok(Self::Ok);
        }

        let tokens: Vec<&str> = line.split(' ').collect();
        if tokens.len() < 2 {
            return Err(SeedlinkError::InvalidResponse(format!(
                "unrecognized reply: {line:?}"
            )));
        }

        if tokens[0] != "ERROR" {
            return Err(SeedlinkError::UnexpectedReply {
                token: tokens[0].to_owned(),
                line: line.to_owned(),
            });
        }

        let error_type = tokens[1].parse::<ErrorType>()?;
        Ok(Self::Error {
            error_type,
            message: tokens[2..].join(" "),
        })
    }

    /// Serialize to wire text, including line terminators.
    pub fn to_line(&self) -> String {
        format!("{self}\r\n")
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hello {
                client_name,
                institution,
            } => write!(f, "{client_name}\r\n{institution}"),
            Self::Ok => f.write_str("OK"),
            Self::Error {
                error_type,
                message,
            } if message.is_empty() => write!(f, "ERROR {error_type}"),
            Self::Error {
                error_type,
                message,
            } => write!(f, "ERROR {error_type} {message}"),
        }
    }
}
