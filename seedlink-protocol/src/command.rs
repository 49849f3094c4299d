use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SeedlinkError};

/// Line terminator for everything the client writes.
pub const CRLF: &str = "\r\n";

/// Outbound SeedLink verbs used during the handshake phase.
///
/// A command travels as its upper-case keyword, optionally followed by a
/// single space and a free-form argument (see [`format_command`]).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Hello,
    UserAgent,
    SlProto,
    Station,
    Select,
    Data,
    Fetch,
    Time,
    End,
    EndFetch,
    Info,
    Cat,
    Batch,
    Bye,
}

impl Command {
    /// Parse a verb from text (case-insensitive, surrounding whitespace ignored).
    pub fn parse(s: &str) -> Result<Self> {
        let keyword = s.trim();
        if keyword.is_empty() {
            return Err(SeedlinkError::InvalidCommand("empty command".into()));
        }

        match keyword.to_uppercase().as_str() {
            "HELLO" => Ok(Self::Hello),
            "USERAGENT" => Ok(Self::UserAgent),
            "SLPROTO" => Ok(Self::SlProto),
            "STATION" => Ok(Self::Station),
            "SELECT" => Ok(Self::Select),
            "DATA" => Ok(Self::Data),
            "FETCH" => Ok(Self::Fetch),
            "TIME" => Ok(Self::Time),
            "END" => Ok(Self::End),
            "ENDFETCH" => Ok(Self::EndFetch),
            "INFO" => Ok(Self::Info),
            "CAT" => Ok(Self::Cat),
            "BATCH" => Ok(Self::Batch),
            "BYE" => Ok(Self::Bye),
            _ => Err(SeedlinkError::InvalidCommand(format!(
                "unknown command: {keyword:?}"
            ))),
        }
    }

    /// Wire keyword (uppercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hello => "HELLO",
            Self::UserAgent => "USERAGENT",
            Self::SlProto => "SLPROTO",
            Self::Station => "STATION",
            Self::Select => "SELECT",
            Self::Data => "DATA",
            Self::Fetch => "FETCH",
            Self::Time => "TIME",
            Self::End => "END",
            Self::EndFetch => "ENDFETCH",
            Self::Info => "INFO",
            Self::Cat => "CAT",
            Self::Batch => "BATCH",
            Self::Bye => "BYE",
        }
    }

    /// Whether the reply to this command is the two-line HELLO banner.
    ///
    /// Every other command is answered by a single `OK` or `ERROR` line.
    pub fn has_banner_reply(&self) -> bool {
        matches!(self, Self::Hello)
    }

    /// Serialize to a CRLF-terminated wire line.
    pub fn to_line(&self, data: Option<&str>) -> String {
        format_command(*self, data)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = SeedlinkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Build `COMMAND[ data]\r\n`.
///
/// An empty `data` is treated as absent. The result always ends with exactly
/// one CRLF, even when `data` already carries line terminators.
pub fn format_command(command: Command, data: Option<&str>) -> String {
    match data.filter(|d| !d.is_empty()) {
        Some(d) => terminate(&format!("{} {d}", command.as_str())),
        None => terminate(command.as_str()),
    }
}

/// Append CRLF unless the text already ends with it.
///
/// Any stray trailing `\r` or `\n` is folded into the single terminator, so the
/// result never ends with two line breaks.
pub fn terminate(text: &str) -> String {
    let body = text.trim_end_matches(['\r', '\n']);
    let mut line = String::with_capacity(body.len() + CRLF.len());
    line.push_str(body);
    line.push_str(CRLF);
    line
}
