//! Operator prompt for a replacement cookie.

use crate::error::{TrackerError, TrackerResult};
use crate::model::SessionToken;
use crossterm::{cursor, execute};
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// No cookie has been saved yet.
    FirstTime,
    /// Upstream rejected the saved cookie.
    Expired,
}

impl RefreshReason {
    pub fn instructions(self) -> &'static str {
        match self {
            RefreshReason::FirstTime => "Go to the browser and fetch the swiggy cookies here: ",
            RefreshReason::Expired => "The given cookie has expired. Paste a new one here: ",
        }
    }
}

/// Source of replacement cookies. Blocks the caller until one is available.
pub trait TokenPrompt: Send {
    fn request_token(&mut self, reason: RefreshReason) -> TrackerResult<SessionToken>;
}

/// Reads a cookie line from the controlling terminal.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl TokenPrompt for ConsolePrompt {
    fn request_token(&mut self, reason: RefreshReason) -> TrackerResult<SessionToken> {
        // Nothing else may issue requests while the cookie is being replaced,
        // so the whole worker blocks here.
        let read = || {
            let mut stdout = io::stdout();
            execute!(stdout, cursor::Show).ok();
            let stdin = io::stdin();
            let res = read_token(&mut stdin.lock(), &mut stdout, reason);
            execute!(stdout, cursor::Hide).ok();
            res
        };
        match tokio::runtime::Handle::try_current() {
            Ok(h) if h.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(read)
            }
            _ => read(),
        }
    }
}

/// Print instructions for `reason` and read one line as the new cookie.
///
/// The line is taken verbatim apart from its line terminator.
pub fn read_token<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    reason: RefreshReason,
) -> TrackerResult<SessionToken> {
    let prompt_err = |e: io::Error| TrackerError::Prompt {
        message: e.to_string(),
    };
    // Start on a fresh line in case the progress bar is mid-redraw.
    writeln!(writer).map_err(prompt_err)?;
    writeln!(writer, "{}", reason.instructions()).map_err(prompt_err)?;
    writer.flush().map_err(prompt_err)?;

    let mut line = String::new();
    let n = reader.read_line(&mut line).map_err(prompt_err)?;
    if n == 0 {
        return Err(TrackerError::Prompt {
            message: "input closed before a cookie was entered".into(),
        });
    }
    let token = line.trim_end_matches(['\n', '\r']);
    if token.trim().is_empty() {
        return Err(TrackerError::Prompt {
            message: "empty cookie".into(),
        });
    }
    Ok(SessionToken::new(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn first_time_prompt_reads_line() {
        let mut input = Cursor::new("_session_tid=abc; deviceId=1\n");
        let mut out = Vec::new();
        let token = read_token(&mut input, &mut out, RefreshReason::FirstTime).unwrap();

        assert_eq!(token.as_str(), "_session_tid=abc; deviceId=1");
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("fetch the swiggy cookies"));
    }

    #[test]
    fn expired_prompt_uses_expiry_wording() {
        let mut input = Cursor::new("x=1\r\n");
        let mut out = Vec::new();
        let token = read_token(&mut input, &mut out, RefreshReason::Expired).unwrap();

        assert_eq!(token.as_str(), "x=1");
        assert!(String::from_utf8(out).unwrap().contains("has expired"));
    }

    #[test]
    fn inline_formatting_is_kept() {
        let mut input = Cursor::new("  a=1;  b=\"two words\"  \n");
        let token = read_token(&mut input, &mut Vec::new(), RefreshReason::Expired).unwrap();
        assert_eq!(token.as_str(), "  a=1;  b=\"two words\"  ");
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut input = Cursor::new("");
        let err = read_token(&mut input, &mut Vec::new(), RefreshReason::FirstTime).unwrap_err();
        assert_eq!(err.error_code(), "PROMPT_FAILURE");
    }

    #[test]
    fn blank_line_is_rejected() {
        let mut input = Cursor::new("   \n");
        assert!(read_token(&mut input, &mut Vec::new(), RefreshReason::FirstTime).is_err());
    }
}
