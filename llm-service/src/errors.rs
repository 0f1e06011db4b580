//! Unified error type for the `llm-service` crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by the chat and embedding clients.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Endpoint is empty or does not start with http/https.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// API key could not be turned into a request header.
    #[error("invalid api key: {0}")]
    InvalidApiKey(String),

    /// Transport/HTTP client error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from upstream.
    #[error("HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body.
        snippet: String,
    },

    /// Response payload could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// Chat response carried no choices.
    #[error("empty `choices` in chat response")]
    EmptyChoices,
}

/// Trims a response body down to a log-friendly, single-line snippet.
pub(crate) fn make_snippet(body: &str) -> String {
    const MAX: usize = 240;
    let one_line = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if one_line.len() <= MAX {
        one_line
    } else {
        let mut cut = MAX;
        while !one_line.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &one_line[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_collapses_whitespace() {
        assert_eq!(make_snippet("a\n  b\tc"), "a b c");
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let body = "x".repeat(1000);
        let s = make_snippet(&body);
        assert!(s.len() <= 244);
        assert!(s.ends_with('…'));
    }
}
