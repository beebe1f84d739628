//! # Redirect Transport
//!
//! The router never writes to the client itself. Redirects go through a
//! [`TransportState`], which knows whether response headers are already out
//! and how to emit either a `Location` redirect or an in-body refresh.

/// Response-side capability consulted by `RouteTable::redirect`
pub trait TransportState {
    /// Whether any response output has already been sent
    fn headers_sent(&self) -> bool;

    /// Emit a location redirect; processing of the request stops afterwards
    fn emit_redirect(&mut self, url: &str);

    /// Emit a client-side refresh into the body
    fn emit_meta_refresh(&mut self, url: &str);
}

/// Result of a redirect attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// `Location` redirect emitted; the caller must stop handling the request
    Halted(String),
    /// Output had already started; a refresh fallback was written instead
    Refreshed(String),
}

impl RedirectOutcome {
    /// Target URL of the redirect
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Halted(url) | Self::Refreshed(url) => url,
        }
    }

    /// Whether further processing must stop
    #[must_use]
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted(_))
    }
}

/// HTML refresh tag used when headers can no longer be set
#[must_use]
pub fn meta_refresh_tag(url: &str) -> String {
    format!("<meta http-equiv='refresh' content='0, URL={url}'>")
}

/// In-memory transport that records what would have been sent
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    headers_sent: bool,
    /// Status code set by a redirect
    pub status: Option<u16>,
    /// `Location` header, if a redirect was emitted
    pub location: Option<String>,
    /// Body written so far
    pub body: String,
}

impl RecordingTransport {
    /// Fresh transport with nothing sent
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose headers are already flushed
    #[must_use]
    pub fn with_headers_sent(mut self) -> Self {
        self.headers_sent = true;
        self
    }

    /// Append body output, which flushes headers
    pub fn write(&mut self, chunk: &str) {
        self.headers_sent = true;
        self.body.push_str(chunk);
    }
}

impl TransportState for RecordingTransport {
    fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    fn emit_redirect(&mut self, url: &str) {
        self.status = Some(302);
        self.location = Some(url.to_string());
        self.headers_sent = true;
    }

    fn emit_meta_refresh(&mut self, url: &str) {
        self.write(&meta_refresh_tag(url));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_records_location() {
        let mut transport = RecordingTransport::new();
        assert!(!transport.headers_sent());
        transport.emit_redirect("/login");
        assert_eq!(transport.status, Some(302));
        assert_eq!(transport.location.as_deref(), Some("/login"));
        assert!(transport.headers_sent());
    }

    #[test]
    fn test_write_flushes_headers() {
        let mut transport = RecordingTransport::new();
        transport.write("partial");
        assert!(transport.headers_sent());
        transport.emit_meta_refresh("/next");
        assert_eq!(
            transport.body,
            "partial<meta http-equiv='refresh' content='0, URL=/next'>"
        );
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = RedirectOutcome::Refreshed("/x".to_string());
        assert_eq!(outcome.url(), "/x");
        assert!(!outcome.is_halted());
    }
}
