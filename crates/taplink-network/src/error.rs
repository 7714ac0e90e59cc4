use thiserror::Error;

/// Errors raised below the HTTP status line: the request never produced a
/// response code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No response within the request timeout
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// DNS failure, refused connection, unreachable host
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Any other failure while encoding or sending the request
    #[error("Request failed: {0}")]
    Request(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        assert_eq!(
            TransportError::Timeout(5000).to_string(),
            "Request timeout after 5000ms"
        );
        assert_eq!(
            TransportError::Connect("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(
            TransportError::Request("body".to_string()).to_string(),
            "Request failed: body"
        );
    }
}
