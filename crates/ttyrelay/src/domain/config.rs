//! Relay configuration types.
//!
//! [`RelayConfig`] is the single source of truth for runtime settings.  It is
//! a plain struct: `main.rs` fills it from CLI flags and environment variables,
//! tests build it directly or start from [`RelayConfig::default`].

use std::time::Duration;

/// Default BBS host the relay connects to.
pub const DEFAULT_ADDR: &str = "bbs-server.mattiselin.repl.co";

/// Default WebSocket path on the BBS host.
pub const DEFAULT_PATH: &str = "/ws";

/// Pre-shared key header.
pub const PSK_HEADER: &str = "X-BBS-PSK";

/// Signed database URL header, the fallback credential when no PSK is set.
pub const DB_AUTH_HEADER: &str = "X-BBS-DBAuth";

/// Name of the user the session belongs to.
pub const USERNAME_HEADER: &str = "X-BBS-Username";

/// All runtime configuration for one relay session.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Full WebSocket URL, e.g. `wss://host/ws`.
    pub url: String,

    /// Credentials sent on the upgrade request.
    pub auth: AuthConfig,

    /// Upper bound on sending the final Close frame, and on waiting for the
    /// remote to acknowledge it before the inbound worker is aborted.
    pub close_timeout: Duration,

    /// Consecutive local read failures after which the input worker gives up.
    pub max_read_errors: u32,
}

impl Default for RelayConfig {
    /// | Field           | Default                                   |
    /// |-----------------|-------------------------------------------|
    /// | url             | `wss://bbs-server.mattiselin.repl.co/ws`  |
    /// | auth            | all empty                                 |
    /// | close_timeout   | 500 ms                                    |
    /// | max_read_errors | 16                                        |
    fn default() -> Self {
        Self {
            url: endpoint_url(DEFAULT_ADDR, DEFAULT_PATH, true),
            auth: AuthConfig::default(),
            close_timeout: Duration::from_millis(500),
            max_read_errors: 16,
        }
    }
}

/// Builds the WebSocket URL for `addr` and `path`.
///
/// A path without a leading slash gets one.
pub fn endpoint_url(addr: &str, path: &str, secure: bool) -> String {
    let scheme = if secure { "wss" } else { "ws" };
    if path.starts_with('/') {
        format!("{scheme}://{addr}{path}")
    } else {
        format!("{scheme}://{addr}/{path}")
    }
}

/// Credentials identifying the operator to the BBS server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// Pre-shared key.  May be empty on forks where secrets are unavailable.
    pub psk: String,
    /// Signed database URL; the server verifies it in place of the PSK.
    pub db_auth: String,
    /// Owner of the session.
    pub username: String,
}

impl AuthConfig {
    /// Returns the upgrade-request headers in the order they are sent.
    ///
    /// The PSK and username headers are always present, even when empty.  The
    /// DB-auth header is only added when there is no PSK.
    pub fn headers(&self) -> Vec<(&'static str, &str)> {
        let mut headers = vec![(PSK_HEADER, self.psk.as_str())];
        if self.psk.is_empty() {
            headers.push((DB_AUTH_HEADER, self.db_auth.as_str()));
        }
        headers.push((USERNAME_HEADER, self.username.as_str()));
        headers
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url_is_secure_bbs_endpoint() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.url, "wss://bbs-server.mattiselin.repl.co/ws");
    }

    #[test]
    fn test_default_close_timeout_is_500ms() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.close_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_default_max_read_errors_is_16() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.max_read_errors, 16);
    }

    #[test]
    fn test_endpoint_url_plaintext() {
        assert_eq!(
            endpoint_url("127.0.0.1:8080", "/ws", false),
            "ws://127.0.0.1:8080/ws"
        );
    }

    #[test]
    fn test_endpoint_url_adds_missing_slash() {
        assert_eq!(endpoint_url("example.org", "ws", true), "wss://example.org/ws");
    }

    #[test]
    fn test_headers_with_psk_skip_db_auth() {
        // Arrange
        let auth = AuthConfig {
            psk: "secret".to_string(),
            db_auth: "https://db.example/signed".to_string(),
            username: "alice".to_string(),
        };

        // Act
        let headers = auth.headers();

        // Assert
        assert_eq!(
            headers,
            vec![(PSK_HEADER, "secret"), (USERNAME_HEADER, "alice")]
        );
    }

    #[test]
    fn test_headers_without_psk_fall_back_to_db_auth() {
        // Arrange
        let auth = AuthConfig {
            psk: String::new(),
            db_auth: "https://db.example/signed".to_string(),
            username: "alice".to_string(),
        };

        // Act
        let headers = auth.headers();

        // Assert: the empty PSK header is still sent
        assert_eq!(
            headers,
            vec![
                (PSK_HEADER, ""),
                (DB_AUTH_HEADER, "https://db.example/signed"),
                (USERNAME_HEADER, "alice"),
            ]
        );
    }

    #[test]
    fn test_headers_always_carry_username_even_when_empty() {
        let auth = AuthConfig::default();
        let headers = auth.headers();
        assert_eq!(headers.last(), Some(&(USERNAME_HEADER, "")));
    }
}
