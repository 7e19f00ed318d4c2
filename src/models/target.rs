//! Host target parsed from input

use std::fmt;

/// Port used when a record or target string does not name one
pub const DEFAULT_PORT: &str = "443";

/// A single host to probe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostTarget {
    host: String,
    port: String,
}

impl HostTarget {
    /// Build a target, trimming both fields and lower-casing the host.
    ///
    /// Returns `None` when the host is blank. A blank port falls back to
    /// [`DEFAULT_PORT`].
    pub fn new(host: &str, port: Option<&str>) -> Option<Self> {
        let host = host.trim();
        if host.is_empty() {
            return None;
        }

        let port = port
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PORT);

        Some(Self {
            host: host.to_lowercase(),
            port: port.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Address suitable for `TcpStream::connect`, bracketing IPv6 literals
    pub fn socket_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
