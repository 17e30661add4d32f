//! Datastore connection settings and connection-string assembly.

use std::fmt::Write as _;

use crate::constants::DEFAULT_MONGO_PORT;
use crate::error::BenchError;

const AUTH_SOURCE: &str = "authSource=admin";
const READ_PREFERENCE: &str = "readPreference=secondaryPreferred";

/// Where and as whom to connect.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSettings {
    /// Either one full `mongodb://` URI or one or more `host[:port]` entries.
    pub hosts: Vec<String>,
    pub database: String,
    pub collection: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionSettings {
    /// Connection string with credentials, `authSource=admin` and
    /// secondary-preferred reads.
    pub fn connection_string(&self) -> Result<String, BenchError> {
        self.build(self.password.as_deref().map(encode))
    }

    /// Same as [`connection_string`](Self::connection_string) with the password masked.
    pub fn redacted(&self) -> Result<String, BenchError> {
        self.build(self.password.as_ref().map(|_| "****".to_string()))
    }

    /// Check the fields a connection needs.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.hosts.is_empty() {
            return Err(BenchError::Config("no datastore URI or host given (-i)".into()));
        }
        if self.database.is_empty() {
            return Err(BenchError::Config("no database given (-d)".into()));
        }
        if self.collection.is_empty() {
            return Err(BenchError::Config("no collection given (-l)".into()));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(BenchError::Config("password given without username".into()));
        }
        Ok(())
    }

    /// `password` arrives already encoded (or masked).
    fn credentials(&self, password: Option<&str>) -> String {
        match (&self.username, password) {
            (Some(user), Some(pass)) => format!("{}:{pass}@", encode(user)),
            (Some(user), None) => format!("{}@", encode(user)),
            _ => String::new(),
        }
    }

    fn build(&self, password: Option<String>) -> Result<String, BenchError> {
        let Some(first) = self.hosts.first() else {
            return Err(BenchError::Config("no datastore URI or host given (-i)".into()));
        };
        let creds = self.credentials(password.as_deref());

        if let Some((scheme, rest)) = first.split_once("://") {
            if self.hosts.len() > 1 {
                return Err(BenchError::Config(
                    "a full URI cannot be combined with further hosts".into(),
                ));
            }
            let split = rest.find(&['/', '?'][..]).unwrap_or(rest.len());
            let (authority, tail) = rest.split_at(split);
            let authority = if authority.contains('@') {
                authority.to_string()
            } else {
                format!("{creds}{authority}")
            };
            return Ok(format!("{scheme}://{authority}{}", with_options(tail)));
        }

        let hosts: Vec<String> = self
            .hosts
            .iter()
            .map(|h| {
                if h.contains(':') {
                    h.clone()
                } else {
                    format!("{h}:{DEFAULT_MONGO_PORT}")
                }
            })
            .collect();
        Ok(format!(
            "mongodb://{creds}{}{}",
            hosts.join(","),
            with_options("")
        ))
    }
}

/// Append the default options to a URI tail (`/db?opts`), keeping explicit ones.
fn with_options(tail: &str) -> String {
    let mut out = if tail.is_empty() {
        "/".to_string()
    } else {
        tail.to_string()
    };
    for option in [AUTH_SOURCE, READ_PREFERENCE] {
        let key = option.split('=').next().unwrap_or(option);
        if out.contains(&format!("{key}=")) {
            continue;
        }
        out.push(if out.contains('?') { '&' } else { '?' });
        out.push_str(option);
    }
    out
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}
