//! Session reference tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every minted token.
pub const REFERENCE_TOKEN_PREFIX: &str = "CHAR_";

/// Correlates every image produced for one character session.
///
/// Minted once per top-level action (a fresh style batch) and threaded
/// through every prompt derived from that session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceToken(String);

impl ReferenceToken {
    /// Mint a new token from the current timestamp.
    ///
    /// Format: `CHAR_<base36 millis>_<6 hex chars>`. The random suffix keeps
    /// tokens minted within the same millisecond distinct.
    pub fn mint() -> Self {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!(
            "{REFERENCE_TOKEN_PREFIX}{}_{}",
            to_base36(millis),
            &suffix[..6]
        ))
    }

    /// Wrap an existing token string (e.g. restored by the shell).
    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
