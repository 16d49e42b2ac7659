use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// Authentication applied to every request of a client.
///
/// A bearer token wins over basic credentials when both are set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub(crate) bearer_token: Option<String>,
    pub(crate) basic: Option<(String, String)>,
}

impl Credentials {
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn basic_username(&self) -> Option<&str> {
        self.basic.as_ref().map(|(user, _)| user.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.bearer_token.is_none() && self.basic.is_none()
    }

    /// Value for the `Authorization` header, if any credentials are set.
    pub(crate) fn authorization(&self) -> Option<String> {
        if let Some(token) = &self.bearer_token {
            return Some(format!("Bearer {}", token));
        }
        self.basic.as_ref().map(|(user, pass)| {
            format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("basic_username", &self.basic_username())
            .finish()
    }
}
