//! Ledger actor identity.
//!
//! The ledger treats identities as opaque strings supplied by a trusted
//! upstream: either a verified email address or an anonymous token of the
//! form `anon:<opaque-id>`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix carried by anonymous identity tokens.
pub const ANONYMOUS_PREFIX: &str = "anon:";

/// Maximum accepted identity length in characters.
pub const IDENTITY_MAX: usize = 320;

/// Validation errors returned by [`Identity::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityValidationError {
    Empty,
    TooLong { max: usize },
}

impl fmt::Display for IdentityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identity must not be empty"),
            Self::TooLong { max } => write!(f, "identity must be at most {max} characters"),
        }
    }
}

impl std::error::Error for IdentityValidationError {}

/// Classification of an [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKind {
    /// A verified account, typically an email address.
    Account,
    /// A synthetic anonymous token.
    Anonymous,
}

/// Actor identity owning ledger events.
///
/// # Examples
/// ```
/// use seed_ledger::domain::{Identity, IdentityKind};
///
/// let account = Identity::new(" user@example.com ").expect("valid identity");
/// assert_eq!(account.as_ref(), "user@example.com");
/// assert_eq!(account.kind(), IdentityKind::Account);
///
/// let anonymous = Identity::new("anon:abc").expect("valid identity");
/// assert!(anonymous.is_anonymous());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Validate and construct an identity, trimming surrounding whitespace.
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::Empty);
        }
        if trimmed.chars().count() > IDENTITY_MAX {
            return Err(IdentityValidationError::TooLong { max: IDENTITY_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Whether the identity is an account or an anonymous token.
    pub fn kind(&self) -> IdentityKind {
        if self.0.starts_with(ANONYMOUS_PREFIX) {
            IdentityKind::Anonymous
        } else {
            IdentityKind::Account
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.kind() == IdentityKind::Anonymous
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.0
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
