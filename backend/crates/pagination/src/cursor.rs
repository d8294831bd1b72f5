//! Opaque cursor encoding.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Upper bound on accepted token length to keep decoding cheap.
const MAX_TOKEN_LEN: usize = 512;

/// Errors raised while encoding or decoding cursors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The cursor key could not be serialised.
    #[error("cursor key could not be serialised: {message}")]
    Encode {
        /// Serialiser diagnostic.
        message: String,
    },
    /// The token is empty, too long, or not valid base64.
    #[error("cursor token is malformed")]
    Malformed,
    /// The token decoded but did not contain the expected key shape.
    #[error("cursor token does not describe a valid position: {message}")]
    InvalidKey {
        /// Deserialiser diagnostic.
        message: String,
    },
}

/// Opaque pagination cursor over a key type `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap a key in a cursor.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the wrapped key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Consume the cursor and return the key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode the cursor as a URL-safe token.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Encode`] when the key cannot be serialised.
    pub fn encode(&self) -> Result<String, CursorError> {
        let bytes = serde_json::to_vec(&self.key).map_err(|err| CursorError::Encode {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode a token previously produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Malformed`] for empty, oversized, or non-base64
    /// input and [`CursorError::InvalidKey`] when the payload does not match
    /// `K`.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let trimmed = token.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_TOKEN_LEN {
            return Err(CursorError::Malformed);
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(trimmed)
            .map_err(|_| CursorError::Malformed)?;
        let key = serde_json::from_slice(&bytes).map_err(|err| CursorError::InvalidKey {
            message: err.to_string(),
        })?;
        Ok(Self { key })
    }
}
