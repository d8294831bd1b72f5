//! Opaque cursor and page envelope primitives shared by HTTP endpoints.
//!
//! Cursors wrap a serialisable key (for example a `(created_at, id)`
//! position) and render it as URL-safe base64 JSON. Clients treat the token as
//! opaque and hand it back unchanged to fetch the next page.
//!
//! ```
//! use pagination::{Cursor, PageLimit};
//!
//! let cursor = Cursor::new(42_i64);
//! let token = cursor.encode().expect("encodable key");
//! let decoded: Cursor<i64> = Cursor::decode(&token).expect("valid token");
//! assert_eq!(decoded.into_key(), 42);
//!
//! let limit = PageLimit::new(None, 100, 1000).expect("default applies");
//! assert_eq!(limit.get(), 100);
//! ```

mod cursor;
mod envelope;

pub use cursor::{Cursor, CursorError};
pub use envelope::{PageLimit, PageLimitError, Paginated, PaginationLinks};
