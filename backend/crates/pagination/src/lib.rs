//! Opaque cursor and page envelope primitives shared by list endpoints.
//!
//! Listing endpoints accept an optional `limit` and an optional opaque
//! `cursor`, validate them into a [`PageRequest`], and answer with a
//! [`Page`] envelope carrying the next cursor when more items remain.
//!
//! Cursors are URL-safe base64 encodings of a small JSON document. Clients
//! must treat them as opaque tokens; the encoding may change without notice.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised while validating pagination input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The requested page size is zero or above [`MAX_LIMIT`].
    #[error("limit must be between 1 and {max}, got {limit}")]
    InvalidLimit {
        /// Requested page size.
        limit: u32,
        /// Largest accepted page size.
        max: u32,
    },
    /// The cursor could not be decoded.
    #[error("cursor is malformed: {reason}")]
    InvalidCursor {
        /// Human-readable decoding failure.
        reason: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct CursorBody {
    #[serde(rename = "o")]
    offset: u64,
}

/// Opaque continuation token pointing at the next page.
///
/// # Examples
/// ```
/// use pagination::Cursor;
///
/// let cursor = Cursor::at_offset(40);
/// let decoded = Cursor::decode(cursor.as_str()).expect("round trip");
/// assert_eq!(decoded.offset(), 40);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    offset: u64,
    token: String,
}

impl Cursor {
    /// Build a cursor pointing at `offset`.
    #[must_use]
    pub fn at_offset(offset: u64) -> Self {
        let body = serde_json::to_vec(&CursorBody { offset }).unwrap_or_default();
        Self {
            offset,
            token: URL_SAFE_NO_PAD.encode(body),
        }
    }

    /// Decode a token previously produced by [`Cursor::at_offset`].
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::InvalidCursor`] when the token is not valid
    /// base64 or does not carry the expected document.
    pub fn decode(token: &str) -> Result<Self, PaginationError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|err| PaginationError::InvalidCursor {
                reason: err.to_string(),
            })?;
        let body: CursorBody =
            serde_json::from_slice(&bytes).map_err(|err| PaginationError::InvalidCursor {
                reason: err.to_string(),
            })?;
        Ok(Self::at_offset(body.offset))
    }

    /// Offset of the first item on the page this cursor points at.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Encoded token handed to clients.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.token.as_str()
    }
}

/// Validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Validate raw query values into a page window.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::InvalidLimit`] for a zero or oversized
    /// limit and [`PaginationError::InvalidCursor`] for an undecodable cursor.
    ///
    /// # Examples
    /// ```
    /// use pagination::{DEFAULT_LIMIT, PageRequest};
    ///
    /// let request = PageRequest::from_query(None, None).expect("defaults");
    /// assert_eq!(request.limit(), DEFAULT_LIMIT);
    /// assert_eq!(request.offset(), 0);
    /// ```
    pub fn from_query(limit: Option<u32>, cursor: Option<&str>) -> Result<Self, PaginationError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PaginationError::InvalidLimit {
                limit,
                max: MAX_LIMIT,
            });
        }
        let offset = match cursor {
            Some(token) if !token.trim().is_empty() => Cursor::decode(token)?.offset(),
            _ => 0,
        };
        Ok(Self { limit, offset })
    }

    /// Build a window directly, clamping the limit into the accepted range.
    #[must_use]
    pub fn new(limit: u32, offset: u64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

/// Page envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in the listing's order.
    pub items: Vec<T>,
    /// Total number of items matching the filter.
    pub total: u64,
    /// Token for the following page; absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Assemble a page, deriving the next cursor from the request window.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    ///
    /// let page = Page::new(vec![1, 2], 5, PageRequest::new(2, 0));
    /// assert!(page.next_cursor.is_some());
    ///
    /// let last = Page::new(vec![5], 5, PageRequest::new(2, 4));
    /// assert!(last.next_cursor.is_none());
    /// ```
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let consumed = request
            .offset()
            .saturating_add(u64::try_from(items.len()).unwrap_or(u64::MAX));
        let next_cursor = (!items.is_empty() && consumed < total)
            .then(|| Cursor::at_offset(consumed).as_str().to_owned());
        Self {
            items,
            total,
            next_cursor,
        }
    }

    /// Empty page with no continuation.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            next_cursor: None,
        }
    }

    /// Convert every item while keeping the envelope intact.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            next_cursor: self.next_cursor,
        }
    }
}
