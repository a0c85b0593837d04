//! Pagination metadata attached to collections.
//!
//! A collection carries either a [`Paginator`] (page numbers and totals) or a
//! [`Cursor`] (opaque positions), never both. Serializers read them to build
//! the pagination block merged into the collection output.
//!
//! ```rust
//! use smokescreen_transform::pagination::{Page, Paginator};
//!
//! let page = Page::new(2, 15, 40).with_count(15).with_base_url("/posts");
//! assert_eq!(page.last_page(), 3);
//! assert_eq!(page.url(3), "/posts?page=3");
//! ```

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Page-number pagination state.
pub trait Paginator: Send + Sync {
    /// Current page, 1-indexed.
    fn current_page(&self) -> u64;
    /// Last page number.
    fn last_page(&self) -> u64;
    /// Total records across all pages.
    fn total(&self) -> u64;
    /// Records on the current page.
    fn count(&self) -> u64;
    /// Records per page.
    fn per_page(&self) -> u64;
    /// URL for the given page.
    fn url(&self, page: u64) -> String;
}

/// Cursor pagination state.
pub trait Cursor: Send + Sync {
    /// Current cursor position.
    fn current(&self) -> Value;
    /// Previous cursor position.
    fn prev(&self) -> Value;
    /// Next cursor position.
    fn next(&self) -> Value;
    /// Records in the current window.
    fn count(&self) -> u64;
}

/// The pagination attached to a collection: a paginator or a cursor.
#[derive(Clone)]
pub enum PaginationKind {
    /// Page-number pagination.
    Paginator(Arc<dyn Paginator>),
    /// Cursor pagination.
    Cursor(Arc<dyn Cursor>),
}

impl fmt::Debug for PaginationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paginator(p) => f
                .debug_struct("Paginator")
                .field("current_page", &p.current_page())
                .field("last_page", &p.last_page())
                .field("total", &p.total())
                .finish(),
            Self::Cursor(c) => f
                .debug_struct("Cursor")
                .field("current", &c.current())
                .field("count", &c.count())
                .finish(),
        }
    }
}

/// A simple length-aware paginator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    current_page: u64,
    per_page: u64,
    total: u64,
    count: Option<u64>,
    base_url: String,
}

impl Page {
    /// Create a page from the current page number, page size and total records.
    pub fn new(current_page: u64, per_page: u64, total: u64) -> Self {
        Self {
            current_page: current_page.max(1),
            per_page,
            total,
            count: None,
            base_url: String::new(),
        }
    }

    /// Set the number of records on this page.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Set the base URL page links are built from.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Paginator for Page {
    fn current_page(&self) -> u64 {
        self.current_page
    }

    fn last_page(&self) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        self.total.div_ceil(self.per_page).max(1)
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn count(&self) -> u64 {
        self.count.unwrap_or_else(|| {
            let start = (self.current_page - 1).saturating_mul(self.per_page);
            self.total.saturating_sub(start).min(self.per_page)
        })
    }

    fn per_page(&self) -> u64 {
        self.per_page
    }

    fn url(&self, page: u64) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}page={page}", self.base_url)
    }
}

/// A simple cursor position.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPosition {
    /// Current position.
    pub current: Value,
    /// Previous position.
    pub prev: Value,
    /// Next position.
    pub next: Value,
    /// Records in this window.
    pub count: u64,
}

impl CursorPosition {
    /// Create a cursor at `current` with no neighbours.
    pub fn new(current: impl Into<Value>, count: u64) -> Self {
        Self {
            current: current.into(),
            prev: Value::Null,
            next: Value::Null,
            count,
        }
    }

    /// Set the previous position.
    pub fn with_prev(mut self, prev: impl Into<Value>) -> Self {
        self.prev = prev.into();
        self
    }

    /// Set the next position.
    pub fn with_next(mut self, next: impl Into<Value>) -> Self {
        self.next = next.into();
        self
    }
}

impl Cursor for CursorPosition {
    fn current(&self) -> Value {
        self.current.clone()
    }

    fn prev(&self) -> Value {
        self.prev.clone()
    }

    fn next(&self) -> Value {
        self.next.clone()
    }

    fn count(&self) -> u64 {
        self.count
    }
}
