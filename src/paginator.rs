//! Namespaced pagination.
//!
//! Several tables can share one page; each gets its own `{ns}-page`
//! query parameter so they page independently. The paginator also
//! renders the page-list window templates iterate over: every page when
//! there are few, otherwise a sliding window around the current page
//! with `None` standing in for the elided stretch at either end.
//!
//! A requested page past the end clamps to the last page; garbage page
//! numbers clamp to the first. Neither is an error.

use crate::error::{Result, TableError};
use crate::resultset::ResultSet;

/// Total page count at or below which the window shows every page.
const WINDOW_THRESHOLD: usize = 10;

/// One slice of a result set, or the whole set when paging is off.
#[derive(Debug, Clone)]
pub struct Page<R> {
	/// The rows on this page.
	pub object_list: Vec<R>,
	/// 1-based page number.
	pub number: usize,
	/// Total number of pages.
	pub num_pages: usize,
	/// The query parameter selecting this table's page; empty for a
	/// pass-through page.
	pub page_param: String,
	paged: bool,
}

impl<R> Page<R> {
	/// Pass-through wrapper used when a table disables paging.
	pub fn unpaged(object_list: Vec<R>) -> Self {
		Self {
			object_list,
			number: 1,
			num_pages: 1,
			page_param: String::new(),
			paged: false,
		}
	}

	/// Whether this page is a real slice rather than a pass-through.
	pub fn is_paged(&self) -> bool {
		self.paged
	}

	/// Whether a later page exists.
	pub fn has_next(&self) -> bool {
		self.number < self.num_pages
	}

	/// Whether an earlier page exists.
	pub fn has_previous(&self) -> bool {
		self.number > 1
	}

	/// Whether navigation is worth rendering at all.
	pub fn has_other_pages(&self) -> bool {
		self.has_next() || self.has_previous()
	}

	/// Number of rows on this page.
	pub fn len(&self) -> usize {
		self.object_list.len()
	}

	/// Whether this page holds no rows.
	pub fn is_empty(&self) -> bool {
		self.object_list.is_empty()
	}
}

/// Paginator tracking a per-table namespace.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
/// use sheepdog_tables::{MemoryResultSet, NamespacedPaginator};
///
/// let rows: Vec<Value> = (1..=30).map(|n| json!({"n": n})).collect();
/// let paginator =
/// 	NamespacedPaginator::new(MemoryResultSet::new(rows), 10, "main_table", 2).unwrap();
///
/// let page = paginator.page();
/// assert_eq!(page.number, 2);
/// assert_eq!(page.num_pages, 3);
/// assert_eq!(page.page_param, "main_table-page");
/// ```
pub struct NamespacedPaginator<Q: ResultSet> {
	queryset: Q,
	per_page: usize,
	namespace: String,
	current_page: usize,
}

impl<Q: ResultSet> NamespacedPaginator<Q> {
	/// Wraps a result set. The requested page is clamped into the valid
	/// range up front; a zero page size is a configuration error.
	pub fn new(
		queryset: Q,
		per_page: usize,
		namespace: impl Into<String>,
		requested_page: usize,
	) -> Result<Self> {
		if per_page == 0 {
			return Err(TableError::ImproperlyConfigured(
				"page size must be positive".to_string(),
			));
		}
		let mut paginator = Self {
			queryset,
			per_page,
			namespace: namespace.into(),
			current_page: 1,
		};
		let clamped = requested_page.clamp(1, paginator.num_pages());
		if clamped != requested_page {
			tracing::debug!(
				namespace = %paginator.namespace,
				requested = requested_page,
				page = clamped,
				"requested page out of range, clamped"
			);
		}
		paginator.current_page = clamped;
		Ok(paginator)
	}

	/// Total number of rows.
	pub fn count(&self) -> usize {
		self.queryset.len()
	}

	/// Total number of pages; an empty set still has one page.
	pub fn num_pages(&self) -> usize {
		self.count().div_ceil(self.per_page).max(1)
	}

	/// The clamped current page number.
	pub fn current_page(&self) -> usize {
		self.current_page
	}

	/// The query parameter carrying this table's page number.
	pub fn page_param(&self) -> String {
		format!("{}-page", self.namespace)
	}

	/// Materializes the current page.
	pub fn page(&self) -> Page<Q::Row> {
		let start = (self.current_page - 1) * self.per_page;
		let end = start + self.per_page;
		Page {
			object_list: self.queryset.slice(start, end),
			number: self.current_page,
			num_pages: self.num_pages(),
			page_param: self.page_param(),
			paged: true,
		}
	}

	/// The page-number window for navigation rendering.
	///
	/// All pages when the total is at most ten; otherwise a nine-wide
	/// window near the current page, with `None` marking the elided end
	/// (no marker where the window touches an edge).
	pub fn pages(&self) -> Vec<Option<usize>> {
		let total = self.num_pages();
		if total <= WINDOW_THRESHOLD {
			return (1..=total).map(Some).collect();
		}
		let start = self.current_page.saturating_sub(4).max(1);
		let end = (start + 8).min(total);
		if start == 1 {
			// The left edge keeps one extra page before the gap.
			(1..=end + 1)
				.map(Some)
				.chain(std::iter::once(None))
				.collect()
		} else if end == total {
			std::iter::once(None)
				.chain((total - 8..=total).map(Some))
				.collect()
		} else {
			std::iter::once(None)
				.chain((start..=end).map(Some))
				.chain(std::iter::once(None))
				.collect()
		}
	}
}
