//! Per-request orchestration.
//!
//! A view implements [`TablesMixin`] by naming its tables and saying how
//! each one fetches its base result set; the provided methods run the
//! pipeline per table — filter, sort, annotate, paginate — and hand back
//! an explicit [`TablesContext`]. Nothing about the current request is
//! stored on the view or the table definitions; the context struct *is*
//! the request-scoped state, built once and passed to the renderer.
//!
//! Each table is identified by a namespace key, and reads its own
//! `{key}-page` and `{key}-sort` parameters, so several tables on one
//! page operate independently.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::filters::{FilterSet, SortChoiceField};
use crate::http::Request;
use crate::paginator::{NamespacedPaginator, Page};
use crate::resultset::ResultSet;
use crate::sort::{SortChoice, apply_sort};
use crate::table::Table;

/// The page-number parameter for a table namespace.
pub fn page_param(namespace: &str) -> String {
	format!("{namespace}-page")
}

/// The sort-token parameter for a table namespace.
pub fn sort_param(namespace: &str) -> String {
	format!("{namespace}-sort")
}

/// Everything the renderer needs for one table.
pub struct TableContext<Q: ResultSet> {
	/// The table's namespace key.
	pub namespace: String,
	/// Header texts in display order.
	pub headers: Vec<String>,
	/// `<table>` tag attributes.
	pub attrs: BTreeMap<String, String>,
	/// Message shown when the page is empty.
	pub empty_text: String,
	/// The current page of rows.
	pub page: Page<Q::Row>,
	/// Page-number window for navigation; empty when paging is off.
	pub pages: Vec<Option<usize>>,
	/// The sort that was actually applied, if any.
	pub sort: Option<SortChoice>,
	/// `(token, label)` pairs for the sort widget.
	pub sort_choices: Vec<(String, String)>,
	/// Raw submitted filter values, for form re-display.
	pub filter_values: Vec<(String, String)>,
}

/// The per-request context for every registered table, in registration
/// order.
pub struct TablesContext<Q: ResultSet> {
	tables: Vec<TableContext<Q>>,
}

impl<Q: ResultSet> TablesContext<Q> {
	/// Looks a table's context up by namespace.
	pub fn get(&self, namespace: &str) -> Option<&TableContext<Q>> {
		self.tables.iter().find(|t| t.namespace == namespace)
	}

	/// Iterates the contexts in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &TableContext<Q>> {
		self.tables.iter()
	}

	/// Number of tables in the context.
	pub fn len(&self) -> usize {
		self.tables.len()
	}

	/// Whether the context holds no tables.
	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}
}

/// Sort handling for request-driven views.
///
/// Split out from [`TablesMixin`] so a view can override how the sort
/// parameter is read or validated without touching the rest of the
/// pipeline.
pub trait SortFilterMixin<Q: ResultSet>: Send + Sync {
	/// The validated sort choice for a table, or `None` when the
	/// parameter is absent or not one of the table's declared choices.
	fn current_sort(&self, request: &Request, key: &str, table: &Table<Q>) -> Option<SortChoice> {
		let raw = request.query_param(&sort_param(key))?;
		SortChoiceField::for_table(table).clean(raw)
	}

	/// Applies the request's sort parameter to a result set, returning
	/// the sort that was actually applied.
	fn apply_table_sort(
		&self,
		queryset: Q,
		request: &Request,
		key: &str,
		table: &Table<Q>,
	) -> (Q, Option<SortChoice>) {
		apply_sort(table, queryset, request.query_param(&sort_param(key)))
	}
}

/// The table pipeline: one context per declared table, per request.
#[async_trait]
pub trait TablesMixin<Q: ResultSet + 'static>: SortFilterMixin<Q> {
	/// The declared tables, each under its namespace key, in display
	/// order.
	fn tables(&self) -> Vec<(&str, &Table<Q>)>;

	/// Fetches the base result set for one table. The key is passed so
	/// views serving several tables from different sources can branch
	/// on it.
	async fn table_queryset(&self, key: &str) -> Result<Q>;

	/// The filter set bound to request parameters for one table, if
	/// any. Defaults to none; filtered list views override this.
	fn filterset(&self, _key: &str) -> Option<&FilterSet> {
		None
	}

	/// The requested page number for a table; garbage degrades to the
	/// first page.
	fn requested_page(&self, request: &Request, key: &str) -> usize {
		let Some(raw) = request.query_param(&page_param(key)) else {
			return 1;
		};
		raw.parse().unwrap_or_else(|_| {
			tracing::debug!(namespace = key, raw, "unparseable page number, using 1");
			1
		})
	}

	/// Runs the pipeline for one table: fetch, filter (table hook, then
	/// bound filter set), sort, annotate, paginate.
	async fn table_context(
		&self,
		request: &Request,
		key: &str,
		table: &Table<Q>,
	) -> Result<TableContext<Q>> {
		let queryset = self.table_queryset(key).await?;
		let queryset = table.filter(queryset);
		let (queryset, filter_values) = match self.filterset(key) {
			Some(filterset) => {
				let bound = filterset.bind(request);
				let queryset = bound.apply(queryset);
				(queryset, bound.into_values())
			}
			None => (queryset, Vec::new()),
		};
		let (queryset, sort) = self.apply_table_sort(queryset, request, key, table);
		let queryset = table.annotate(queryset);
		let (page, pages) = if table.is_paged() {
			let paginator = NamespacedPaginator::new(
				queryset,
				table.page_limit(),
				key,
				self.requested_page(request, key),
			)?;
			(paginator.page(), paginator.pages())
		} else {
			(Page::unpaged(queryset.into_rows()), Vec::new())
		};
		Ok(TableContext {
			namespace: key.to_string(),
			headers: table.headers(),
			attrs: table.attrs().clone(),
			empty_text: table.empty_text().to_string(),
			page,
			pages,
			sort,
			sort_choices: table.sort_choices(),
			filter_values,
		})
	}

	/// Builds the context for every declared table.
	async fn tables_context(&self, request: &Request) -> Result<TablesContext<Q>> {
		let mut contexts = Vec::new();
		for (key, table) in self.tables() {
			contexts.push(self.table_context(request, key, table).await?);
		}
		Ok(TablesContext { tables: contexts })
	}
}

/// A filtered list view: one primary table whose base result set is
/// narrowed by a declared filter set.
///
/// Implementors override [`TablesMixin::filterset`] to return
/// [`list_filterset`](FilteredListMixin::list_filterset) so the
/// pipeline applies it; the provided method here additionally hands the
/// bound set back for rendering the filter form.
#[async_trait]
pub trait FilteredListMixin<Q: ResultSet + 'static>: TablesMixin<Q> {
	/// The filter set narrowing the list.
	fn list_filterset(&self) -> &FilterSet;

	/// Builds the table contexts together with the bound filter set of
	/// the request.
	async fn filtered_context(
		&self,
		request: &Request,
	) -> Result<(TablesContext<Q>, crate::filters::BoundFilterSet)> {
		let bound = self.list_filterset().bind(request);
		let context = self.tables_context(request).await?;
		Ok((context, bound))
	}
}
