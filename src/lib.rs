//! Declarative tables for request/response views.
//!
//! Describe a tabular view once — columns, ordering, paging, links,
//! editability — then bind that definition to a result set per request.
//! The pipeline runs filter → sort → annotate → paginate for each table
//! on the page, every table tracking its own `{namespace}-page` and
//! `{namespace}-sort` query parameters, and hands the renderer an
//! explicit context. CSV export and bulk editing ride the same
//! definitions.
//!
//! # Defining a table
//!
//! ```
//! use serde_json::Value;
//! use sheepdog_tables::{Column, ColumnUrl, MemoryResultSet, Table};
//!
//! let table: Table<MemoryResultSet<Value>> = Table::builder()
//! 	.column(
//! 		"name",
//! 		Column::new()
//! 			.sortable(true)
//! 			.url(ColumnUrl::new("participants:detail").arg("id")),
//! 	)
//! 	.column("joined", Column::new().accessor("profile__joined"))
//! 	.page_limit(50)
//! 	.build()
//! 	.unwrap();
//!
//! assert_eq!(table.headers(), vec!["Name", "Joined"]);
//! ```
//!
//! Rows reach columns through the [`FieldAccess`] capability, so typed
//! records and plain JSON mappings flow through the same pipeline.
//! Views wire everything up by implementing [`TablesMixin`] (and its
//! bulk-edit/CSV/filtered flavors) over any [`ResultSet`].

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod column;
pub mod csv_export;
pub mod edit;
pub mod error;
pub mod filters;
pub mod forms;
pub mod http;
pub mod mixins;
pub mod paginator;
pub mod resultset;
pub mod row;
pub mod sort;
pub mod table;
#[cfg(feature = "templates")]
pub mod templatetags;
pub mod urls;

pub use column::{Accessor, Column, ColumnUrl};
pub use csv_export::{CsvExportView, CsvTableMixin};
pub use edit::{EditOutcome, EditTableContext, EditTablesMixin};
pub use error::{Result, TableError};
pub use filters::{
	BoundFilterSet, FilterField, FilterSet, SortChoiceField, SortableFilterSet,
};
pub use forms::{
	CsvExportForm, EditForm, EditFormSet, FieldKind, FormError, FormFieldDef, RowStore, SaveReport,
};
pub use self::http::{Request, Response};
pub use mixins::{
	FilteredListMixin, SortFilterMixin, TableContext, TablesContext, TablesMixin, page_param,
	sort_param,
};
pub use paginator::{NamespacedPaginator, Page};
pub use resultset::{Filter, FilterOperator, MemoryResultSet, ResultSet};
pub use row::FieldAccess;
pub use sort::SortChoice;
pub use table::{DEFAULT_PAGE_LIMIT, EditTable, Table, TableBuilder};
pub use urls::UrlMap;
