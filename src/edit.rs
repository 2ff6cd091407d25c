//! Bulk editing over table pages.
//!
//! [`EditTablesMixin`] layers form-sets on top of the table pipeline: a
//! GET builds one unbound form per row of each table's READY page; a
//! POST binds the submitted data, saves every individually-valid record
//! through the [`RowStore`] seam, and hands back the bound form-sets so
//! invalid rows re-render with their errors. Partial failure is the
//! normal outcome, not an exception.

use async_trait::async_trait;

use crate::error::Result;
use crate::forms::{EditFormSet, RowStore, SaveReport};
use crate::http::Request;
use crate::mixins::{TableContext, TablesMixin};
use crate::resultset::ResultSet;
use crate::table::EditTable;

/// One editable table's context: the rendered page plus its form-set.
pub struct EditTableContext<Q: ResultSet> {
	/// The ordinary table context for this namespace.
	pub context: TableContext<Q>,
	/// The form-set built from the page's rows. Unbound on GET, bound
	/// (and carrying errors) after a POST.
	pub formset: EditFormSet,
}

/// What a bulk-edit POST produced.
pub struct EditOutcome<Q: ResultSet> {
	/// Per-table contexts with their bound form-sets, in registration
	/// order.
	pub tables: Vec<EditTableContext<Q>>,
	/// Save counts across every table.
	pub report: SaveReport,
}

impl<Q: ResultSet> EditOutcome<Q> {
	/// Whether every submitted record was persisted.
	pub fn succeeded(&self) -> bool {
		self.report.all_saved()
	}

	/// Looks one table's outcome up by namespace.
	pub fn get(&self, namespace: &str) -> Option<&EditTableContext<Q>> {
		self.tables
			.iter()
			.find(|t| t.context.namespace == namespace)
	}
}

/// The bulk-edit pipeline on top of [`TablesMixin`].
#[async_trait]
pub trait EditTablesMixin<Q: ResultSet + 'static>: TablesMixin<Q> {
	/// The editable tables, each under its namespace key.
	fn edit_tables(&self) -> Vec<(&str, &EditTable<Q>)>;

	/// Builds the GET context: the usual pipeline per table, plus an
	/// unbound form-set over the current page's rows.
	async fn edit_context(&self, request: &Request) -> Result<Vec<EditTableContext<Q>>> {
		let mut contexts = Vec::new();
		for (key, edit_table) in self.edit_tables() {
			let context = self.table_context(request, key, edit_table.table()).await?;
			let formset = edit_table.formset(key, &context.page.object_list);
			contexts.push(EditTableContext { context, formset });
		}
		Ok(contexts)
	}

	/// Handles a bulk-edit POST: bind each table's form-set to the
	/// submitted data, persist the valid records, and report back with
	/// the bound form-sets for re-display.
	async fn process_post(
		&self,
		request: &Request,
		store: &mut (dyn RowStore + Send),
	) -> Result<EditOutcome<Q>> {
		let data = request.form_data();
		let mut tables = Vec::new();
		let mut report = SaveReport::default();
		for (key, edit_table) in self.edit_tables() {
			let context = self.table_context(request, key, edit_table.table()).await?;
			let mut formset = edit_table.formset(key, &context.page.object_list);
			formset.bind(&data);
			report.absorb(formset.save(&mut *store));
			tables.push(EditTableContext { context, formset });
		}
		Ok(EditOutcome { tables, report })
	}
}
