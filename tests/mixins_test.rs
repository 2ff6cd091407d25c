mod fixtures;

use async_trait::async_trait;
use fixtures::{Participant, Roster, participants, roster_table};
use rstest::*;
use serde_json::json;
use sheepdog_tables::{
	Column, FieldAccess, FilterOperator, FilterSet, FilteredListMixin, MemoryResultSet, Request,
	Result, SortFilterMixin, Table, TablesMixin, page_param, sort_param,
};

struct RosterView {
	main_table: Table<Roster>,
	other_table: Table<Roster>,
	filterset: Option<FilterSet>,
	rows: Vec<Participant>,
}

impl SortFilterMixin<Roster> for RosterView {}

#[async_trait]
impl TablesMixin<Roster> for RosterView {
	fn tables(&self) -> Vec<(&str, &Table<Roster>)> {
		vec![
			("main_table", &self.main_table),
			("other_table", &self.other_table),
		]
	}

	async fn table_queryset(&self, _key: &str) -> Result<Roster> {
		Ok(MemoryResultSet::new(self.rows.clone()))
	}

	fn filterset(&self, key: &str) -> Option<&FilterSet> {
		match key {
			"main_table" => self.filterset.as_ref(),
			_ => None,
		}
	}
}

#[async_trait]
impl FilteredListMixin<Roster> for RosterView {
	fn list_filterset(&self) -> &FilterSet {
		self.filterset.as_ref().expect("view has no filterset")
	}
}

fn sorted_other_table() -> Table<Roster> {
	Table::builder()
		.column("name", Column::new().sortable(true))
		.column("created", Column::new().sortable(true))
		.page_limit(3)
		.build()
		.unwrap()
}

#[fixture]
fn view(roster_table: Table<Roster>, participants: Vec<Participant>) -> RosterView {
	RosterView {
		main_table: roster_table,
		other_table: sorted_other_table(),
		filterset: None,
		rows: participants,
	}
}

fn page_names(context: &sheepdog_tables::TableContext<Roster>) -> Vec<String> {
	context
		.page
		.object_list
		.iter()
		.map(|p| p.name.clone())
		.collect()
}

#[rstest]
#[tokio::test]
async fn namespaces_page_and_sort_independently(view: RosterView) {
	let request = Request::get("/roster?main_table-page=2&other_table-sort=-created").unwrap();
	let context = view.tables_context(&request).await.unwrap();
	assert_eq!(context.len(), 2);

	// main_table pages (limit 2) without sorting: page 2 keeps insertion order.
	let main = context.get("main_table").unwrap();
	assert_eq!(main.page.number, 2);
	assert_eq!(main.sort, None);
	assert_eq!(page_names(main), vec!["Edsger", "Barbara"]);

	// other_table sorts descending by created, unpaged parameters ignored.
	let other = context.get("other_table").unwrap();
	assert_eq!(other.page.number, 1);
	assert_eq!(other.sort.as_ref().map(|c| c.token()), Some("-created".to_string()));
	assert_eq!(page_names(other), vec!["Edsger", "Donald", "Ada"]);
}

#[rstest]
#[tokio::test]
async fn page_past_the_end_serves_the_last_page(view: RosterView) {
	let request = Request::get("/roster?main_table-page=99").unwrap();
	let context = view.tables_context(&request).await.unwrap();
	let main = context.get("main_table").unwrap();
	assert_eq!(main.page.number, 3);
	assert_eq!(page_names(main), vec!["Donald"]);
}

#[rstest]
#[tokio::test]
async fn garbage_page_number_degrades_to_the_first_page(view: RosterView) {
	let request = Request::get("/roster?main_table-page=banana").unwrap();
	let context = view.tables_context(&request).await.unwrap();
	assert_eq!(context.get("main_table").unwrap().page.number, 1);
}

#[rstest]
#[tokio::test]
async fn unpaged_table_passes_every_row_through(participants: Vec<Participant>) {
	let view = RosterView {
		main_table: Table::builder()
			.column("name", Column::new())
			.unpaged()
			.build()
			.unwrap(),
		other_table: sorted_other_table(),
		filterset: None,
		rows: participants,
	};
	let request = Request::get("/roster?main_table-page=7").unwrap();
	let context = view.tables_context(&request).await.unwrap();
	let main = context.get("main_table").unwrap();
	assert!(!main.page.is_paged());
	assert_eq!(main.page.len(), 5);
	assert!(main.pages.is_empty());
}

#[rstest]
#[tokio::test]
async fn context_carries_render_metadata(view: RosterView) {
	let request = Request::get("/roster").unwrap();
	let context = view.tables_context(&request).await.unwrap();
	let main = context.get("main_table").unwrap();
	assert_eq!(main.headers.len(), 5);
	assert_eq!(main.empty_text, "No data is available");
	assert_eq!(
		main.attrs.get("class").map(String::as_str),
		Some("table table-bordered table-striped")
	);
	assert_eq!(main.pages, vec![Some(1), Some(2), Some(3)]);
	assert!(main.sort_choices.iter().any(|(token, _)| token == "-name"));
}

#[rstest]
#[tokio::test]
async fn filtered_list_narrows_and_reports_bound_values(
	roster_table: Table<Roster>,
	participants: Vec<Participant>,
) {
	let view = RosterView {
		main_table: roster_table,
		other_table: sorted_other_table(),
		filterset: Some(
			FilterSet::builder()
				.field_for("team", "team__name", FilterOperator::Exact)
				.build(),
		),
		rows: participants,
	};
	let request = Request::get("/roster?team=Systems").unwrap();
	let (context, bound) = view.filtered_context(&request).await.unwrap();
	let main = context.get("main_table").unwrap();
	assert_eq!(page_names(main), vec!["Ada", "Edsger"]);
	assert_eq!(
		main.filter_values,
		vec![("team".to_string(), "Systems".to_string())]
	);
	assert_eq!(bound.values().len(), 1);
	// The unfiltered table is untouched.
	assert_eq!(context.get("other_table").unwrap().page.len(), 3);
}

#[rstest]
fn param_names_follow_the_namespace_contract() {
	assert_eq!(page_param("main_table"), "main_table-page");
	assert_eq!(sort_param("other_table"), "other_table-sort");
}

#[rstest]
fn current_sort_validates_tokens(view: RosterView) {
	let request = Request::get("/roster?main_table-sort=-name&other_table-sort=score").unwrap();
	let sort = view.current_sort(&request, "main_table", &view.main_table);
	assert_eq!(sort.map(|c| c.token()), Some("-name".to_string()));
	// score is not a declared sortable column on other_table.
	assert_eq!(
		view.current_sort(&request, "other_table", &view.other_table),
		None
	);
}

#[rstest]
fn rows_expose_fields_for_rendering(participants: Vec<Participant>) {
	// FieldAccess is the only contract templates rely on.
	assert_eq!(participants[0].field("name"), Some(json!("Ada")));
	assert_eq!(participants[0].field("nope"), None);
}
