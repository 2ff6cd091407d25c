mod fixtures;

use async_trait::async_trait;
use fixtures::{Participant, RecordingStore, Roster, editable_table, participants};
use rstest::*;
use serde_json::json;
use sheepdog_tables::{
	EditTable, EditTablesMixin, MemoryResultSet, Request, Result, SortFilterMixin, Table,
	TablesMixin,
};

struct EditView {
	edit_table: EditTable<Roster>,
	rows: Vec<Participant>,
}

impl SortFilterMixin<Roster> for EditView {}

#[async_trait]
impl TablesMixin<Roster> for EditView {
	fn tables(&self) -> Vec<(&str, &Table<Roster>)> {
		vec![("main_table", self.edit_table.table())]
	}

	async fn table_queryset(&self, _key: &str) -> Result<Roster> {
		Ok(MemoryResultSet::new(self.rows.clone()))
	}
}

#[async_trait]
impl EditTablesMixin<Roster> for EditView {
	fn edit_tables(&self) -> Vec<(&str, &EditTable<Roster>)> {
		vec![("main_table", &self.edit_table)]
	}
}

#[fixture]
fn view(editable_table: Table<Roster>, participants: Vec<Participant>) -> EditView {
	EditView {
		edit_table: EditTable::new(editable_table),
		rows: participants,
	}
}

/// Form data editing all five rows, with two invalid scores.
fn bulk_post() -> Vec<(&'static str, &'static str)> {
	vec![
		("main_table-0-name", "Ada L."),
		("main_table-0-score", "10"),
		("main_table-1-name", "Grace H."),
		("main_table-1-score", "not-a-number"),
		("main_table-2-name", "Edsger D."),
		("main_table-2-score", "7"),
		("main_table-3-name", ""),
		("main_table-3-score", "2"),
		("main_table-4-name", "Donald K."),
		("main_table-4-score", "1"),
	]
}

#[rstest]
#[tokio::test]
async fn get_builds_unbound_formsets(view: EditView) {
	let request = Request::get("/roster").unwrap();
	let contexts = view.edit_context(&request).await.unwrap();
	assert_eq!(contexts.len(), 1);
	let formset = &contexts[0].formset;
	assert_eq!(formset.namespace(), "main_table");
	assert_eq!(formset.forms().len(), 5);

	let first = &formset.forms()[0];
	assert!(!first.is_bound());
	assert_eq!(first.pk(), &json!(1));
	assert_eq!(first.prefix(), "main_table-0");
	assert_eq!(first.input_name("score"), "main_table-0-score");
	assert_eq!(first.initial().get("name"), Some(&json!("Ada")));
	// Initial values are the stored ones, placeholder-free.
	assert_eq!(formset.forms()[2].initial().get("score"), Some(&json!(0)));
}

#[rstest]
#[tokio::test]
async fn partial_save_persists_the_valid_records(view: EditView) {
	let request = Request::post_form("/roster", &bulk_post()).unwrap();
	let mut store = RecordingStore::default();
	let outcome = view.process_post(&request, &mut store).await.unwrap();

	// Three of five validate; the valid ones are saved anyway.
	assert!(!outcome.succeeded());
	assert_eq!(outcome.report.saved, 3);
	assert_eq!(outcome.report.failed, 2);
	assert_eq!(store.saved.len(), 3);
	let saved_pks: Vec<&serde_json::Value> = store.saved.iter().map(|(pk, _)| pk).collect();
	assert_eq!(saved_pks, vec![&json!(1), &json!(3), &json!(5)]);
	assert_eq!(
		store.saved[0].1.get("score"),
		Some(&json!(10))
	);

	// The bound formset comes back carrying the two failures.
	let formset = &outcome.get("main_table").unwrap().formset;
	let grace = &formset.forms()[1];
	assert_eq!(grace.errors()["score"], vec!["enter a whole number"]);
	let barbara = &formset.forms()[3];
	assert_eq!(barbara.errors()["name"], vec!["this field is required"]);
}

#[rstest]
#[tokio::test]
async fn store_rejections_count_as_failures(view: EditView) {
	let request = Request::post_form("/roster", &bulk_post()).unwrap();
	let mut store = RecordingStore {
		reject_pk: Some(json!(3)),
		..RecordingStore::default()
	};
	let outcome = view.process_post(&request, &mut store).await.unwrap();
	assert_eq!(outcome.report.saved, 2);
	assert_eq!(outcome.report.failed, 3);

	let formset = &outcome.get("main_table").unwrap().formset;
	let edsger = &formset.forms()[2];
	assert!(
		edsger.errors()["_all"][0].contains("record is locked"),
		"save error should be recorded on the form"
	);
}

#[rstest]
fn formset_only_covers_editable_columns(
	editable_table: Table<Roster>,
	participants: Vec<Participant>,
) {
	let edit_table = EditTable::new(editable_table);
	let formset = edit_table.formset("main_table", &participants);
	let fields: Vec<&str> = formset.forms()[0]
		.fields()
		.iter()
		.map(|f| f.name.as_str())
		.collect();
	assert_eq!(fields, vec!["name", "score"]);
}

#[rstest]
fn pk_field_override_changes_the_key(participants: Vec<Participant>) {
	let table: Table<Roster> = Table::builder()
		.column(
			"name",
			sheepdog_tables::Column::new()
				.editable(sheepdog_tables::FieldKind::Char { max_length: None }),
		)
		.build()
		.unwrap();
	let edit_table = EditTable::new(table).pk_field("email");
	let formset = edit_table.formset("t", &participants[..1]);
	assert_eq!(formset.forms()[0].pk(), &json!("ada@example.com"));
}
