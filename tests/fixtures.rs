//! Common test fixtures for sheepdog-tables tests.

use std::collections::HashMap;

use rstest::*;
use serde_json::{Value, json};
use sheepdog_tables::{
	Column, FieldAccess, FieldKind, FormError, MemoryResultSet, RowStore, Table,
};

/// The result-set type every fixture-driven test runs against.
pub type Roster = MemoryResultSet<Participant>;

/// Test row with a nested relation and a deliberately falsy score.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
	pub id: i64,
	pub name: String,
	pub email: String,
	pub score: i64,
	pub active: bool,
	pub created: String,
	pub team: Option<String>,
}

impl FieldAccess for Participant {
	fn field(&self, name: &str) -> Option<Value> {
		match name {
			"id" => Some(json!(self.id)),
			"name" => Some(json!(self.name)),
			"email" => Some(json!(self.email)),
			"score" => Some(json!(self.score)),
			"active" => Some(json!(self.active)),
			"created" => Some(json!(self.created)),
			"team" => self.team.as_ref().map(|team| json!({ "name": team })),
			_ => None,
		}
	}
}

fn participant(
	id: i64,
	name: &str,
	score: i64,
	created: &str,
	team: Option<&str>,
) -> Participant {
	Participant {
		id,
		name: name.to_string(),
		email: format!("{}@example.com", name.to_lowercase()),
		score,
		active: id % 2 == 1,
		created: created.to_string(),
		team: team.map(str::to_string),
	}
}

/// Five participants: out-of-order creation dates, one zero score, one
/// without a team.
#[fixture]
pub fn participants() -> Vec<Participant> {
	vec![
		participant(1, "Ada", 3, "2024-03-10", Some("Systems")),
		participant(2, "Grace", 5, "2024-01-15", Some("Compilers")),
		participant(3, "Edsger", 0, "2024-05-02", Some("Systems")),
		participant(4, "Barbara", 2, "2024-02-20", None),
		participant(5, "Donald", 4, "2024-04-01", Some("Algorithms")),
	]
}

/// The participants wrapped as an in-memory result set.
#[fixture]
pub fn roster(participants: Vec<Participant>) -> Roster {
	MemoryResultSet::new(participants)
}

/// A table over the roster: sortable name and created, a relation
/// column, and a column that hits the zero score.
#[fixture]
pub fn roster_table() -> Table<Roster> {
	Table::builder()
		.column("name", Column::new().sortable(true))
		.column("email", Column::new())
		.column("score", Column::new())
		.column("created", Column::new().header("Created").sortable(true))
		.column("team", Column::new().accessor("team__name"))
		.page_limit(2)
		.build()
		.unwrap()
}

/// A bulk-edit-ready table: editable name and score.
#[fixture]
pub fn editable_table() -> Table<Roster> {
	Table::builder()
		.column(
			"name",
			Column::new().editable(FieldKind::Char { max_length: Some(20) }),
		)
		.column("score", Column::new().editable(FieldKind::Integer))
		.build()
		.unwrap()
}

/// Row store recording saves, optionally rejecting one primary key.
#[derive(Debug, Default)]
pub struct RecordingStore {
	pub saved: Vec<(Value, HashMap<String, Value>)>,
	pub reject_pk: Option<Value>,
}

impl RowStore for RecordingStore {
	fn save(&mut self, pk: &Value, changes: &HashMap<String, Value>) -> Result<(), FormError> {
		if self.reject_pk.as_ref() == Some(pk) {
			return Err(FormError::Save {
				pk: pk.to_string(),
				message: "record is locked".to_string(),
			});
		}
		self.saved.push((pk.clone(), changes.clone()));
		Ok(())
	}
}
