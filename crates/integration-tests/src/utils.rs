#![allow(dead_code)]

use fixtures::{Entity, FieldReader, FixtureError, FixtureHarness, Hydrate, Persist};
use model::{core::value::Value, records::row::RowData};
use planner::QuerySpec;

/// Identifiers of the documents created by [`seed_company_scenario`].
pub struct Seeded {
    pub hlogeon: Value,
    pub davert: Value,
    pub codegyre: Value,
}

/// Two companies in two countries, three users. `hlogeon` works at
/// Codegyre (UA), is managed by `davert`, and belongs to both groups.
pub fn seed_company_scenario(h: &FixtureHarness) -> Result<Seeded, FixtureError> {
    h.have_in_repository("Country", [("code", "UA"), ("name", "Ukraine")])?;
    h.have_in_repository("Country", [("code", "PL"), ("name", "Poland")])?;
    let codegyre = h.have_in_repository("Company", [("name", "Codegyre"), ("Country", "UA")])?;
    let other = h.have_in_repository("Company", [("name", "Other"), ("Country", "PL")])?;
    let admins = h.have_in_repository("Group", [("title", "admins")])?;
    let devs = h.have_in_repository("Group", [("title", "devs")])?;

    let davert = h.have_in_repository(
        "User",
        [
            ("name", Value::from("davert")),
            ("email", Value::from("davert@example.com")),
            ("Company", other),
        ],
    )?;
    let hlogeon = h.have_in_repository(
        "User",
        [
            ("name", Value::from("hlogeon")),
            ("email", Value::from("hlogeon@example.com")),
            ("Company", codegyre.clone()),
            ("Manager", davert.clone()),
            ("Groups", Value::Array(vec![admins, devs])),
        ],
    )?;
    h.have_in_repository("User", [("name", "loner")])?;

    Ok(Seeded {
        hlogeon,
        davert,
        codegyre,
    })
}

pub fn count(h: &FixtureHarness, entity: &str, spec: serde_json::Value) -> usize {
    let spec = QuerySpec::try_from(spec).expect("valid spec");
    h.count_in_repository(entity, &spec).expect("query runs")
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<Value>,
}

impl Entity for User {
    const NAME: &'static str = "User";
}

impl Hydrate for User {
    fn from_row(row: &RowData) -> Result<Self, FixtureError> {
        let r = FieldReader::new(row);
        Ok(User {
            id: r.optional("id").and_then(Value::as_string),
            name: r.string("name")?,
            email: r.optional_string("email")?,
            company: r.optional("Company").cloned(),
        })
    }
}

impl Persist for User {
    fn to_row(&self) -> RowData {
        let mut row = RowData::from_pairs(Self::NAME, [("name", self.name.as_str())]);
        row.set("id", self.id.clone());
        row.set("email", self.email.clone());
        row.set("Company", self.company.clone().unwrap_or(Value::Null));
        row
    }
}
