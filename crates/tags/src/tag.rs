use orgdesk_account::organization::ORGANIZATIONS_TABLE;
use orgdesk_core::{
    Changes, Column, DomainError, DomainResult, Field, Record, RecordId, RecordMeta, RecordSchema,
    Row,
};
use serde::{Deserialize, Serialize};

static COLUMNS: [Column; 4] = [
    Column::text("name"),
    Column::text("type"),
    Column::text("description").nullable(),
    Column::uuid("org_uuid").references(ORGANIZATIONS_TABLE),
];

pub static TAG_SCHEMA: RecordSchema = RecordSchema::new("tags", &COLUMNS).scoped_by("org_uuid");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub org: RecordId,
}

impl Record for Tag {
    fn schema() -> &'static RecordSchema {
        &TAG_SCHEMA
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("name", self.name.as_str())
            .with("type", self.kind.as_str())
            .with("description", self.description.clone())
            .with("org_uuid", self.org)
    }

    fn from_row(meta: RecordMeta, row: &Row) -> DomainResult<Self> {
        Ok(Self {
            meta,
            name: row.text("name")?,
            kind: row.text("type")?,
            description: row.opt_text("description")?,
            org: row.record_id("org_uuid")?,
        })
    }
}

fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        Err(DomainError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Create payload. The owning organization comes from the route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewTag {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
}

impl NewTag {
    pub fn into_tag(self, org: RecordId) -> DomainResult<Tag> {
        require("name", &self.name)?;
        require("type", &self.kind)?;
        Ok(Tag {
            meta: RecordMeta::default(),
            name: self.name,
            kind: self.kind,
            description: self.description,
            org,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TagPatch {
    pub name: Field<String>,
    #[serde(rename = "type")]
    pub kind: Field<String>,
    pub description: Field<String>,
}

impl TagPatch {
    pub fn into_changes(self) -> DomainResult<Changes> {
        for (field, value) in [("name", &self.name), ("type", &self.kind)] {
            match value {
                Field::Null => return Err(DomainError::validation(format!("{field} cannot be null"))),
                Field::Set(v) => require(field, v)?,
                Field::Absent => {}
            }
        }
        Ok(Changes::new()
            .field("name", self.name)
            .field("type", self.kind)
            .field("description", self.description))
    }
}
