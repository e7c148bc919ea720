//! Organization record: the parent of users and tags.

use orgdesk_core::{
    Changes, Column, DomainError, DomainResult, Field, Record, RecordMeta, RecordSchema, Row,
};
use serde::{Deserialize, Serialize};

static COLUMNS: [Column; 3] = [
    Column::text("name"),
    Column::text("email"),
    Column::text("phone").nullable(),
];

pub const ORGANIZATIONS_TABLE: &str = "organizations";

pub static ORGANIZATION_SCHEMA: RecordSchema = RecordSchema::new(ORGANIZATIONS_TABLE, &COLUMNS);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl Record for Organization {
    fn schema() -> &'static RecordSchema {
        &ORGANIZATION_SCHEMA
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
            .with("email", self.email.as_str())
            .with("phone", self.phone.clone())
    }

    fn from_row(meta: RecordMeta, row: &Row) -> DomainResult<Self> {
        Ok(Self {
            meta,
            name: row.text("name")?,
            email: row.text("email")?,
            phone: row.opt_text("phone")?,
        })
    }
}

/// Create payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewOrganization {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        Err(DomainError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

impl NewOrganization {
    /// Build the record; `name` and `email` must not be blank.
    pub fn into_organization(self) -> DomainResult<Organization> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        Ok(Organization {
            meta: RecordMeta::default(),
            name: self.name,
            email: self.email,
            phone: self.phone,
        })
    }
}

/// Partial update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrganizationPatch {
    pub name: Field<String>,
    pub email: Field<String>,
    pub phone: Field<String>,
}

impl OrganizationPatch {
    pub fn into_changes(self) -> DomainResult<Changes> {
        for (field, value) in [("name", &self.name), ("email", &self.email)] {
            match value {
                Field::Null => return Err(DomainError::validation(format!("{field} cannot be null"))),
                Field::Set(v) => require(field, v)?,
                Field::Absent => {}
            }
        }
        Ok(Changes::new()
            .field("name", self.name)
            .field("email", self.email)
            .field("phone", self.phone))
    }
}
