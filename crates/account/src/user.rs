//! User record, user types and password handling.
//!
//! Users always belong to an organization (`org_uuid`) and are only ever read
//! or written within that scope.

use core::str::FromStr;

use orgdesk_core::{
    Changes, Column, DomainError, DomainResult, Field, Record, RecordId, RecordMeta, RecordSchema,
    Row,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::organization::ORGANIZATIONS_TABLE;
use crate::password::{PasswordError, hash_password, verify_password};

// ─────────────────────────────────────────────────────────────────────────────
// User Type
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Manager,
    Teacher,
    Student,
}

impl UserType {
    pub const ALL: [UserType; 3] = [UserType::Manager, UserType::Teacher, UserType::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Manager => "MANAGER",
            UserType::Teacher => "TEACHER",
            UserType::Student => "STUDENT",
        }
    }
}

impl core::fmt::Display for UserType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown user type: {s}")))
    }
}

/// Every user type, in display order.
pub fn user_types() -> Vec<&'static str> {
    UserType::ALL.iter().map(UserType::as_str).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// User Record
// ─────────────────────────────────────────────────────────────────────────────

static COLUMNS: [Column; 10] = [
    Column::text("email").unique(),
    Column::text("password").nullable(),
    Column::text("first_name").nullable(),
    Column::text("last_name").nullable(),
    Column::text("birth_date").nullable(),
    Column::text("birth_place").nullable(),
    Column::text("address").nullable(),
    Column::text("phone").nullable(),
    Column::text("type").nullable(),
    Column::uuid("org_uuid").references(ORGANIZATIONS_TABLE),
];

pub static USER_SCHEMA: RecordSchema = RecordSchema::new("users", &COLUMNS).scoped_by("org_uuid");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub email: String,
    /// Argon2id hash. Never leaves the process.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<UserType>,
    pub org: RecordId,
}

impl User {
    /// Replace the stored hash with one for `password`.
    pub fn set_password(&mut self, password: &str) -> Result<(), PasswordError> {
        let hash = hash_password(password).inspect_err(|e| {
            warn!(op = "user.set_password", error = %e);
        })?;
        self.password = Some(hash);
        Ok(())
    }

    pub fn authenticate(&self, password: &str) -> Result<(), PasswordError> {
        let hash = self.password.as_deref().ok_or(PasswordError::NotSet)?;
        if verify_password(password, hash)? {
            Ok(())
        } else {
            warn!(op = "user.authenticate", user = ?self.meta.uuid, "password mismatch");
            Err(PasswordError::Mismatch)
        }
    }
}

impl Record for User {
    fn schema() -> &'static RecordSchema {
        &USER_SCHEMA
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("email", self.email.as_str())
            .with("password", self.password.clone())
            .with("first_name", self.first_name.clone())
            .with("last_name", self.last_name.clone())
            .with("birth_date", self.birth_date.clone())
            .with("birth_place", self.birth_place.clone())
            .with("address", self.address.clone())
            .with("phone", self.phone.clone())
            .with("type", self.kind.map(|t| t.as_str()))
            .with("org_uuid", self.org)
    }

    fn from_row(meta: RecordMeta, row: &Row) -> DomainResult<Self> {
        let kind = match row.opt_text("type")? {
            Some(raw) => Some(raw.parse::<UserType>().map_err(|_| {
                DomainError::malformed_row(format!("users.type holds unknown value {raw:?}"))
            })?),
            None => None,
        };
        Ok(Self {
            meta,
            email: row.text("email")?,
            password: row.opt_text("password")?,
            first_name: row.opt_text("first_name")?,
            last_name: row.opt_text("last_name")?,
            birth_date: row.opt_text("birth_date")?,
            birth_place: row.opt_text("birth_place")?,
            address: row.opt_text("address")?,
            phone: row.opt_text("phone")?,
            kind,
            org: row.record_id("org_uuid")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Create payload. The owning organization comes from the route, not the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub email: String,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<UserType>,
}

impl NewUser {
    /// Build the record for `org`, hashing the plaintext password if one was sent.
    ///
    /// Hashing is CPU-bound; async callers should run this on a blocking thread.
    pub fn into_user(self, org: RecordId) -> Result<User, AccountError> {
        if self.email.trim().is_empty() {
            return Err(DomainError::validation("email is required").into());
        }
        let mut user = User {
            meta: RecordMeta::default(),
            email: self.email,
            password: None,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            birth_place: self.birth_place,
            address: self.address,
            phone: self.phone,
            kind: self.kind,
            org,
        };
        if let Some(plain) = self.password.as_deref() {
            user.set_password(plain)?;
        }
        Ok(user)
    }
}

/// Partial update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub email: Field<String>,
    pub password: Field<String>,
    pub first_name: Field<String>,
    pub last_name: Field<String>,
    pub birth_date: Field<String>,
    pub birth_place: Field<String>,
    pub address: Field<String>,
    pub phone: Field<String>,
    #[serde(rename = "type")]
    pub kind: Field<UserType>,
}

impl UserPatch {
    /// Column changes for this patch. A new password is hashed here.
    pub fn into_changes(self) -> Result<Changes, AccountError> {
        let email = match self.email {
            Field::Null => return Err(DomainError::validation("email cannot be null").into()),
            Field::Set(e) if e.trim().is_empty() => {
                return Err(DomainError::validation("email cannot be blank").into());
            }
            other => other,
        };
        let password = match self.password {
            Field::Set(plain) => Field::Set(hash_password(&plain)?),
            other => other,
        };
        Ok(Changes::new()
            .field("email", email)
            .field("password", password)
            .field("first_name", self.first_name)
            .field("last_name", self.last_name)
            .field("birth_date", self.birth_date)
            .field("birth_place", self.birth_place)
            .field("address", self.address)
            .field("phone", self.phone)
            .field("type", self.kind.map(|t| t.as_str())))
    }
}
