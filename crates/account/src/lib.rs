//! `orgdesk-account`: organizations and their users.

pub mod organization;
pub mod password;
pub mod user;

pub use organization::{NewOrganization, ORGANIZATION_SCHEMA, Organization, OrganizationPatch};
pub use password::{PasswordError, hash_password, verify_password};
pub use user::{AccountError, NewUser, USER_SCHEMA, User, UserPatch, UserType, user_types};

use orgdesk_core::RecordSchema;

/// Schemas owned by this crate, parents first.
pub fn schemas() -> [&'static RecordSchema; 2] {
    [&ORGANIZATION_SCHEMA, &USER_SCHEMA]
}
