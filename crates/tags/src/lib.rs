//! `orgdesk-tags`: free-form labels attached to an organization.

pub mod tag;

pub use tag::{NewTag, TAG_SCHEMA, Tag, TagPatch};

use orgdesk_core::RecordSchema;

/// Schemas owned by this crate. Requires the organization table to exist.
pub fn schemas() -> [&'static RecordSchema; 1] {
    [&TAG_SCHEMA]
}
