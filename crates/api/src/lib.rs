//! HTTP API: generic resource mounting, the concrete resources and the
//! application router.

pub mod app;
pub mod generic;
