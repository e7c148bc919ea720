//! Generic resource mounting: any [`ResourceService`] gets the five CRUD
//! routes, transport binding and the response envelope for free.

pub mod bind;
pub mod envelope;
pub mod error;
pub mod mount;
pub mod operation;
pub mod service;

pub use bind::{BindError, Transport};
pub use envelope::{Envelope, ServiceResult};
pub use error::ServiceError;
pub use mount::{RouteInfo, ServiceRouter, mount, route_table};
pub use operation::Operation;
pub use service::{Request, ResourceService};
