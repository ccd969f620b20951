//! Typed wrappers around the tracker's REST resources.
//!
//! Each resource family is a trait so views can be driven by any backend;
//! [`HttpClient`] is the production implementation.

pub mod auth;
pub mod client;
pub mod organization;
pub mod project;
pub mod task;

pub use auth::AuthApi;
pub use client::{BearerToken, ClientConfig, HttpClient};
pub use organization::OrganizationApi;
pub use project::ProjectApi;
pub use task::TaskApi;

/// Everything a view may call
pub trait TrackerApi: AuthApi + OrganizationApi + ProjectApi + TaskApi {}

impl<T> TrackerApi for T where T: AuthApi + OrganizationApi + ProjectApi + TaskApi {}
