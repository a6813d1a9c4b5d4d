//! Argo CD API data models
//!
//! Records returned by the Argo CD REST API, organized by resource type.

mod application;
mod cluster;

pub use application::Application;
pub use cluster::Cluster;
