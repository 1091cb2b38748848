//! HTTP plumbing shared by the server binary and feature modules.

pub mod auth;
pub mod error;
pub mod health;
pub mod openapi;
pub mod pipeline;
pub mod problem;
pub mod registry;
pub mod router;
pub mod routes;
pub mod state;
