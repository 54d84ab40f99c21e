/// Basic application code
pub mod app;
/// REST clients for outside services
pub mod client;
/// Controllers for REST endpoints
pub mod controller;
/// Cryptography-related objects
pub mod crypto;
/// Domain objects
pub mod domain;
/// Error enums
pub mod error;
/// Stored models
pub mod model;
/// Subscription emails
pub mod notifier;
/// Repositories
pub mod repo;
/// Recurring weather update jobs
pub mod scheduler;
/// Subscription lifecycle
pub mod service;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;

#[cfg(test)]
mod test_support;
