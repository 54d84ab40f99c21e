/// Error mapping for REST responses
pub mod error;
/// Subscription lifecycle endpoints
pub mod subscriptions;
/// Current weather endpoint
pub mod weather;
