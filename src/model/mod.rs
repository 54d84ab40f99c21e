mod subscriptions;

pub use subscriptions::{NewSubscription, Subscription, CURRENT_MIGRATION_VERSION};
