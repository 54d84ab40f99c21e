mod subscriptions;

pub use subscriptions::SubscriptionService;
