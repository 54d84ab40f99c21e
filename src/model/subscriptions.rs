use uuid::Uuid;

use chrono::{DateTime, Utc};

use serde::Serialize;

use crate::crypto::SubscriptionToken;
use crate::domain::{CityName, EmailAddress, Frequency};

/// Schema version stamped on newly created records
pub const CURRENT_MIGRATION_VERSION: i32 = 0;

/// New Subscription request
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub email: EmailAddress,
    pub city: CityName,
    pub frequency: Frequency,
}

/// Stored Subscription record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    /// ID of the subscription, also the key of its scheduled job.
    /// Internal only, the token is the external handle.
    #[serde(skip_serializing)]
    pub id: Uuid,
    /// Normalized email address
    pub email: String,
    pub city: String,
    pub frequency: Frequency,
    /// `false` until the subscriber follows the confirmation link
    pub confirmed: bool,
    /// External handle and duplicate-detection key, see [`SigningKey::subscription_token`](crate::crypto::SigningKey::subscription_token)
    pub token: String,
    pub migration_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Build an unconfirmed record for a new subscription request
    pub fn new(new_subscription: NewSubscription, token: SubscriptionToken) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: new_subscription.email.as_ref().to_string(),
            city: new_subscription.city.as_ref().to_string(),
            frequency: new_subscription.frequency,
            confirmed: false,
            token: token.as_ref().to_string(),
            migration_version: CURRENT_MIGRATION_VERSION,
            created_at: now,
            updated_at: now,
        }
    }
}
