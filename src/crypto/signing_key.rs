use hmac::{Hmac, Mac};

use sha2::Sha256;

use secrecy::Secret;

use super::SubscriptionToken;

/// Process-wide HMAC key used to derive subscription tokens
#[derive(Clone)]
pub struct SigningKey(Hmac<Sha256>);

impl SigningKey {
    pub fn new(key: &Secret<String>) -> anyhow::Result<Self> {
        use secrecy::ExposeSecret;

        let hmac = Hmac::new_from_slice(key.expose_secret().as_bytes())?;

        Ok(Self(hmac))
    }

    /// Derive the token addressing the subscription of `email` to `city`.
    /// Both parts are lower-cased so the same pair always maps to the same token.
    pub fn subscription_token(&self, email: &str, city: &str) -> SubscriptionToken {
        let message = format!("{}:{}", email.to_lowercase(), city.to_lowercase());
        let digest = self
            .0
            .clone()
            .chain_update(message.as_bytes())
            .finalize()
            .into_bytes();

        SubscriptionToken::from_digest(&digest)
    }
}

impl AsRef<Hmac<Sha256>> for SigningKey {
    fn as_ref(&self) -> &Hmac<Sha256> {
        &self.0
    }
}
