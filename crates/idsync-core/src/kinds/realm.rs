//! Realm spec: the top-level container every other kind lives in.

use serde::{Deserialize, Serialize};

use crate::object::ResourceSpec;

/// Desired state of one realm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmSpec {
    /// Remote realm name, unique within the service.
    pub realm_name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub enabled: Option<bool>,

    /// Alias of the auth flow bound as the realm browser flow.
    #[serde(default)]
    pub browser_flow: Option<String>,

    #[serde(default)]
    pub settings: RealmSettings,

    /// Outgoing email configuration. When absent the email handler is a
    /// successful no-op.
    #[serde(default)]
    pub email: Option<EmailSettings>,
}

/// Field-level realm settings merged into the fetched representation on
/// update, so remote-managed fields outside this struct are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmSettings {
    #[serde(default)]
    pub login_theme: Option<String>,
    #[serde(default)]
    pub frontend_url: Option<String>,
    #[serde(default)]
    pub password_policy: Option<String>,
    #[serde(default)]
    pub registration_allowed: Option<bool>,
    #[serde(default)]
    pub remember_me: Option<bool>,
}

/// SMTP settings for the realm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSettings {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub from: String,
    #[serde(default)]
    pub from_display_name: Option<String>,
    #[serde(default)]
    pub starttls: bool,
    #[serde(default)]
    pub username: Option<String>,
}

impl ResourceSpec for RealmSpec {
    const KIND: &'static str = "Realm";

    fn key_name(&self) -> &str {
        &self.realm_name
    }
}
