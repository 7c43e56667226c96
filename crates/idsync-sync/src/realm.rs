//! Realm synchronization: base put, field-level settings, and SMTP.
//!
//! Each step fetches the current representation and merges only the fields
//! the spec declares, so remote-managed settings survive the update.

use idsync_client::realms::RealmRepresentation;
use idsync_client::RemoteClient;
use idsync_core::kinds::realm::RealmSpec;
use tracing::debug;

use crate::error::{RemoteResultExt, SyncError, SyncResult};

/// Create the realm if absent, otherwise update its base fields.
pub async fn put_realm(client: &RemoteClient, spec: &RealmSpec) -> SyncResult<()> {
    let name = &spec.realm_name;

    match client.get_realm(name).await {
        Ok(mut current) => {
            if spec.display_name.is_some() {
                current.display_name = spec.display_name.clone();
            }
            if spec.enabled.is_some() {
                current.enabled = spec.enabled;
            }
            client
                .update_realm(&current)
                .await
                .context(|| format!("updating realm {name}"))
        }
        Err(e) if e.is_not_found() => {
            debug!(realm = %name, "creating realm");
            let rep = RealmRepresentation {
                realm: name.clone(),
                display_name: spec.display_name.clone(),
                enabled: spec.enabled.or(Some(true)),
                ..RealmRepresentation::default()
            };
            client
                .create_realm(&rep)
                .await
                .context(|| format!("creating realm {name}"))
        }
        Err(e) => Err(SyncError::remote(
            format!("fetching realm {name}"),
            e,
        )),
    }
}

/// Merge declared field-level settings and the browser-flow binding into
/// the live representation.
pub async fn apply_settings(client: &RemoteClient, spec: &RealmSpec) -> SyncResult<()> {
    let name = &spec.realm_name;
    let mut current = client
        .get_realm(name)
        .await
        .context(|| format!("fetching realm {name}"))?;

    let settings = &spec.settings;
    if settings.login_theme.is_some() {
        current.login_theme = settings.login_theme.clone();
    }
    if settings.frontend_url.is_some() {
        current.frontend_url = settings.frontend_url.clone();
    }
    if settings.password_policy.is_some() {
        current.password_policy = settings.password_policy.clone();
    }
    if settings.registration_allowed.is_some() {
        current.registration_allowed = settings.registration_allowed;
    }
    if settings.remember_me.is_some() {
        current.remember_me = settings.remember_me;
    }
    if spec.browser_flow.is_some() {
        current.browser_flow = spec.browser_flow.clone();
    }

    client
        .update_realm(&current)
        .await
        .context(|| format!("applying settings to realm {name}"))
}

/// Write the declared SMTP settings. A spec without email settings is a
/// successful no-op.
pub async fn configure_email(client: &RemoteClient, spec: &RealmSpec) -> SyncResult<()> {
    let Some(email) = &spec.email else {
        return Ok(());
    };
    let name = &spec.realm_name;

    let mut current = client
        .get_realm(name)
        .await
        .context(|| format!("fetching realm {name}"))?;

    let mut smtp = std::collections::BTreeMap::new();
    smtp.insert("host".to_string(), email.host.clone());
    smtp.insert("from".to_string(), email.from.clone());
    if let Some(port) = email.port {
        smtp.insert("port".to_string(), port.to_string());
    }
    if let Some(display) = &email.from_display_name {
        smtp.insert("fromDisplayName".to_string(), display.clone());
    }
    smtp.insert("starttls".to_string(), email.starttls.to_string());
    if let Some(user) = &email.username {
        smtp.insert("auth".to_string(), "true".to_string());
        smtp.insert("user".to_string(), user.clone());
    }
    current.smtp_server = Some(smtp);

    client
        .update_realm(&current)
        .await
        .context(|| format!("configuring email for realm {name}"))
}

/// Delete the remote realm. Absence is success.
pub async fn remove_realm(client: &RemoteClient, spec: &RealmSpec) -> SyncResult<()> {
    let name = &spec.realm_name;
    match client.delete_realm(name).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(SyncError::remote(
            format!("deleting realm {name}"),
            e,
        )),
    }
}
