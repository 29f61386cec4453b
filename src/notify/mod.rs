//! Release announcement over a chat webhook.
//!
//! The payload is a single embed: author, title, description, timestamp and
//! one download field per platform. Delivery is fire-and-forget. A failed or
//! skipped notification is logged and never fails the release.

use crate::config::{EnvConfig, NotifySettings, PlatformSettings};
use crate::error::ConfigError;
use crate::placeholder::PlaceholderRegistry;
use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Download location for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformLink {
    /// Field label
    pub label: String,
    /// Download URL
    pub url: String,
}

/// Webhook request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    /// Sender name override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Sender avatar override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Message embeds
    pub embeds: Vec<Embed>,
}

/// Rich message body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    /// Author line
    pub author: EmbedAuthor,
    /// Heading
    pub title: String,
    /// Body text
    pub description: String,
    /// RFC 3339, at the configured offset
    pub timestamp: String,
    /// Accent colour as `0xRRGGBB`
    pub color: u32,
    /// One field per platform
    pub fields: Vec<EmbedField>,
}

/// Embed author line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedAuthor {
    /// Author text
    pub name: String,
    /// Author icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// One name/value row of an embed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    /// Row label
    pub name: String,
    /// Row text, markdown allowed
    pub value: String,
    /// Render side by side with neighbouring fields
    pub inline: bool,
}

/// Final state of a dispatched notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Endpoint accepted the payload
    Delivered,
    /// Request failed or was rejected
    Failed,
    /// Nothing was sent
    Skipped,
    /// Still in flight when the wait ended
    Pending,
}

/// Handle to an in-flight notification
#[derive(Debug)]
pub struct DispatchHandle {
    task: Option<JoinHandle<bool>>,
}

impl DispatchHandle {
    fn skipped() -> Self {
        Self { task: None }
    }

    /// Whether a request was actually started
    pub fn is_dispatched(&self) -> bool {
        self.task.is_some()
    }

    /// Wait up to `timeout` for delivery to finish
    pub async fn settle(self, timeout: Duration) -> DispatchOutcome {
        let Some(task) = self.task else {
            return DispatchOutcome::Skipped;
        };

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(true)) => DispatchOutcome::Delivered,
            Ok(Ok(false)) => DispatchOutcome::Failed,
            Ok(Err(e)) => {
                log::warn!("Notification task ended abnormally: {}", e);
                DispatchOutcome::Failed
            }
            Err(_) => {
                log::warn!("Notification still pending after {:?}", timeout);
                DispatchOutcome::Pending
            }
        }
    }
}

/// Announces a release to the configured webhook
pub struct ReleaseNotifier<'a> {
    settings: NotifySettings,
    project_name: String,
    registry: &'a PlaceholderRegistry,
    env: EnvConfig,
    client: reqwest::Client,
}

impl<'a> ReleaseNotifier<'a> {
    /// Create a notifier rendering text through `registry`
    pub fn new(
        settings: NotifySettings,
        project_name: impl Into<String>,
        registry: &'a PlaceholderRegistry,
        env: EnvConfig,
    ) -> Self {
        Self {
            settings,
            project_name: project_name.into(),
            registry,
            env,
            client: reqwest::Client::new(),
        }
    }

    /// Use a specific HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the webhook body for `version`, stamped at `now`
    pub fn build_payload(
        &self,
        version: &Version,
        links: &[PlatformLink],
        now: DateTime<Utc>,
    ) -> Result<WebhookPayload, ConfigError> {
        let offset = self.settings.offset()?;

        let fields = links
            .iter()
            .map(|link| EmbedField {
                name: link.label.clone(),
                value: format!("[Download]({})", link.url),
                inline: true,
            })
            .collect();

        Ok(WebhookPayload {
            username: self.settings.username.clone(),
            avatar_url: self.settings.avatar_url.clone(),
            embeds: vec![Embed {
                author: EmbedAuthor {
                    name: format!("{} {}", self.project_name, version),
                    icon_url: self.settings.avatar_url.clone(),
                },
                title: self.registry.substitute(&self.settings.title),
                description: self.registry.substitute(&self.settings.description),
                timestamp: now.with_timezone(&offset).to_rfc3339(),
                color: self.settings.color,
                fields,
            }],
        })
    }

    /// Send the release announcement without waiting for delivery
    ///
    /// Must be called from within a tokio runtime. The endpoint is read from
    /// the environment at call time; when it is absent nothing is sent.
    pub fn notify(&self, version: &Version, links: &[PlatformLink]) -> DispatchHandle {
        let Some(endpoint) = self.env.get(&self.settings.webhook_env) else {
            log::warn!(
                "{} is not set, skipping release notification",
                self.settings.webhook_env
            );
            return DispatchHandle::skipped();
        };

        if url::Url::parse(&endpoint).is_err() {
            log::warn!(
                "{} does not hold a valid URL, skipping release notification",
                self.settings.webhook_env
            );
            return DispatchHandle::skipped();
        }

        let payload = match self.build_payload(version, links, Utc::now()) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Could not build release notification: {}", e);
                return DispatchHandle::skipped();
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("No async runtime for release notification: {}", e);
                return DispatchHandle::skipped();
            }
        };

        let client = self.client.clone();
        log::info!("Dispatching release notification for {}", version);
        DispatchHandle {
            task: Some(runtime.spawn(deliver(client, endpoint, payload))),
        }
    }
}

async fn deliver(client: reqwest::Client, endpoint: String, payload: WebhookPayload) -> bool {
    match client.post(&endpoint).json(&payload).send().await {
        Ok(response) if response.status().is_success() => {
            log::info!("Release notification delivered ({})", response.status());
            true
        }
        Ok(response) => {
            log::warn!("Release notification rejected with status {}", response.status());
            false
        }
        Err(e) => {
            log::warn!("Release notification failed: {}", e);
            false
        }
    }
}

/// Download links for every platform that declares one
///
/// URLs may contain placeholders and are rendered through `registry`.
pub fn platform_links(
    platforms: &[PlatformSettings],
    registry: &PlaceholderRegistry,
) -> Vec<PlatformLink> {
    platforms
        .iter()
        .filter_map(|platform| {
            let Some(url) = platform.download_url.as_deref() else {
                log::debug!("Platform '{}' has no download URL", platform.name);
                return None;
            };
            Some(PlatformLink {
                label: platform.label().to_string(),
                url: registry.substitute(url),
            })
        })
        .collect()
}
