//! Slack incoming-webhook notifier for crossings and sync results.

use geofence_core::{CrossingEvent, CrossingType, EventSink, ReconciliationResult};
use log::{debug, error};
use reqwest::Client;
use serde::Serialize;

use crate::BuildError;
use crate::runtime::BlockingRuntime;
use crate::transport::{DEFAULT_USER_AGENT, HttpTransportConfig};

/// Where and how Slack messages are posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackNotifierConfig {
    /// Incoming-webhook URL.
    pub webhook_url: String,
    /// Channel override; the webhook's default channel when `None`.
    pub channel: Option<String>,
    /// Text placed before every message, e.g. an emoji.
    pub prefix: String,
}

impl SlackNotifierConfig {
    /// Post to `webhook_url` with no channel override or prefix.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel: None,
            prefix: String::new(),
        }
    }

    /// Post to `channel` instead of the webhook default.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Prefix every message with `prefix`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
}

/// Render one line per crossing direction: `<prefix><type>: 'A', 'B'`.
///
/// Directions appear in the order first seen; unnamed fences fall back to
/// their code.
///
/// # Examples
/// ```
/// use chrono::DateTime;
/// use geofence_core::{CrossingEvent, CrossingType, GeofenceRecord};
/// use geofence_http::format_crossing_message;
///
/// let at = DateTime::parse_from_rfc3339("2016-02-10T08:54:08+01:00").unwrap();
/// let fences = [
///     GeofenceRecord::new(Some("A".into()), "Home", 1.0, 2.0, 50.0),
///     GeofenceRecord::new(Some("B".into()), "Work", 1.0, 2.0, 50.0),
/// ];
/// let events = CrossingEvent::for_fences(&fences, CrossingType::Enter, "dev", "1.0.1", at);
///
/// assert_eq!(format_crossing_message(":pin: ", &events), ":pin: enter: 'Home', 'Work'");
/// ```
#[must_use]
pub fn format_crossing_message(prefix: &str, events: &[CrossingEvent]) -> String {
    let mut directions: Vec<CrossingType> = Vec::new();
    for event in events {
        if !directions.contains(&event.crossing_type) {
            directions.push(event.crossing_type);
        }
    }
    directions
        .into_iter()
        .map(|direction| {
            let names: Vec<String> = events
                .iter()
                .filter(|event| event.crossing_type == direction)
                .map(|event| {
                    let label = event
                        .fence_name
                        .as_deref()
                        .or(event.fence_code.as_deref())
                        .unwrap_or_default();
                    format!("'{label}'")
                })
                .collect();
            format!("{prefix}{direction}: {}", names.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a sync summary: one line per stored fence, then the deletions.
#[must_use]
pub fn format_sync_message(prefix: &str, result: &ReconciliationResult) -> String {
    let mut lines = vec![format!(
        "{prefix}synced {} geofence(s)",
        result.total_count
    )];
    lines.extend(result.updated_or_created.iter().map(|fence| {
        format!(
            "{} : lat={:.6}; lng={:.6}; radius={:.0} m",
            fence.name.as_deref().unwrap_or_default(),
            fence.latitude(),
            fence.longitude(),
            fence.radius
        )
    }));
    if !result.deleted_codes.is_empty() {
        lines.push(format!("deleted: {}", result.deleted_codes.join(", ")));
    }
    lines.join("\n")
}

/// [`EventSink`] posting messages to a Slack incoming webhook.
///
/// Delivery is best effort: failures are logged and never reach the
/// operation that triggered the notification.
#[derive(Debug)]
pub struct SlackNotifier {
    client: Client,
    config: SlackNotifierConfig,
    runtime: BlockingRuntime,
}

impl SlackNotifier {
    /// Build a notifier using the default HTTP timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook URL is not http(s) or if the HTTP
    /// client or Tokio runtime fails to build.
    pub fn new(config: SlackNotifierConfig) -> Result<Self, BuildError> {
        if !(config.webhook_url.starts_with("http://") || config.webhook_url.starts_with("https://"))
        {
            return Err(BuildError::InvalidBaseUrl {
                url: config.webhook_url,
            });
        }
        let timeout = HttpTransportConfig::default().timeout;
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(BuildError::HttpClient)?;
        let runtime = BlockingRuntime::new().map_err(BuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Notifier configuration.
    #[must_use]
    pub const fn config(&self) -> &SlackNotifierConfig {
        &self.config
    }

    fn post(&self, text: &str) {
        let message = WebhookMessage {
            text,
            channel: self.config.channel.as_deref(),
        };
        let outcome = self.runtime.block_on(async {
            self.client
                .post(&self.config.webhook_url)
                .json(&message)
                .send()
                .await?
                .error_for_status()
        });
        match outcome {
            Ok(_) => debug!("slack message delivered"),
            Err(err) => error!("slack request error: {err}"),
        }
    }
}

impl EventSink for SlackNotifier {
    fn crossing_detected(&self, events: &[CrossingEvent]) {
        if events.is_empty() {
            return;
        }
        self.post(&format_crossing_message(&self.config.prefix, events));
    }

    fn geofences_synced(&self, result: &ReconciliationResult) {
        self.post(&format_sync_message(&self.config.prefix, result));
    }
}
