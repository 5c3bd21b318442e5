//! Domain values shared by every component: assets, pending events and summaries.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Title of every summary message.
pub const SUMMARY_TITLE: &str = "New Emoji";
/// Accent colour of every summary message.
pub const SUMMARY_COLOR: u32 = 0x5ae9ff;

/// A shared custom asset ("emoji") owned by one tenant.
///
/// `id` is unique within the tenant; the value is immutable once observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// Opaque identifier, unique within the tenant.
    pub id: String,
    /// Display name (the `:name:` shortcode without colons).
    pub name: String,
    /// Whether the asset is animated.
    #[serde(default)]
    pub animated: bool,
}

impl Asset {
    /// Creates a static asset.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            animated: false,
        }
    }

    /// Marks the asset as animated.
    #[inline]
    pub fn animated(mut self) -> Self {
        self.animated = true;
        self
    }

    /// Inline message form: `<:name:id>`, or `<a:name:id>` when animated.
    ///
    /// # Example
    /// ```
    /// use emoji_notifier::Asset;
    ///
    /// assert_eq!(Asset::new("42", "party").render(), "<:party:42>");
    /// assert_eq!(Asset::new("42", "party").animated().render(), "<a:party:42>");
    /// ```
    pub fn render(&self) -> String {
        let prefix = if self.animated { "a" } else { "" };
        format!("<{prefix}:{}:{}>", self.name, self.id)
    }

    /// One summary line: ``<rendered> (`:name:`)``.
    pub fn summary_line(&self) -> String {
        format!("{} (`:{}:`)", self.render(), self.name)
    }
}

/// A pending notification: one newly observed asset of one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Owning tenant.
    pub tenant: String,
    /// Asset state at observation time.
    pub asset: Asset,
}

impl NotificationEvent {
    /// Creates a new event.
    pub fn new(tenant: impl Into<String>, asset: Asset) -> Self {
        Self {
            tenant: tenant.into(),
            asset,
        }
    }
}

/// Structured summary handed to the delivery transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Message title.
    pub title: String,
    /// Accent colour (RGB).
    pub color: u32,
    /// Number of new assets in this summary.
    pub count: usize,
    /// One line per asset, see [`Asset::summary_line`].
    pub lines: Vec<String>,
    /// Footer naming the tenant.
    pub footer: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
}

impl Summary {
    /// Builds the summary for `assets` of the tenant displayed as `tenant_name`.
    pub fn build(tenant_name: &str, assets: &[Asset], at: DateTime<Utc>) -> Self {
        Self {
            title: SUMMARY_TITLE.to_string(),
            color: SUMMARY_COLOR,
            count: assets.len(),
            lines: assets.iter().map(Asset::summary_line).collect(),
            footer: tenant_name.to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Message body: headline, blank line, one line per asset.
    pub fn description(&self) -> String {
        format!(
            ":new: **{} emoji(s)** are added to the server!\n\n{}",
            self.count,
            self.lines.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_summary_layout() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let assets = vec![Asset::new("1", "foo"), Asset::new("2", "bar").animated()];
        let summary = Summary::build("Cool Guild", &assets, at);

        assert_eq!(summary.title, "New Emoji");
        assert_eq!(summary.color, 0x5ae9ff);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.footer, "Cool Guild");
        assert_eq!(summary.timestamp, "2024-03-01T12:30:00Z");
        assert_eq!(
            summary.description(),
            ":new: **2 emoji(s)** are added to the server!\n\n<:foo:1> (`:foo:`)\n<a:bar:2> (`:bar:`)"
        );
    }
}
