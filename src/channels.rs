//! Channel list index.
//!
//! Thin lookup table over the TV's channel database: load once from the
//! `/channeldb/tv/channelLists/all` body, then resolve channels by name or
//! by ccid (channel collection identifier).

use serde::Deserialize;

use crate::error::{Result, TvError};

/// One channel record: the identifying fields plus the raw object, which is
/// what `/activities/tv` expects back when switching channels.
#[derive(Debug, Clone)]
pub struct ChannelRecord {
    pub ccid: String,
    pub name: String,
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChannelListBody {
    #[serde(rename = "Channel")]
    channel: Vec<ChannelEntry>,
}

#[derive(Debug, Deserialize)]
struct ChannelEntry {
    #[serde(deserialize_with = "ccid_string")]
    ccid: String,
    name: String,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

fn ccid_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "ccid must be a string or number, got {other}"
        ))),
    }
}

/// In-memory channel index, rebuilt on every reload.
#[derive(Debug, Default)]
pub struct ChannelIndex {
    channels: Vec<ChannelRecord>,
}

impl ChannelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index with the channels parsed from a channel-list body.
    pub fn reload(&mut self, list_body: &str) -> Result<()> {
        let body: ChannelListBody =
            serde_json::from_str(list_body).map_err(|e| TvError::Protocol {
                reason: format!("malformed channel list: {e}"),
            })?;

        self.channels = body
            .channel
            .into_iter()
            .map(|entry| {
                let mut object = serde_json::Map::new();
                object.insert("ccid".to_string(), entry.ccid.clone().into());
                object.insert("name".to_string(), entry.name.clone().into());
                object.extend(entry.rest);
                ChannelRecord {
                    ccid: entry.ccid,
                    name: entry.name,
                    object: serde_json::Value::Object(object),
                }
            })
            .collect();
        Ok(())
    }

    /// All loaded channels, in TV order.
    pub fn channels(&self) -> &[ChannelRecord] {
        &self.channels
    }

    /// Look up the raw channel object by display name.
    pub fn object_by_name(&self, name: &str) -> Option<&serde_json::Value> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.object)
    }

    /// Look up the display name by ccid.
    pub fn name_by_ccid(&self, ccid: &str) -> Option<&str> {
        self.channels
            .iter()
            .find(|c| c.ccid == ccid)
            .map(|c| c.name.as_str())
    }

    /// Look up the raw channel object by ccid.
    pub fn object_by_ccid(&self, ccid: &str) -> Option<&serde_json::Value> {
        self.channels
            .iter()
            .find(|c| c.ccid == ccid)
            .map(|c| &c.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"{
        "version": 1,
        "Channel": [
            {"ccid": 35, "preset": "1", "name": "NPO 1"},
            {"ccid": "36", "preset": "2", "name": "NPO 2"}
        ]
    }"#;

    #[test]
    fn test_reload_parses_channels() {
        let mut index = ChannelIndex::new();
        index.reload(LIST).unwrap();
        assert_eq!(index.channels().len(), 2);
        assert_eq!(index.channels()[0].name, "NPO 1");
    }

    #[test]
    fn test_lookup_by_name() {
        let mut index = ChannelIndex::new();
        index.reload(LIST).unwrap();
        let object = index.object_by_name("NPO 2").unwrap();
        assert_eq!(object["ccid"], "36");
        assert_eq!(object["preset"], "2");
        assert!(index.object_by_name("missing").is_none());
    }

    #[test]
    fn test_lookup_by_ccid() {
        let mut index = ChannelIndex::new();
        index.reload(LIST).unwrap();
        assert_eq!(index.name_by_ccid("35"), Some("NPO 1"));
        assert!(index.object_by_ccid("35").is_some());
        assert!(index.name_by_ccid("99").is_none());
    }

    #[test]
    fn test_reload_replaces_previous_index() {
        let mut index = ChannelIndex::new();
        index.reload(LIST).unwrap();
        index
            .reload(r#"{"Channel": [{"ccid": 1, "name": "Only"}]}"#)
            .unwrap();
        assert_eq!(index.channels().len(), 1);
        assert!(index.name_by_ccid("35").is_none());
    }

    #[test]
    fn test_malformed_list_is_protocol_error() {
        let mut index = ChannelIndex::new();
        let err = index.reload("not json").unwrap_err();
        assert!(matches!(err, TvError::Protocol { .. }));
    }
}
