//! The `(channel-style, channel)` pipeline: labels each raw text record with
//! the channel it was posted to, producing training records for the
//! downstream models.

use common_kafka::admin::TopicSpec;
use serde::{Deserialize, Serialize};

/// Topic the raw channel text lands on upstream. Fixed for this variant
/// rather than supplied by the caller.
pub const INPUT_TOPIC: &str = "raw_channel_text";

pub const DEFAULT_PARTITIONS: i32 = 3;

pub fn provisioning_spec() -> TopicSpec {
    TopicSpec {
        num_partitions: DEFAULT_PARTITIONS,
        replication_factor: 1,
    }
}

/// Wire format of one raw record on [`INPUT_TOPIC`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawChannelMessage {
    pub channel: String,
    #[serde(default)]
    pub user: Option<String>,
    pub text: String,
    #[serde(default)]
    pub ts: Option<String>,
}

/// One labeled training record, as written to the output topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub text: String,
    pub label: String,
}

/// Turns a raw message into a training record labeled with its channel.
///
/// Per-record failure policy for this variant: records with nothing to train
/// on (empty or whitespace-only text) are skipped, not fatal, as are records
/// the reader could not decode. Broker-side read errors and any write error
/// abort the pipeline.
pub fn transform(raw: RawChannelMessage) -> Option<LabeledRecord> {
    let text = raw.text.trim();
    if text.is_empty() {
        return None;
    }

    Some(LabeledRecord {
        text: text.to_string(),
        label: raw.channel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(channel: &str, text: &str) -> RawChannelMessage {
        RawChannelMessage {
            channel: channel.to_string(),
            user: Some("U123".to_string()),
            text: text.to_string(),
            ts: Some("1501718400.000200".to_string()),
        }
    }

    #[test]
    fn labels_text_with_its_channel() {
        let labeled = transform(raw("incidents", "the deploy is on fire")).unwrap();
        assert_eq!(
            labeled,
            LabeledRecord {
                text: "the deploy is on fire".to_string(),
                label: "incidents".to_string(),
            }
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let labeled = transform(raw("general", "  hello  ")).unwrap();
        assert_eq!(labeled.text, "hello");
    }

    #[test]
    fn empty_text_is_skipped() {
        assert!(transform(raw("general", "")).is_none());
        assert!(transform(raw("general", "   \t")).is_none());
    }

    #[test]
    fn raw_messages_tolerate_missing_optional_fields() {
        let message: RawChannelMessage =
            serde_json::from_str(r#"{"channel":"random","text":"hi"}"#).unwrap();
        assert_eq!(message.channel, "random");
        assert!(message.user.is_none());
        assert!(message.ts.is_none());
    }
}
