use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use thiserror::Error;
use tracing::debug;

use crate::config::KafkaConfig;

/// Provisioning options for a new topic. The broker ignores options it does
/// not understand, so only the knobs we actually set are modeled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicSpec {
    pub num_partitions: i32,
    pub replication_factor: i32,
}

impl Default for TopicSpec {
    fn default() -> Self {
        TopicSpec {
            num_partitions: 3,
            replication_factor: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum TopicError {
    /// Distinguished from other failures so callers that provision
    /// idempotently can log and move on.
    #[error("topic {0} already exists")]
    AlreadyExists(String),

    #[error("failed to provision topic {topic}: {source}")]
    ProvisioningFailed {
        topic: String,
        #[source]
        source: KafkaError,
    },
}

/// Topic provisioning as consumed by the dispatcher. Behind a trait so jobs
/// can be handed a test double instead of a live admin client.
#[async_trait]
pub trait TopicAdmin: Send + Sync {
    async fn create_topic(&self, name: &str, spec: &TopicSpec) -> Result<(), TopicError>;
}

pub struct KafkaTopicAdmin {
    client: AdminClient<DefaultClientContext>,
}

impl KafkaTopicAdmin {
    pub fn new(config: &KafkaConfig) -> Result<Self, KafkaError> {
        let mut client_config = ClientConfig::new();
        client_config.set("bootstrap.servers", &config.kafka_hosts);

        if config.kafka_tls {
            client_config
                .set("security.protocol", "ssl")
                .set("enable.ssl.certificate.verification", "false");
        };

        debug!("rdkafka admin configuration: {:?}", client_config);
        let client: AdminClient<DefaultClientContext> = client_config.create()?;
        Ok(KafkaTopicAdmin { client })
    }
}

#[async_trait]
impl TopicAdmin for KafkaTopicAdmin {
    /// Single blocking round trip, no retries. Retry policy, if any, belongs
    /// here rather than in the callers.
    async fn create_topic(&self, name: &str, spec: &TopicSpec) -> Result<(), TopicError> {
        let topic = NewTopic {
            name,
            num_partitions: spec.num_partitions,
            replication: TopicReplication::Fixed(spec.replication_factor),
            config: vec![],
        };

        let results = self
            .client
            .create_topics(&[topic], &AdminOptions::default())
            .await
            .map_err(|e| TopicError::ProvisioningFailed {
                topic: name.to_string(),
                source: e,
            })?;

        match results.into_iter().next() {
            Some(Ok(_)) => Ok(()),
            Some(Err((topic, RDKafkaErrorCode::TopicAlreadyExists))) => {
                Err(TopicError::AlreadyExists(topic))
            }
            Some(Err((topic, code))) => Err(TopicError::ProvisioningFailed {
                topic,
                source: KafkaError::AdminOp(code),
            }),
            None => Err(TopicError::ProvisioningFailed {
                topic: name.to_string(),
                source: KafkaError::AdminOpCreation(
                    "broker returned no result for the topic".to_string(),
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_matches_broker_defaults() {
        let spec = TopicSpec::default();
        assert_eq!(spec.num_partitions, 3);
        assert_eq!(spec.replication_factor, 1);
    }

    #[test]
    fn already_exists_is_not_a_provisioning_failure() {
        let err = TopicError::AlreadyExists("labels-out".to_string());
        assert!(matches!(err, TopicError::AlreadyExists(topic) if topic == "labels-out"));
    }
}
