use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use serde::Serialize;
use serde_json::error::Error as SerdeError;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::KafkaConfig;

pub async fn create_kafka_producer(config: &KafkaConfig) -> Result<FutureProducer, KafkaError> {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.kafka_hosts)
        .set("linger.ms", config.kafka_producer_linger_ms.to_string())
        .set(
            "message.timeout.ms",
            config.kafka_message_timeout_ms.to_string(),
        )
        .set(
            "compression.codec",
            config.kafka_compression_codec.to_owned(),
        )
        .set(
            "queue.buffering.max.kbytes",
            (config.kafka_producer_queue_mib * 1024).to_string(),
        )
        .set(
            "queue.buffering.max.messages",
            config.kafka_producer_queue_messages.to_string(),
        );

    if config.kafka_tls {
        client_config
            .set("security.protocol", "ssl")
            .set("enable.ssl.certificate.verification", "false");
    };

    debug!("rdkafka configuration: {:?}", client_config);
    let producer: FutureProducer = client_config.create()?;

    // "Ping" the Kafka brokers by requesting metadata
    match producer
        .client()
        .fetch_metadata(None, std::time::Duration::from_secs(15))
    {
        Ok(metadata) => {
            info!(
                "Successfully connected to Kafka brokers. Found {} topics.",
                metadata.topics().len()
            );
        }
        Err(error) => {
            error!("Failed to fetch metadata from Kafka brokers: {:?}", error);
            return Err(error);
        }
    }

    Ok(producer)
}

#[derive(Error, Debug)]
pub enum KafkaProduceError {
    #[error("failed to serialize: {error}")]
    SerializationError { error: SerdeError },
    #[error("failed to produce to kafka: {error}")]
    KafkaProduceError { error: KafkaError },
    #[error("failed to produce to kafka (timeout)")]
    KafkaProduceCanceled,
}

/// Serializes one record as JSON and waits for broker acknowledgement.
///
/// Writers abort on the first failed element, so there is deliberately no
/// batch variant; each record is confirmed before the next is sent.
pub async fn send_json_to_kafka<T>(
    producer: &FutureProducer,
    topic: &str,
    key: Option<&str>,
    item: &T,
) -> Result<(), KafkaProduceError>
where
    T: Serialize,
{
    let payload = serde_json::to_string(item)
        .map_err(|e| KafkaProduceError::SerializationError { error: e })?;

    let record = FutureRecord {
        topic,
        key,
        payload: Some(&payload),
        timestamp: None,
        partition: None,
        headers: None,
    };

    let delivery = match producer.send_result(record) {
        Ok(f) => f,
        Err((e, _)) => return Err(KafkaProduceError::KafkaProduceError { error: e }),
    };

    match delivery.await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err((e, _))) => Err(KafkaProduceError::KafkaProduceError { error: e }),
        Err(_) => Err(KafkaProduceError::KafkaProduceCanceled),
    }
}
