use anyhow::{Context, Result};
use async_trait::async_trait;
use envconfig::Envconfig;
use tracing::{info, warn};

use common_kafka::config::{ConsumerConfig, KafkaConfig};
use common_kafka::kafka_consumer::{RecvErr, SingleTopicConsumer};
use common_kafka::kafka_producer::{create_kafka_producer, send_json_to_kafka};

use crate::dispatch::PipelineRequest;
use crate::variants::{channel_text, PipelineVariant};

/// Seam between the dispatcher and the streaming execution. The dispatcher
/// blocks on `run`; an unbounded pipeline only ever returns with a fatal
/// error, so an `Ok` here means the stream was exhausted.
#[async_trait]
pub trait PipelineRunner {
    async fn run(&self, variant: &PipelineVariant, request: &PipelineRequest) -> Result<()>;
}

/// Runs the resolved variant against real Kafka: consume raw records from the
/// variant's input topic, transform them, produce labeled records to the
/// requested output topic.
pub struct KafkaPipelineRunner {
    kafka: KafkaConfig,
}

impl KafkaPipelineRunner {
    pub fn new(kafka: KafkaConfig) -> Self {
        KafkaPipelineRunner { kafka }
    }

    fn consumer_for(&self, variant: &PipelineVariant) -> Result<SingleTopicConsumer> {
        ConsumerConfig::set_defaults("preprocess-worker", variant.input_topic(), true);
        let consumer_config =
            ConsumerConfig::init_from_env().context("failed to load consumer configuration")?;
        SingleTopicConsumer::new(self.kafka.clone(), consumer_config)
            .context("failed to create source consumer")
    }

    async fn run_channel_text(&self, request: &PipelineRequest) -> Result<()> {
        let consumer = self.consumer_for(&PipelineVariant::ChannelText)?;
        let producer = create_kafka_producer(&self.kafka)
            .await
            .context("failed to create sink producer")?;

        info!(
            input = channel_text::INPUT_TOPIC,
            output = %request.output_topic,
            "starting channel text pipeline"
        );

        loop {
            let (raw, offset): (channel_text::RawChannelMessage, _) =
                match consumer.json_recv().await {
                    Ok(received) => received,
                    Err(RecvErr::Kafka(err)) => {
                        return Err(err).context("reading from the source topic failed")
                    }
                    Err(err @ (RecvErr::Serde(_) | RecvErr::Empty)) => {
                        // Undecodable records are skipped per this variant's
                        // policy; their offset was already stored.
                        metrics::counter!("preprocess_records_skipped").increment(1);
                        warn!("skipping undecodable record: {}", err);
                        continue;
                    }
                };
            metrics::counter!("preprocess_records_read").increment(1);

            match channel_text::transform(raw) {
                Some(labeled) => {
                    send_json_to_kafka(&producer, &request.output_topic, None, &labeled)
                        .await
                        .context("writing to the output topic failed")?;
                    metrics::counter!("preprocess_records_written").increment(1);
                }
                None => {
                    metrics::counter!("preprocess_records_skipped").increment(1);
                }
            }

            offset
                .store()
                .context("failed to store consumer offset")?;
        }
    }
}

#[async_trait]
impl PipelineRunner for KafkaPipelineRunner {
    async fn run(&self, variant: &PipelineVariant, request: &PipelineRequest) -> Result<()> {
        match variant {
            PipelineVariant::ChannelText => self.run_channel_text(request).await,
        }
    }
}
