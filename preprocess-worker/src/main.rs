use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use envconfig::Envconfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common_kafka::admin::KafkaTopicAdmin;
use preprocess_worker::config::Config;
use preprocess_worker::dispatch::PipelineDispatcher;
use preprocess_worker::runner::KafkaPipelineRunner;

/// Command line surface of the worker. The values stay optional here so the
/// dispatcher itself can report which one is missing, before any side effect.
#[derive(Parser, Debug)]
#[command(
    name = "preprocess-worker",
    about = "Selects and runs a label-preprocessing pipeline over Kafka"
)]
struct Args {
    /// Source of the raw data
    #[arg(long)]
    datasource: Option<String>,

    /// Type of preprocessing used to generate labels
    #[arg(long)]
    processtype: Option<String>,

    /// Topic the labeled records are written to
    #[arg(long)]
    topic: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "preprocess_worker=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("preprocess worker starting");

    if let Err(err) = run(args).await {
        error!("preprocess worker failed: {:#}", err);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::init_from_env().context("failed to load configuration")?;

    let metrics_addr: SocketAddr = config
        .metrics_bind()
        .parse()
        .context("invalid metrics bind address")?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .context("failed to install metrics exporter")?;
    info!("metrics listening on {}", metrics_addr);

    let admin =
        KafkaTopicAdmin::new(&config.kafka).context("failed to create kafka admin client")?;
    let runner = KafkaPipelineRunner::new(config.kafka.clone());
    let dispatcher = PipelineDispatcher::new(admin, runner);

    dispatcher
        .dispatch(args.datasource, args.processtype, args.topic)
        .await?;

    info!("pipeline finished");
    Ok(())
}
