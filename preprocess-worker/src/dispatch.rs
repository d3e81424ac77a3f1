use std::str::FromStr;

use common_kafka::admin::{TopicAdmin, TopicError};
use tracing::{info, warn};

use crate::error::DispatchError;
use crate::runner::PipelineRunner;
use crate::variants::resolve;

/// One validated invocation of the worker. All fields are non-empty once
/// construction succeeds; the input topic is variant-defined and resolved
/// during dispatch, not supplied by the caller.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub datasource: String,
    pub processtype: String,
    pub output_topic: String,
}

impl PipelineRequest {
    /// Builds a request from the raw argument values. Fails with
    /// `MissingArgument` naming the offending field, before any side effect
    /// has a chance to happen.
    pub fn new(
        datasource: Option<String>,
        processtype: Option<String>,
        output_topic: Option<String>,
    ) -> Result<Self, DispatchError> {
        Ok(PipelineRequest {
            datasource: required("datasource", datasource)?,
            processtype: required("processtype", processtype)?,
            output_topic: required("topic", output_topic)?,
        })
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String, DispatchError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DispatchError::MissingArgument(name)),
    }
}

/// Data sources registered in the dispatch table. Anything else is an
/// invalid datasource; an unmatched value can never drift into another
/// source's cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    ChannelStyle,
    UrlStyle,
    StreamStyle,
}

impl FromStr for DataSource {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, DispatchError> {
        match s {
            "channel-style" => Ok(DataSource::ChannelStyle),
            "url-style" => Ok(DataSource::UrlStyle),
            "stream-style" => Ok(DataSource::StreamStyle),
            other => Err(DispatchError::InvalidDatasource(other.to_string())),
        }
    }
}

/// Maps a (datasource, processtype) pair to a concrete pipeline and runs it.
///
/// The admin client and the pipeline runner are injected at construction so
/// the whole dispatch path can be exercised against test doubles.
pub struct PipelineDispatcher<A, R> {
    admin: A,
    runner: R,
}

impl<A: TopicAdmin, R: PipelineRunner> PipelineDispatcher<A, R> {
    pub fn new(admin: A, runner: R) -> Self {
        PipelineDispatcher { admin, runner }
    }

    /// Validation, variant resolution, output-topic provisioning and the
    /// pipeline run, strictly in that order. Provisioning is idempotent from
    /// the caller's perspective: `AlreadyExists` is logged and ignored, any
    /// other provisioning failure or pipeline failure is surfaced unmodified.
    pub async fn dispatch(
        &self,
        datasource: Option<String>,
        processtype: Option<String>,
        output_topic: Option<String>,
    ) -> Result<(), DispatchError> {
        let request = PipelineRequest::new(datasource, processtype, output_topic)?;
        let source: DataSource = request.datasource.parse()?;
        let variant = resolve(source, &request)?;

        info!(
            datasource = %request.datasource,
            processtype = %request.processtype,
            "resolved pipeline variant {:?}",
            variant
        );

        if let Some(spec) = variant.provisioning() {
            match self.admin.create_topic(&request.output_topic, &spec).await {
                Ok(()) => info!(topic = %request.output_topic, "output topic created"),
                Err(TopicError::AlreadyExists(topic)) => {
                    warn!(%topic, "output topic already exists, writing to it as-is")
                }
                Err(err) => return Err(DispatchError::Provisioning(err)),
            }
        }

        self.runner
            .run(&variant, &request)
            .await
            .map_err(DispatchError::Pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_requires_all_three_arguments() {
        let err = PipelineRequest::new(
            None,
            Some("channel".to_string()),
            Some("labels-out".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::MissingArgument("datasource")));

        let err = PipelineRequest::new(
            Some("channel-style".to_string()),
            None,
            Some("labels-out".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::MissingArgument("processtype")));

        let err = PipelineRequest::new(
            Some("channel-style".to_string()),
            Some("channel".to_string()),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::MissingArgument("topic")));
    }

    #[test]
    fn empty_and_blank_arguments_count_as_missing() {
        let err = PipelineRequest::new(
            Some(String::new()),
            Some("channel".to_string()),
            Some("labels-out".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::MissingArgument("datasource")));

        let err = PipelineRequest::new(
            Some("channel-style".to_string()),
            Some("channel".to_string()),
            Some("   ".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::MissingArgument("topic")));
    }

    #[test]
    fn known_datasources_parse() {
        assert_eq!(
            "channel-style".parse::<DataSource>().unwrap(),
            DataSource::ChannelStyle
        );
        assert_eq!(
            "url-style".parse::<DataSource>().unwrap(),
            DataSource::UrlStyle
        );
        assert_eq!(
            "stream-style".parse::<DataSource>().unwrap(),
            DataSource::StreamStyle
        );
    }

    #[test]
    fn unknown_datasource_is_rejected() {
        let err = "unknown-source".parse::<DataSource>().unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InvalidDatasource(value) if value == "unknown-source"
        ));
    }
}
