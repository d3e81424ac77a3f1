//! Per-variant pipeline logic, one submodule per working pipeline.
//!
//! A variant owns everything specific to one (datasource, processtype) pair:
//! the wire format of its raw records, the label-generating transform, its
//! fixed input topic and the provisioning options for its output topic. The
//! dispatcher never inspects record contents, it only routes them.

pub mod channel_text;

use common_kafka::admin::TopicSpec;

use crate::dispatch::{DataSource, PipelineRequest};
use crate::error::DispatchError;

/// The closed set of runnable pipelines. A (datasource, processtype) pair
/// resolves to exactly one of these or to an error; there is no null variant
/// to invoke by mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineVariant {
    ChannelText,
}

impl PipelineVariant {
    /// Topic the variant reads its raw records from.
    pub fn input_topic(&self) -> &'static str {
        match self {
            PipelineVariant::ChannelText => channel_text::INPUT_TOPIC,
        }
    }

    /// Provisioning options for the output topic, when the variant wants it
    /// created before the pipeline starts consuming.
    pub fn provisioning(&self) -> Option<TopicSpec> {
        match self {
            PipelineVariant::ChannelText => Some(channel_text::provisioning_spec()),
        }
    }
}

/// The two-level dispatch table: datasource first, processtype within it.
///
/// Placeholder combinations are registered so they fail with `NotImplemented`
/// instead of no-oping; everything unregistered fails with an explicit
/// error. There is deliberately no fall-through between sources.
pub fn resolve(
    source: DataSource,
    request: &PipelineRequest,
) -> Result<PipelineVariant, DispatchError> {
    match source {
        DataSource::ChannelStyle => match request.processtype.as_str() {
            "channel" => Ok(PipelineVariant::ChannelText),
            // Declared upstream, no working transformer yet
            "processtype2" | "processtype3" => Err(DispatchError::NotImplemented {
                datasource: request.datasource.clone(),
                processtype: request.processtype.clone(),
            }),
            _ => Err(DispatchError::InvalidProcesstype {
                datasource: request.datasource.clone(),
                processtype: request.processtype.clone(),
            }),
        },
        DataSource::UrlStyle | DataSource::StreamStyle => Err(DispatchError::NotImplemented {
            datasource: request.datasource.clone(),
            processtype: request.processtype.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(datasource: &str, processtype: &str) -> PipelineRequest {
        PipelineRequest {
            datasource: datasource.to_string(),
            processtype: processtype.to_string(),
            output_topic: "labels-out".to_string(),
        }
    }

    #[test]
    fn channel_pair_resolves_to_the_channel_text_variant() {
        let variant = resolve(
            DataSource::ChannelStyle,
            &request("channel-style", "channel"),
        )
        .unwrap();
        assert_eq!(variant, PipelineVariant::ChannelText);
        assert_eq!(variant.input_topic(), channel_text::INPUT_TOPIC);
    }

    #[test]
    fn placeholder_processtypes_are_not_implemented() {
        for processtype in ["processtype2", "processtype3"] {
            let err = resolve(
                DataSource::ChannelStyle,
                &request("channel-style", processtype),
            )
            .unwrap_err();
            assert!(matches!(err, DispatchError::NotImplemented { .. }));
        }
    }

    #[test]
    fn unknown_processtype_does_not_fall_through() {
        let err = resolve(DataSource::ChannelStyle, &request("channel-style", "bogus"))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InvalidProcesstype { processtype, .. } if processtype == "bogus"
        ));
    }

    #[test]
    fn placeholder_datasources_are_not_implemented() {
        for source in [DataSource::UrlStyle, DataSource::StreamStyle] {
            let err = resolve(source, &request("url-style", "channel")).unwrap_err();
            assert!(matches!(err, DispatchError::NotImplemented { .. }));
        }
    }
}
