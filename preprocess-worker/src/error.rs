use common_kafka::admin::TopicError;
use thiserror::Error;

/// Everything that can take the worker down, from argument validation through
/// pipeline execution. Callers match on this exhaustively; there is no
/// catch-all branch to fall into by accident.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("required argument {0} is missing")]
    MissingArgument(&'static str),

    #[error("invalid datasource {0}")]
    InvalidDatasource(String),

    #[error("datasource {datasource} has no processtype {processtype}")]
    InvalidProcesstype {
        datasource: String,
        processtype: String,
    },

    #[error("preprocessing for datasource {datasource} with processtype {processtype} is not implemented")]
    NotImplemented {
        datasource: String,
        processtype: String,
    },

    #[error("failed to provision output topic: {0}")]
    Provisioning(#[from] TopicError),

    #[error("pipeline failed: {0}")]
    Pipeline(#[source] anyhow::Error),
}
