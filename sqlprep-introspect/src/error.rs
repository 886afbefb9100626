use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntrospectError {
    #[error("unrecognized native column type '{0}'")]
    UnknownNativeType(String),

    #[error("malformed enum/set value list for column '{0}': {1}")]
    MalformedEnumValues(String, String),

    #[error("catalog source error: {0}")]
    Catalog(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Schema(#[from] sqlprep_schema::SchemaError),
}
