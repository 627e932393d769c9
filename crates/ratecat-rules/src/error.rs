use ratecat_config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A rule requires a column no header alias or field can ever produce.
    #[error("table type {table_type} requires column {column:?}, which no header alias produces")]
    UnsatisfiableColumn { table_type: String, column: String },
}

pub type Result<T> = std::result::Result<T, RulesError>;
