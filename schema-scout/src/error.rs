use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaScoutError {
    #[error("Error from postgres: `{0}`")]
    PostgresError(#[from] tokio_postgres::Error),

    #[error("Error from postgres: `{source}` when executing query: `{query}`")]
    PostgresErrorWithQuery {
        query: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Invalid number of results returned from query. Expected `{expected}`, got `{actual}`")]
    InvalidNumberOfResults {
        actual: usize,
        expected: usize,
    },

    #[error("Server reported an unparsable version number: `{0}`")]
    InvalidServerVersion(String),

    #[error("Connection task ended abnormally: `{0}`")]
    ConnectionTaskFailed(#[from] tokio::task::JoinError),
}

pub type Result<T = ()> = std::result::Result<T, SchemaScoutError>;
