use crate::catalog_reader::{list_schemas, PostgresCatalog};
use crate::models::ConnectionProbe;
use crate::postgres_client_wrapper::PostgresClientWrapper;
use tracing::{error, info, instrument, warn};

/// Connects to `address` and lists the schemas visible there.
///
/// Never fails: an address that cannot be connected to, or whose schemas cannot
/// be listed, is reported as unreachable with no schemas.
#[instrument(skip_all)]
pub async fn probe_connection(address: &str) -> ConnectionProbe {
    let Some(connection) = open_connection(address).await else {
        return ConnectionProbe::unreachable();
    };

    let schemas = list_schemas(&PostgresCatalog::new(&connection)).await;

    release_connection(connection).await;

    match schemas {
        Ok(schemas) => ConnectionProbe {
            reachable: true,
            schemas,
        },
        Err(e) => {
            error!("Failed to retrieve schemas: {}", e);
            ConnectionProbe::unreachable()
        }
    }
}

/// Opens a connection, logging the outcome. `None` means the database is unreachable.
pub(crate) async fn open_connection(address: &str) -> Option<PostgresClientWrapper> {
    match PostgresClientWrapper::new(address).await {
        Ok(connection) => {
            info!(
                "Database connection successful. Server version {}",
                connection.version()
            );
            Some(connection)
        }
        Err(e) => {
            error!("Database connection failed: {}", e);
            None
        }
    }
}

pub(crate) async fn release_connection(connection: PostgresClientWrapper) {
    match connection.close().await {
        Ok(()) => info!("Database connection closed."),
        Err(e) => warn!("Database connection did not close cleanly: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_address_is_not_an_error() {
        let probe =
            probe_connection("host=127.0.0.1 port=1 user=nobody dbname=nowhere connect_timeout=2")
                .await;

        assert_eq!(probe, ConnectionProbe::unreachable());
        assert!(!probe.reachable);
        assert!(probe.schemas.is_empty());
    }

    #[tokio::test]
    async fn malformed_address_is_unreachable() {
        let probe = probe_connection("postgres://user@:not-a-port/db").await;
        assert!(!probe.reachable);
        assert!(probe.schemas.is_empty());
    }
}
