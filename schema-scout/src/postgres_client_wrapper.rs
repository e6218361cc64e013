use crate::{Result, SchemaScoutError};
use tokio::task::JoinHandle;
use tokio_postgres::types::{FromSqlOwned, ToSql};
use tokio_postgres::{Client, NoTls, Row};

pub struct PostgresClientWrapper {
    client: Client,
    join_handle: Option<JoinHandle<Result<()>>>,
    version: i32,
}

impl PostgresClientWrapper {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls).await?;

        // The connection object performs the actual communication with the database,
        // so spawn it off to run on its own.
        let join_handle = tokio::spawn(async move {
            match connection.await {
                Err(e) => Err(SchemaScoutError::PostgresError(e)),
                Ok(_) => Ok(()),
            }
        });

        let mut wrapper = PostgresClientWrapper {
            client,
            join_handle: Some(join_handle),
            version: 0,
        };

        let version = wrapper
            .get_single_result::<String>("show server_version_num;", &[])
            .await?;
        wrapper.version = version
            .parse()
            .map_err(|_| SchemaScoutError::InvalidServerVersion(version))?;

        Ok(wrapper)
    }

    pub async fn execute_non_query(&self, sql: &str) -> Result {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| SchemaScoutError::PostgresErrorWithQuery {
                source: e,
                query: sql.to_string(),
            })?;

        Ok(())
    }

    pub async fn get_results<T: FromRow>(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<T>> {
        let query_results =
            self.client
                .query(sql, params)
                .await
                .map_err(|e| SchemaScoutError::PostgresErrorWithQuery {
                    source: e,
                    query: sql.to_string(),
                })?;

        let mut output = Vec::with_capacity(query_results.len());

        for row in query_results.into_iter() {
            output.push(T::from_row(row)?);
        }

        Ok(output)
    }

    pub async fn get_result<T: FromRow>(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<T> {
        let results = self.get_results(sql, params).await?;
        if results.len() != 1 {
            return Err(SchemaScoutError::InvalidNumberOfResults {
                actual: results.len(),
                expected: 1,
            });
        }

        let mut results = results.into_iter();
        results.next().ok_or(SchemaScoutError::InvalidNumberOfResults {
            actual: 0,
            expected: 1,
        })
    }

    pub async fn get_single_results<T: FromSqlOwned>(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<T>> {
        let r = self
            .get_results::<(T,)>(sql, params)
            .await?
            .into_iter()
            .map(|t| t.0)
            .collect();

        Ok(r)
    }

    pub async fn get_single_result<T: FromSqlOwned>(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<T> {
        let result = self.get_result::<(T,)>(sql, params).await?;
        Ok(result.0)
    }

    /// The value of `server_version_num`, e.g. `160002` for 16.2.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Closes the connection and waits for the connection task to wind down.
    ///
    /// Dropping the wrapper also releases the connection, but without waiting
    /// for the server to acknowledge it.
    pub async fn close(mut self) -> Result {
        let join_handle = self.join_handle.take();

        // Dropping the client makes the connection task send a terminate message and exit.
        drop(self);

        match join_handle {
            Some(handle) => handle.await?,
            None => Ok(()),
        }
    }
}

impl Drop for PostgresClientWrapper {
    fn drop(&mut self) {
        if let Some(join_handle) = &self.join_handle {
            join_handle.abort();
        }
    }
}

pub trait FromRow: Sized {
    fn from_row(row: Row) -> Result<Self>;
}

impl<T1: FromSqlOwned> FromRow for (T1,) {
    fn from_row(row: Row) -> Result<Self> {
        Ok((row.try_get(0)?,))
    }
}
