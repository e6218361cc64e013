use crate::connection_prober::{open_connection, release_connection};
use crate::models::{Lookup, SchemaName, TableName};
use crate::postgres_client_wrapper::PostgresClientWrapper;
use crate::{Result, SchemaScoutError};
use itertools::Itertools;
use std::collections::HashMap;
use std::future::Future;
use tracing::{error, info, instrument};

mod foreign_key;
mod key_column_usage;
mod schema;
mod table;
mod table_column;

pub use foreign_key::ForeignKeyEdge;
pub use key_column_usage::{ConstrainedColumn, ConstraintKind};
pub use table_column::ColumnDescriptor;

/// Table name to the columns taking part in one kind of constraint, in catalog order.
/// Tables without such a constraint are absent.
pub type ConstraintMap = HashMap<TableName, Vec<String>>;

/// Raw, fallible access to the catalog of one open database.
///
/// Every `tables` argument is an allow-list: implementations only return rows
/// belonging to those tables.
pub trait CatalogSource: Send + Sync {
    fn fetch_schemas(&self) -> impl Future<Output = Result<Vec<SchemaName>>> + Send;

    fn fetch_tables(&self, schema: &str) -> impl Future<Output = Result<Vec<TableName>>> + Send;

    fn fetch_columns(
        &self,
        schema: &str,
        tables: &[TableName],
    ) -> impl Future<Output = Result<Vec<ColumnDescriptor>>> + Send;

    fn fetch_constrained_columns(
        &self,
        schema: &str,
        tables: &[TableName],
        kind: ConstraintKind,
    ) -> impl Future<Output = Result<Vec<ConstrainedColumn>>> + Send;

    fn fetch_foreign_keys(
        &self,
        schema: &str,
        tables: &[TableName],
    ) -> impl Future<Output = Result<Vec<ForeignKeyEdge>>> + Send;
}

/// Reads `information_schema` through an open connection.
pub struct PostgresCatalog<'a> {
    connection: &'a PostgresClientWrapper,
}

impl<'a> PostgresCatalog<'a> {
    pub fn new(connection: &'a PostgresClientWrapper) -> Self {
        Self { connection }
    }
}

impl CatalogSource for PostgresCatalog<'_> {
    async fn fetch_schemas(&self) -> Result<Vec<SchemaName>> {
        self.connection.get_single_results(schema::SCHEMAS_QUERY, &[]).await
    }

    async fn fetch_tables(&self, schema: &str) -> Result<Vec<TableName>> {
        self.connection
            .get_single_results(table::TABLES_QUERY, &[&schema])
            .await
    }

    async fn fetch_columns(
        &self,
        schema: &str,
        tables: &[TableName],
    ) -> Result<Vec<ColumnDescriptor>> {
        self.get_columns(schema, tables).await
    }

    async fn fetch_constrained_columns(
        &self,
        schema: &str,
        tables: &[TableName],
        kind: ConstraintKind,
    ) -> Result<Vec<ConstrainedColumn>> {
        self.get_constrained_columns(kind.as_sql(), schema, tables).await
    }

    async fn fetch_foreign_keys(
        &self,
        schema: &str,
        tables: &[TableName],
    ) -> Result<Vec<ForeignKeyEdge>> {
        self.get_foreign_keys(schema, tables).await
    }
}

/// Lists the non-system schemas, sorted by name. Unlike the other reads this one
/// does not degrade: the prober treats a failure here as an unreachable database.
pub async fn list_schemas(source: &impl CatalogSource) -> Result<Vec<SchemaName>> {
    let schemas = source.fetch_schemas().await?;
    info!("Retrieved schemas: {:?}", schemas);
    Ok(schemas)
}

/// Lists all tables in `schema`, or nothing if the catalog could not be read.
pub async fn list_tables(source: &impl CatalogSource, schema: &str) -> Vec<TableName> {
    match source.fetch_tables(schema).await {
        Ok(tables) => {
            info!("Retrieved tables: {:?}", tables);
            tables
        }
        Err(e) => degraded("tables", e),
    }
}

pub async fn list_columns(
    source: &impl CatalogSource,
    schema: &str,
    tables: &[TableName],
) -> Vec<ColumnDescriptor> {
    match source.fetch_columns(schema, tables).await {
        Ok(columns) => {
            info!("Retrieved {} columns", columns.len());
            columns
        }
        Err(e) => degraded("columns", e),
    }
}

/// Groups the columns of `kind` constraints by table, keeping the catalog order
/// within each table.
pub async fn list_constrained_columns(
    source: &impl CatalogSource,
    schema: &str,
    tables: &[TableName],
    kind: ConstraintKind,
) -> ConstraintMap {
    match source.fetch_constrained_columns(schema, tables, kind).await {
        Ok(rows) => {
            info!("Retrieved {} constraint metadata", kind.as_sql());
            rows.into_iter()
                .map(|row| (row.table_name, row.column_name))
                .into_group_map()
        }
        Err(e) => degraded(kind.as_sql(), e),
    }
}

pub async fn list_foreign_keys(
    source: &impl CatalogSource,
    schema: &str,
    tables: &[TableName],
) -> Vec<ForeignKeyEdge> {
    match source.fetch_foreign_keys(schema, tables).await {
        Ok(edges) => {
            info!("Retrieved {} foreign key edges", edges.len());
            edges
        }
        Err(e) => degraded("foreign key", e),
    }
}

/// Lists the tables of `schema` on the database at `address`.
#[instrument(skip_all, fields(schema = %schema))]
pub async fn read_tables(address: &str, schema: &str) -> Lookup<Vec<TableName>> {
    let Some(connection) = open_connection(address).await else {
        return Lookup::Unreachable;
    };

    let tables = list_tables(&PostgresCatalog::new(&connection), schema).await;

    release_connection(connection).await;

    Lookup::Found(tables)
}

fn degraded<T: Default>(what: &str, e: SchemaScoutError) -> T {
    error!("Failed to retrieve {} metadata: {}", what, e);
    T::default()
}

macro_rules! define_catalog_query {
    ($fn_name:ident, $result:ident, $query:literal, ($($param:ident: $param_ty:ty),*)) => {
        impl $crate::catalog_reader::PostgresCatalog<'_> {
            #[tracing::instrument(skip_all)]
            pub(in crate::catalog_reader) async fn $fn_name(
                &self,
                $($param: $param_ty),*
            ) -> $crate::Result<Vec<$result>> {
                self.connection.get_results($query, &[$(&$param),*]).await
            }
        }
    };
}

pub(crate) use define_catalog_query;
