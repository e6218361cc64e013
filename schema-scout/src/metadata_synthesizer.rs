use crate::catalog_reader::{
    list_columns, list_constrained_columns, list_foreign_keys, CatalogSource, ColumnDescriptor,
    ConstraintKind, ConstraintMap, ForeignKeyEdge, PostgresCatalog,
};
use crate::connection_prober::{open_connection, release_connection};
use crate::models::{
    ColumnMetadata, ForeignKeyMetadata, Lookup, RelationshipType, TableMetadata, TableName,
};
use crate::type_normalizer::normalize;
use futures::join;
use itertools::Itertools;
use tracing::{info, instrument};

/// Builds the metadata of `tables` in `schema` on the database at `address`.
///
/// Entries come back in the order of `tables`. Reads that fail on an open
/// connection only leave their part of the result empty; only a failed connect
/// makes the whole lookup [`Lookup::Unreachable`].
#[instrument(skip_all, fields(schema = %schema, tables = tables.len()))]
pub async fn synthesize(
    address: &str,
    schema: &str,
    tables: &[TableName],
) -> Lookup<Vec<TableMetadata>> {
    let Some(connection) = open_connection(address).await else {
        return Lookup::Unreachable;
    };

    let metadata = synthesize_from(&PostgresCatalog::new(&connection), schema, tables).await;

    release_connection(connection).await;

    Lookup::Found(metadata)
}

/// Same as [`synthesize`], against an already available catalog.
pub async fn synthesize_from(
    source: &impl CatalogSource,
    schema: &str,
    tables: &[TableName],
) -> Vec<TableMetadata> {
    let (columns, primary_keys, unique_constraints, foreign_keys) = join!(
        list_columns(source, schema, tables),
        list_constrained_columns(source, schema, tables, ConstraintKind::PrimaryKey),
        list_constrained_columns(source, schema, tables, ConstraintKind::Unique),
        list_foreign_keys(source, schema, tables),
    );

    let snapshot = CatalogSnapshot {
        columns,
        primary_keys,
        unique_constraints,
        foreign_keys,
    };

    let metadata = snapshot.table_metadata(tables);
    info!("Retrieved metadata for {} tables", metadata.len());
    metadata
}

/// Everything read from the catalog for one batch of tables.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    pub columns: Vec<ColumnDescriptor>,
    pub primary_keys: ConstraintMap,
    pub unique_constraints: ConstraintMap,
    pub foreign_keys: Vec<ForeignKeyEdge>,
}

impl CatalogSnapshot {
    /// One entry per requested table, in request order. Names the snapshot knows
    /// nothing about still get an (empty) entry.
    pub fn table_metadata(&self, tables: &[TableName]) -> Vec<TableMetadata> {
        let columns_by_table = self
            .columns
            .iter()
            .into_group_map_by(|c| c.table_name.as_str());
        let edges_by_table = self
            .foreign_keys
            .iter()
            .into_group_map_by(|fk| fk.source_table.as_str());

        tables
            .iter()
            .map(|table| {
                let columns = columns_by_table
                    .get(table.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let edges = edges_by_table
                    .get(table.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                self.describe_table(table, columns, edges)
            })
            .collect()
    }

    fn describe_table(
        &self,
        table: &str,
        columns: &[&ColumnDescriptor],
        edges: &[&ForeignKeyEdge],
    ) -> TableMetadata {
        let primary_key = self.primary_keys.get(table).cloned().unwrap_or_default();
        let unique = self
            .unique_constraints
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let foreign_keys = edges
            .iter()
            .map(|edge| {
                let is_unique = primary_key.contains(&edge.source_column)
                    || unique.contains(&edge.source_column);

                ForeignKeyMetadata {
                    source_column: edge.source_column.clone(),
                    target_table: edge.target_table.clone(),
                    target_column: edge.target_column.clone(),
                    relationship_type: if is_unique {
                        RelationshipType::OneToOne
                    } else {
                        RelationshipType::OneToMany
                    },
                }
            })
            .collect();

        let is_join_table = primary_key.len() == 2 && edges.len() == 2;

        TableMetadata {
            table_name: table.to_string(),
            columns: columns
                .iter()
                .map(|c| ColumnMetadata {
                    column_name: c.column_name.clone(),
                    data_type: normalize(&c.native_type).to_string(),
                })
                .collect(),
            primary_key,
            foreign_keys,
            relationship_type: is_join_table.then_some(RelationshipType::ManyToMany),
        }
    }
}
