use crate::catalog_reader::define_catalog_query;
use crate::postgres_client_wrapper::FromRow;
use crate::TableName;
use tokio_postgres::Row;

/// A single column pair of a foreign key, pointing from `source_table` to `target_table`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ForeignKeyEdge {
    pub source_table: TableName,
    pub source_column: String,
    pub target_table: TableName,
    pub target_column: String,
}

impl FromRow for ForeignKeyEdge {
    fn from_row(row: Row) -> crate::Result<Self> {
        Ok(Self {
            source_table: row.try_get(0)?,
            source_column: row.try_get(1)?,
            target_table: row.try_get(2)?,
            target_column: row.try_get(3)?,
        })
    }
}

// Constraint names are only unique per table, so the columns come from the constraint itself
// rather than from a join on its name. Composite keys pair up by position in conkey/confkey.
//language=postgresql
define_catalog_query!(get_foreign_keys, ForeignKeyEdge, r#"
select tab.relname::text          as source_table,
       source_attr.attname::text  as source_column,
       target.relname::text       as target_table,
       target_attr.attname::text  as target_column
from pg_catalog.pg_constraint con
         join pg_catalog.pg_class tab on tab.oid = con.conrelid
         join pg_catalog.pg_namespace tab_ns on tab_ns.oid = tab.relnamespace
         join pg_catalog.pg_class target on target.oid = con.confrelid
         join unnest(con.conkey, con.confkey) with ordinality
              as cols (conkey, confkey, ordinal) on true
         join pg_catalog.pg_attribute source_attr
              on source_attr.attrelid = con.conrelid and source_attr.attnum = cols.conkey
         join pg_catalog.pg_attribute target_attr
              on target_attr.attrelid = con.confrelid and target_attr.attnum = cols.confkey
where con.contype = 'f'
  and tab_ns.nspname::text = $1::text
  and tab.relname::text = any($2::text[])
order by tab.relname, con.conname, cols.ordinal;
"#, (schema: &str, tables: &[TableName]));
