use crate::catalog_reader::define_catalog_query;
use crate::postgres_client_wrapper::FromRow;
use crate::TableName;
use tokio_postgres::Row;

/// One column of a requested table, with the type name the catalog reports.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ColumnDescriptor {
    pub table_name: TableName,
    pub column_name: String,
    pub native_type: String,
}

impl FromRow for ColumnDescriptor {
    fn from_row(row: Row) -> crate::Result<Self> {
        Ok(ColumnDescriptor {
            table_name: row.try_get(0)?,
            column_name: row.try_get(1)?,
            native_type: row.try_get(2)?,
        })
    }
}

//language=postgresql
define_catalog_query!(get_columns, ColumnDescriptor, r#"
select c.table_name::text,
       c.column_name::text,
       c.data_type::text
from information_schema.columns c
where c.table_schema::text = $1::text
  and c.table_name::text = any($2::text[])
order by c.table_name, c.ordinal_position;
"#, (schema: &str, tables: &[TableName]));
