use crate::catalog_reader::define_catalog_query;
use crate::postgres_client_wrapper::FromRow;
use crate::TableName;
use tokio_postgres::Row;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
}

impl ConstraintKind {
    /// The spelling used by `information_schema.table_constraints.constraint_type`.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConstrainedColumn {
    pub table_name: TableName,
    pub column_name: String,
}

impl ConstrainedColumn {
    pub fn new(table_name: &str, column_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
        }
    }
}

impl FromRow for ConstrainedColumn {
    fn from_row(row: Row) -> crate::Result<Self> {
        Ok(ConstrainedColumn {
            table_name: row.try_get(0)?,
            column_name: row.try_get(1)?,
        })
    }
}

//language=postgresql
define_catalog_query!(get_constrained_columns, ConstrainedColumn, r#"
select tc.table_name::text,
       kcu.column_name::text
from information_schema.table_constraints tc
         join information_schema.key_column_usage kcu
              on kcu.constraint_schema = tc.constraint_schema
                  and kcu.constraint_name = tc.constraint_name
                  and kcu.table_schema = tc.table_schema
                  and kcu.table_name = tc.table_name
where tc.constraint_type::text = $1::text
  and tc.table_schema::text = $2::text
  and tc.table_name::text = any($3::text[])
order by tc.table_name, tc.constraint_name, kcu.ordinal_position;
"#, (constraint_type: &str, schema: &str, tables: &[TableName]));
