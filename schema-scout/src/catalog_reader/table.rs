//language=postgresql
pub(super) const TABLES_QUERY: &str = r#"
select table_name::text
from information_schema.tables
where table_schema::text = $1::text
order by table_name;
"#;
