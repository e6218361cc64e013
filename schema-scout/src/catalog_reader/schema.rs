//language=postgresql
pub(super) const SCHEMAS_QUERY: &str = r#"
select schema_name::text
from information_schema.schemata
where schema_name not in ('information_schema', 'pg_catalog')
  and schema_name not like 'pg\_toast%'
  and schema_name not like 'pg\_temp%'
order by schema_name;
"#;
