/// Maps the type name reported by `information_schema.columns.data_type` to its
/// short canonical spelling. Unknown types are returned unchanged.
pub fn normalize(native_type: &str) -> &str {
    match native_type {
        "integer" => "int",
        "timestamp without time zone" => "timestamp",
        "timestamp with time zone" => "timestamptz",
        "character varying" => "varchar",
        "character" => "char",
        "boolean" => "bool",
        "double precision" => "double",
        "real" => "float",
        "numeric" => "decimal",
        other => other,
    }
}
