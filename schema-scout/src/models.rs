use serde::Serialize;

/// Name of a namespace within a database, such as `public`.
pub type SchemaName = String;

/// Name of a table, unique within its schema.
pub type TableName = String;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub enum RelationshipType {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// The structural summary of one requested table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TableMetadata {
    pub table_name: TableName,
    pub columns: Vec<ColumnMetadata>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyMetadata>,
    /// Only set, to [`RelationshipType::ManyToMany`], when the table is a join table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<RelationshipType>,
}

impl TableMetadata {
    pub fn is_join_table(&self) -> bool {
        self.relationship_type == Some(RelationshipType::ManyToMany)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ColumnMetadata {
    pub column_name: String,
    /// The canonical type name, see [`crate::normalize`].
    pub data_type: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ForeignKeyMetadata {
    pub source_column: String,
    pub target_table: TableName,
    pub target_column: String,
    pub relationship_type: RelationshipType,
}

/// Result of probing a database address.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct ConnectionProbe {
    pub reachable: bool,
    pub schemas: Vec<SchemaName>,
}

impl ConnectionProbe {
    pub fn unreachable() -> Self {
        Self::default()
    }
}

/// Outcome of an operation that has to reach the database first.
///
/// Keeps "could not connect" apart from "connected, but found nothing".
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Lookup<T> {
    Unreachable,
    Found(T),
}

impl<T> Lookup<T> {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Lookup::Unreachable)
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Unreachable => None,
        }
    }
}

impl<T: Default> Lookup<T> {
    pub fn into_found_or_default(self) -> T {
        self.found().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_table_relationship_is_omitted_from_json_when_absent() {
        let table = TableMetadata {
            table_name: "users".to_string(),
            columns: vec![ColumnMetadata {
                column_name: "id".to_string(),
                data_type: "int".to_string(),
            }],
            primary_key: vec!["id".to_string()],
            foreign_keys: vec![],
            relationship_type: None,
        };

        let json = serde_json_value(&table);
        assert!(!json.contains("\"relationship_type\""));
        assert!(json.contains("\"data_type\":\"int\""));
    }

    #[test]
    fn relationship_types_serialize_by_name() {
        let table = TableMetadata {
            table_name: "user_roles".to_string(),
            columns: vec![],
            primary_key: vec!["user_id".to_string(), "role_id".to_string()],
            foreign_keys: vec![ForeignKeyMetadata {
                source_column: "user_id".to_string(),
                target_table: "users".to_string(),
                target_column: "id".to_string(),
                relationship_type: RelationshipType::OneToOne,
            }],
            relationship_type: Some(RelationshipType::ManyToMany),
        };

        let json = serde_json_value(&table);
        assert!(json.contains("\"relationship_type\":\"ManyToMany\""));
        assert!(json.contains("\"relationship_type\":\"OneToOne\""));
        assert!(table.is_join_table());
    }

    #[test]
    fn unreachable_lookup_defaults_to_empty() {
        let lookup: Lookup<Vec<TableName>> = Lookup::Unreachable;
        assert!(lookup.is_unreachable());
        assert_eq!(lookup.into_found_or_default(), Vec::<TableName>::new());

        let lookup = Lookup::Found(vec!["users".to_string()]);
        assert_eq!(lookup.into_found_or_default(), vec!["users".to_string()]);
    }

    fn serde_json_value<T: Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap()
    }
}
