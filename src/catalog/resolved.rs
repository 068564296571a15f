//! Resolved entity model: catalog config validated and flattened for runtime use.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// PostgreSQL type name, used for DDL and SQL casts.
    pub pg_type: String,
    pub nullable: bool,
    /// Whether the column has a DB default and may be omitted on insert.
    pub has_default: bool,
}

/// Columns backing the soft-delete marker: the boolean flag plus the
/// deletion timestamp stamped alongside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoftDeleteSpec {
    pub flag_column: String,
    pub timestamp_column: String,
}

/// Optional behaviors an entity's schema declares; generic operations are
/// gated on these rather than on field names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    SoftDelete,
    StatusToggle,
    WorkflowStatus,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::SoftDelete => "soft-delete",
            Capability::StatusToggle => "status-toggle",
            Capability::WorkflowStatus => "workflow-status",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Case-preserving identity used for display and logging.
    pub canonical_name: String,
    pub schema_name: String,
    pub table_name: String,
    pub pk_column: String,
    pub columns: Vec<ColumnInfo>,
    pub soft_delete: Option<SoftDeleteSpec>,
    pub toggle_column: Option<String>,
    pub workflow_column: Option<String>,
}

impl EntityDescriptor {
    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::SoftDelete => self.soft_delete.is_some(),
            Capability::StatusToggle => self.toggle_column.is_some(),
            Capability::WorkflowStatus => self.workflow_column.is_some(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}
