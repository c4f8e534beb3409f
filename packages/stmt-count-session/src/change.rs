use crate::session::Row;

/// A write staged in the session, emitted as SQL on flush.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    /// Insert a new entity
    Insert { table: String, id: u64, row: Row },
    /// Overwrite an existing entity
    Update { table: String, id: u64, row: Row },
    /// Delete an entity
    Delete { table: String, id: u64 },
}

impl PendingWrite {
    pub fn table(&self) -> &str {
        match self {
            PendingWrite::Insert { table, .. }
            | PendingWrite::Update { table, .. }
            | PendingWrite::Delete { table, .. } => table,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            PendingWrite::Insert { id, .. }
            | PendingWrite::Update { id, .. }
            | PendingWrite::Delete { id, .. } => *id,
        }
    }

    /// Renders the SQL statement this write is flushed as.
    pub fn to_sql(&self) -> String {
        match self {
            PendingWrite::Insert { table, id, row } => format!(
                "insert into {table} (id, data) values ({id}, '{}')",
                quote(row)
            ),
            PendingWrite::Update { table, id, row } => format!(
                "update {table} set data = '{}' where id = {id}",
                quote(row)
            ),
            PendingWrite::Delete { table, id } => format!("delete from {table} where id = {id}"),
        }
    }
}

/// Serializes `row` for a single-quoted SQL literal.
fn quote(row: &Row) -> String {
    row.to_string().replace('\'', "''")
}
