use std::collections::BTreeMap;

use sqlprep_quote::Engine;

use crate::error::SchemaError;
use crate::table::{Procedure, Table};

/// `(host, port)` — the key the schema cache in `sqlprep-cmd` uses to
/// invalidate a server's cached snapshot after DDL.
pub type ServerKey = (String, u16);

/// A snapshot of a database's structure: every table and stored procedure
/// this engine knows about, plus the server it was introspected from (if
/// any — hand-built schemas have no server).
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub engine: Engine,
    pub tables: BTreeMap<String, Table>,
    pub procs: BTreeMap<String, Procedure>,
    pub server_key: Option<ServerKey>,
    pub charset: Option<String>,
    pub collation: Option<String>,
}

impl Schema {
    pub fn new(engine: Engine) -> Schema {
        Schema {
            engine,
            tables: BTreeMap::new(),
            procs: BTreeMap::new(),
            server_key: None,
            charset: None,
            collation: None,
        }
    }

    pub fn with_server_key(mut self, key: ServerKey) -> Schema {
        self.server_key = Some(key);
        self
    }

    /// Inserts `table` keyed by its own `schema.table` qualified name.
    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.qualified_name(), table);
    }

    pub fn table(&self, qualified_name: &str) -> Option<&Table> {
        self.tables.get(qualified_name)
    }

    /// Validates every table, and that every fk's `ref_table`/`ref_cols`
    /// resolve within this schema (the fatal "foreign key with unresolved
    /// ref_cols" case).
    pub fn validate(&self) -> Result<(), SchemaError> {
        for table in self.tables.values() {
            table.validate()?;
            for (name, fk) in &table.fks {
                let referenced = self.tables.get(&fk.ref_table).ok_or_else(|| {
                    SchemaError::UnresolvedForeignKey {
                        table: table.qualified_name(),
                        fk: name.clone(),
                        ref_table: fk.ref_table.clone(),
                        column: fk.ref_cols.first().cloned().unwrap_or_default(),
                    }
                })?;
                for col in &fk.ref_cols {
                    if referenced.field(col).is_none() {
                        return Err(SchemaError::UnresolvedForeignKey {
                            table: table.qualified_name(),
                            fk: name.clone(),
                            ref_table: fk.ref_table.clone(),
                            column: col.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
