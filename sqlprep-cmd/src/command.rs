//! Command Facade (CMD): routes SQL through TPL, shapes result sets, and
//! brackets transactions.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use sqlprep_core::TemplateEnvironment;
use sqlprep_introspect::AttrRegistry;
use sqlprep_quote::Value;
use sqlprep_schema::{Field, Schema, ServerKey};

use crate::cache::SchemaCache;
use crate::classifier::{is_primary_key_message, Classifier, ErrorTag};
use crate::connection::{Connection, PreparedStatement, QueryResult, Row};
use crate::ddl_detect;
use crate::error::{CmdError, DbError};

/// Result-shaping options (component design §4.8).
#[derive(Debug, Clone)]
pub struct ResultOptions {
    /// Route `sql` through TPL. `false` sends it to the connection as-is.
    pub parse: bool,
    /// Yield rows one at a time rather than all at once (callers using
    /// `each_row`/`each_row_vals` already get this; `to_array` signals
    /// the same mode for `query`'s batch return).
    pub to_array: bool,
    /// Project each row as a positional sequence instead of a name map.
    pub compact: bool,
    /// Overlay caller-supplied per-column attributes onto shaped fields.
    pub field_attrs: Option<Arc<AttrRegistry>>,
    /// Enrich each returned field with the canonical descriptor from the
    /// server's cached schema, looked up by column name across every
    /// cached table (the facade never parses `sql` to learn which table
    /// a column came from).
    pub get_table_defs: bool,
}

impl Default for ResultOptions {
    fn default() -> ResultOptions {
        ResultOptions {
            parse: true,
            to_array: false,
            compact: false,
            field_attrs: None,
            get_table_defs: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ShapedRow {
    Map(Vec<(String, Value)>),
    Array(Vec<Value>),
}

impl ShapedRow {
    pub fn values(&self) -> Vec<&Value> {
        match self {
            ShapedRow::Map(pairs) => pairs.iter().map(|(_, v)| v).collect(),
            ShapedRow::Array(values) => values.iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShapedField {
    pub name: String,
    pub table: Option<String>,
    pub descriptor: Option<Field>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    pub rows: Vec<ShapedRow>,
    pub fields: Vec<ShapedField>,
    pub has_more: bool,
    pub affected_rows: Option<u64>,
}

fn shape_row(row: &Row, compact: bool) -> ShapedRow {
    if compact {
        ShapedRow::Array(row.iter().map(|(_, v)| v.clone()).collect())
    } else {
        ShapedRow::Map(row.clone())
    }
}

fn find_descriptor(schema: Option<&Schema>, col: &str) -> Option<Field> {
    schema?.tables.values().find_map(|t| t.field(col).cloned())
}

fn shape_result(result: QueryResult, opts: &ResultOptions, schema: Option<&Schema>) -> QueryOutcome {
    let rows = result.rows.iter().map(|r| shape_row(r, opts.compact)).collect();
    let fields = result
        .fields
        .iter()
        .map(|f| {
            let mut descriptor = if opts.get_table_defs { find_descriptor(schema, &f.name) } else { None };
            if let (Some(overlay), Some(field)) = (&opts.field_attrs, &mut descriptor) {
                let qualified = match &f.table {
                    Some(table) => format!("{table}.{}", f.name),
                    None => f.name.clone(),
                };
                overlay.overlay(&qualified, field);
            }
            ShapedField { name: f.name.clone(), table: f.table.clone(), descriptor }
        })
        .collect();
    QueryOutcome { rows, fields, has_more: result.has_more, affected_rows: None }
}

/// Dropped without `finish()` having run: logs and marks the connection's
/// next operation as touching an abandoned transaction, since `Drop`
/// cannot `.await` a rollback itself (component design §4.9).
struct TransactionGuard {
    finished: bool,
    abandoned: Arc<AtomicBool>,
}

impl TransactionGuard {
    fn new(abandoned: Arc<AtomicBool>) -> TransactionGuard {
        TransactionGuard { finished: false, abandoned }
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!("transaction guard dropped without commit or rollback; marking connection's next operation abandoned");
            self.abandoned.store(true, Ordering::SeqCst);
        }
    }
}

pub struct Command {
    conn: Box<dyn Connection>,
    server_key: ServerKey,
    schema_cache: Arc<SchemaCache>,
    abandoned: Arc<AtomicBool>,
    classifier: Option<Arc<dyn Classifier>>,
}

impl Command {
    pub fn new(conn: Box<dyn Connection>, server_key: ServerKey, schema_cache: Arc<SchemaCache>) -> Command {
        Command { conn, server_key, schema_cache, abandoned: Arc::new(AtomicBool::new(false)), classifier: None }
    }

    /// Registers the engine-specific classifier (component design §7) that
    /// enriches every [`DbError`] this connection raises with a normalized
    /// `code` tag.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Command {
        self.classifier = Some(classifier);
        self
    }

    fn cached_schema(&self) -> Option<Arc<Schema>> {
        self.schema_cache.get(&self.server_key)
    }

    fn check_abandoned(&self) -> Result<(), CmdError> {
        if self.abandoned.load(Ordering::SeqCst) {
            return Err(CmdError::AbandonedTransaction);
        }
        Ok(())
    }

    /// Tags `err.code` from the registered classifier, upgrading a
    /// `UniqueKey` tag to `PrimaryKey` when the raw message names the
    /// `PRIMARY` key specifically (the classifier only sees `errno`, which
    /// MySQL reuses for both cases).
    fn classify_error(&self, mut err: DbError) -> DbError {
        if let Some(classifier) = &self.classifier {
            if let Some(mut tag) = classifier.classify(err.sqlcode as u16) {
                if tag == ErrorTag::UniqueKey && is_primary_key_message(&err.message) {
                    tag = ErrorTag::PrimaryKey;
                }
                err.code = Some(tag.as_str().to_string());
            }
        }
        err
    }

    async fn route(&mut self, sql: &str, env: &TemplateEnvironment, opts: &ResultOptions) -> Result<(String, QueryResult), CmdError> {
        self.check_abandoned()?;
        let final_sql = if opts.parse { sqlprep_core::render(sql, env)? } else { sql.to_string() };
        let result = self.conn.query(&final_sql).await.map_err(|e| self.classify_error(e))?;
        if ddl_detect::is_ddl(&final_sql) {
            self.schema_cache.invalidate(&self.server_key);
        }
        Ok((final_sql, result))
    }

    pub async fn query(&mut self, sql: &str, env: &TemplateEnvironment, opts: &ResultOptions) -> Result<QueryOutcome, CmdError> {
        let (_, result) = self.route(sql, env, opts).await?;
        let schema = self.cached_schema();
        Ok(shape_result(result, opts, schema.as_deref()))
    }

    pub async fn first_row(&mut self, sql: &str, env: &TemplateEnvironment, opts: &ResultOptions) -> Result<Option<ShapedRow>, CmdError> {
        let outcome = self.query(sql, env, opts).await?;
        Ok(outcome.rows.into_iter().next())
    }

    pub async fn each_row<F: FnMut(&ShapedRow)>(
        &mut self,
        sql: &str,
        env: &TemplateEnvironment,
        opts: &ResultOptions,
        mut f: F,
    ) -> Result<(), CmdError> {
        let outcome = self.query(sql, env, opts).await?;
        for row in &outcome.rows {
            f(row);
        }
        Ok(())
    }

    pub async fn each_row_vals<F: FnMut(&[Value])>(
        &mut self,
        sql: &str,
        env: &TemplateEnvironment,
        mut f: F,
    ) -> Result<(), CmdError> {
        let mut opts = ResultOptions::default();
        opts.compact = true;
        let outcome = self.query(sql, env, &opts).await?;
        for row in &outcome.rows {
            let values: Vec<Value> = row.values().into_iter().cloned().collect();
            f(&values);
        }
        Ok(())
    }

    /// Groups the rows of one result set by the value of `key_col`,
    /// preserving first-seen group order — the shape hierarchical joins
    /// need to reassemble one-to-many results from a flat row set.
    pub async fn each_group(
        &mut self,
        sql: &str,
        env: &TemplateEnvironment,
        opts: &ResultOptions,
        key_col: &str,
    ) -> Result<Vec<(Value, Vec<ShapedRow>)>, CmdError> {
        let outcome = self.query(sql, env, opts).await?;
        let mut groups: Vec<(Value, Vec<ShapedRow>)> = Vec::new();
        for row in outcome.rows {
            let key = match &row {
                ShapedRow::Map(pairs) => pairs.iter().find(|(name, _)| name == key_col).map(|(_, v)| v.clone()),
                ShapedRow::Array(_) => None,
            };
            let Some(key) = key else { continue };
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, rows)) => rows.push(row),
                None => groups.push((key, vec![row])),
            }
        }
        Ok(groups)
    }

    pub async fn exec(&mut self, sql: &str, env: &TemplateEnvironment) -> Result<u64, CmdError> {
        let opts = ResultOptions { parse: true, ..ResultOptions::default() };
        let (_, result) = self.route(sql, env, &opts).await?;
        Ok(result.rows.len() as u64)
    }

    pub async fn prepare(&mut self, sql: &str, env: &TemplateEnvironment) -> Result<PreparedCommand, CmdError> {
        self.check_abandoned()?;
        let expanded = sqlprep_core::prepare(sql, env)?;
        let stmt = self.conn.prepare(&expanded.sql).await.map_err(|e| self.classify_error(e))?;
        Ok(PreparedCommand {
            stmt,
            param_map: expanded.param_map,
            freed: false,
            classifier: self.classifier.clone(),
        })
    }

    /// Brackets `f` with `start transaction` and `commit`/`rollback`,
    /// re-raising any failure after the rollback completes. `f` returns a
    /// boxed, lifetime-scoped future (rather than a bare `Fut: Future`
    /// type parameter) because it borrows `&mut Command` across an
    /// `.await`, and a single generic `Fut` cannot vary with the
    /// higher-ranked borrow the way `Pin<Box<dyn Future + 'c>>` can.
    pub async fn atomic<T, F>(&mut self, f: F) -> Result<T, CmdError>
    where
        F: for<'c> FnOnce(&'c mut Command) -> Pin<Box<dyn Future<Output = Result<T, CmdError>> + 'c>>,
    {
        self.check_abandoned()?;
        self.conn.start_transaction().await?;
        let mut guard = TransactionGuard::new(self.abandoned.clone());
        let outcome = f(self).await;
        match outcome {
            Ok(value) => {
                self.conn.commit().await?;
                guard.finish();
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.rollback().await;
                guard.finish();
                Err(err)
            }
        }
    }
}

pub struct PreparedCommand {
    stmt: Box<dyn PreparedStatement>,
    param_map: Vec<sqlprep_core::BindSite>,
    freed: bool,
    classifier: Option<Arc<dyn Classifier>>,
}

impl PreparedCommand {
    fn resolve_values(&self, env: &TemplateEnvironment) -> Result<Vec<Value>, CmdError> {
        self.param_map
            .iter()
            .map(|site| match site {
                sqlprep_core::BindSite::Positional(idx) => env.arg(*idx).map(|v| v.clone()).map_err(CmdError::from),
                sqlprep_core::BindSite::Named(name) => env.param(name).map(|v| v.clone()).map_err(CmdError::from),
            })
            .collect()
    }

    fn classify_error(&self, mut err: DbError) -> DbError {
        if let Some(classifier) = &self.classifier {
            if let Some(mut tag) = classifier.classify(err.sqlcode as u16) {
                if tag == ErrorTag::UniqueKey && is_primary_key_message(&err.message) {
                    tag = ErrorTag::PrimaryKey;
                }
                err.code = Some(tag.as_str().to_string());
            }
        }
        err
    }

    pub async fn execute(&mut self, env: &TemplateEnvironment, opts: &ResultOptions) -> Result<QueryOutcome, CmdError> {
        if self.freed {
            return Err(CmdError::StatementFreed);
        }
        let values = self.resolve_values(env)?;
        let result = self.stmt.execute(values).await.map_err(|e| self.classify_error(e))?;
        Ok(shape_result(result, opts, None))
    }

    pub async fn free(&mut self) -> Result<(), CmdError> {
        if !self.freed {
            self.stmt.free().await.map_err(|e| self.classify_error(e))?;
            self.freed = true;
        }
        Ok(())
    }
}

impl Drop for PreparedCommand {
    fn drop(&mut self) {
        if !self.freed {
            warn!("prepared statement dropped without an explicit free()");
        }
    }
}
