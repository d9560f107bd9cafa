use crate::core::{ClassSchema, PartCountError, Result, Row, Value};
use crate::query::Predicate;
use crate::storage::Workspace;
use std::collections::btree_map;
use std::sync::Arc;
use tracing::{trace, warn};

/// Cursor token that maps to the object-id field whatever its real name is.
pub const OID_TOKEN: &str = "OID@";
/// Cursor token that maps to the shape field whatever its real name is.
pub const SHAPE_TOKEN: &str = "SHAPE@";

/// One record projected to the fields a cursor was opened with, in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    fields: Arc<[String]>,
    values: Vec<Value>,
}

impl FeatureRow {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.position(field).map(|idx| &self.values[idx])
    }

    pub fn set(&mut self, field: &str, value: Value) -> Result<()> {
        let idx = self.position(field).ok_or_else(|| {
            PartCountError::ColumnNotFound(field.to_string(), "cursor row".to_string())
        })?;
        self.values[idx] = value;
        Ok(())
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.eq_ignore_ascii_case(field))
    }
}

/// Requested cursor fields resolved to schema column indexes.
#[derive(Debug, Clone)]
pub(crate) struct Projection {
    fields: Arc<[String]>,
    columns: Vec<usize>,
}

impl Projection {
    pub(crate) fn resolve<S: AsRef<str>>(fields: &[S], schema: &ClassSchema) -> Result<Self> {
        if fields.is_empty() {
            return Err(PartCountError::execution("A cursor needs at least one field"));
        }

        let columns = fields
            .iter()
            .map(|field| resolve_column(field.as_ref(), schema))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            columns,
        })
    }

    fn project(&self, row: &Row) -> FeatureRow {
        FeatureRow {
            fields: Arc::clone(&self.fields),
            values: self.columns.iter().map(|&idx| row[idx].clone()).collect(),
        }
    }
}

fn resolve_column(field: &str, schema: &ClassSchema) -> Result<usize> {
    if field.eq_ignore_ascii_case(OID_TOKEN) {
        return Ok(schema.oid_index());
    }
    if field.eq_ignore_ascii_case(SHAPE_TOKEN) {
        return Ok(schema.shape_index());
    }
    schema
        .find_field_index(field)
        .ok_or_else(|| PartCountError::ColumnNotFound(field.to_string(), schema.name().to_string()))
}

/// Forward-only read cursor. Holds a read lock on the workspace until it is
/// dropped, however iteration ends.
pub struct SearchCursor<'a> {
    workspace: &'a Workspace,
    schema: &'a ClassSchema,
    rows: btree_map::Iter<'a, i64, Row>,
    projection: Projection,
    predicate: Option<Predicate>,
}

impl<'a> SearchCursor<'a> {
    pub(crate) fn open<S: AsRef<str>>(
        workspace: &'a Workspace,
        class_name: &str,
        fields: &[S],
        query: Option<&str>,
    ) -> Result<Self> {
        let class = workspace.feature_class(class_name)?;
        let schema = class.schema();
        let projection = Projection::resolve(fields, schema)?;
        let predicate = Predicate::compile(query, schema)?;

        workspace.acquire_reader();
        trace!(feature_class = %class_name, ?query, "search cursor opened");

        Ok(Self {
            workspace,
            schema,
            rows: class.rows(),
            projection,
            predicate,
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.projection.fields
    }
}

impl Iterator for SearchCursor<'_> {
    type Item = Result<FeatureRow>;

    fn next(&mut self) -> Option<Self::Item> {
        for (_, row) in self.rows.by_ref() {
            if let Some(predicate) = &self.predicate {
                match predicate.matches(row, self.schema) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => return Some(Err(err)),
                }
            }
            return Some(Ok(self.projection.project(row)));
        }
        None
    }
}

impl Drop for SearchCursor<'_> {
    fn drop(&mut self) {
        self.workspace.release_reader();
        trace!(feature_class = %self.schema.name(), "search cursor released");
    }
}

/// Forward-only update cursor.
///
/// Each step hands out the current row together with a [`RowUpdater`] bound
/// to it; the row is only rewritten if the updater is used before the cursor
/// advances. Outside an edit session the changes are saved when the cursor is
/// closed.
pub struct UpdateCursor<'a> {
    workspace: &'a mut Workspace,
    class_name: String,
    pending: std::vec::IntoIter<i64>,
    projection: Projection,
    predicate: Option<Predicate>,
    dirty: bool,
    closed: bool,
}

impl<'a> UpdateCursor<'a> {
    pub(crate) fn open<S: AsRef<str>>(
        workspace: &'a mut Workspace,
        class_name: &str,
        fields: &[S],
        query: Option<&str>,
    ) -> Result<Self> {
        let class = workspace.feature_class(class_name)?;
        let schema = class.schema();
        let projection = Projection::resolve(fields, schema)?;
        let predicate = Predicate::compile(query, schema)?;
        let pending = class.oids().into_iter();

        trace!(feature_class = %class_name, ?query, "update cursor opened");

        Ok(Self {
            workspace,
            class_name: class_name.to_string(),
            pending,
            projection,
            predicate,
            dirty: false,
            closed: false,
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.projection.fields
    }

    /// Advance to the next matching row.
    pub fn next_row(&mut self) -> Option<Result<(FeatureRow, RowUpdater<'_>)>> {
        let (oid, row) = loop {
            let oid = self.pending.next()?;
            let class = match self.workspace.feature_class(&self.class_name) {
                Ok(class) => class,
                Err(err) => return Some(Err(err)),
            };
            let Some(stored) = class.get(oid) else {
                continue;
            };
            if let Some(predicate) = &self.predicate {
                match predicate.matches(stored, class.schema()) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => return Some(Err(err)),
                }
            }
            break (oid, self.projection.project(stored));
        };

        Some(Ok((
            row,
            RowUpdater {
                workspace: &mut *self.workspace,
                class_name: &self.class_name,
                oid,
                projection: &self.projection,
                dirty: &mut self.dirty,
            },
        )))
    }

    /// Release the cursor, saving its changes when no edit session is open.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.workspace.autocommit()?;
            self.dirty = false;
        }
        trace!(feature_class = %self.class_name, "update cursor released");
        Ok(())
    }
}

impl Drop for UpdateCursor<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.flush() {
            warn!(feature_class = %self.class_name, error = %err, "failed to save updates on cursor release");
        }
    }
}

/// Write handle for the row an [`UpdateCursor`] is positioned on.
pub struct RowUpdater<'c> {
    workspace: &'c mut Workspace,
    class_name: &'c str,
    oid: i64,
    projection: &'c Projection,
    dirty: &'c mut bool,
}

impl RowUpdater<'_> {
    pub fn oid(&self) -> i64 {
        self.oid
    }

    /// Replace the row's values, given in the cursor's field order.
    pub fn update_row(self, values: Vec<Value>) -> Result<()> {
        let RowUpdater {
            workspace,
            class_name,
            oid,
            projection,
            dirty,
        } = self;

        if values.len() != projection.columns.len() {
            return Err(PartCountError::execution(format!(
                "Expected {} values for fields {:?}, got {}",
                projection.columns.len(),
                projection.fields,
                values.len()
            )));
        }

        let class = workspace.feature_class_mut(class_name)?;
        for (&column, value) in projection.columns.iter().zip(values.iter()) {
            class.schema().fields()[column].validate(value)?;
        }

        *dirty = true;
        for (&column, value) in projection.columns.iter().zip(values.iter()) {
            class.set_value(oid, column, value)?;
        }
        Ok(())
    }
}
