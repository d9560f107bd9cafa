//! Count the parts of every multipart feature and store the counts in a
//! SHORT field.

use crate::config::CountOptions;
use crate::core::{FieldType, PartCountError, Result, ShapeType, Value};
use crate::dataset::{Dataset, OID_TOKEN, SHAPE_TOKEN};
use crate::storage::Workspace;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, info_span};

pub use crate::config::DEFAULT_FIELD_NAME;

/// Object id → number of parts, for multipart features only.
pub type PartCountMap = BTreeMap<i64, i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOutcome {
    /// Nothing to count; the dataset was left alone.
    NoMultipart,
    /// Counted but not written.
    Reported,
    /// Counts stored in the output field.
    Written,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountReport {
    pub dataset: String,
    pub multipart_count: usize,
    pub field_written: Option<String>,
    pub outcome: CountOutcome,
}

impl CountReport {
    fn no_multipart(dataset: &str) -> Self {
        Self {
            dataset: dataset.to_string(),
            multipart_count: 0,
            field_written: None,
            outcome: CountOutcome::NoMultipart,
        }
    }
}

impl fmt::Display for CountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            CountOutcome::NoMultipart => write!(f, "No multipart features found"),
            CountOutcome::Reported | CountOutcome::Written => write!(
                f,
                "{} multipart features found in {}",
                self.multipart_count, self.dataset
            ),
        }
    }
}

/// Scan every row and record the part count of each multipart geometry.
/// Rows without a geometry are skipped.
pub fn collect_part_counts(dataset: &Dataset) -> Result<PartCountMap> {
    let mut counts = PartCountMap::new();

    for row in dataset.read_rows(&[OID_TOKEN, SHAPE_TOKEN], None)? {
        let row = row?;
        let Some(geometry) = row.get(SHAPE_TOKEN).and_then(Value::as_geometry) else {
            continue;
        };
        if !geometry.is_multipart() {
            continue;
        }
        let oid = row_oid(&row)?;
        counts.insert(oid, geometry.part_count() as i64);
    }

    Ok(counts)
}

/// `<oid field> IN (k1,k2,...)` over the keys of `counts`, ascending.
pub fn multipart_filter(oid_field_name: &str, counts: &PartCountMap) -> String {
    let keys: Vec<String> = counts.keys().map(i64::to_string).collect();
    format!("{} IN ({})", oid_field_name, keys.join(","))
}

/// Count the multipart features of the dataset at `path` and, unless
/// `report_only` is set, write each count into `options.field_name`.
///
/// Non-multipart rows keep the field default (NULL). The field change and the
/// row updates share one edit session, so a failure part way leaves the
/// workspace file as it was.
pub fn count_multipart<P: AsRef<Path>>(path: P, options: &CountOptions) -> Result<CountReport> {
    let path = path.as_ref();
    let span = info_span!("count_multipart", dataset = %path.display());
    let _enter = span.enter();

    let dataset = Dataset::open(path)?;
    run(dataset, options)
}

/// Run [`count_multipart`] over every feature class in a workspace whose name
/// matches `wildcard`. Stops at the first failing class.
pub fn count_multipart_in_workspace<P: AsRef<Path>>(
    path: P,
    wildcard: Option<&str>,
    options: &CountOptions,
) -> Result<Vec<CountReport>> {
    let path = path.as_ref();
    let span = info_span!("count_multipart_in_workspace", workspace = %path.display(), ?wildcard);
    let _enter = span.enter();

    let names = Workspace::open(path)?.list_feature_classes(wildcard)?;
    info!(feature_classes = names.len(), "processing workspace");

    let mut reports = Vec::with_capacity(names.len());
    for name in names {
        reports.push(count_multipart(path.join(&name), options)?);
    }
    Ok(reports)
}

fn run(mut dataset: Dataset, options: &CountOptions) -> Result<CountReport> {
    let shape_type = dataset.shape_type();
    if shape_type == ShapeType::MultiPatch {
        return Err(PartCountError::UnsupportedGeometryType(shape_type.to_string()));
    }

    let counts = collect_part_counts(&dataset)?;
    debug!(multipart = counts.len(), "scan complete");

    if counts.is_empty() {
        let report = CountReport::no_multipart(dataset.base_name());
        info!("{}", report);
        return Ok(report);
    }

    let field_name = options.field_name.as_str();
    let mut report = CountReport {
        dataset: dataset.base_name().to_string(),
        multipart_count: counts.len(),
        field_written: None,
        outcome: CountOutcome::Reported,
    };

    if !options.report_only {
        options.validate()?;
        write_counts(&mut dataset, field_name, options.overwrite, &counts)?;
        report.field_written = Some(field_name.to_string());
        report.outcome = CountOutcome::Written;
    }

    info!("{}", report);
    Ok(report)
}

fn write_counts(
    dataset: &mut Dataset,
    field_name: &str,
    overwrite: bool,
    counts: &PartCountMap,
) -> Result<()> {
    let exists = dataset.has_field(field_name)?;
    if exists && !overwrite {
        return Err(PartCountError::FieldExists {
            field: field_name.to_string(),
            dataset: dataset.catalog_path().display().to_string(),
        });
    }

    let query = multipart_filter(dataset.oid_field_name(), counts);
    let mut session = dataset.edit()?;

    if exists {
        session.delete_field(field_name)?;
    }
    session.add_field(field_name, FieldType::Short)?;

    let fields = [OID_TOKEN, field_name];
    let mut cursor = session.update_rows(&fields, Some(&query))?;
    let mut updated = 0usize;
    while let Some(step) = cursor.next_row() {
        let (mut row, updater) = step?;
        let oid = row_oid(&row)?;
        let parts = counts.get(&oid).copied().ok_or_else(|| {
            PartCountError::execution(format!("Row {} was not counted during the scan", oid))
        })?;
        row.set(field_name, Value::Integer(parts))?;
        updater.update_row(row.into_values())?;
        updated += 1;
    }
    cursor.close()?;
    debug!(rows = updated, field = %field_name, "rows updated");

    session.stop(true)
}

fn row_oid(row: &crate::dataset::FeatureRow) -> Result<i64> {
    row.get(OID_TOKEN)
        .and_then(Value::as_i64)
        .ok_or_else(|| PartCountError::execution("Cursor row has no object id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_filter_sorted() {
        let counts: PartCountMap = [(12, 2), (3, 5), (7, 4)].into_iter().collect();
        assert_eq!(multipart_filter("FID", &counts), "FID IN (3,7,12)");
    }

    #[test]
    fn test_report_messages() {
        let report = CountReport {
            dataset: "parcels".to_string(),
            multipart_count: 2,
            field_written: Some("PartCount".to_string()),
            outcome: CountOutcome::Written,
        };
        assert_eq!(report.to_string(), "2 multipart features found in parcels");
        assert_eq!(
            CountReport::no_multipart("parcels").to_string(),
            "No multipart features found"
        );
    }
}
