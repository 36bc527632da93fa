//! Projection planner
//!
//! Compiles a `Selection` into the columns and blob extraction needed to
//! satisfy it, and nothing more.
//!
//! Rules (strict order):
//! 1. `id` is always fetched first
//! 2. `version` then `organisation_id` when flagged
//! 3. The blob is fetched when `type` or any attribute is flagged
//! 4. Every blob key flagged: the raw blob, decoded wholesale
//! 5. A strict subset flagged: only those keys, extracted by the engine
//!    from a blob holding every key

use std::fmt;

use crate::codec::BlobPath;
use crate::payment::Selection;

/// A first-class column of the payments table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Version,
    OrganisationId,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Version => "version",
            Column::OrganisationId => "organisation_id",
        }
    }
}

/// How the `data` column is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobFetch {
    /// Not read at all
    Skip,
    /// Read as opaque bytes and decoded in full
    Whole,
    /// Only the listed keys, assembled into a smaller JSON object; NULL
    /// when the blob isn't a complete payment object
    Paths(Vec<BlobPath>),
}

/// Immutable projection plan (no runtime state)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionPlan {
    /// Columns to fetch, in select order. Always starts with `Column::Id`.
    pub columns: Vec<Column>,
    /// Blob extraction, selected after the columns
    pub blob: BlobFetch,
    /// The selection this plan was compiled from
    pub selection: Selection,
}

impl ProjectionPlan {
    /// Returns true if the `data` column is read
    pub fn fetches_blob(&self) -> bool {
        self.blob != BlobFetch::Skip
    }

    /// Position of a column in the select list
    pub fn column_index(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// Position of the blob expression in the select list
    pub fn blob_index(&self) -> Option<usize> {
        if self.fetches_blob() {
            Some(self.columns.len())
        } else {
            None
        }
    }

    /// The SQL select list
    pub fn select_list(&self) -> String {
        let mut items: Vec<String> = self.columns.iter().map(|c| c.name().to_string()).collect();
        match &self.blob {
            BlobFetch::Skip => {}
            BlobFetch::Whole => items.push("data".to_string()),
            BlobFetch::Paths(paths) => items.push(path_extraction_sql(paths)),
        }
        items.join(", ")
    }
}

impl fmt::Display for ProjectionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols: Vec<&str> = self.columns.iter().map(|c| c.name()).collect();
        write!(f, "columns=[{}]", cols.join(","))?;
        match &self.blob {
            BlobFetch::Skip => write!(f, " blob=skip"),
            BlobFetch::Whole => write!(f, " blob=whole"),
            BlobFetch::Paths(paths) => {
                let keys: Vec<&str> = paths.iter().map(|p| p.key()).collect();
                write!(f, " blob=paths[{}]", keys.join(","))
            }
        }
    }
}

/// Builds the expression projecting the given keys out of `data`.
///
/// The keys are only extracted from a JSON object holding every blob key,
/// the same shape a whole decode demands. Anything else yields NULL, which
/// the store reports as `InvalidFormat`; `data` itself is never NULL. The
/// result is a BLOB.
fn path_extraction_sql(paths: &[BlobPath]) -> String {
    const DOC: &str = "CAST(data AS TEXT)";

    let missing: Vec<String> = BlobPath::ALL
        .iter()
        .map(|p| format!("json_type({DOC}, '$.{key}') IS NULL", key = p.key()))
        .collect();
    let pairs: Vec<String> = paths
        .iter()
        .map(|p| format!("'{key}', json_extract({DOC}, '$.{key}')", key = p.key()))
        .collect();

    // WHEN arms are evaluated in order; json_type only sees valid objects
    format!(
        "CAST(CASE WHEN NOT json_valid({DOC}) THEN NULL \
         WHEN json_type({DOC}) <> 'object' THEN NULL \
         WHEN {} THEN NULL \
         ELSE json_object({}) END AS BLOB)",
        missing.join(" OR "),
        pairs.join(", ")
    )
}

/// Compiles selections into projection plans
#[derive(Debug, Clone, Copy)]
pub struct ProjectionPlanner {
    path_extraction: bool,
}

impl Default for ProjectionPlanner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ProjectionPlanner {
    /// Creates a planner. With `path_extraction` off, partial selections
    /// fall back to reading the whole blob and discarding unselected keys.
    pub fn new(path_extraction: bool) -> Self {
        Self { path_extraction }
    }

    /// Plans a selection. Deterministic: same selection, same plan.
    pub fn plan(&self, selection: &Selection) -> ProjectionPlan {
        let mut columns = vec![Column::Id];
        if selection.version {
            columns.push(Column::Version);
        }
        if selection.organisation_id {
            columns.push(Column::OrganisationId);
        }

        let blob = if !selection.needs_blob() {
            BlobFetch::Skip
        } else if selection.selects_whole_blob() || !self.path_extraction {
            BlobFetch::Whole
        } else {
            BlobFetch::Paths(BlobPath::selected(selection))
        };

        ProjectionPlan {
            columns,
            blob,
            selection: *selection,
        }
    }
}
