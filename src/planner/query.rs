//! Find planner
//!
//! Turns a filter, a selection, an optional sort and a chunk into a single
//! bounded statement. Every plan carries a positive limit no greater than
//! the configured maximum, and orders by `id` last so pages are stable.

use rusqlite::types::Value;

use crate::payment::{Chunk, Filter, PaymentError, PaymentResult, Selection, Sort, SortField};

use super::projection::{ProjectionPlan, ProjectionPlanner};

/// Immutable find plan
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub projection: ProjectionPlan,
    /// Statement with positional parameters
    pub sql: String,
    /// Parameters, in order
    pub params: Vec<Value>,
}

/// Plans find queries
#[derive(Debug, Clone, Copy)]
pub struct QueryPlanner {
    projection: ProjectionPlanner,
    max_chunk_size: u64,
}

impl QueryPlanner {
    pub fn new(projection: ProjectionPlanner, max_chunk_size: u64) -> Self {
        Self {
            projection,
            max_chunk_size,
        }
    }

    /// Plans the read of a single payment by identity
    pub fn plan_get(&self, selection: &Selection) -> ProjectionPlan {
        self.projection.plan(selection)
    }

    /// Plans a find. Fails with `InvalidArgument` on an unbounded chunk.
    pub fn plan_find(
        &self,
        filter: &Filter,
        selection: &Selection,
        sort: Option<Sort>,
        chunk: Chunk,
    ) -> PaymentResult<QueryPlan> {
        self.check_chunk(chunk)?;

        let projection = self.projection.plan(selection);
        let mut sql = format!("SELECT {} FROM payments", projection.select_list());
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(org) = filter.organisation_id {
            conditions.push("organisation_id = ?");
            params.push(Value::Text(org.to_string()));
        }
        if let Some(ref payment_type) = filter.payment_type {
            conditions.push(
                "CASE WHEN json_valid(CAST(data AS TEXT)) \
                 THEN json_extract(CAST(data AS TEXT), '$.type') END = ?",
            );
            params.push(Value::Text(payment_type.clone()));
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(&order_by(sort));

        sql.push_str(" LIMIT ? OFFSET ?");
        // both bounded by check_chunk
        params.push(Value::Integer(chunk.limit as i64));
        params.push(Value::Integer(chunk.offset as i64));

        Ok(QueryPlan {
            projection,
            sql,
            params,
        })
    }

    fn check_chunk(&self, chunk: Chunk) -> PaymentResult<()> {
        if chunk.limit == 0 {
            return Err(PaymentError::invalid_argument(
                "chunk.limit",
                chunk.limit,
                "chunk limit must be positive",
            ));
        }
        if chunk.limit > self.max_chunk_size {
            return Err(PaymentError::invalid_argument(
                "chunk.limit",
                chunk.limit,
                format!("chunk limit must not exceed {}", self.max_chunk_size),
            ));
        }
        if chunk.offset > i64::MAX as u64 {
            return Err(PaymentError::invalid_argument(
                "chunk.offset",
                chunk.offset,
                "chunk offset out of range",
            ));
        }
        Ok(())
    }
}

fn order_by(sort: Option<Sort>) -> String {
    let Some(sort) = sort else {
        return "id ASC".to_string();
    };
    let column = match sort.field {
        SortField::Id => return format!("id {}", sort.direction.as_str()),
        SortField::Version => "version",
        SortField::OrganisationId => "organisation_id",
    };
    format!("{} {}, id ASC", column, sort.direction.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::ErrorKind;
    use uuid::Uuid;

    fn planner() -> QueryPlanner {
        QueryPlanner::new(ProjectionPlanner::default(), 100)
    }

    #[test]
    fn test_unfiltered_find() {
        let plan = planner()
            .plan_find(&Filter::any(), &Selection::id_only(), None, Chunk::first(10))
            .unwrap();
        assert_eq!(
            plan.sql,
            "SELECT id FROM payments ORDER BY id ASC LIMIT ? OFFSET ?"
        );
        assert_eq!(plan.params, vec![Value::Integer(10), Value::Integer(0)]);
    }

    #[test]
    fn test_filters_are_and_combined() {
        let org = Uuid::new_v4();
        let plan = planner()
            .plan_find(
                &Filter::any().organisation(org).payment_type("credit"),
                &Selection::id_only().with_version(),
                Some(Sort::desc(SortField::Version)),
                Chunk::new(20, 10),
            )
            .unwrap();
        assert!(plan.sql.starts_with("SELECT id, version FROM payments WHERE organisation_id = ? AND CASE"));
        assert!(plan.sql.contains("'$.type') END = ?"));
        assert!(plan.sql.ends_with("ORDER BY version DESC, id ASC LIMIT ? OFFSET ?"));
        assert_eq!(
            plan.params,
            vec![
                Value::Text(org.to_string()),
                Value::Text("credit".into()),
                Value::Integer(10),
                Value::Integer(20),
            ]
        );
    }

    #[test]
    fn test_sort_by_id_desc() {
        let plan = planner()
            .plan_find(
                &Filter::any(),
                &Selection::id_only(),
                Some(Sort::desc(SortField::Id)),
                Chunk::first(1),
            )
            .unwrap();
        assert!(plan.sql.contains("ORDER BY id DESC LIMIT"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = planner()
            .plan_find(&Filter::any(), &Selection::id_only(), None, Chunk::first(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("arg.chunk.limit=0"));
    }

    #[test]
    fn test_oversized_limit_rejected() {
        let err = planner()
            .plan_find(&Filter::any(), &Selection::id_only(), None, Chunk::first(101))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_offset_out_of_range_rejected() {
        let err = planner()
            .plan_find(&Filter::any(), &Selection::id_only(), None, Chunk::new(u64::MAX, 1))
            .unwrap_err();
        assert!(err.to_string().contains("arg.chunk.offset"));
    }
}
