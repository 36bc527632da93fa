//! Filter, sort and chunk of payment listings

use uuid::Uuid;

/// Rows matched by a find. All present conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub organisation_id: Option<Uuid>,
    pub payment_type: Option<String>,
}

impl Filter {
    /// Matches every payment
    pub fn any() -> Self {
        Self::default()
    }

    pub fn organisation(mut self, organisation_id: Uuid) -> Self {
        self.organisation_id = Some(organisation_id);
        self
    }

    pub fn payment_type(mut self, payment_type: impl Into<String>) -> Self {
        self.payment_type = Some(payment_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.organisation_id.is_none() && self.payment_type.is_none()
    }
}

/// Sortable payment fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Version,
    OrganisationId,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort order for find results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// A page of results: skip `offset` rows, return at most `limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub offset: u64,
    pub limit: u64,
}

impl Chunk {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// First page of the given size
    pub fn first(limit: u64) -> Self {
        Self { offset: 0, limit }
    }

    /// The page following this one
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}
