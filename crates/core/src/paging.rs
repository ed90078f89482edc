//! Sorting and pagination helpers shared by the listing queries.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Sort direction for listing queries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Apply the direction to an ascending ordering.
    pub fn apply(self, ordering: core::cmp::Ordering) -> core::cmp::Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Sort instruction on a listing key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: PartialEq + Copy> SortSpec<K> {
    pub fn asc(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    /// Header-click semantics: sorting by the current key again flips the
    /// direction; sorting by a new key starts ascending.
    pub fn toggle(previous: Option<Self>, key: K) -> Self {
        match previous {
            Some(prev) if prev.key == key => Self {
                key,
                direction: prev.direction.reversed(),
            },
            _ => Self::asc(key),
        }
    }
}

/// 1-based page request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: usize = 10;

    pub fn new(page: usize, per_page: usize) -> DomainResult<Self> {
        if page == 0 {
            return Err(DomainError::validation("page numbers start at 1"));
        }
        if per_page == 0 {
            return Err(DomainError::validation("per_page must be positive"));
        }
        Ok(Self { page, per_page })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice `items` into the requested page.
///
/// `total_pages = ceil(len / per_page)`; a page past the end is empty rather
/// than an error.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_items.div_ceil(request.per_page);
    let start = (request.page - 1).saturating_mul(request.per_page);

    let items = items
        .into_iter()
        .skip(start)
        .take(request.per_page)
        .collect();

    Page {
        items,
        page: request.page,
        per_page: request.per_page,
        total_items,
        total_pages,
    }
}
