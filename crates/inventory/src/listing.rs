//! Stock listing: search, sort and paginate toner rows.

use serde::{Deserialize, Serialize};

use printfleet_core::{Page, PageRequest, SortSpec, TonerId, paginate};

/// One row of the stock table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonerSummary {
    pub id: TonerId,
    pub name: String,
    pub performance: u64,
    pub quantity: u64,
}

/// Columns the stock table can be sorted by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TonerSortKey {
    Name,
    Performance,
    Quantity,
}

impl core::str::FromStr for TonerSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "performance" => Ok(Self::Performance),
            "quantity" => Ok(Self::Quantity),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Listing query over the stock table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockQuery {
    /// Case-insensitive substring filter on the toner name.
    pub search: Option<String>,
    pub sort: Option<SortSpec<TonerSortKey>>,
    pub page: PageRequest,
}

impl StockQuery {
    pub fn run(&self, rows: Vec<TonerSummary>) -> Page<TonerSummary> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<TonerSummary> = match needle {
            Some(needle) => rows
                .into_iter()
                .filter(|r| r.name.to_lowercase().contains(&needle))
                .collect(),
            None => rows,
        };

        if let Some(sort) = self.sort {
            // Stable sort: equal keys keep their incoming order.
            rows.sort_by(|a, b| {
                let ordering = match sort.key {
                    TonerSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                    TonerSortKey::Performance => a.performance.cmp(&b.performance),
                    TonerSortKey::Quantity => a.quantity.cmp(&b.quantity),
                };
                sort.direction.apply(ordering)
            });
        }

        paginate(rows, self.page)
    }
}
