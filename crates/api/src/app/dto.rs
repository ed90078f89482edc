use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use printfleet_core::{PageRequest, SortDirection, SortSpec};
use printfleet_inventory::{StockQuery, TonerSortKey};
use printfleet_maintenance::{
    Equipment, MeterKind, MeterReading, meter::{period_differences, period_stats},
};

use crate::app::errors;

/// Period lengths (in readings) reported by the meter statistics.
pub const METER_STAT_PERIODS: [usize; 4] = [1, 3, 6, 12];

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct TonerRequest {
    pub name: String,
    pub performance: u64,
    pub quantity: u64,
}

#[derive(Debug, Deserialize)]
pub struct AdjustQuantityRequest {
    pub delta: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTonersQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    /// Sort the table was showing before this request. Re-sorting by the
    /// same key without a `direction` flips it.
    pub previous_sort: Option<String>,
    pub previous_direction: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecordExchangeRequest {
    pub toner_name: String,
    pub meter_count: u64,
    /// Defaults to the time the request is handled.
    pub exchanged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub lookback_months: Option<i64>,
    pub target_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsageQuery {
    pub lookback_months: Option<i64>,
}

impl ListTonersQuery {
    pub fn into_stock_query(self) -> Result<StockQuery, axum::response::Response> {
        let bad_query = |msg: String| errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", msg);

        let sort = match self.sort {
            None => None,
            Some(raw) => {
                let key: TonerSortKey = raw.parse().map_err(bad_query)?;
                let explicit = parse_direction(self.direction.as_deref()).map_err(bad_query)?;
                let previous = match self.previous_sort {
                    None => None,
                    Some(prev) => Some(SortSpec {
                        key: prev.parse::<TonerSortKey>().map_err(bad_query)?,
                        direction: parse_direction(self.previous_direction.as_deref())
                            .map_err(bad_query)?
                            .unwrap_or(SortDirection::Asc),
                    }),
                };
                Some(match explicit {
                    Some(direction) => SortSpec { key, direction },
                    None => SortSpec::toggle(previous, key),
                })
            }
        };

        let page = PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(PageRequest::DEFAULT_PER_PAGE),
        )
        .map_err(|e| bad_query(e.to_string()))?;

        Ok(StockQuery {
            search: self.search,
            sort,
            page,
        })
    }
}

fn parse_direction(raw: Option<&str>) -> Result<Option<SortDirection>, String> {
    match raw.map(str::to_lowercase).as_deref() {
        None => Ok(None),
        Some("asc") => Ok(Some(SortDirection::Asc)),
        Some("desc") => Ok(Some(SortDirection::Desc)),
        Some(other) => Err(format!("unknown sort direction: {other}")),
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn equipment_to_json(equipment: &Equipment) -> serde_json::Value {
    let mut body = serde_json::json!({
        "id": equipment.id_typed().to_string(),
        "repairs": equipment.repairs().len(),
        "meter_readings": equipment.meter_readings().len(),
        "exchanges": equipment.exchanges().len(),
    });

    if let (Some(details), Some(obj)) = (
        equipment.details().and_then(|d| serde_json::to_value(d).ok()),
        body.as_object_mut(),
    ) {
        if let Some(fields) = details.as_object() {
            for (k, v) in fields {
                obj.insert(k.clone(), v.clone());
            }
        }
    }

    body
}

/// One entry of an event history listing.
pub fn event_to_json(
    event_type: &str,
    occurred_at: DateTime<Utc>,
    event: &impl serde::Serialize,
) -> serde_json::Value {
    serde_json::json!({
        "type": event_type,
        "occurred_at": occurred_at,
        "event": event,
    })
}

pub fn meters_to_json(readings: &[MeterReading]) -> serde_json::Value {
    let stats: Vec<serde_json::Value> = METER_STAT_PERIODS
        .iter()
        .map(|&periods| {
            serde_json::json!({
                "periods": periods,
                "printed": period_stats(readings, periods, MeterKind::Printed),
                "copied": period_stats(readings, periods, MeterKind::Copied),
            })
        })
        .collect();

    serde_json::json!({
        "readings": readings,
        "differences": {
            "printed": period_differences(readings, MeterKind::Printed),
            "copied": period_differences(readings, MeterKind::Copied),
        },
        "stats": stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_sorted_paged_query() {
        let query = ListTonersQuery {
            search: Some("tn".to_string()),
            sort: Some("quantity".to_string()),
            direction: Some("DESC".to_string()),
            page: Some(2),
            per_page: Some(5),
            ..Default::default()
        }
        .into_stock_query()
        .unwrap();

        assert_eq!(query.sort.map(|s| s.key), Some(TonerSortKey::Quantity));
        assert_eq!(query.sort.map(|s| s.direction), Some(SortDirection::Desc));
        assert_eq!(query.page.page, 2);
        assert_eq!(query.page.per_page, 5);
    }

    #[test]
    fn resorting_by_the_same_column_flips_direction() {
        let sort_of = |sort: &str, previous: Option<(&str, &str)>| {
            ListTonersQuery {
                sort: Some(sort.to_string()),
                previous_sort: previous.map(|(k, _)| k.to_string()),
                previous_direction: previous.map(|(_, d)| d.to_string()),
                ..Default::default()
            }
            .into_stock_query()
            .unwrap()
            .sort
            .unwrap()
        };

        assert_eq!(sort_of("name", None).direction, SortDirection::Asc);
        assert_eq!(sort_of("name", Some(("name", "asc"))).direction, SortDirection::Desc);
        assert_eq!(sort_of("name", Some(("name", "desc"))).direction, SortDirection::Asc);
        assert_eq!(
            sort_of("quantity", Some(("name", "desc"))),
            SortSpec::asc(TonerSortKey::Quantity)
        );
    }

    #[test]
    fn explicit_direction_wins_over_previous_sort() {
        let query = ListTonersQuery {
            sort: Some("name".to_string()),
            direction: Some("asc".to_string()),
            previous_sort: Some("name".to_string()),
            previous_direction: Some("asc".to_string()),
            ..Default::default()
        }
        .into_stock_query()
        .unwrap();

        assert_eq!(query.sort.map(|s| s.direction), Some(SortDirection::Asc));
    }

    #[test]
    fn rejects_unknown_sort_and_zero_page() {
        let bad_sort = ListTonersQuery {
            sort: Some("colour".to_string()),
            ..Default::default()
        };
        assert_eq!(
            bad_sort.into_stock_query().unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );

        let bad_page = ListTonersQuery {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(
            bad_page.into_stock_query().unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn meter_report_has_every_period() {
        let readings = vec![
            MeterReading {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                printed_pages: 100,
                copied_pages: 10,
            },
            MeterReading {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                printed_pages: 400,
                copied_pages: 30,
            },
        ];

        let body = meters_to_json(&readings);
        assert_eq!(body["differences"]["printed"], serde_json::json!([0, 300]));
        assert_eq!(body["stats"].as_array().unwrap().len(), METER_STAT_PERIODS.len());
        assert_eq!(body["stats"][0]["printed"]["total"], 300);
    }
}
