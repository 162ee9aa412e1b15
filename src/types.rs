// =============================================================================
// Shared types used across the stock tracker
// =============================================================================

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One trading date as returned by the indicator service.
///
/// Every indicator column is optional: the service decides what it sends and
/// the presenter renders a missing value as an empty cell. Any column the
/// table does not show is kept in `extra` so a row stays equal to the object
/// it was parsed from. An explicit `null` is kept as `Some(Value::Null)` and
/// an absent key as `None`, so both survive re-serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    #[serde(
        rename = "Date",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Value>,
    #[serde(
        rename = "Close",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub close: Option<Value>,
    #[serde(
        rename = "SMA_50",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub sma_50: Option<Value>,
    #[serde(
        rename = "Upper_BB",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub upper_bb: Option<Value>,
    #[serde(
        rename = "Lower_BB",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub lower_bb: Option<Value>,
    #[serde(
        rename = "%K",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub stoch_k: Option<Value>,
    #[serde(
        rename = "%D",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub stoch_d: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A key that is present maps to `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl StockRow {
    /// The displayed columns, in table order.
    pub fn cells(&self) -> [Option<&Value>; 7] {
        [
            self.date.as_ref(),
            self.close.as_ref(),
            self.sma_50.as_ref(),
            self.upper_bb.as_ref(),
            self.lower_bb.as_ref(),
            self.stoch_k.as_ref(),
            self.stoch_d.as_ref(),
        ]
    }
}

/// Ordered rows for one symbol, in the order the service sent them.
/// Replaced wholesale on every successful fetch.
pub type Dataset = Arc<[StockRow]>;

pub fn empty_dataset() -> Dataset {
    Arc::from(Vec::new())
}

/// Outcome of the most recent fetch activity.
#[derive(Debug, Clone)]
pub enum FetchStatus {
    /// Nothing fetched yet, or the last success carried no rows.
    Idle,
    /// Last applied outcome was a success.
    Loaded(Dataset),
    /// Last applied outcome was an error. `retained` is the dataset that was
    /// current when the error arrived; it is carried, never cleared.
    Failed { message: String, retained: Dataset },
}

impl Default for FetchStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl FetchStatus {
    /// The active error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// The current dataset, including one retained behind an error.
    pub fn dataset(&self) -> &[StockRow] {
        match self {
            Self::Idle => &[],
            Self::Loaded(rows) => &rows[..],
            Self::Failed { retained, .. } => &retained[..],
        }
    }

    /// Record an error on top of whatever dataset is current.
    pub fn fail(self, message: impl Into<String>) -> Self {
        let retained = match self {
            Self::Idle => empty_dataset(),
            Self::Loaded(rows) => rows,
            Self::Failed { retained, .. } => retained,
        };
        Self::Failed {
            message: message.into(),
            retained,
        }
    }

    /// Replace the dataset with a successful response. An active error is
    /// left in place and carries the new rows; otherwise an empty response
    /// means `Idle`.
    pub fn replace_rows(self, rows: Vec<StockRow>) -> Self {
        match self {
            Self::Failed { message, .. } => Self::Failed {
                message,
                retained: Arc::from(rows),
            },
            _ if rows.is_empty() => Self::Idle,
            _ => Self::Loaded(Arc::from(rows)),
        }
    }

    /// Drop the active error, keeping the dataset it was carrying.
    pub fn clear_error(self) -> Self {
        match self {
            Self::Failed { retained, .. } if retained.is_empty() => Self::Idle,
            Self::Failed { retained, .. } => Self::Loaded(retained),
            other => other,
        }
    }
}

/// Everything the presenter needs. Replaced under one lock per transition.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Raw input text. Never trimmed.
    pub symbol: String,
    pub status: FetchStatus,
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn one_row() -> Dataset {
        Arc::from(vec![StockRow {
            date: Some(json!("2024-01-02")),
            ..Default::default()
        }])
    }

    #[test]
    fn row_parses_indicator_columns_and_keeps_the_rest() {
        let raw = json!({
            "Date": "2024-01-02",
            "Close": 150.2,
            "SMA_50": 148.0,
            "Upper_BB": 155.5,
            "Lower_BB": 140.5,
            "%K": 80,
            "%D": 70.25,
            "Volume": 1200
        });
        let row: StockRow = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(row.date, Some(json!("2024-01-02")));
        assert_eq!(row.stoch_k, Some(json!(80)));
        assert_eq!(row.extra.get("Volume"), Some(&json!(1200)));
        assert_eq!(serde_json::to_value(&row).unwrap(), raw);
    }

    #[test]
    fn null_columns_stay_apart_from_missing_ones() {
        let raw = json!({ "Date": "2024-01-02", "Close": 150.2, "SMA_50": null });
        let row: StockRow = serde_json::from_value(raw.clone()).unwrap();
        assert!(row.upper_bb.is_none());
        assert_eq!(row.sma_50, Some(Value::Null));
        assert_eq!(row.cells().iter().filter(|c| c.is_some()).count(), 3);
        assert_eq!(serde_json::to_value(&row).unwrap(), raw);
    }

    #[test]
    fn fail_retains_current_dataset() {
        let status = FetchStatus::Loaded(one_row()).fail("boom");
        assert_eq!(status.error_message(), Some("boom"));
        assert_eq!(status.dataset().len(), 1);

        let status = status.fail("again");
        assert_eq!(status.error_message(), Some("again"));
        assert_eq!(status.dataset().len(), 1);
    }

    #[test]
    fn new_rows_do_not_clear_an_active_error() {
        let status = FetchStatus::Idle.fail("Please enter a stock symbol");
        let rows = one_row().to_vec();

        let status = status.replace_rows(rows.clone());
        assert_eq!(status.error_message(), Some("Please enter a stock symbol"));
        assert_eq!(status.dataset(), rows.as_slice());

        let loaded = FetchStatus::Idle.replace_rows(rows);
        assert!(matches!(loaded, FetchStatus::Loaded(ref r) if r.len() == 1));
        assert!(matches!(loaded.replace_rows(Vec::new()), FetchStatus::Idle));
    }

    #[test]
    fn clear_error_restores_retained_rows_or_idle() {
        let cleared = FetchStatus::Loaded(one_row()).fail("x").clear_error();
        assert!(matches!(cleared, FetchStatus::Loaded(ref rows) if rows.len() == 1));

        let cleared = FetchStatus::Idle.fail("x").clear_error();
        assert!(matches!(cleared, FetchStatus::Idle));

        let untouched = FetchStatus::Loaded(one_row()).clear_error();
        assert!(untouched.error_message().is_none());
        assert_eq!(untouched.dataset().len(), 1);
    }
}
