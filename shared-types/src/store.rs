use serde::{Deserialize, Serialize};

/// Row handed to the destination store: one page/record per shift.
///
/// The weekday is derived by the store from `date` and is never written here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRow {
    pub title: String,
    pub date: String, // YYYY-MM-DD
    pub time: String,
    pub location: String, // Category/select value; the store creates new options
    pub notes: String,
}
