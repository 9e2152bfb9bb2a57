use serde::{Deserialize, Serialize};

use crate::table::visible::OccupancyTable;

/// Body of `GET /open-access/v1/`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatusResponse {
    pub open_access: bool,
}

/// Body of `GET /open-access/v1/machine-schedule`. `table` is null when nothing is stored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScheduleResponse {
    pub table: Option<OccupancyTable>,
}

/// Body expected by `POST /open-access/v1/machine-schedule`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UpdateRequest {
    pub table: OccupancyTable,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UpdateData {
    pub table: OccupancyTable,
}

/// Answer to an update, echoing the table that was sent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UpdateResponse {
    pub code: String,
    pub message: String,
    pub data: UpdateData,
}

impl UpdateResponse {
    pub fn updated(table: OccupancyTable) -> Self {
        Self {
            code: "updated".to_string(),
            message: "Updated machine schedule.".to_string(),
            data: UpdateData { table },
        }
    }

    pub fn update_error(table: OccupancyTable) -> Self {
        Self {
            code: "update_error".to_string(),
            message: "Could not update machine schedule.".to_string(),
            data: UpdateData { table },
        }
    }

    pub fn is_updated(&self) -> bool {
        self.code == "updated"
    }
}
