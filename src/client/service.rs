use reqwest::Client;
use tracing::info;

use crate::{
    error::{Result, ScheduleError},
    server::myresponse::{ScheduleResponse, StatusResponse, UpdateRequest, UpdateResponse},
    table::visible::{OccupancyTable, VisibleSchedule},
    API_BASE,
};

const ENDPOINTS: [(&str, &str); 3] = [
    ("status", "/"),
    ("schedule", "/machine-schedule"),
    ("visible", "/machine-schedule/visible"),
];

/// Talks to the open access REST endpoints of a schedule server.
pub struct ScheduleService {
    base_url: String,
    client: Client,
}

impl ScheduleService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            base_url: format!("{}{}", base_url, API_BASE),
            client: Client::new(),
        }
    }

    pub fn url_for(&self, service: &str) -> Result<String> {
        let (_, endpoint) = ENDPOINTS
            .iter()
            .find(|(name, _)| *name == service)
            .ok_or_else(|| ScheduleError::UnknownEndpoint(service.to_string()))?;
        Ok(format!("{}{}", self.base_url, endpoint))
    }

    pub async fn status(&self) -> Result<bool> {
        let url = self.url_for("status")?;
        info!("get {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let status: StatusResponse = response.json().await?;
        Ok(status.open_access)
    }

    pub async fn get(&self) -> Result<Option<OccupancyTable>> {
        let url = self.url_for("schedule")?;
        info!("get {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let schedule: ScheduleResponse = response.json().await?;
        Ok(schedule.table)
    }

    /// The masked schedule, or `None` while the fablab is closed.
    pub async fn get_visible(&self) -> Result<Option<VisibleSchedule>> {
        let url = self.url_for("visible")?;
        info!("get {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    pub async fn post(&self, table: OccupancyTable) -> Result<UpdateResponse> {
        let url = self.url_for("schedule")?;
        info!("post {}", url);
        let response = self
            .client
            .post(&url)
            .json(&UpdateRequest { table })
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

/// One line per machine, `X` for a booked slot and `-` for a free one.
pub fn format_table(table: &[Vec<bool>]) -> String {
    table
        .iter()
        .map(|row| {
            row.iter()
                .map(|booked| if *booked { "X" } else { "-" })
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .collect::<Vec<String>>()
        .join("\n")
}
