use std::path::PathBuf;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::service::ScheduleService;
use crate::{
    error::{Result, ScheduleError},
    table::visible::OccupancyTable,
};

/// Settings of the posting loop.
pub struct DaemonConfig {
    /// File holding the table in the `<table>` X/- text format.
    pub table: PathBuf,
    /// Post even outside of open access.
    pub force_scan: bool,
    /// Read the table but never post it.
    pub disable_post: bool,
    pub interval: Duration,
}

/// What a single pass of the loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    Closed,
    Posted,
    PostDisabled,
    Rejected,
}

/**
Parse the rows between the `<table>` and `</table>` lines.

Each row holds space separated cells, `X` for a machine in use and anything else for a free
one. Empty rows are skipped.
*/
pub fn parse_table(text: &str) -> Result<OccupancyTable> {
    let rows: Vec<&str> = text.lines().map(str::trim).collect();
    let start = rows
        .iter()
        .position(|row| *row == "<table>")
        .ok_or_else(|| ScheduleError::TableFormat("missing <table>".to_string()))?;
    let end = rows
        .iter()
        .position(|row| *row == "</table>")
        .filter(|end| *end > start)
        .ok_or_else(|| ScheduleError::TableFormat("missing </table>".to_string()))?;
    Ok(rows[start + 1..end]
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| row.split_whitespace().map(|cell| cell == "X").collect())
        .collect())
}

pub async fn read_table(config: &DaemonConfig) -> Result<OccupancyTable> {
    let text = tokio::fs::read_to_string(&config.table).await?;
    parse_table(&text)
}

/// Check the open access status and post the table if open (or forced).
pub async fn run_once(service: &ScheduleService, config: &DaemonConfig) -> Result<Iteration> {
    if !config.force_scan && !service.status().await? {
        debug!("open access: false");
        return Ok(Iteration::Closed);
    }
    debug!(
        "open access: true{}",
        if config.force_scan { " (forced)" } else { "" }
    );

    let table = read_table(config).await?;
    if config.disable_post {
        debug!("Posting disabled, table of {} rows not sent", table.len());
        return Ok(Iteration::PostDisabled);
    }
    let response = service.post(table).await?;
    if !response.is_updated() {
        warn!("Server did not store the table: {}", response.message);
        return Ok(Iteration::Rejected);
    }
    Ok(Iteration::Posted)
}

/// Run forever. Errors are logged and the next tick tries again.
pub async fn run(service: ScheduleService, config: DaemonConfig) {
    info!(
        "Posting {} every {:?}",
        config.table.display(),
        config.interval
    );
    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = run_once(&service, &config).await {
            error!("{}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::{client::test_server::spawn_server, options::config::MachineScheduleOptions};

    const TABLE: &str = "scan of the wall\n<table>\nX - X\n\n- - -\n</table>\ndone\n";

    fn table_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn config(file: &tempfile::NamedTempFile, force_scan: bool, disable_post: bool) -> DaemonConfig {
        DaemonConfig {
            table: file.path().to_path_buf(),
            force_scan,
            disable_post,
            interval: Duration::from_secs(1),
        }
    }

    async fn service(open: bool) -> ScheduleService {
        let options = MachineScheduleOptions {
            page_id: 3,
            ..MachineScheduleOptions::default()
        };
        ScheduleService::new(&spawn_server(options, open).await)
    }

    #[test]
    fn table_between_markers() {
        assert_eq!(
            parse_table(TABLE).unwrap(),
            vec![vec![true, false, true], vec![false, false, false]]
        );
    }

    #[test]
    fn empty_table() {
        assert!(parse_table("<table>\n</table>").unwrap().is_empty());
    }

    #[test]
    fn missing_markers_are_errors() {
        assert!(matches!(
            parse_table("X - X\n</table>"),
            Err(ScheduleError::TableFormat(_))
        ));
        assert!(matches!(
            parse_table("<table>\nX - X"),
            Err(ScheduleError::TableFormat(_))
        ));
        assert!(matches!(
            parse_table("</table>\n<table>"),
            Err(ScheduleError::TableFormat(_))
        ));
    }

    #[tokio::test]
    async fn posts_while_open() {
        let file = table_file(TABLE);
        let service = service(true).await;
        let result = run_once(&service, &config(&file, false, false)).await.unwrap();
        assert_eq!(result, Iteration::Posted);
        assert_eq!(
            service.get().await.unwrap(),
            Some(vec![vec![true, false, true], vec![false, false, false]])
        );
    }

    #[tokio::test]
    async fn waits_while_closed() {
        let file = table_file(TABLE);
        let service = service(false).await;
        let result = run_once(&service, &config(&file, false, false)).await.unwrap();
        assert_eq!(result, Iteration::Closed);
        assert_eq!(service.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn force_posts_while_closed() {
        let file = table_file(TABLE);
        let service = service(false).await;
        let result = run_once(&service, &config(&file, true, false)).await.unwrap();
        assert_eq!(result, Iteration::Posted);
        assert!(service.get().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn disabled_post_sends_nothing() {
        let file = table_file(TABLE);
        let service = service(true).await;
        let result = run_once(&service, &config(&file, false, true)).await.unwrap();
        assert_eq!(result, Iteration::PostDisabled);
        assert_eq!(service.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_without_page_rejects() {
        let file = table_file(TABLE);
        let url = spawn_server(MachineScheduleOptions::default(), true).await;
        let service = ScheduleService::new(&url);
        let result = run_once(&service, &config(&file, false, false)).await.unwrap();
        assert_eq!(result, Iteration::Rejected);
    }

    #[tokio::test]
    async fn malformed_table_file_is_an_error() {
        let file = table_file("X - X\n");
        let service = service(true).await;
        let result = run_once(&service, &config(&file, false, false)).await;
        assert!(matches!(result, Err(ScheduleError::TableFormat(_))));
        assert_eq!(service.get().await.unwrap(), None);
    }
}
