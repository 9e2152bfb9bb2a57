use std::sync::Arc;

use chrono::{TimeZone, Utc};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use r2d2_sqlite::SqliteConnectionManager;
use tokio::net::TcpListener;

use crate::{
    database::sqlite::TableStore, options::config::MachineScheduleOptions, server::server::Server,
    timing::clock::FixedClock,
};

/// Serve on a random local port and return its base url.
///
/// With the default opening hours, `open` pins the clock to Thursday 16:00 in Luxembourg,
/// otherwise to Wednesday 16:00.
pub async fn spawn_server(options: MachineScheduleOptions, open: bool) -> String {
    let manager = SqliteConnectionManager::memory();
    let pool = Arc::new(r2d2::Pool::builder().max_size(1).build(manager).unwrap());
    TableStore::create_table(&pool).unwrap();
    let day = if open { 13 } else { 12 };
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, day, 14, 0, 0).unwrap());
    let server = Server::setup(pool, Arc::new(options), Arc::new(clock));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let server = server.clone();
            tokio::spawn(async move {
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), server)
                    .await;
            });
        }
    });
    format!("http://{}", address)
}
