use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use r2d2_sqlite::SqliteConnectionManager;
use tokio::{net::TcpListener, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use machine_schedule::{
    client::{
        daemon::{self, DaemonConfig},
        service::{format_table, ScheduleService},
    },
    database::sqlite::TableStore,
    options::config::MachineScheduleOptions,
    server::server::Server,
    timing::{clock::SystemClock, time_slot::format_opening_hours},
    OccupancyTable, Result,
};

const DEFAULT_URL: &str = "http://127.0.0.1:7878";

#[derive(Parser)]
#[command(about = "Fablab machine use schedule and open access status")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the REST API
    Serve {
        #[arg(short, long, default_value = "machine_schedule.json")]
        config: PathBuf,
        #[arg(short, long, default_value = "data.db")]
        database: PathBuf,
        #[arg(short, long, default_value = "127.0.0.1:7878")]
        address: String,
    },
    /// Ask a server whether the fablab is in open access
    Status {
        #[arg(short, long, default_value = DEFAULT_URL)]
        base_url: String,
    },
    /// Print the schedule table of a server
    Get {
        #[arg(short, long, default_value = DEFAULT_URL)]
        base_url: String,
    },
    /// Upload a schedule table read from a JSON file
    Post {
        #[arg(short, long)]
        table: PathBuf,
        #[arg(short, long, default_value = DEFAULT_URL)]
        base_url: String,
    },
    /// Post a table file to a server whenever it is in open access
    Daemon {
        /// Table in the `<table>` X/- text format
        #[arg(short, long)]
        table: PathBuf,
        #[arg(short, long, default_value = DEFAULT_URL)]
        base_url: String,
        #[arg(short, long, default_value_t = 1)]
        interval_secs: u64,
        /// Post even outside of open access hours
        #[arg(short = 's', long)]
        force_scan: bool,
        /// Never post the table to the server
        #[arg(short = 'p', long)]
        disable_post: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let result = match Cli::parse().command {
        Command::Serve {
            config,
            database,
            address,
        } => serve(config, database, &address).await,
        Command::Status { base_url } => status(&base_url).await,
        Command::Get { base_url } => get(&base_url).await,
        Command::Post { table, base_url } => post(table, &base_url).await,
        Command::Daemon {
            table,
            base_url,
            interval_secs,
            force_scan,
            disable_post,
        } => {
            let config = DaemonConfig {
                table,
                force_scan,
                disable_post,
                interval: Duration::from_secs(interval_secs.max(1)),
            };
            daemon::run(ScheduleService::new(&base_url), config).await;
            Ok(())
        }
    };
    if let Err(err) = result {
        error!("{}", err);
        std::process::exit(1);
    }
}

async fn serve(config: PathBuf, database: PathBuf, address: &str) -> Result<()> {
    let options = MachineScheduleOptions::from_file(&config)?;
    info!(
        "Open access in {}:\n{}",
        options.timezone,
        format_opening_hours(&options.opening_hours)
    );

    let manager = SqliteConnectionManager::file(database);
    let pool = r2d2::Pool::builder().build(manager)?;
    let pool = Arc::new(pool);
    TableStore::create_table(&pool)?;

    let server = Server::setup(pool, Arc::new(options), Arc::new(SystemClock));

    let listener = TcpListener::bind(address).await?;
    info!("Listening on {}", address);

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(connection) => connection,
            Err(err) => {
                error!("Could not accept connection.\n{}", err);
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let server_clone = server.clone();
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(io, server_clone)
                .await
            {
                error!("{}", err);
            }
        });
    }
}

async fn status(base_url: &str) -> Result<()> {
    let open_access = ScheduleService::new(base_url).status().await?;
    println!("open access: {}", open_access);
    Ok(())
}

async fn get(base_url: &str) -> Result<()> {
    match ScheduleService::new(base_url).get().await? {
        Some(table) => println!("{}", format_table(&table)),
        None => println!("no schedule stored"),
    }
    Ok(())
}

async fn post(table: PathBuf, base_url: &str) -> Result<()> {
    let table: OccupancyTable = serde_json::from_str(&std::fs::read_to_string(table)?)?;
    let response = ScheduleService::new(base_url).post(table).await?;
    println!("{}", response.message);
    println!("{}", format_table(&response.data.table));
    Ok(())
}
