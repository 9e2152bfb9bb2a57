use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::{Body, Incoming},
    header::{HeaderValue, CONTENT_TYPE},
    service::Service,
    Method, Request, Response, StatusCode,
};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use serde::Serialize;
use tracing::{debug, error, warn};
use url_escape::decode;

use std::{collections::HashMap, fmt::Display, future::Future, pin::Pin, sync::Arc};

use crate::{
    database::sqlite::TableStore, options::config::MachineScheduleOptions,
    timing::clock::Clock, API_BASE,
};

use super::myresponse::{ScheduleResponse, StatusResponse, UpdateRequest, UpdateResponse};

type HttpResult = Result<Response<Full<Bytes>>, hyper::Error>;

/// The Server
///
/// Handles the open access REST endpoints. Table storage goes through `TableStore`, the open
/// access status and visibility masks come from the options.
///
/// Cloned for every connection; all shared state sits behind `Arc`s.
#[derive(Clone)]
pub struct Server {
    connection_pool: Arc<Pool<SqliteConnectionManager>>,
    options: Arc<MachineScheduleOptions>,
    clock: Arc<dyn Clock>,
}

impl Server {
    pub fn setup(
        connection_pool: Arc<Pool<SqliteConnectionManager>>,
        options: Arc<MachineScheduleOptions>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connection_pool,
            options,
            clock,
        }
    }

    /// Parses the query parameters and returns a `hashmap` of key pair values
    /// Empty pairs are skipped and a key without `=` gets an empty value.
    /// Returns `None` if a pair has no key.
    fn parse_params(text: &str) -> Option<HashMap<String, String>> {
        let mut map: HashMap<String, String> = HashMap::new();
        for pair in text.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key.is_empty() {
                return None;
            }
            map.insert(decode(key).to_string(), decode(value).to_string());
        }
        Some(map)
    }

    /// Obtain a connection from the connection pool.
    fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, String> {
        self.connection_pool
            .get()
            .map_err(|err| format!("Could not get connection - Server.\n{}", err))
    }

    /// The page whose table is requested: `page_id` from the query, else the configured one.
    fn requested_page(&self, query: Option<&str>) -> Result<i64, &'static str> {
        let Some(query) = query else {
            return Ok(self.options.page_id);
        };
        let Some(map) = Self::parse_params(query) else {
            return Err("Malformed Parameters.");
        };
        match map.get("page_id") {
            None => Ok(self.options.page_id),
            Some(page_id) => page_id.parse().map_err(|_| "Malformed page_id"),
        }
    }

    /// The GET / endpoint.
    fn status(&self) -> HttpResult {
        match self.options.schedule_config().is_open(self.clock.now()) {
            Ok(open_access) => Self::ok_data(StatusResponse { open_access }),
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    /// The GET /machine-schedule endpoint. Serves the stored table without any masking.
    fn get_schedule(&self, query: Option<&str>) -> HttpResult {
        let page_id = match self.requested_page(query) {
            Ok(page_id) => page_id,
            Err(message) => return Self::bad_request(message),
        };
        let connection = match self.get_connection() {
            Ok(conn) => conn,
            Err(err) => return Self::server_error(&err),
        };
        match TableStore::query_table(&connection, page_id) {
            Ok(table) => Self::ok_data(ScheduleResponse { table }),
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    /// The GET /machine-schedule/visible endpoint.
    ///
    /// Returns the masked table with its labels while in open access. Returns a 204 when the
    /// fablab is closed or no table has been stored for the page. Honours `?page_id=` like
    /// the unmasked endpoint.
    fn get_visible_schedule(&self, query: Option<&str>) -> HttpResult {
        let page_id = match self.requested_page(query) {
            Ok(page_id) => page_id,
            Err(message) => return Self::bad_request(message),
        };
        match self.options.schedule_config().is_open(self.clock.now()) {
            Ok(true) => {}
            Ok(false) => return Self::no_data(),
            Err(err) => return Self::server_error(&err.to_string()),
        }
        let connection = match self.get_connection() {
            Ok(conn) => conn,
            Err(err) => return Self::server_error(&err),
        };
        match TableStore::query_table(&connection, page_id) {
            Ok(Some(table)) => Self::ok_data(self.options.visible_schedule(&table)),
            Ok(None) => Self::no_data(),
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    /// The POST /machine-schedule endpoint.
    ///
    /// Expects `{"table": [[bool]]}`. A failed write still answers 200, with the
    /// `update_error` code.
    async fn update_schedule<B>(&self, req: Request<B>) -> HttpResult
    where
        B: Body,
        B::Error: Display,
    {
        let body = match req.into_body().collect().await {
            Ok(body) => body.to_bytes(),
            Err(err) => return Self::bad_request(&format!("Could not read body. {}", err)),
        };
        let request: UpdateRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(err) => return Self::bad_request(&format!("Malformed table. {}", err)),
        };
        let connection = match self.get_connection() {
            Ok(conn) => conn,
            Err(err) => return Self::server_error(&err),
        };
        let stored = TableStore::update_table(&connection, self.options.page_id, &request.table);
        let response = match stored {
            Ok(true) => UpdateResponse::updated(request.table),
            Ok(false) => {
                warn!("No page configured, table not stored");
                UpdateResponse::update_error(request.table)
            }
            Err(err) => {
                error!("Could not store table.\n{}", err);
                UpdateResponse::update_error(request.table)
            }
        };
        Self::ok_data(response)
    }

    pub async fn route<B>(&self, req: Request<B>) -> HttpResult
    where
        B: Body,
        B::Error: Display,
    {
        debug!("{} {}", req.method(), req.uri());
        let Some(endpoint) = req.uri().path().strip_prefix(API_BASE) else {
            return Self::not_found("");
        };
        let endpoint = endpoint.to_string();
        let method = req.method().clone();
        match (method, endpoint.as_str()) {
            (Method::GET, "" | "/") => self.status(),
            (Method::GET, "/machine-schedule") => self.get_schedule(req.uri().query()),
            (Method::GET, "/machine-schedule/visible") => {
                self.get_visible_schedule(req.uri().query())
            }
            (Method::POST, "/machine-schedule") => self.update_schedule(req).await,
            _ => Self::not_found(""),
        }
    }

    fn respond(status: StatusCode, body: Bytes) -> HttpResult {
        let mut res = Response::new(Full::new(body));
        *res.status_mut() = status;
        if status != StatusCode::NO_CONTENT {
            res.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(res)
    }

    fn error_body(message: &str) -> Bytes {
        Bytes::from(serde_json::json!({ "error": message }).to_string())
    }

    /// Return a 200 OK response with the data provided.
    fn ok_data<T: Serialize>(body: T) -> HttpResult {
        match serde_json::to_string(&body) {
            Ok(data) => Self::respond(StatusCode::OK, Bytes::from(data)),
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    /// Return a 500 Internal Server Error response with the message provided.
    fn server_error(message: &str) -> HttpResult {
        error!("{}", message);
        Self::respond(StatusCode::INTERNAL_SERVER_ERROR, Self::error_body(message))
    }

    /// Return a 404 Not Found response with the message provided. The message here is optional.
    /// Leave it empty for no message.
    fn not_found(message: &str) -> HttpResult {
        let body = if message.is_empty() {
            Bytes::new()
        } else {
            Self::error_body(message)
        };
        Self::respond(StatusCode::NOT_FOUND, body)
    }

    /// Return a 400 Bad Request response with the message provided.
    fn bad_request(message: &str) -> HttpResult {
        Self::respond(StatusCode::BAD_REQUEST, Self::error_body(message))
    }

    /// Return a 204 No Content response.
    fn no_data() -> HttpResult {
        Self::respond(StatusCode::NO_CONTENT, Bytes::new())
    }
}

impl Service<Request<Incoming>> for Server {
    type Response = Response<Full<Bytes>>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let server = self.clone();
        Box::pin(async move { server.route(req).await })
    }
}
