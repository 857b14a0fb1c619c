use std::net::SocketAddr;
use std::process::exit;

use axum::extract::{Path, Query};
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use log::*;
use serde_derive::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use atconfig::conf_reader::{read_atelier_env, read_config};
use atconfig::properties::{get_prop_pg_connect_string, get_prop_value, set_prop_values};
use atconfig::property_name::{LOG_CONFIG_FILE_PROPERTY, SERVER_PORT_PROPERTY};
use atdto::{JsonBytes, NewEntryRequest};
use commons_error::*;
use commons_pg::sql_transaction::init_db_pool;
use commons_services::token_lib::SessionToken;
use commons_services::x_request_id::XRequestID;

use crate::access_log::{AccessLogDelegate, AccessLogFilters};
use crate::new_entry::NewEntryDelegate;
use crate::schema_projects::install_schema;

mod access_log;
mod actions;
mod filename;
mod form;
mod new_entry;
mod schema_projects;

#[derive(Deserialize)]
struct UploadParams {
    file_name: String,
    path: Option<String>,
}

#[derive(Deserialize)]
struct ListingParams {
    path: Option<String>,
}

/// 🌟 Create a file, a folder or a download from the form candidate
///
/// POST /new_entry
async fn new_entry(
    session_token: SessionToken,
    x_request_id: XRequestID,
    Json(request): Json<NewEntryRequest>,
) -> JsonBytes {
    let mut delegate = NewEntryDelegate::new(session_token, x_request_id);
    delegate.new_entry(&request).await.into()
}

/// 🌟 Store an uploaded file in the project
///
/// POST /upload/:project_id?file_name=<name>&path=<folder>
async fn upload(
    session_token: SessionToken,
    x_request_id: XRequestID,
    Path(project_id): Path<Uuid>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> JsonBytes {
    let mut delegate = NewEntryDelegate::new(session_token, x_request_id);
    let path = params.path.unwrap_or_default();
    delegate
        .upload(&project_id, &path, &params.file_name, body)
        .await
        .into()
}

/// 🌟 Directory listing of a project folder
///
/// GET /listing/:project_id?path=<folder>
async fn listing(
    session_token: SessionToken,
    x_request_id: XRequestID,
    Path(project_id): Path<Uuid>,
    Query(params): Query<ListingParams>,
) -> JsonBytes {
    let mut delegate = NewEntryDelegate::new(session_token, x_request_id);
    let path = params.path.unwrap_or_default();
    delegate.listing(&project_id, &path).await.into()
}

/// 🌟 The file type registry behind the dropdown
///
/// GET /file_types
async fn file_types(session_token: SessionToken, x_request_id: XRequestID) -> JsonBytes {
    let mut delegate = NewEntryDelegate::new(session_token, x_request_id);
    delegate.file_types().await.into()
}

/// 🌟 Search the access rows of a project
///
/// GET /access/:project_id?account_id=&filename=&from=&to=&start=&length=
async fn search_access(
    session_token: SessionToken,
    x_request_id: XRequestID,
    Path(project_id): Path<Uuid>,
    Query(filters): Query<AccessLogFilters>,
) -> JsonBytes {
    let mut delegate = AccessLogDelegate::new(session_token, x_request_id);
    delegate.search_access(&project_id, &filters).await.into()
}

/// Main async routine
#[tokio::main(flavor = "multi_thread", worker_threads = 6)]
async fn main() {
    const PROGRAM_NAME: &str = "Project Server";

    println!("😎 Init {}", PROGRAM_NAME);

    const PROJECT_CODE: &str = "project-server";
    const VAR_NAME: &str = "ATELIER_ENV";

    // Read the application config's file
    println!(
        "😎 Config file using PROJECT_CODE={} VAR_NAME={}",
        PROJECT_CODE, VAR_NAME
    );

    let props = read_config(PROJECT_CODE, &read_atelier_env(VAR_NAME));
    set_prop_values(props);

    let Ok(port) = get_prop_value(SERVER_PORT_PROPERTY)
        .unwrap_or("".to_string())
        .parse::<u16>()
    else {
        eprintln!("💣 Cannot read the server port");
        exit(-56);
    };

    let Ok(log_config) = get_prop_value(LOG_CONFIG_FILE_PROPERTY) else {
        eprintln!("💣 Cannot read the log4rs config");
        exit(-57);
    };

    let log_config_path = std::path::Path::new(&log_config);

    // Read the global properties
    println!("😎 Read log properties from {:?}", &log_config_path);

    match log4rs::init_file(&log_config_path, Default::default()) {
        Err(e) => {
            eprintln!("{:?} {:?}", &log_config_path, e);
            exit(-59);
        }
        Ok(_) => {}
    }

    // Init DB pool
    let (connect_string, db_pool_size) = match get_prop_pg_connect_string()
        .map_err(err_fwd!("Cannot read the database connection information"))
    {
        Ok(x) => x,
        Err(e) => {
            log_error!("{:?}", e);
            exit(-64);
        }
    };

    if let Err(e) = init_db_pool(&connect_string, db_pool_size).await {
        log_error!("💣 Cannot init the db pool, error=[{}]", e);
        exit(-64);
    }

    if let Err(e) = install_schema().await {
        log_error!("💣 Cannot install the projects schema, error=[{}]", e);
        exit(-66);
    }

    log_info!("🚀 Start {} on port {}", PROGRAM_NAME, port);

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_origin(Any)
        .allow_headers(Any);

    let project_routes = Router::new()
        .route("/new_entry", post(new_entry))
        .route("/upload/:project_id", post(upload))
        .route("/listing/:project_id", get(listing))
        .route("/file_types", get(file_types))
        .route("/access/:project_id", get(search_access))
        .layer(cors);

    let base_url = format!("/{}", PROJECT_CODE);
    let app = Router::new().nest(&base_url, project_routes);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let Ok(listener) = tokio::net::TcpListener::bind(addr).await else {
        eprintln!("💣 Cannot bind the server on [{}]", addr);
        exit(-58);
    };
    if let Err(e) = axum::serve(listener, app).await {
        log_error!("💣 Server failure, error=[{}]", e);
        exit(-61);
    }

    log_info!("🏁 End {}", PROGRAM_NAME);
}
