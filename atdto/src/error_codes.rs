use http::StatusCode;
use once_cell::sync::Lazy;

use crate::ErrorSet;

pub static SUCCESS: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Success",
    http_error_code: StatusCode::OK.as_u16(),
});

pub static INVALID_TOKEN: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Invalid token",
    http_error_code: StatusCode::UNAUTHORIZED.as_u16(),
});

pub static INVALID_SID: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Invalid Sid",
    http_error_code: StatusCode::UNAUTHORIZED.as_u16(),
});

pub static INVALID_REQUEST: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Invalid request",
    http_error_code: StatusCode::BAD_REQUEST.as_u16(),
});

pub static INTERNAL_TECHNICAL_ERROR: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Internal technical error",
    http_error_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
});

pub static INTERNAL_DATABASE_ERROR: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Internal database error",
    http_error_code: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
});

/// New entry
pub static INVALID_PROJECT_ID: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Invalid project id",
    http_error_code: StatusCode::BAD_REQUEST.as_u16(),
});

pub static PROJECT_NOT_RUNNING: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "The project is not running. Please try again in a moment",
    http_error_code: StatusCode::CONFLICT.as_u16(),
});

pub static ENTRY_CREATION_FAILED: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Entry creation failed",
    http_error_code: StatusCode::BAD_REQUEST.as_u16(),
});

/// Upload
pub static UPLOAD_WRONG_FILE_NAME: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "File name is not a correct string",
    http_error_code: StatusCode::BAD_REQUEST.as_u16(),
});

pub static UPLOAD_FAILED: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Upload could not be handed over",
    http_error_code: StatusCode::BAD_GATEWAY.as_u16(),
});

/// Listing
pub static LISTING_NOT_AVAILABLE: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Directory listing not available",
    http_error_code: StatusCode::BAD_GATEWAY.as_u16(),
});

/// Access log
pub static ACCESS_LOG_NOT_AVAILABLE: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Access log not available",
    http_error_code: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
});

pub static HTTP_CLIENT_ERROR: Lazy<ErrorSet> = Lazy::new(|| ErrorSet {
    err_message: "Http Client Error",
    http_error_code: StatusCode::BAD_REQUEST.as_u16(),
});
