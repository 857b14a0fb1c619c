use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::CONTENT_TYPE;
use http::{HeaderName, StatusCode};
use serde::de;
use serde::Serialize;
use serde_derive::Deserialize;
use uuid::Uuid;

pub use crate::api_error::ApiError;
use crate::error_codes::INTERNAL_TECHNICAL_ERROR;

pub mod api_error;
pub mod error_codes;

///
/// Commons DTO
///

#[derive(Debug)]
pub struct ErrorSet<'a> {
    pub err_message: &'a str,
    pub http_error_code: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SimpleMessage {
    pub message: String,
}

///
/// Builder for the typed replies, implemented by WebType and WebResponse
///
pub trait WebTypeBuilder<T> {
    fn from_simple(code: u16, simple: SimpleMessage) -> Self;
    fn from_item(code: u16, item: T) -> Self;
    fn from_errorset(error: &ErrorSet<'static>) -> Self;
}

/// Typed reply of the web api routes
pub struct WebType<T> {
    pub http_code: StatusCode,
    pub result: Result<T, SimpleMessage>,
}

/// A response with a potential error related to a http code
/// (500, CONTENT_TYPE, message)
pub type JsonBytes = (StatusCode, [(HeaderName, &'static str); 1], Bytes);

///
/// * Allow the conversion of a WebType<T> to a JsonBytes
///
impl<T> Into<JsonBytes> for WebType<T>
where
    T: Serialize,
{
    fn into(self) -> JsonBytes {
        let binary = match self.result {
            Ok(value) => serialize_to_bytes(&value),
            Err(error) => serialize_to_bytes(&SimpleMessage {
                message: error.message.to_string(),
            }),
        };

        (self.http_code, [(CONTENT_TYPE, "application/json")], binary)
    }
}

fn serialize_to_bytes<T: Serialize>(value: &T) -> Bytes {
    match serde_json::to_vec(value) {
        Ok(json_data) => Bytes::from(json_data),
        Err(_) => Bytes::from(INTERNAL_TECHNICAL_ERROR.err_message.as_bytes()),
    }
}

impl<T> WebTypeBuilder<T> for WebType<T>
where
    T: de::DeserializeOwned + Serialize,
{
    fn from_simple(code: u16, simple: SimpleMessage) -> Self {
        Self {
            http_code: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            result: Err(simple),
        }
    }

    fn from_item(code: u16, item: T) -> Self {
        Self {
            http_code: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            result: Ok(item),
        }
    }

    fn from_errorset(error: &ErrorSet<'static>) -> Self {
        Self {
            http_code: StatusCode::from_u16(error.http_error_code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            result: Err(SimpleMessage {
                message: error.err_message.to_string(),
            }),
        }
    }
}

impl<T> From<ApiError<'static>> for WebType<T> {
    fn from(api_error: ApiError<'static>) -> Self {
        Self {
            http_code: StatusCode::from_u16(api_error.http_error_code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            result: Err(SimpleMessage {
                message: api_error.message.to_string(),
            }),
        }
    }
}

/// Result of the inner service routines and of the request clients.
/// On the error side the http code travels with the message.
pub type WebResponse<T> = Result<T, ApiError<'static>>;

impl<T> WebTypeBuilder<T> for WebResponse<T> {
    fn from_simple(code: u16, simple: SimpleMessage) -> Self {
        Err(ApiError::owned(code, simple.message))
    }

    // The http code of a success does not travel with a WebResponse
    fn from_item(_code: u16, item: T) -> Self {
        Ok(item)
    }

    fn from_errorset(error: &ErrorSet<'static>) -> Self {
        Err(ApiError::borrowed(error.http_error_code, error.err_message))
    }
}

///
/// New entry DTO
///

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewEntryRequest {
    pub project_id: Uuid,
    pub current_path: String,
    pub filename: Option<String>,
    pub ext: Option<String>,
    pub confirm: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewEntryReply {
    pub needs_confirmation: bool,
    pub kind: String, // "file" | "folder" | "download", empty when needs_confirmation
    pub name: String,
    pub hint: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileTypeReply {
    pub ext: String,
    pub label: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileTypesReply {
    pub file_types: Vec<FileTypeReply>,
    pub special_names: Vec<String>,
}

///
/// Listing DTO
///

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ListingEntryReply {
    pub name: String,
    pub kind: String, // "file" | "dir"
    pub size: Option<i64>,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ListingReply {
    pub path: String,
    pub entries: Vec<ListingEntryReply>,
}

///
/// Upload DTO
///

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UploadReply {
    pub file_name: String,
    pub size: i64,
    pub listing_count: i64,
}

///
/// Access log DTO
///

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccessLogEntryReply {
    pub id: Uuid,
    pub project_id: Uuid,
    pub account_id: Uuid,
    pub filename: String,
    pub time: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccessLogReply {
    pub entries: Vec<AccessLogEntryReply>,
}

///
/// Project runtime DTO
/// The runtime is the black box doing the real file work, we only carry
/// the requests over.
///

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateFileRequest {
    pub name: String,
    pub ext: Option<String>,
    pub current_path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateFolderRequest {
    pub name: String,
    pub current_path: String,
    pub switch_over: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatedReply {
    pub path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SavedUploadReply {
    pub path: String,
    pub size: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProjectQuotasReply {
    pub network: bool,
    pub member_host: bool,
    pub disk_quota_mb: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_type_renders_the_item_as_json() {
        let wt = WebType::from_item(
            StatusCode::OK.as_u16(),
            NewEntryReply {
                needs_confirmation: false,
                kind: "folder".to_string(),
                name: "notebooks/".to_string(),
                hint: None,
            },
        );
        let (code, headers, body): JsonBytes = wt.into();
        assert_eq!(StatusCode::OK, code);
        assert_eq!("application/json", headers[0].1);
        let reply: NewEntryReply = serde_json::from_slice(&body).unwrap();
        assert_eq!("folder", reply.kind);
    }

    #[test]
    fn web_type_renders_the_errorset_message() {
        let wt: WebType<NewEntryReply> = WebType::from_errorset(&error_codes::INVALID_TOKEN);
        let (code, _headers, body): JsonBytes = wt.into();
        assert_eq!(StatusCode::UNAUTHORIZED, code);
        let msg: SimpleMessage = serde_json::from_slice(&body).unwrap();
        assert_eq!("Invalid token", msg.message);
    }

    #[test]
    fn web_response_carries_the_http_code_on_error() {
        let wr: WebResponse<String> = WebResponse::from_errorset(&error_codes::INTERNAL_DATABASE_ERROR);
        let e = wr.unwrap_err();
        assert_eq!(StatusCode::SERVICE_UNAVAILABLE.as_u16(), e.http_error_code);

        let wt: WebType<String> = WebType::from(e);
        assert_eq!(StatusCode::SERVICE_UNAVAILABLE, wt.http_code);
    }
}
