use std::fmt::Display;
use std::time::Duration;

use anyhow::anyhow;
use log::warn;
use reqwest::blocking::RequestBuilder;
use serde::{de, Serialize};
use uuid::Uuid;

use atdto::error_codes::HTTP_CLIENT_ERROR;
use atdto::{
    AccessLogReply, FileTypesReply, ListingReply, NewEntryReply, NewEntryRequest, SimpleMessage,
    UploadReply, WebResponse, WebTypeBuilder,
};
use commons_error::*;

use crate::request_client::TokenType::{Sid, Token};

const TIMEOUT: Duration = Duration::from_secs(60 * 60);
const MAX_HTTP_RETRY: i32 = 5;

#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug, Hash)]
pub struct CustomHeaders {
    pub token_type: TokenType,
    pub x_request_id: Option<u32>,
}

#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug, Hash)]
pub enum TokenType {
    Token(String),
    Sid(String),
    None,
}

impl TokenType {
    pub fn value(&self) -> String {
        String::from(match self {
            Token(tok) => tok.as_str(),
            Sid(sid) => sid.as_str(),
            TokenType::None => "",
        })
    }
}

struct WebServer {
    server_name: String,
    port: u16,
    context: String, // Ex : "project-server"
}

impl WebServer {
    pub fn new(server_name: &str, port: u16, context: &str) -> Self {
        Self {
            server_name: server_name.to_owned(),
            port,
            context: context.to_owned(),
        }
    }

    fn get_data_retry<V: de::DeserializeOwned>(&self, url: &str, token: &TokenType) -> WebResponse<V> {
        let mut r_reply;
        let mut count = 0;
        loop {
            r_reply = self.get_data(url, token);
            if r_reply.is_ok() || count >= MAX_HTTP_RETRY {
                break;
            }
            log_warn!("Url call failed, url=[{}], attempt=[{}]", url, count);
            count += 1;
        }
        match r_reply {
            Ok(reply) => reply,
            Err(_) => WebResponse::from_errorset(&HTTP_CLIENT_ERROR),
        }
    }

    fn get_data<V: de::DeserializeOwned>(
        &self,
        url: &str,
        token: &TokenType,
    ) -> anyhow::Result<WebResponse<V>> {
        let request_builder = reqwest::blocking::Client::new().get(url).timeout(TIMEOUT);
        let request_builder = Self::add_header(request_builder, token);
        Self::send_request_builder(request_builder)
    }

    fn send_request_builder<V: de::DeserializeOwned>(
        request_builder: RequestBuilder,
    ) -> anyhow::Result<WebResponse<V>> {
        let wt = match request_builder.send() {
            Ok(v) => {
                let status_code = v.status();
                if status_code.as_u16() >= 300 {
                    let value: SimpleMessage = v
                        .json()
                        .map_err(|e| anyhow!("Cannot parse the error reply: {}", e.to_string()))?;
                    WebResponse::from_simple(status_code.as_u16(), value)
                } else {
                    let value: V = v
                        .json()
                        .map_err(|e| anyhow!("Cannot parse the reply: {}", e.to_string()))?;
                    WebResponse::from_item(status_code.as_u16(), value)
                }
            }
            Err(e) => {
                return Err(anyhow!("Http request failed: {}", e.to_string()));
            }
        };
        Ok(wt)
    }

    ///
    /// Post
    ///

    /// Generic routine to post a message
    fn post_data<U: Serialize, V: de::DeserializeOwned>(
        &self,
        url: &str,
        request: &U,
        headers: &CustomHeaders,
    ) -> anyhow::Result<WebResponse<V>> {
        let request_builder = reqwest::blocking::Client::new().post(url).timeout(TIMEOUT);
        let request_builder = Self::add_header(request_builder, &headers.token_type);

        let request_builder = match headers.x_request_id {
            None => request_builder,
            Some(x_request_id) => request_builder.header("X-Request-ID", x_request_id),
        };

        Self::send_request_builder(request_builder.json(request))
    }

    fn post_data_retry<U: Serialize, V: de::DeserializeOwned>(
        &self,
        url: &str,
        request: &U,
        headers: &CustomHeaders,
    ) -> WebResponse<V> {
        let mut r_reply;
        let mut count = 0;
        loop {
            r_reply = self.post_data(url, request, headers);
            if r_reply.is_ok() || count >= MAX_HTTP_RETRY {
                break;
            }
            log_warn!("Url call failed, url=[{}], attempt=[{}]", url, count);
            count += 1;
        }
        match r_reply {
            Ok(reply) => reply,
            Err(_) => WebResponse::from_errorset(&HTTP_CLIENT_ERROR),
        }
    }

    fn post_bytes_retry<V: de::DeserializeOwned>(
        &self,
        url: &str,
        request: &Vec<u8>,
        token: &TokenType,
    ) -> WebResponse<V> {
        let mut r_reply;
        let mut count = 0;
        loop {
            let rr = request.clone();
            r_reply = self.post_bytes(url, rr, token);
            if r_reply.is_ok() || count >= MAX_HTTP_RETRY {
                break;
            }
            log_warn!("Url call failed, url=[{}], attempt=[{}]", url, count);
            count += 1;
        }
        match r_reply {
            Ok(reply) => reply,
            Err(_) => WebResponse::from_errorset(&HTTP_CLIENT_ERROR),
        }
    }

    /// Generic routine to post a binary content
    fn post_bytes<V: de::DeserializeOwned>(
        &self,
        url: &str,
        request: Vec<u8>,
        token: &TokenType,
    ) -> anyhow::Result<WebResponse<V>> {
        let request_builder = reqwest::blocking::Client::new().post(url).timeout(TIMEOUT);
        let request_builder = Self::add_header(request_builder, token);
        Self::send_request_builder(request_builder.body(request))
    }

    fn add_header(request_builder: RequestBuilder, token: &TokenType) -> RequestBuilder {
        match token {
            Token(token_value) => request_builder.header("token", token_value.clone()),
            Sid(sid_value) => request_builder.header("sid", sid_value.clone()),
            TokenType::None => request_builder,
        }
    }

    ///
    /// end_point , ex : "new_entry", "file_types"
    ///
    fn build_url(&self, end_point: &str) -> String {
        format!(
            "http://{}:{}/{}/{}",
            &self.server_name, self.port, self.context, end_point
        )
    }

    ///
    /// end_point , ex : "listing", "access"
    ///
    fn build_url_with_refcode<T>(&self, end_point: &str, ref_code: T) -> String
    where
        T: Display,
    {
        format!(
            "http://{}:{}/{}/{}/{}",
            &self.server_name, self.port, self.context, end_point, ref_code
        )
    }
}

/// Keep paths and file names readable inside a query string
pub fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

///
/// Project Server
///
pub struct ProjectServerClient {
    server: WebServer,
}

impl ProjectServerClient {
    pub fn new(server_name: &str, port: u16) -> Self {
        Self {
            server: WebServer::new(server_name, port, "project-server"),
        }
    }

    pub fn new_entry(&self, request: &NewEntryRequest, sid: &str) -> WebResponse<NewEntryReply> {
        // http://localhost:{port}/project-server/new_entry
        let url = self.server.build_url("new_entry");

        let headers = CustomHeaders {
            token_type: Sid(sid.to_string()),
            x_request_id: None,
        };

        self.server.post_data_retry(&url, request, &headers)
    }

    pub fn upload(
        &self,
        project_id: &Uuid,
        path: &str,
        file_name: &str,
        request: &Vec<u8>,
        sid: &str,
    ) -> WebResponse<UploadReply> {
        // http://localhost:{port}/project-server/upload/{project_id}?path=..&file_name=..
        let raw_url = self.server.build_url_with_refcode("upload", project_id);
        let url = format!(
            "{}?path={}&file_name={}",
            raw_url,
            encode_query_value(path),
            encode_query_value(file_name)
        );
        self.server
            .post_bytes_retry(&url, request, &Sid(sid.to_string()))
    }

    pub fn listing(&self, project_id: &Uuid, path: &str, sid: &str) -> WebResponse<ListingReply> {
        // http://localhost:{port}/project-server/listing/{project_id}?path=..
        let raw_url = self.server.build_url_with_refcode("listing", project_id);
        let url = format!("{}?path={}", raw_url, encode_query_value(path));
        self.server.get_data_retry(&url, &Sid(sid.to_string()))
    }

    pub fn file_types(&self, sid: &str) -> WebResponse<FileTypesReply> {
        // http://localhost:{port}/project-server/file_types
        let url = self.server.build_url("file_types");
        self.server.get_data_retry(&url, &Sid(sid.to_string()))
    }

    pub fn search_access(
        &self,
        project_id: &Uuid,
        account_id: &Option<Uuid>,
        filename: &Option<String>,
        start: u32,
        length: Option<u32>,
        sid: &str,
    ) -> WebResponse<AccessLogReply> {
        // http://localhost:{port}/project-server/access/{project_id}?start=..&account_id=..&filename=..&length=..
        let raw_url = self.server.build_url_with_refcode("access", project_id);
        let mut url = format!("{}?start={}", raw_url, start);
        if let Some(account_id) = account_id {
            url.push_str(&format!("&account_id={}", account_id));
        }
        if let Some(filename) = filename {
            url.push_str(&format!("&filename={}", encode_query_value(filename)));
        }
        if let Some(length) = length {
            url.push_str(&format!("&length={}", length));
        }
        self.server.get_data_retry(&url, &Sid(sid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_nests_the_context() {
        let server = WebServer::new("localhost", 30090, "project-server");
        assert_eq!(
            "http://localhost:30090/project-server/file_types",
            server.build_url("file_types")
        );
        assert_eq!(
            "http://localhost:30090/project-server/listing/77",
            server.build_url_with_refcode("listing", 77)
        );
    }

    #[test]
    fn query_values_are_percent_encoded() {
        assert_eq!("a%2Fb+c", encode_query_value("a/b c"));
    }

    #[test]
    fn token_type_value() {
        assert_eq!("my-sid", Sid("my-sid".to_string()).value());
        assert_eq!("", TokenType::None.value());
    }
}
