use std::fmt::Display;
use std::time::Duration;

use anyhow::anyhow;
use log::warn;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{de, Serialize};
use tokio::time::sleep;
use url::Url;
use uuid::Uuid;

use atdto::error_codes::HTTP_CLIENT_ERROR;
use atdto::{
    CreateFileRequest, CreateFolderRequest, CreatedReply, ListingReply, ProjectQuotasReply,
    SavedUploadReply, SimpleMessage, WebResponse, WebTypeBuilder,
};
use commons_error::*;

use crate::request_client::TokenType::{Sid, Token};
use crate::request_client::{encode_query_value, CustomHeaders, TokenType};

const TIMEOUT: Duration = Duration::from_secs(60 * 60);
const MAX_HTTP_RETRY: u32 = 5;
const LAPS: u32 = 2_000;

///
/// Project Runtime
///
#[derive(Clone)]
pub struct ProjectRuntimeClientAsync {
    server: WebServerAsync,
}

impl ProjectRuntimeClientAsync {
    pub fn new(server_name: &str, port: u16) -> Self {
        Self {
            server: WebServerAsync::new(server_name, port, "project-runtime"),
        }
    }

    pub async fn create_file(
        &self,
        project_id: &Uuid,
        request: &CreateFileRequest,
        sid: &str,
        x_request_id: Option<u32>,
    ) -> WebResponse<CreatedReply> {
        // http://localhost:{port}/project-runtime/file/{project_id}
        let url = self.server.build_url_with_refcode("file", project_id);

        let headers = CustomHeaders {
            token_type: Sid(sid.to_string()),
            x_request_id,
        };

        self.server.post_data_retry(&url, request, &headers).await
    }

    pub async fn create_folder(
        &self,
        project_id: &Uuid,
        request: &CreateFolderRequest,
        sid: &str,
        x_request_id: Option<u32>,
    ) -> WebResponse<CreatedReply> {
        // http://localhost:{port}/project-runtime/folder/{project_id}
        let url = self.server.build_url_with_refcode("folder", project_id);

        let headers = CustomHeaders {
            token_type: Sid(sid.to_string()),
            x_request_id,
        };

        self.server.post_data_retry(&url, request, &headers).await
    }

    pub async fn save_upload(
        &self,
        project_id: &Uuid,
        path: &str,
        file_name: &str,
        content: Vec<u8>,
        sid: &str,
        x_request_id: Option<u32>,
    ) -> WebResponse<SavedUploadReply> {
        // http://localhost:{port}/project-runtime/upload/{project_id}?path=..&file_name=..
        let raw_url = self.server.build_url_with_refcode("upload", project_id);
        let url = format!(
            "{}?path={}&file_name={}",
            raw_url,
            encode_query_value(path),
            encode_query_value(file_name)
        );

        let headers = CustomHeaders {
            token_type: Sid(sid.to_string()),
            x_request_id,
        };

        self.server.post_bytes_retry(&url, content, &headers).await
    }

    pub async fn directory_listing(
        &self,
        project_id: &Uuid,
        path: &str,
        sid: &str,
        x_request_id: Option<u32>,
    ) -> WebResponse<ListingReply> {
        // http://localhost:{port}/project-runtime/listing/{project_id}?path=..
        let raw_url = self.server.build_url_with_refcode("listing", project_id);
        let url = format!("{}?path={}", raw_url, encode_query_value(path));

        let headers = CustomHeaders {
            token_type: Sid(sid.to_string()),
            x_request_id,
        };

        self.server.get_data_retry(&url, &headers).await
    }

    pub async fn project_quotas(
        &self,
        project_id: &Uuid,
        sid: &str,
        x_request_id: Option<u32>,
    ) -> WebResponse<ProjectQuotasReply> {
        // http://localhost:{port}/project-runtime/quotas/{project_id}
        let url = self.server.build_url_with_refcode("quotas", project_id);

        let headers = CustomHeaders {
            token_type: Sid(sid.to_string()),
            x_request_id,
        };

        self.server.get_data_retry(&url, &headers).await
    }
}

#[derive(Clone)]
struct WebServerAsync {
    server_name: String,
    port: u16,
    context: String, // Ex : "project-runtime"
}

impl WebServerAsync {
    pub fn new(server_name: &str, port: u16, context: &str) -> Self {
        Self {
            server_name: server_name.to_owned(),
            port,
            context: context.to_owned(),
        }
    }

    async fn get_data_retry<V: DeserializeOwned>(
        &self,
        url: &str,
        headers: &CustomHeaders,
    ) -> WebResponse<V> {
        let mut count: u32 = 0;
        loop {
            match self.get_data(url, headers).await {
                Ok(reply) => return reply,
                Err(_) if count < MAX_HTTP_RETRY => {
                    log_warn!("Url call failed, url=[{}], attempt=[{}]", url, count);
                    sleep(Duration::from_millis(LAPS as u64)).await;
                    count += 1;
                }
                Err(_) => return WebResponse::from_errorset(&HTTP_CLIENT_ERROR),
            }
        }
    }

    async fn get_data<V: de::DeserializeOwned>(
        &self,
        url: &str,
        headers: &CustomHeaders,
    ) -> anyhow::Result<WebResponse<V>> {
        let client = Client::new();
        let url = Url::parse(url)?;

        let request_builder = client.get(url).timeout(TIMEOUT);
        let request_builder = Self::add_headers(request_builder, headers);

        Self::send_request_builder(request_builder).await
    }

    async fn post_data_retry<U: Serialize, V: DeserializeOwned>(
        &self,
        url: &str,
        request: &U,
        headers: &CustomHeaders,
    ) -> WebResponse<V> {
        let mut count: u32 = 0;
        loop {
            match self.post_data(url, request, headers).await {
                Ok(reply) => return reply,
                Err(_) if count < MAX_HTTP_RETRY => {
                    log_warn!("Url call failed, url=[{}], attempt=[{}]", url, count);
                    sleep(Duration::from_millis(LAPS as u64)).await;
                    count += 1;
                }
                Err(_) => return WebResponse::from_errorset(&HTTP_CLIENT_ERROR),
            }
        }
    }

    async fn post_data<U: Serialize, V: de::DeserializeOwned>(
        &self,
        url: &str,
        request: &U,
        headers: &CustomHeaders,
    ) -> anyhow::Result<WebResponse<V>> {
        let client = Client::new();
        let url = Url::parse(url)?;

        let request_builder = client.post(url).timeout(TIMEOUT);
        let request_builder = Self::add_headers(request_builder, headers);
        let request_builder = request_builder.json(request);

        Self::send_request_builder(request_builder).await
    }

    async fn post_bytes_retry<V: DeserializeOwned>(
        &self,
        url: &str,
        content: Vec<u8>,
        headers: &CustomHeaders,
    ) -> WebResponse<V> {
        let mut count: u32 = 0;
        loop {
            match self.post_bytes(url, content.clone(), headers).await {
                Ok(reply) => return reply,
                Err(_) if count < MAX_HTTP_RETRY => {
                    log_warn!("Url call failed, url=[{}], attempt=[{}]", url, count);
                    sleep(Duration::from_millis(LAPS as u64)).await;
                    count += 1;
                }
                Err(_) => return WebResponse::from_errorset(&HTTP_CLIENT_ERROR),
            }
        }
    }

    async fn post_bytes<V: de::DeserializeOwned>(
        &self,
        url: &str,
        content: Vec<u8>,
        headers: &CustomHeaders,
    ) -> anyhow::Result<WebResponse<V>> {
        let client = Client::new();
        let url = Url::parse(url)?;

        let request_builder = client.post(url).timeout(TIMEOUT);
        let request_builder = Self::add_headers(request_builder, headers);
        let request_builder = request_builder.body(content);

        Self::send_request_builder(request_builder).await
    }

    async fn send_request_builder<V: DeserializeOwned>(
        request_builder: RequestBuilder,
    ) -> anyhow::Result<WebResponse<V>> {
        let response = match request_builder.send().await {
            Ok(v) => {
                let status_code = v.status();
                if status_code.as_u16() >= 300 {
                    let value: Result<SimpleMessage, reqwest::Error> = v.json().await;
                    match value {
                        Ok(v_value) => WebResponse::from_simple(status_code.as_u16(), v_value),
                        Err(e) => {
                            return Err(anyhow!("Cannot parse the error reply: {}", e.to_string()))
                        }
                    }
                } else {
                    let value: Result<V, reqwest::Error> = v.json().await;
                    match value {
                        Ok(v_value) => WebResponse::from_item(status_code.as_u16(), v_value),
                        Err(e) => return Err(anyhow!("Cannot parse the reply: {}", e.to_string())),
                    }
                }
            }
            Err(e) => {
                return Err(anyhow!("Http request failed: {}", e.to_string()));
            }
        };
        Ok(response)
    }

    fn add_headers(request_builder: RequestBuilder, headers: &CustomHeaders) -> RequestBuilder {
        let request_builder = match &headers.token_type {
            Token(token_value) => request_builder.header("token", token_value.clone()),
            Sid(sid_value) => request_builder.header("sid", sid_value.clone()),
            TokenType::None => request_builder,
        };

        match headers.x_request_id {
            None => request_builder,
            Some(x_request_id) => request_builder.header("X-Request-ID", x_request_id),
        }
    }

    ///
    /// end_point , ex : "listing", "quotas"
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
