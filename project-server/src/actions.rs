use async_trait::async_trait;
use uuid::Uuid;

use atconfig::properties::get_prop_value;
use atconfig::property_name::{RUNTIME_HOSTNAME_PROPERTY, RUNTIME_PORT_PROPERTY};
use atdto::{
    CreateFileRequest, CreateFolderRequest, CreatedReply, ListingReply, ProjectQuotasReply,
    SavedUploadReply, WebResponse,
};
use atelier_cli::async_request_client::ProjectRuntimeClientAsync;
use commons_error::*;

/// Every real effect of the form goes through this seam. The project
/// runtime behind it owns the storage, the upload pipeline and the
/// quota system, none of that lives here.
#[async_trait]
pub(crate) trait ProjectActions: Send + Sync {
    async fn create_file(&self, request: &CreateFileRequest) -> WebResponse<CreatedReply>;
    async fn create_folder(&self, request: &CreateFolderRequest) -> WebResponse<CreatedReply>;
    async fn save_upload(
        &self,
        path: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> WebResponse<SavedUploadReply>;
    async fn fetch_directory_listing(&self, path: &str) -> WebResponse<ListingReply>;
    async fn project_quotas(&self) -> WebResponse<ProjectQuotasReply>;
}

/// Default seam, talks to the project runtime service over http
pub(crate) struct RuntimeActions {
    client: ProjectRuntimeClientAsync,
    project_id: Uuid,
    sid: String,
    x_request_id: Option<u32>,
}

impl RuntimeActions {
    pub fn new(project_id: Uuid, sid: String, x_request_id: Option<u32>) -> anyhow::Result<Self> {
        let server_host = get_prop_value(RUNTIME_HOSTNAME_PROPERTY)?;
        let server_port: u16 = get_prop_value(RUNTIME_PORT_PROPERTY)?
            .parse()
            .map_err(tr_fwd!())?;

        Ok(Self {
            client: ProjectRuntimeClientAsync::new(&server_host, server_port),
            project_id,
            sid,
            x_request_id,
        })
    }
}

#[async_trait]
impl ProjectActions for RuntimeActions {
    async fn create_file(&self, request: &CreateFileRequest) -> WebResponse<CreatedReply> {
        self.client
            .create_file(&self.project_id, request, &self.sid, self.x_request_id)
            .await
    }

    async fn create_folder(&self, request: &CreateFolderRequest) -> WebResponse<CreatedReply> {
        self.client
            .create_folder(&self.project_id, request, &self.sid, self.x_request_id)
            .await
    }

    async fn save_upload(
        &self,
        path: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> WebResponse<SavedUploadReply> {
        self.client
            .save_upload(
                &self.project_id,
                path,
                file_name,
                content,
                &self.sid,
                self.x_request_id,
            )
            .await
    }

    async fn fetch_directory_listing(&self, path: &str) -> WebResponse<ListingReply> {
        self.client
            .directory_listing(&self.project_id, path, &self.sid, self.x_request_id)
            .await
    }

    async fn project_quotas(&self) -> WebResponse<ProjectQuotasReply> {
        self.client
            .project_quotas(&self.project_id, &self.sid, self.x_request_id)
            .await
    }
}
