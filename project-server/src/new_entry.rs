use bytes::Bytes;
use chrono::Utc;
use http::StatusCode;
use log::*;
use uuid::Uuid;

use atdto::error_codes::{
    INTERNAL_TECHNICAL_ERROR, INVALID_REQUEST, INVALID_SID, INVALID_TOKEN, LISTING_NOT_AVAILABLE,
    PROJECT_NOT_RUNNING, UPLOAD_FAILED, UPLOAD_WRONG_FILE_NAME,
};
use atdto::{
    ApiError, CreateFileRequest, CreateFolderRequest, FileTypeReply, FileTypesReply, ListingReply,
    NewEntryReply, NewEntryRequest, SimpleMessage, UploadReply, WebType, WebTypeBuilder,
};
use atelier_cli::request_client::TokenType;
use commons_error::*;
use commons_services::token_lib::SessionToken;
use commons_services::x_request_id::{Follower, XRequestID};

use crate::access_log::record_access;
use crate::actions::{ProjectActions, RuntimeActions};
use crate::filename::{FILE_TYPES, SPECIAL_FILENAMES};
use crate::form::{NewEntryForm, SubmitOutcome};

/// Suffix of the "Download from Internet" label when the project
/// cannot reach the network
pub(crate) const BLOCKED_HINT: &str = " (access blocked -- see project settings)";

#[derive(Debug, Clone)]
pub(crate) struct NewEntryDelegate {
    pub session_token: SessionToken,
    pub follower: Follower,
}

impl NewEntryDelegate {
    pub fn new(session_token: SessionToken, x_request_id: XRequestID) -> Self {
        Self {
            session_token,
            follower: Follower {
                x_request_id: x_request_id.new_if_null(),
                token_type: TokenType::None,
            },
        }
    }

    /// 🌟 Create a file, a folder or a download from the form candidate
    ///
    /// POST /new_entry
    pub async fn new_entry(&mut self, request: &NewEntryRequest) -> WebType<NewEntryReply> {
        log_info!(
            "🚀 Start new_entry api, project_id=[{}], filename=[{:?}], confirm=[{}], follower=[{}]",
            &request.project_id,
            &request.filename,
            request.confirm,
            &self.follower
        );

        if !self.session_token.is_valid() {
            log_error!(
                "💣 Invalid session token, token=[{:?}], follower=[{}]",
                &self.session_token,
                &self.follower
            );
            return WebType::from_errorset(&INVALID_TOKEN);
        }
        self.follower.token_type = TokenType::Sid(self.session_token.0.clone());

        let Ok(account_id) = self
            .session_token
            .account_id()
            .map_err(err_fwd!("💣 Sid without account, follower=[{}]", &self.follower))
        else {
            return WebType::from_errorset(&INVALID_SID);
        };

        let Ok(actions) = RuntimeActions::new(
            request.project_id,
            self.session_token.0.clone(),
            self.follower.x_request_id.value(),
        )
        .map_err(err_fwd!(
            "💣 Cannot reach the runtime configuration, follower=[{}]",
            &self.follower
        )) else {
            return WebType::from_errorset(&INTERNAL_TECHNICAL_ERROR);
        };

        let reply = self.run_form(request, &actions, &account_id).await;

        log_info!("🏁 End new_entry api, follower=[{}]", &self.follower);

        reply
    }

    /// Drive the form over the actions seam
    async fn run_form(
        &self,
        request: &NewEntryRequest,
        actions: &dyn ProjectActions,
        account_id: &Uuid,
    ) -> WebType<NewEntryReply> {
        let mut form = NewEntryForm::new(request.filename.clone(), request.ext.as_deref());

        let outcome = if request.confirm {
            form.confirm_anyway()
        } else {
            form.submit(request.ext.as_deref())
        };

        match outcome {
            SubmitOutcome::NoOp => {
                log_warn!("⛔ Empty entry name, follower=[{}]", &self.follower);
                WebType::from_errorset(&INVALID_REQUEST)
            }
            SubmitOutcome::NeedsConfirmation => {
                log_info!(
                    "Entry has no extension, waiting for a confirmation, name=[{}], follower=[{}]",
                    &form.filename,
                    &self.follower
                );
                WebType::from_item(
                    StatusCode::OK.as_u16(),
                    NewEntryReply {
                        needs_confirmation: true,
                        kind: "".to_owned(),
                        name: form.filename.clone(),
                        hint: None,
                    },
                )
            }
            SubmitOutcome::CreateFile { name, ext } => {
                let creation = CreateFileRequest {
                    name,
                    ext,
                    current_path: request.current_path.clone(),
                };
                match actions.create_file(&creation).await {
                    Ok(created) => {
                        record_access(
                            &request.project_id,
                            account_id,
                            &created.path,
                            Utc::now(),
                            &self.follower,
                        )
                        .await;
                        log_info!(
                            "😎 File created, path=[{}], follower=[{}]",
                            &created.path,
                            &self.follower
                        );
                        WebType::from_item(
                            StatusCode::OK.as_u16(),
                            NewEntryReply {
                                needs_confirmation: false,
                                kind: "file".to_owned(),
                                name: created.path,
                                hint: None,
                            },
                        )
                    }
                    Err(e) => self.creation_failure(&mut form, e),
                }
            }
            SubmitOutcome::CreateFolder { name } => {
                let creation = CreateFolderRequest {
                    name,
                    current_path: request.current_path.clone(),
                    switch_over: true,
                };
                match actions.create_folder(&creation).await {
                    Ok(created) => {
                        record_access(
                            &request.project_id,
                            account_id,
                            &created.path,
                            Utc::now(),
                            &self.follower,
                        )
                        .await;
                        log_info!(
                            "😎 Folder created, path=[{}], follower=[{}]",
                            &created.path,
                            &self.follower
                        );
                        WebType::from_item(
                            StatusCode::OK.as_u16(),
                            NewEntryReply {
                                needs_confirmation: false,
                                kind: "folder".to_owned(),
                                name: created.path,
                                hint: None,
                            },
                        )
                    }
                    Err(e) => self.creation_failure(&mut form, e),
                }
            }
            SubmitOutcome::Download { name } => {
                let hint = self.network_block_hint(actions).await;
                let creation = CreateFileRequest {
                    name,
                    ext: None,
                    current_path: request.current_path.clone(),
                };
                let reply = match actions.create_file(&creation).await {
                    Ok(created) => {
                        record_access(
                            &request.project_id,
                            account_id,
                            &created.path,
                            Utc::now(),
                            &self.follower,
                        )
                        .await;
                        log_info!(
                            "😎 Download handed over, path=[{}], follower=[{}]",
                            &created.path,
                            &self.follower
                        );
                        WebType::from_item(
                            StatusCode::OK.as_u16(),
                            NewEntryReply {
                                needs_confirmation: false,
                                kind: "download".to_owned(),
                                name: created.path,
                                hint,
                            },
                        )
                    }
                    Err(e) => self.creation_failure(&mut form, e),
                };
                form.download_done();
                reply
            }
        }
    }

    /// Keep the creation failure on the form and reply with the mapped
    /// message, "not running" travels as the friendly conflict reply
    fn creation_failure(
        &self,
        form: &mut NewEntryForm,
        error: ApiError<'static>,
    ) -> WebType<NewEntryReply> {
        form.set_creation_error(&error.message);
        let message = form.file_creation_error.clone().unwrap_or_default();
        log_warn!(
            "⛔ Entry creation failed, message=[{}], follower=[{}]",
            &message,
            &self.follower
        );
        if message == PROJECT_NOT_RUNNING.err_message {
            WebType::from_errorset(&PROJECT_NOT_RUNNING)
        } else {
            WebType::from_simple(error.http_error_code, SimpleMessage { message })
        }
    }

    /// Hint for the "Download from Internet" action. Only when the
    /// runtime knows the project and its network quota is off.
    async fn network_block_hint(&self, actions: &dyn ProjectActions) -> Option<String> {
        match actions.project_quotas().await {
            Ok(quotas) if !quotas.network => Some(BLOCKED_HINT.to_owned()),
            Ok(_) => None,
            Err(e) => {
                log_debug!(
                    "Quotas not available, no block hint, error=[{}], follower=[{}]",
                    e,
                    &self.follower
                );
                None
            }
        }
    }

    /// 🌟 Hand the uploaded bytes over to the runtime, refresh the
    /// listing and keep an access row
    ///
    /// POST /upload/:project_id
    pub async fn upload(
        &mut self,
        project_id: &Uuid,
        path: &str,
        file_name: &str,
        content: Bytes,
    ) -> WebType<UploadReply> {
        log_info!(
            "🚀 Start upload api, file_name=[{}], size=[{}], follower=[{}]",
            file_name,
            content.len(),
            &self.follower
        );

        if !self.session_token.is_valid() {
            log_error!(
                "💣 Invalid session token, token=[{:?}], follower=[{}]",
                &self.session_token,
                &self.follower
            );
            return WebType::from_errorset(&INVALID_TOKEN);
        }
        self.follower.token_type = TokenType::Sid(self.session_token.0.clone());

        let Ok(account_id) = self
            .session_token
            .account_id()
            .map_err(err_fwd!("💣 Sid without account, follower=[{}]", &self.follower))
        else {
            return WebType::from_errorset(&INVALID_SID);
        };

        if file_name.trim().is_empty() {
            log_error!("💣 Empty upload file name, follower=[{}]", &self.follower);
            return WebType::from_errorset(&UPLOAD_WRONG_FILE_NAME);
        }

        let Ok(actions) = RuntimeActions::new(
            *project_id,
            self.session_token.0.clone(),
            self.follower.x_request_id.value(),
        )
        .map_err(err_fwd!(
            "💣 Cannot reach the runtime configuration, follower=[{}]",
            &self.follower
        )) else {
            return WebType::from_errorset(&INTERNAL_TECHNICAL_ERROR);
        };

        let reply = self
            .run_upload(project_id, path, file_name, content, &actions, &account_id)
            .await;

        log_info!("🏁 End upload api, follower=[{}]", &self.follower);

        reply
    }

    async fn run_upload(
        &self,
        project_id: &Uuid,
        path: &str,
        file_name: &str,
        content: Bytes,
        actions: &dyn ProjectActions,
        account_id: &Uuid,
    ) -> WebType<UploadReply> {
        let Ok(saved) = actions
            .save_upload(path, file_name, content.to_vec())
            .await
            .map_err(err_fwd!(
                "💣 Upload hand over failed, file_name=[{}], follower=[{}]",
                file_name,
                &self.follower
            ))
        else {
            return WebType::from_errorset(&UPLOAD_FAILED);
        };

        // Completion hook of the upload zone, refresh the listing
        let Ok(listing) = actions.fetch_directory_listing(path).await.map_err(err_fwd!(
            "💣 Listing refresh failed after upload, follower=[{}]",
            &self.follower
        )) else {
            return WebType::from_errorset(&LISTING_NOT_AVAILABLE);
        };

        record_access(project_id, account_id, &saved.path, Utc::now(), &self.follower).await;

        log_info!(
            "😎 Upload stored, path=[{}], listing count=[{}], follower=[{}]",
            &saved.path,
            listing.entries.len(),
            &self.follower
        );

        WebType::from_item(
            StatusCode::OK.as_u16(),
            UploadReply {
                file_name: file_name.to_owned(),
                size: saved.size,
                listing_count: listing.entries.len() as i64,
            },
        )
    }

    /// 🌟 Pass through listing fetch
    ///
    /// GET /listing/:project_id?path=
    pub async fn listing(&mut self, project_id: &Uuid, path: &str) -> WebType<ListingReply> {
        log_info!(
            "🚀 Start listing api, project_id=[{}], path=[{}], follower=[{}]",
            project_id,
            path,
            &self.follower
        );

        if !self.session_token.is_valid() {
            log_error!(
                "💣 Invalid session token, token=[{:?}], follower=[{}]",
                &self.session_token,
                &self.follower
            );
            return WebType::from_errorset(&INVALID_TOKEN);
        }
        self.follower.token_type = TokenType::Sid(self.session_token.0.clone());

        let Ok(actions) = RuntimeActions::new(
            *project_id,
            self.session_token.0.clone(),
            self.follower.x_request_id.value(),
        )
        .map_err(err_fwd!(
            "💣 Cannot reach the runtime configuration, follower=[{}]",
            &self.follower
        )) else {
            return WebType::from_errorset(&INTERNAL_TECHNICAL_ERROR);
        };

        let Ok(listing) = actions.fetch_directory_listing(path).await.map_err(err_fwd!(
            "💣 Listing fetch failed, follower=[{}]",
            &self.follower
        )) else {
            return WebType::from_errorset(&LISTING_NOT_AVAILABLE);
        };

        log_info!(
            "🏁 End listing api, count=[{}], follower=[{}]",
            listing.entries.len(),
            &self.follower
        );

        WebType::from_item(StatusCode::OK.as_u16(), listing)
    }

    /// 🌟 The registry behind the file type dropdown
    ///
    /// GET /file_types
    pub async fn file_types(&mut self) -> WebType<FileTypesReply> {
        log_info!("🚀 Start file_types api, follower=[{}]", &self.follower);

        if !self.session_token.is_valid() {
            log_error!(
                "💣 Invalid session token, token=[{:?}], follower=[{}]",
                &self.session_token,
                &self.follower
            );
            return WebType::from_errorset(&INVALID_TOKEN);
        }
        self.follower.token_type = TokenType::Sid(self.session_token.0.clone());

        let file_types = FILE_TYPES
            .iter()
            .map(|(ext, label)| FileTypeReply {
                ext: (*ext).to_owned(),
                label: (*label).to_owned(),
            })
            .collect();
        let special_names = SPECIAL_FILENAMES.iter().map(|s| (*s).to_owned()).collect();

        log_info!("🏁 End file_types api, follower=[{}]", &self.follower);

        WebType::from_item(
            StatusCode::OK.as_u16(),
            FileTypesReply {
                file_types,
                special_names,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use atdto::{CreatedReply, ListingEntryReply, ProjectQuotasReply, SavedUploadReply, WebResponse};

    use super::*;

    struct StubActions {
        calls: Mutex<Vec<String>>,
        fail_create: Option<String>,
        quotas: Option<ProjectQuotasReply>,
    }

    impl StubActions {
        fn ok() -> Self {
            Self {
                calls: Mutex::new(vec![]),
                fail_create: None,
                quotas: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                fail_create: Some(message.to_owned()),
                ..Self::ok()
            }
        }

        fn with_network(network: bool) -> Self {
            Self {
                quotas: Some(ProjectQuotasReply {
                    network,
                    member_host: false,
                    disk_quota_mb: 3000,
                }),
                ..Self::ok()
            }
        }

        fn recorded(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn join(path: &str, name: &str) -> String {
            if path.is_empty() {
                name.to_owned()
            } else {
                format!("{}/{}", path.trim_end_matches('/'), name)
            }
        }
    }

    #[async_trait]
    impl ProjectActions for StubActions {
        async fn create_file(&self, request: &CreateFileRequest) -> WebResponse<CreatedReply> {
            self.calls.lock().unwrap().push(format!(
                "create_file name={} ext={:?}",
                request.name, request.ext
            ));
            match &self.fail_create {
                Some(message) => Err(ApiError::owned(500, message.clone())),
                None => Ok(CreatedReply {
                    path: Self::join(&request.current_path, &request.name),
                }),
            }
        }

        async fn create_folder(&self, request: &CreateFolderRequest) -> WebResponse<CreatedReply> {
            self.calls.lock().unwrap().push(format!(
                "create_folder name={} switch_over={}",
                request.name, request.switch_over
            ));
            match &self.fail_create {
                Some(message) => Err(ApiError::owned(500, message.clone())),
                None => Ok(CreatedReply {
                    path: Self::join(&request.current_path, &request.name),
                }),
            }
        }

        async fn save_upload(
            &self,
            path: &str,
            file_name: &str,
            content: Vec<u8>,
        ) -> WebResponse<SavedUploadReply> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("save_upload file_name={}", file_name));
            Ok(SavedUploadReply {
                path: Self::join(path, file_name),
                size: content.len() as i64,
            })
        }

        async fn fetch_directory_listing(&self, path: &str) -> WebResponse<ListingReply> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("fetch_directory_listing path={}", path));
            Ok(ListingReply {
                path: path.to_owned(),
                entries: vec![
                    ListingEntryReply {
                        name: "notes.md".to_owned(),
                        kind: "file".to_owned(),
                        size: Some(120),
                        modified: None,
                    },
                    ListingEntryReply {
                        name: "data".to_owned(),
                        kind: "dir".to_owned(),
                        size: None,
                        modified: None,
                    },
                ],
            })
        }

        async fn project_quotas(&self) -> WebResponse<ProjectQuotasReply> {
            self.calls.lock().unwrap().push("project_quotas".to_owned());
            match &self.quotas {
                Some(q) => Ok(q.clone()),
                None => Err(ApiError::owned(404, "unknown project".to_owned())),
            }
        }
    }

    fn delegate() -> NewEntryDelegate {
        NewEntryDelegate::new(
            SessionToken("47cef2c4-188d-43ed-895d-fe29440633da".to_owned()),
            XRequestID::from_value(Some(1)),
        )
    }

    fn request(filename: &str, ext: Option<&str>, confirm: bool) -> NewEntryRequest {
        NewEntryRequest {
            project_id: Uuid::new_v4(),
            current_path: "notebooks".to_owned(),
            filename: Some(filename.to_owned()),
            ext: ext.map(|e| e.to_owned()),
            confirm,
        }
    }

    fn account() -> Uuid {
        Uuid::parse_str("47cef2c4-188d-43ed-895d-fe29440633da").unwrap()
    }

    #[tokio::test]
    async fn extension_makes_a_file() {
        let stub = StubActions::ok();
        let wt = delegate()
            .run_form(&request("notes.md", None, false), &stub, &account())
            .await;

        let reply = wt.result.unwrap();
        assert!(!reply.needs_confirmation);
        assert_eq!("file", reply.kind);
        assert_eq!("notebooks/notes.md", reply.name);
        assert_eq!(
            vec!["create_file name=notes.md ext=None"],
            stub.recorded()
        );
    }

    #[tokio::test]
    async fn explicit_ext_travels_to_the_runtime() {
        let stub = StubActions::ok();
        let wt = delegate()
            .run_form(&request("analysis", Some("ipynb"), false), &stub, &account())
            .await;

        assert_eq!("file", wt.result.unwrap().kind);
        assert_eq!(
            vec!["create_file name=analysis ext=Some(\"ipynb\")"],
            stub.recorded()
        );
    }

    #[tokio::test]
    async fn trailing_slash_makes_a_folder_with_switch_over() {
        let stub = StubActions::ok();
        let wt = delegate()
            .run_form(&request("data/", None, false), &stub, &account())
            .await;

        assert_eq!("folder", wt.result.unwrap().kind);
        assert_eq!(
            vec!["create_folder name=data/ switch_over=true"],
            stub.recorded()
        );
    }

    #[tokio::test]
    async fn no_extension_asks_for_a_confirmation() {
        let stub = StubActions::ok();
        let wt = delegate()
            .run_form(&request("notes", None, false), &stub, &account())
            .await;

        let reply = wt.result.unwrap();
        assert!(reply.needs_confirmation);
        assert_eq!("", reply.kind);
        assert_eq!("notes", reply.name);
        assert!(stub.recorded().is_empty());
    }

    #[tokio::test]
    async fn confirm_flag_creates_the_file_anyway() {
        let stub = StubActions::ok();
        let wt = delegate()
            .run_form(&request("notes", None, true), &stub, &account())
            .await;

        let reply = wt.result.unwrap();
        assert!(!reply.needs_confirmation);
        assert_eq!("file", reply.kind);
        assert_eq!(vec!["create_file name=notes ext=None"], stub.recorded());
    }

    #[tokio::test]
    async fn empty_name_is_an_invalid_request() {
        let stub = StubActions::ok();
        let wt = delegate()
            .run_form(&request("", None, false), &stub, &account())
            .await;

        assert_eq!(StatusCode::BAD_REQUEST, wt.http_code);
        assert!(stub.recorded().is_empty());
    }

    #[tokio::test]
    async fn download_carries_the_block_hint_when_network_is_off() {
        let stub = StubActions::with_network(false);
        let wt = delegate()
            .run_form(
                &request("https://example.com/data.csv", None, false),
                &stub,
                &account(),
            )
            .await;

        let reply = wt.result.unwrap();
        assert_eq!("download", reply.kind);
        assert_eq!(Some(BLOCKED_HINT.to_owned()), reply.hint);
    }

    #[tokio::test]
    async fn download_with_network_on_has_no_hint() {
        let stub = StubActions::with_network(true);
        let wt = delegate()
            .run_form(
                &request("https://example.com/data.csv", None, false),
                &stub,
                &account(),
            )
            .await;

        assert_eq!(None, wt.result.unwrap().hint);
    }

    #[tokio::test]
    async fn unknown_project_has_no_hint() {
        let stub = StubActions::ok();
        let wt = delegate()
            .run_form(
                &request("https://example.com/data.csv", None, false),
                &stub,
                &account(),
            )
            .await;

        assert_eq!(None, wt.result.unwrap().hint);
    }

    #[tokio::test]
    async fn not_running_maps_to_the_friendly_conflict() {
        let stub = StubActions::failing("not running");
        let wt = delegate()
            .run_form(&request("notes.md", None, false), &stub, &account())
            .await;

        assert_eq!(StatusCode::CONFLICT, wt.http_code);
        assert_eq!(
            "The project is not running. Please try again in a moment",
            wt.result.unwrap_err().message
        );
    }

    #[tokio::test]
    async fn other_failures_keep_their_message() {
        let stub = StubActions::failing("disk full");
        let wt = delegate()
            .run_form(&request("notes.md", None, false), &stub, &account())
            .await;

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, wt.http_code);
        assert_eq!("disk full", wt.result.unwrap_err().message);
    }

    #[tokio::test]
    async fn upload_refreshes_the_listing_and_counts_it() {
        let stub = StubActions::ok();
        let project_id = Uuid::new_v4();
        let wt = delegate()
            .run_upload(
                &project_id,
                "notebooks",
                "results.csv",
                Bytes::from_static(b"a,b,c"),
                &stub,
                &account(),
            )
            .await;

        let reply = wt.result.unwrap();
        assert_eq!("results.csv", reply.file_name);
        assert_eq!(5, reply.size);
        assert_eq!(2, reply.listing_count);
        assert_eq!(
            vec![
                "save_upload file_name=results.csv",
                "fetch_directory_listing path=notebooks"
            ],
            stub.recorded()
        );
    }
}
