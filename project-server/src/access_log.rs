use std::collections::HashMap;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use http::StatusCode;
use log::*;
use serde_derive::Deserialize;
use uuid::Uuid;

use atdto::error_codes::{ACCESS_LOG_NOT_AVAILABLE, INTERNAL_DATABASE_ERROR, INVALID_TOKEN};
use atdto::{AccessLogEntryReply, AccessLogReply, WebType, WebTypeBuilder};
use atelier_cli::request_client::TokenType;
use commons_error::*;
use commons_pg::sql_transaction::{
    CellValue, SQLChange, SQLConnection, SQLQueryBlock, SQLTransaction,
};
use commons_services::database_lib::open_transaction;
use commons_services::token_lib::SessionToken;
use commons_services::try_or_return;
use commons_services::x_request_id::{Follower, XRequestID};

/// Optional filters of the access log search, straight from the query string
#[derive(Deserialize, Debug)]
pub(crate) struct AccessLogFilters {
    pub account_id: Option<Uuid>,
    pub filename: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub start: Option<u32>,
    pub length: Option<u32>,
}

/// Best effort insert. The access log is an analytics tier, a dropped
/// row must never fail the user operation that produced it.
pub(crate) async fn record_access(
    project_id: &Uuid,
    account_id: &Uuid,
    filename: &str,
    time: DateTime<Utc>,
    follower: &Follower,
) {
    if let Err(e) = insert_access_row(project_id, account_id, filename, time, follower).await {
        log_warn!(
            "⛔ Access log row dropped, filename=[{}], error=[{}], follower=[{}]",
            filename,
            e,
            follower
        );
    }
}

async fn insert_access_row(
    project_id: &Uuid,
    account_id: &Uuid,
    filename: &str,
    time: DateTime<Utc>,
    follower: &Follower,
) -> anyhow::Result<()> {
    let id = Uuid::new_v4();

    let mut r_cnx = SQLConnection::from_pool().await;
    let mut trans = open_transaction(&mut r_cnx)
        .await
        .map_err(err_fwd!("Open transaction error, follower=[{}]", follower))?;

    let mut params = HashMap::new();
    params.insert("p_id".to_owned(), CellValue::from_raw_uuid(id));
    params.insert(
        "p_project_id".to_owned(),
        CellValue::from_raw_uuid(*project_id),
    );
    params.insert(
        "p_account_id".to_owned(),
        CellValue::from_raw_uuid(*account_id),
    );
    params.insert("p_filename".to_owned(), CellValue::from_raw_str(filename));
    params.insert(
        "p_time".to_owned(),
        CellValue::from_raw_naivedatetime(time.naive_utc()),
    );

    let sql_insert = r#"INSERT INTO projects.file_access_log (id, project_id, account_id, filename, "time")
                        VALUES (:p_id, :p_project_id, :p_account_id, :p_filename, :p_time)"#;

    let change = SQLChange {
        sql_query: sql_insert.to_string(),
        params,
        sequence_name: "".to_string(),
    };

    let _ = change
        .insert_no_pk(&mut trans)
        .await
        .map_err(err_fwd!("Cannot insert the access row, follower=[{}]", follower))?;

    trans
        .commit()
        .await
        .map_err(err_fwd!("Commit failed, follower=[{}]", follower))?;

    log_debug!(
        "💾 Access row stored, id=[{}], filename=[{}], follower=[{}]",
        id,
        filename,
        follower
    );

    Ok(())
}

fn search_params(project_id: &Uuid, filters: &AccessLogFilters) -> HashMap<String, CellValue> {
    let mut params = HashMap::new();
    params.insert(
        "p_project_id".to_owned(),
        CellValue::from_raw_uuid(*project_id),
    );
    params.insert(
        "p_account_id".to_owned(),
        CellValue::from_opt_uuid(filters.account_id),
    );
    params.insert(
        "p_filename".to_owned(),
        CellValue::from_opt_string(filters.filename.as_ref().map(|prefix| format!("{}%", prefix))),
    );
    params.insert(
        "p_from".to_owned(),
        CellValue::from_opt_naivedatetime(filters.from.map(|d| d.naive_utc())),
    );
    params.insert(
        "p_to".to_owned(),
        CellValue::from_opt_naivedatetime(filters.to.map(|d| d.naive_utc())),
    );
    params
}

#[derive(Debug, Clone)]
pub(crate) struct AccessLogDelegate {
    pub session_token: SessionToken,
    pub follower: Follower,
}

impl AccessLogDelegate {
    pub fn new(session_token: SessionToken, x_request_id: XRequestID) -> Self {
        Self {
            session_token,
            follower: Follower {
                x_request_id: x_request_id.new_if_null(),
                token_type: TokenType::None,
            },
        }
    }

    /// 🌟 Search the raw access rows of a project, newest first
    ///
    /// GET /access/:project_id
    pub async fn search_access(
        &mut self,
        project_id: &Uuid,
        filters: &AccessLogFilters,
    ) -> WebType<AccessLogReply> {
        log_info!(
            "🚀 Start search_access api, project_id=[{}], follower=[{}]",
            project_id,
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

        let mut r_cnx = SQLConnection::from_pool().await;
        let mut trans = try_or_return!(
            open_transaction(&mut r_cnx)
                .await
                .map_err(err_fwd!("Open transaction error, follower=[{}]", &self.follower)),
            |_| WebType::from_errorset(&INTERNAL_DATABASE_ERROR)
        );

        let Ok(entries) = self
            .search_access_rows(&mut trans, project_id, filters)
            .await
            .map_err(err_fwd!(
                "💣 Access log search failed, follower=[{}]",
                &self.follower
            ))
        else {
            return WebType::from_errorset(&ACCESS_LOG_NOT_AVAILABLE);
        };

        if trans
            .commit()
            .await
            .map_err(err_fwd!("💣 Commit failed, follower=[{}]", &self.follower))
            .is_err()
        {
            return WebType::from_errorset(&INTERNAL_DATABASE_ERROR);
        }

        log_info!(
            "🏁 End search_access api, count=[{}], follower=[{}]",
            entries.len(),
            &self.follower
        );

        WebType::from_item(StatusCode::OK.as_u16(), AccessLogReply { entries })
    }

    async fn search_access_rows(
        &self,
        trans: &mut SQLTransaction<'_>,
        project_id: &Uuid,
        filters: &AccessLogFilters,
    ) -> anyhow::Result<Vec<AccessLogEntryReply>> {
        let params = search_params(project_id, filters);

        let query = SQLQueryBlock {
            sql_query: r#"SELECT id, project_id, account_id, filename, "time"
                    FROM projects.file_access_log
                    WHERE project_id = :p_project_id
                    AND (account_id = :p_account_id OR :p_account_id IS NULL)
                    AND (filename LIKE :p_filename OR :p_filename IS NULL)
                    AND ("time" >= :p_from OR :p_from IS NULL)
                    AND ("time" < :p_to OR :p_to IS NULL)
                    ORDER BY "time" DESC"#
                .to_string(),
            start: filters.start.unwrap_or(0),
            length: filters.length,
            params,
        };

        let mut sql_result = query.execute(trans).await.map_err(err_fwd!(
            "Query failed, [{}], follower=[{}]",
            &query.sql_query,
            &self.follower
        ))?;

        let mut entries = vec![];
        while sql_result.next() {
            let id = sql_result.get_uuid("id").ok_or(anyhow!("Wrong id col"))?;
            let project_id = sql_result
                .get_uuid("project_id")
                .ok_or(anyhow!("Wrong project_id col"))?;
            let account_id = sql_result
                .get_uuid("account_id")
                .ok_or(anyhow!("Wrong account_id col"))?;
            let filename = sql_result
                .get_string("filename")
                .ok_or(anyhow!("Wrong filename col"))?;
            let time = sql_result
                .get_timestamp_as_datetime("time")
                .ok_or(anyhow!("Wrong time col"))?;

            entries.push(AccessLogEntryReply {
                id,
                project_id,
                account_id,
                filename,
                time,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_filters() -> AccessLogFilters {
        AccessLogFilters {
            account_id: None,
            filename: None,
            from: None,
            to: None,
            start: None,
            length: None,
        }
    }

    #[test]
    fn filename_filter_becomes_a_prefix_pattern() {
        let project_id = Uuid::new_v4();
        let mut filters = no_filters();
        filters.filename = Some("notebooks/".to_owned());

        let params = search_params(&project_id, &filters);

        match params.get("p_filename") {
            Some(CellValue::String(Some(pattern))) => assert_eq!("notebooks/%", pattern),
            other => panic!("unexpected cell {:?}", other),
        }
    }

    #[test]
    fn missing_filters_travel_as_null_cells() {
        let project_id = Uuid::new_v4();
        let params = search_params(&project_id, &no_filters());

        assert!(matches!(
            params.get("p_account_id"),
            Some(CellValue::Uuid(None))
        ));
        assert!(matches!(
            params.get("p_filename"),
            Some(CellValue::String(None))
        ));
        assert!(matches!(
            params.get("p_from"),
            Some(CellValue::Timestamp(None))
        ));
        assert!(matches!(
            params.get("p_project_id"),
            Some(CellValue::Uuid(Some(_)))
        ));
    }
}
