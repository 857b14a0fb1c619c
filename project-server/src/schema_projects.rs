use commons_error::*;
use commons_pg::sql_transaction::{SQLChange, SQLConnection};
use commons_services::database_lib::open_transaction;
use log::*;
use std::collections::HashMap;

/// The access log is an analytics tier, losing rows on a crash is
/// accepted. UNLOGGED skips the WAL for that reason.
pub(crate) const PROJECTS_SCHEMA: &str = r#"

CREATE SCHEMA IF NOT EXISTS projects;

SET search_path = projects, pg_catalog;

-- file_access_log definition

-- One row per file touched by an account inside a project

CREATE UNLOGGED TABLE IF NOT EXISTS file_access_log (
	id uuid NOT NULL,
	project_id uuid NOT NULL,
	account_id uuid NOT NULL,
	filename text NOT NULL,
	"time" timestamp(0) NOT NULL,
	CONSTRAINT file_access_log_pk PRIMARY KEY (id)
);
CREATE INDEX IF NOT EXISTS file_access_log_project_idx ON file_access_log USING btree (project_id);
CREATE INDEX IF NOT EXISTS file_access_log_account_idx ON file_access_log USING btree (account_id);
CREATE INDEX IF NOT EXISTS file_access_log_filename_idx ON file_access_log USING btree (filename);
CREATE INDEX IF NOT EXISTS file_access_log_time_idx ON file_access_log USING btree ("time");

"#;

/// Run the schema script, every statement is IF NOT EXISTS so the boot
/// can run it again and again
pub(crate) async fn install_schema() -> anyhow::Result<()> {
    let mut r_cnx = SQLConnection::from_pool().await;
    let mut trans = open_transaction(&mut r_cnx)
        .await
        .map_err(err_fwd!("Open transaction error"))?;

    let change = SQLChange {
        sql_query: PROJECTS_SCHEMA.to_string(),
        params: HashMap::new(),
        sequence_name: "".to_string(),
    };

    change
        .batch(&mut trans)
        .await
        .map_err(err_fwd!("Projects schema batch failed"))?;

    trans
        .commit()
        .await
        .map_err(err_fwd!("Commit failed"))?;

    log_info!("😎 Schema projects is in place");

    Ok(())
}
