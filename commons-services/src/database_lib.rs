use commons_error::*;
use commons_pg::sql_transaction::{SQLConnection, SQLTransaction};

///
/// Start a new database transaction
///
pub async fn open_transaction(
    r_cnx: &'_ mut anyhow::Result<SQLConnection>,
) -> anyhow::Result<SQLTransaction<'_>> {
    let cnx = match r_cnx
        .as_mut()
        .map_err(err_fwd!("Fail opening db connection"))
    {
        Ok(x) => x,
        Err(_) => {
            return Err(anyhow::anyhow!("_"));
        }
    };
    let trans = cnx
        .begin()
        .await
        .map_err(err_fwd!("Fail starting a transaction"))?;
    Ok(trans)
}
