use anyhow::anyhow;
use uuid::Uuid;

use atconfig::properties::get_prop_value;
use atelier_cli::request_client::ProjectServerClient;

use crate::file_commands::parse_project_id;
use crate::session_commands::read_session_id;

/// Print the access rows of a project, newest first
pub(crate) fn access_list(
    project_id: &str,
    o_account_id: Option<&str>,
    o_filename: Option<&str>,
    o_start: Option<&str>,
    o_length: Option<&str>,
) -> anyhow::Result<()> {
    println!("👶 Getting the access rows...");

    let server_host = get_prop_value("server.host")?;
    let project_server_port: u16 = get_prop_value("ps.port")?.parse()?;
    println!("Project server port : {}", project_server_port);
    let client = ProjectServerClient::new(&server_host, project_server_port);

    let sid = read_session_id()?;
    let project_id = parse_project_id(project_id)?;

    let account_id = match o_account_id {
        Some(a) => Some(
            Uuid::parse_str(a).map_err(|_| anyhow!("The account id is not a uuid, account_id=[{}]", a))?,
        ),
        None => None,
    };
    let filename = o_filename.map(|f| f.to_owned());
    let start: u32 = o_start.unwrap_or("0").parse()?;
    let length: Option<u32> = match o_length {
        Some(l) => Some(l.parse()?),
        None => None,
    };

    let wr_reply = client.search_access(&project_id, &account_id, &filename, start, length, &sid);

    match wr_reply {
        Ok(reply) => {
            println!("time\taccount\tfilename");
            for entry in reply.entries {
                println!("{}\t{}\t{}", entry.time, entry.account_id, entry.filename);
            }
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e.message)),
    }
}
