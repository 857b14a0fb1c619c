use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::anyhow;
use uuid::Uuid;

use atconfig::properties::get_prop_value;
use atdto::{NewEntryReply, NewEntryRequest, WebResponse};
use atelier_cli::request_client::ProjectServerClient;

use crate::session_commands::read_session_id;

///
pub(crate) fn file_new(
    project_id: &str,
    name: &str,
    o_ext: Option<&str>,
    o_path: Option<&str>,
    confirm: bool,
) -> anyhow::Result<()> {
    println!("👶 Creating the entry...");

    let server_host = get_prop_value("server.host")?;
    let project_server_port: u16 = get_prop_value("ps.port")?.parse()?;
    println!("Project server port : {}", project_server_port);
    let client = ProjectServerClient::new(&server_host, project_server_port);

    let sid = read_session_id()?;
    let project_id = parse_project_id(project_id)?;

    let request = NewEntryRequest {
        project_id,
        current_path: o_path.unwrap_or("").to_owned(),
        filename: Some(name.to_owned()),
        ext: o_ext.map(|e| e.to_owned()),
        confirm,
    };

    let reply = client.new_entry(&request, &sid);
    print_new_entry_reply(reply)
}

///
pub(crate) fn folder_new(project_id: &str, name: &str, o_path: Option<&str>) -> anyhow::Result<()> {
    println!("👶 Creating the folder...");

    let server_host = get_prop_value("server.host")?;
    let project_server_port: u16 = get_prop_value("ps.port")?.parse()?;
    println!("Project server port : {}", project_server_port);
    let client = ProjectServerClient::new(&server_host, project_server_port);

    let sid = read_session_id()?;
    let project_id = parse_project_id(project_id)?;

    // the trailing slash routes the candidate to the folder branch
    let filename = format!("{}/", name.trim_end_matches('/'));

    let request = NewEntryRequest {
        project_id,
        current_path: o_path.unwrap_or("").to_owned(),
        filename: Some(filename),
        ext: None,
        confirm: false,
    };

    let reply = client.new_entry(&request, &sid);
    print_new_entry_reply(reply)
}

fn print_new_entry_reply(reply: WebResponse<NewEntryReply>) -> anyhow::Result<()> {
    match reply {
        Ok(reply) => {
            if reply.needs_confirmation {
                println!(
                    "⛔ The name [{}] has no extension, run again with --confirm to create it anyway",
                    reply.name
                );
            } else {
                println!(
                    "😎 Entry successfully created, kind : {}, name : {}{}",
                    reply.kind,
                    reply.name,
                    reply.hint.unwrap_or_default()
                );
            }
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e.message)),
    }
}

///
pub(crate) fn file_upload(
    project_id: &str,
    local_path: &str,
    o_path: Option<&str>,
) -> anyhow::Result<()> {
    println!("👶 Uploading the file...");

    let server_host = get_prop_value("server.host")?;
    let project_server_port: u16 = get_prop_value("ps.port")?.parse()?;
    println!("Project server port : {}", project_server_port);
    let client = ProjectServerClient::new(&server_host, project_server_port);

    let sid = read_session_id()?;
    let project_id = parse_project_id(project_id)?;

    let file = File::open(Path::new(&local_path))?;
    let mut buf_reader = BufReader::new(file);
    let mut binary: Vec<u8> = vec![];
    let _n = buf_reader.read_to_end(&mut binary)?;

    let file_name = Path::new(local_path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(anyhow!("Cannot read the file name, path=[{}]", local_path))?;

    let wr_reply = client.upload(&project_id, o_path.unwrap_or(""), file_name, &binary, &sid);

    match wr_reply {
        Ok(reply) => {
            println!(
                "😎 File successfully uploaded, name : {}, size : {}, entries in the folder : {}",
                reply.file_name, reply.size, reply.listing_count
            );
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e.message)),
    }
}

///
pub(crate) fn listing_get(project_id: &str, o_path: Option<&str>) -> anyhow::Result<()> {
    println!("👶 Getting the directory listing...");

    let server_host = get_prop_value("server.host")?;
    let project_server_port: u16 = get_prop_value("ps.port")?.parse()?;
    println!("Project server port : {}", project_server_port);
    let client = ProjectServerClient::new(&server_host, project_server_port);

    let sid = read_session_id()?;
    let project_id = parse_project_id(project_id)?;

    let wr_reply = client.listing(&project_id, o_path.unwrap_or(""), &sid);

    match wr_reply {
        Ok(reply) => {
            println!("kind\tsize\tmodified\tname");
            for entry in reply.entries {
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.kind,
                    entry.size.map(|s| s.to_string()).unwrap_or_default(),
                    entry.modified.map(|m| m.to_string()).unwrap_or_default(),
                    entry.name
                );
            }
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e.message)),
    }
}

/// Print the file type registry behind the dropdown
pub(crate) fn types_list() -> anyhow::Result<()> {
    println!("👶 Getting the file types...");

    let server_host = get_prop_value("server.host")?;
    let project_server_port: u16 = get_prop_value("ps.port")?.parse()?;
    println!("Project server port : {}", project_server_port);
    let client = ProjectServerClient::new(&server_host, project_server_port);

    let sid = read_session_id()?;

    let wr_reply = client.file_types(&sid);

    match wr_reply {
        Ok(reply) => {
            println!("ext\tlabel");
            for file_type in reply.file_types {
                println!("{}\t{}", file_type.ext, file_type.label);
            }
            println!("Special names : {}", reply.special_names.join(", "));
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e.message)),
    }
}

pub(crate) fn parse_project_id(project_id: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(project_id)
        .map_err(|_| anyhow!("The project id is not a uuid, project_id=[{}]", project_id))
}
