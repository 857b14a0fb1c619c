use std::fs::File;
use std::io::{BufReader, Read, Write};

use anyhow::anyhow;
use uuid::Uuid;

use crate::get_target_file;

/// Store the sid delivered by the workspace, all the other commands
/// read it back from the config folder.
pub(crate) fn session_use(sid: &str) -> anyhow::Result<()> {
    println!("👶 Store the session id...");

    let _ = Uuid::parse_str(sid).map_err(|_| anyhow!("The session id is not a uuid, sid=[{}]", sid))?;

    write_session_id(sid)?;

    println!("😎 Session id stored, sid : {}...", &sid[0..7]);
    Ok(())
}

fn write_session_id(session_id: &str) -> anyhow::Result<()> {
    let mut file = File::create(get_target_file("config/session.id")?)?;
    file.write_all(session_id.as_bytes())?;
    println!("💾 Session id stored");
    Ok(())
}

pub(crate) fn read_session_id() -> anyhow::Result<String> {
    let file = File::open(get_target_file("config/session.id")?)?;
    let mut buf_reader = BufReader::new(file);
    let mut content: String = "".to_string();
    let _ = buf_reader.read_to_string(&mut content)?;
    Ok(content)
}
