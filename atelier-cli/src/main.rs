use std::collections::HashMap;
use std::env;
use std::env::current_exe;
use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::anyhow;

use atconfig::conf_reader::{read_atelier_env, read_config};
use atconfig::properties::{get_prop_value, set_prop_values};
use commons_error::*;

use crate::access_commands::access_list;
use crate::command_options::{display_commands, load_commands, parse_args, Command, Params};
use crate::file_commands::{file_new, file_upload, folder_new, listing_get, types_list};
use crate::session_commands::session_use;

mod access_commands;
mod command_options;
mod file_commands;
mod session_commands;

const PARAMETER_ERROR: u16 = 10;
const CONFIGURATION_ERROR: u16 = 20;
const SESSION_STORE_FAILED: u16 = 30;
const NEW_ENTRY_FAILED: u16 = 40;
const NEW_FOLDER_FAILED: u16 = 50;
const FILE_UPLOAD_FAILED: u16 = 110;
const LISTING_FAILED: u16 = 120;
const TYPES_FAILED: u16 = 130;
const ACCESS_LIST_FAILED: u16 = 140;
const SUCCESS: u16 = 0;

fn read_configuration_file() -> anyhow::Result<()> {
    let atelier_env = read_atelier_env("ATELIER_CLI_ENV");
    let props = read_config("atelier-cli", &atelier_env);
    set_prop_values(props);
    Ok(())
}

fn extract_mandatory_option(
    options: &HashMap<String, Option<String>>,
    key: &str,
) -> anyhow::Result<String> {
    let opt_value = options
        .get(key)
        .ok_or_else(|| anyhow!("💣 Missing option, option=[{}]", key))?;
    let value = opt_value
        .as_ref()
        .ok_or_else(|| anyhow!("💣 Missing value, option=[{}]", key))?;
    Ok(value.to_owned())
}

fn extract_option(
    options: &HashMap<String, Option<String>>,
    key: &str,
) -> anyhow::Result<Option<String>> {
    let opt_value = options.get(key);
    match opt_value {
        None => Ok(None),
        Some(o_value) => Ok(o_value.to_owned()),
    }
}

fn dispatch(params: &Params, commands: &[Command]) -> u16 {
    match (params.object.as_str(), params.action.as_str()) {
        ("help", _) => {
            display_commands(commands);
            SUCCESS
        }
        ("session", "use") => {
            let Ok(sid) =
                extract_mandatory_option(&params.options, "-s").map_err(eprint_fwd!("Error"))
            else {
                return PARAMETER_ERROR;
            };
            let err = session_use(&sid);
            success_or_err(err, SESSION_STORE_FAILED)
        }
        ("file", "new") => {
            let Ok((project_id, name, o_ext, o_path)) = (|| -> anyhow::Result<(
                String,
                String,
                Option<String>,
                Option<String>,
            )> {
                Ok((
                    extract_mandatory_option(&params.options, "-pj")?,
                    extract_mandatory_option(&params.options, "-n")?,
                    extract_option(&params.options, "-e")?,
                    extract_option(&params.options, "-p")?,
                ))
            })()
            .map_err(eprint_fwd!("Error")) else {
                return PARAMETER_ERROR;
            };
            let confirm = params.options.contains_key("--confirm");
            let err = file_new(&project_id, &name, o_ext.as_deref(), o_path.as_deref(), confirm);
            success_or_err(err, NEW_ENTRY_FAILED)
        }
        ("folder", "new") => {
            let Ok((project_id, name, o_path)) =
                (|| -> anyhow::Result<(String, String, Option<String>)> {
                    Ok((
                        extract_mandatory_option(&params.options, "-pj")?,
                        extract_mandatory_option(&params.options, "-n")?,
                        extract_option(&params.options, "-p")?,
                    ))
                })()
                .map_err(eprint_fwd!("Error"))
            else {
                return PARAMETER_ERROR;
            };
            let err = folder_new(&project_id, &name, o_path.as_deref());
            success_or_err(err, NEW_FOLDER_FAILED)
        }
        ("file", "upload") => {
            let Ok((project_id, local_path, o_path)) =
                (|| -> anyhow::Result<(String, String, Option<String>)> {
                    Ok((
                        extract_mandatory_option(&params.options, "-pj")?,
                        extract_mandatory_option(&params.options, "-pt")?,
                        extract_option(&params.options, "-p")?,
                    ))
                })()
                .map_err(eprint_fwd!("Error"))
            else {
                return PARAMETER_ERROR;
            };
            let err = file_upload(&project_id, &local_path, o_path.as_deref());
            success_or_err(err, FILE_UPLOAD_FAILED)
        }
        ("listing", "get") => {
            let Ok((project_id, o_path)) = (|| -> anyhow::Result<(String, Option<String>)> {
                Ok((
                    extract_mandatory_option(&params.options, "-pj")?,
                    extract_option(&params.options, "-p")?,
                ))
            })()
            .map_err(eprint_fwd!("Error")) else {
                return PARAMETER_ERROR;
            };
            let err = listing_get(&project_id, o_path.as_deref());
            success_or_err(err, LISTING_FAILED)
        }
        ("types", "list") => {
            let err = types_list();
            success_or_err(err, TYPES_FAILED)
        }
        ("access", "list") => {
            let Ok((project_id, o_account, o_filename, o_start, o_length)) =
                (|| -> anyhow::Result<(
                    String,
                    Option<String>,
                    Option<String>,
                    Option<String>,
                    Option<String>,
                )> {
                    Ok((
                        extract_mandatory_option(&params.options, "-pj")?,
                        extract_option(&params.options, "--account")?,
                        extract_option(&params.options, "--filename")?,
                        extract_option(&params.options, "--start")?,
                        extract_option(&params.options, "--length")?,
                    ))
                })()
                .map_err(eprint_fwd!("Error"))
            else {
                return PARAMETER_ERROR;
            };
            let err = access_list(
                &project_id,
                o_account.as_deref(),
                o_filename.as_deref(),
                o_start.as_deref(),
                o_length.as_deref(),
            );
            success_or_err(err, ACCESS_LIST_FAILED)
        }
        (_, _) => {
            eprintln!(
                "💣 Unknown command, object=[{}], action=[{}]",
                params.object, params.action
            );
            display_commands(commands);
            PARAMETER_ERROR
        }
    }
}

fn success_or_err(err: anyhow::Result<()>, err_code: u16) -> u16 {
    match err {
        Ok(_) => SUCCESS,
        Err(e) => {
            eprintln!("💣 Command failed, err=[{}]", e);
            err_code
        }
    }
}

/// Resolve a file living next to the binary, or under
/// {ATELIER_CLI_ENV}/atelier-cli/ when the env var is set
pub fn get_target_file(termination_path: &str) -> anyhow::Result<PathBuf> {
    let atelier_cli_env = env::var("ATELIER_CLI_ENV").unwrap_or("".to_string());

    if !atelier_cli_env.is_empty() {
        Ok(Path::new(&atelier_cli_env)
            .join("atelier-cli")
            .join(termination_path))
    } else {
        let path = current_exe()?;
        let parent_path = path
            .parent()
            .ok_or(anyhow!("Problem to identify parent's binary folder"))?;
        Ok(parent_path.join(termination_path))
    }
}

///
/// atelier-cli [object] [action] [options]
///
/// The services are potentially on different servers and ports,
/// the properties file tells where they are.
///
fn main() {
    println!("atelier-cli version 0.3.0");

    let args: Vec<String> = env::args().collect();
    let commands = load_commands();

    let params = match parse_args(&args, &commands) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("💣 Error while parsing the arguments, err=[{}]", e);
            display_commands(&commands);
            exit_program(PARAMETER_ERROR as i32);
        }
    };

    match read_configuration_file() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("💣 Error while reading the configuration file, err=[{}]", e);
            exit_program(CONFIGURATION_ERROR as i32);
        }
    }

    let Ok(server_host) =
        get_prop_value("server.host").map_err(eprint_fwd!("Cannot read the server host"))
    else {
        exit_program(CONFIGURATION_ERROR as i32);
    };
    println!("Server host [{}]", &server_host);

    // main routing

    let exit_code = dispatch(&params, &commands);
    exit_program(exit_code as i32);
}

fn exit_program(code: i32) -> ! {
    println!("Terminated [{}]", code);
    exit(code)
}
