use std::collections::HashMap;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
struct CmdOption {
    description: String,
    flags: Vec<String>,
    required: bool,
    #[serde(rename = "hasValue")]
    has_value: bool,
    key: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct Subcommand {
    name: String,
    description: String,
    options: Vec<CmdOption>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Command {
    name: String,
    sub: Vec<Subcommand>,
}

#[derive(Debug)]
pub struct Params {
    pub object: String,
    pub action: String,
    pub options: HashMap<String, Option<String>>,
}

pub fn load_commands() -> Vec<Command> {
    let command_str = include_str!("../commands.json");
    serde_json::from_str(command_str).unwrap_or_else(|e| {
        eprintln!("💣 Broken commands.json, err=[{}]", e);
        vec![]
    })
}

/// atelier-cli [object] [action] [options]
///
/// Every option is stored under its canonical key, whatever flag
/// spelling was typed.
pub fn parse_args(args: &[String], commands: &[Command]) -> anyhow::Result<Params> {
    let object = args.get(1).ok_or(anyhow!("Don't find 1st param"))?.clone();

    if object == "help" {
        return Ok(Params {
            object: "help".to_string(),
            action: "help".to_string(),
            options: HashMap::new(),
        });
    }

    let action = args.get(2).ok_or(anyhow!("Don't find 2nd param"))?.clone();
    let mut options: HashMap<String, Option<String>> = HashMap::new();
    let mut i = 3;

    loop {
        if i > args.len() - 1 {
            break;
        }
        let option_flag = args
            .get(i)
            .ok_or(anyhow!("Don't find param, i=[{}]", i))?
            .clone();
        i += 1;

        let option =
            find_option(commands, &object, &action, &option_flag).map_err(|e| anyhow!(e))?;

        let option_value = if option.has_value {
            let value = args
                .get(i)
                .ok_or(anyhow!("Missing value for option [{}]", option_flag))?
                .clone();
            i += 1;
            Some(value)
        } else {
            None
        };

        options.insert(option.key.clone(), option_value);
    }

    Ok(Params {
        object,
        action,
        options,
    })
}

fn find_option<'a>(
    commands: &'a [Command],
    command_name: &str,
    subcommand_name: &str,
    option_flag: &str,
) -> Result<&'a CmdOption, String> {
    let command = commands
        .iter()
        .find(|cmd| cmd.name == command_name)
        .ok_or(format!("Command {} not found", command_name))?;

    let subcommand = command
        .sub
        .iter()
        .find(|subcmd| subcmd.name == subcommand_name)
        .ok_or(format!(
            "Subcommand {} not found in command {}",
            subcommand_name, command_name
        ))?;

    let option = subcommand
        .options
        .iter()
        .find(|opt| opt.flags.contains(&option_flag.to_string()))
        .ok_or(format!(
            "Option with flag {} not found in subcommand {}",
            option_flag, subcommand_name
        ))?;

    Ok(option)
}

pub fn display_commands(commands: &[Command]) {
    println!("Usage : atelier-cli [object] [action] [options]");
    for command in commands {
        for sub in &command.sub {
            println!();
            println!("atelier-cli {} {} : {}", command.name, sub.name, sub.description);
            for option in &sub.options {
                let value_hint = if option.has_value { " <value>" } else { "" };
                let tag = if option.required { "required" } else { "optional" };
                println!(
                    "    {}{} ({}) : {}",
                    option.flags.join(", "),
                    value_hint,
                    tag,
                    option.description
                );
            }
        }
    }
    println!();
    println!("atelier-cli help : display this page");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(|s| s.to_string()).collect()
    }

    #[test]
    fn commands_json_is_loadable() {
        let commands = load_commands();
        assert!(!commands.is_empty());
        assert!(commands.iter().any(|c| c.name == "file"));
    }

    #[test]
    fn parse_file_new_with_all_the_options() {
        let commands = load_commands();
        let params = parse_args(
            &args("atelier-cli file new -pj 6a3b9f2c-0d34-4430-a1f2-7dd534a4a4a4 -n notes -e md -p docs --confirm"),
            &commands,
        )
        .unwrap();

        assert_eq!("file", params.object);
        assert_eq!("new", params.action);
        assert_eq!(
            Some("notes".to_string()),
            params.options.get("-n").unwrap().clone()
        );
        assert_eq!(
            Some("md".to_string()),
            params.options.get("-e").unwrap().clone()
        );
        // flag without value
        assert_eq!(None, params.options.get("--confirm").unwrap().clone());
    }

    #[test]
    fn long_flags_are_stored_under_the_canonical_key() {
        let commands = load_commands();
        let params = parse_args(
            &args("atelier-cli listing get --project 6a3b9f2c-0d34-4430-a1f2-7dd534a4a4a4 --path docs"),
            &commands,
        )
        .unwrap();

        assert!(params.options.contains_key("-pj"));
        assert_eq!(
            Some("docs".to_string()),
            params.options.get("-p").unwrap().clone()
        );
    }

    #[test]
    fn unknown_option_is_refused() {
        let commands = load_commands();
        let r = parse_args(&args("atelier-cli listing get --nope 12"), &commands);
        assert!(r.is_err());
    }

    #[test]
    fn help_needs_no_action() {
        let commands = load_commands();
        let params = parse_args(&args("atelier-cli help"), &commands);
        assert_eq!("help", params.unwrap().action);
    }
}
