use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::exit;

use java_properties::read;

/// Read the atelier env value
/// It's the path where we can find the properties for the service
pub fn read_atelier_env(var_name: &str) -> Option<String> {
    let mut atelier_env: Option<String> = None;
    let args: Vec<String> = env::args().collect();
    let mut index = 1;

    // Parse command-line arguments to look for "--atelier-env"
    while index < args.len() {
        let v = &args[index];
        match v.as_str() {
            "--atelier-env" => {
                if let Some(k) = args.get(index + 1) {
                    atelier_env = Some(k.clone());
                }
                index += 2; // Skip the value after "--atelier-env"
            }
            _ => {
                index += 1;
            }
        }
    }

    // If no "--atelier-env" argument is found, check the environment variable
    if atelier_env.is_none() {
        atelier_env = match env::var(var_name) {
            Ok(env) => Some(env),
            Err(e) => {
                eprintln!("💣 Cannot find the {} system variable: {}", var_name, e);
                None
            }
        };
    }

    atelier_env
}

/// Read the configuration file for the given program
/// The property file is expected at {env_folder}/{project_code}/config/application.properties
pub fn read_config(project_code: &str, env_folder: &Option<String>) -> HashMap<String, String> {
    let property_file = match env_folder {
        Some(folder) => Path::new(folder)
            .join(project_code)
            .join("config/application.properties"),
        None => {
            eprintln!("💣 No configuration folder for the program : {}", project_code);
            exit(89);
        }
    };

    let Ok(props) = read_config_from_path(&property_file) else {
        exit(100);
    };

    props
}

/// Read the configuration file from a direct path
/// Property values may reference system environment variables with the ${KEY} notation,
/// they are substituted here.
pub fn read_config_from_path(property_file: &PathBuf) -> anyhow::Result<HashMap<String, String>> {
    println!(
        "Read the properties from the file : {}",
        property_file.to_str().unwrap_or("Not found")
    );

    let props = match File::open(property_file) {
        Ok(f) => read(BufReader::new(f)).unwrap_or_else(|e| {
            eprintln!("💣 Cannot read the configuration file, e={}", e);
            HashMap::new()
        }),
        Err(e) => {
            eprintln!("💣 Cannot open the property file, e={}", e);
            HashMap::new()
        }
    };

    let resolved_props: HashMap<String, String> = props
        .into_iter()
        .map(|(key, value)| (key, replace_value_with_env(&value)))
        .collect();

    Ok(resolved_props)
}

/// Replaces a single property's value by substituting environment variables.
fn replace_value_with_env(value: &str) -> String {
    let mut resolved_value = value.to_string();

    for (env_key, env_value) in env::vars() {
        let placeholder = format!("${{{}}}", env_key); // Placeholder format: ${KEY}
        if resolved_value.contains(&placeholder) {
            resolved_value = resolved_value.replace(&placeholder, &env_value);
        }
    }

    resolved_value
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn read_props_with_env_interpolation() -> anyhow::Result<()> {
        env::set_var("ATELIER_TEST_DB_HOST", "pg-main");

        let dir = env::temp_dir().join("atconfig-test");
        std::fs::create_dir_all(&dir)?;
        let file_path = dir.join("application.properties");
        let mut f = File::create(&file_path)?;
        writeln!(f, "server.port=30090")?;
        writeln!(f, "db.hostname=${{ATELIER_TEST_DB_HOST}}")?;
        writeln!(f, "runtime.host=localhost")?;

        let props = read_config_from_path(&file_path)?;

        assert_eq!(Some(&"30090".to_string()), props.get("server.port"));
        assert_eq!(Some(&"pg-main".to_string()), props.get("db.hostname"));
        assert_eq!(Some(&"localhost".to_string()), props.get("runtime.host"));
        Ok(())
    }

    #[test]
    fn missing_file_gives_empty_props() -> anyhow::Result<()> {
        let file_path = env::temp_dir().join("atconfig-test/no_such.properties");
        let props = read_config_from_path(&file_path)?;
        assert!(props.is_empty());
        Ok(())
    }
}
