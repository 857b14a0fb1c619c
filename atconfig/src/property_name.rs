//! Names of the properties used across the services

pub const LOG_CONFIG_FILE_PROPERTY: &str = "log4rs.config";
pub const SERVER_PORT_PROPERTY: &str = "server.port";
pub const SERVER_HOSTNAME_PROPERTY: &str = "server.host";

pub const PROJECT_SERVER_PORT_PROPERTY: &str = "ps.port";

pub const RUNTIME_HOSTNAME_PROPERTY: &str = "runtime.host";
pub const RUNTIME_PORT_PROPERTY: &str = "runtime.port";
