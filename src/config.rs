//! Server configuration.
//!
//! The whole configuration surface is the command line: `tinircd <port>
//! <password>`. Everything else (server identity, framing limits) carries
//! defaults.

use thiserror::Error;

/// Lowest port a non-privileged listener may use.
const MIN_PORT: u16 = 1024;

/// Errors produced by command-line validation.
///
/// The caller prints these and exits with status 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("expected exactly two arguments: <port> <password>")]
    WrongArgCount,

    #[error("invalid port {0:?}: not a number")]
    InvalidPort(String),

    #[error("port {0} out of range [1024, 65535]")]
    PortOutOfRange(u16),
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port to listen on.
    pub port: u16,
    /// Connection password clients must supply via PASS.
    pub password: String,
    /// Server identity.
    pub server: ServerConfig,
    /// Protocol limits.
    pub limits: LimitsConfig,
}

/// Server identity used in reply prefixes and the welcome line.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub network: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "tinircd.local".to_string(),
            network: "TinyNet".to_string(),
        }
    }
}

/// Protocol limits.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Maximum framed line length in bytes, terminator included.
    pub max_line_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: tinirc_proto::line::DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl Config {
    /// Build a configuration from the program arguments (sans argv[0]).
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Config, UsageError> {
        let (Some(port_arg), Some(password), None) = (args.next(), args.next(), args.next())
        else {
            return Err(UsageError::WrongArgCount);
        };

        let port: u16 = port_arg
            .parse()
            .map_err(|_| UsageError::InvalidPort(port_arg.clone()))?;
        if port < MIN_PORT {
            return Err(UsageError::PortOutOfRange(port));
        }

        Ok(Config {
            port,
            password,
            server: ServerConfig::default(),
            limits: LimitsConfig::default(),
        })
    }
}
