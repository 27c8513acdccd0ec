//! Configuration management for the archive client.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks:
//!
//! - `ORTHANC_URI` - Archive base URL (default: http://localhost:8042)
//! - `ORTHANC_USER` - Basic-auth user
//! - `ORTHANC_PASSWORD` - Basic-auth password
//! - `ORTHANC_TIMEOUT` - Request timeout in seconds (default: 30)
//! - `ORTHANC_CHANGE_LIMIT` - Change-log entries per page (default: 10)
//!
//! # Example
//!
//! ```ignore
//! use orthanc_lazy::config::Cli;
//!
//! let cli = Cli::parse();
//! cli.connection.validate()?;
//! let orthanc = Orthanc::connect(&cli.connection)?;
//! ```

use clap::{Args, Parser, Subcommand};

use crate::changes::{ChangeType, DEFAULT_CHANGE_LIMIT};
use crate::resource::ResourceKind;
use crate::transport::DEFAULT_TIMEOUT_SECS;

// =============================================================================
// Default Values
// =============================================================================

/// Default archive URL (Orthanc's stock HTTP port).
pub const DEFAULT_HOST: &str = "http://localhost:8042";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Browse an Orthanc archive: patients, studies, series, instances and the
/// change feed.
#[derive(Parser, Debug, Clone)]
#[command(name = "orthanc-lazy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionConfig,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings for one archive.
#[derive(Args, Debug, Clone)]
pub struct ConnectionConfig {
    /// Archive base URL.
    #[arg(long, global = true, default_value = DEFAULT_HOST, env = "ORTHANC_URI")]
    pub host: String,

    /// User for HTTP basic authentication.
    ///
    /// Credentials are sent with every request when set.
    #[arg(long, global = true, env = "ORTHANC_USER")]
    pub user: Option<String>,

    /// Password for HTTP basic authentication.
    #[arg(long, global = true, env = "ORTHANC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS, env = "ORTHANC_TIMEOUT")]
    pub timeout: u64,

    /// Number of change-log entries requested per page.
    #[arg(long, global = true, default_value_t = DEFAULT_CHANGE_LIMIT, env = "ORTHANC_CHANGE_LIMIT")]
    pub change_limit: u32,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show a patient and its studies.
    Patient { id: String },

    /// Show a study and its series.
    Study { id: String },

    /// Show a series and its preview URL.
    Series { id: String },

    /// Show an instance.
    Instance { id: String },

    /// Stream ids of resources that became stable.
    Changes {
        #[arg(value_enum)]
        change_type: ChangeType,
    },

    /// List configured remote modalities.
    Modalities,

    /// Create an anonymized copy of a study.
    Anonymize {
        study: String,

        /// Replacement for PatientName and PatientID.
        obscure_id: String,
    },

    /// Send a study to a remote modality.
    Send { study: String, modality: String },

    /// Delete a resource on the archive.
    Delete {
        #[arg(value_enum)]
        kind: ResourceKind,
        id: String,
    },

    /// Print the absolute URL of an archive path without fetching it.
    Url { path: String },
}

impl ConnectionConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.host)
            .map_err(|e| format!("Invalid host '{}': {}. Set --host or ORTHANC_URI", self.host, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "Host must be an http or https URL, got scheme '{}'",
                url.scheme()
            ));
        }

        if self.password.is_some() && self.user.is_none() {
            return Err("A password was given without a user. Set --user or ORTHANC_USER".to_string());
        }

        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }
        if self.change_limit == 0 {
            return Err("change_limit must be greater than 0".to_string());
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
