use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for one multipart upload body, in bytes.
    pub max_upload_bytes: usize,
}

/// Pipeline knobs, passed into the merger service explicitly so the
/// pipeline itself stays free of any HTTP dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How many leading rows of a sheet are scanned for the header row.
    pub header_scan_limit: usize,
    /// Base name (without extension) of the generated report file.
    pub output_filename: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_upload_bytes: 50 * 1024 * 1024,
            },
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            header_scan_limit: 20,
            output_filename: "Merged_Orders_Summary".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(50 * 1024 * 1024),
            },
            pipeline: PipelineConfig {
                header_scan_limit: std::env::var("HEADER_SCAN_LIMIT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(20),
                output_filename: std::env::var("OUTPUT_FILENAME")
                    .unwrap_or_else(|_| "Merged_Orders_Summary".to_string()),
            },
        }
    }
}
