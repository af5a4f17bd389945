// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "tracefold";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".tracefold";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "tracefold.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TRACEFOLD_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TRACEFOLD_LOG";

// =============================================================================
// Environment Variables - Translation
// =============================================================================

/// Environment variable for the explicit dataset override
pub const ENV_DATASET: &str = "TRACEFOLD_DATASET";

/// Environment variable for the API key attached to translated requests
pub const ENV_API_KEY: &str = "TRACEFOLD_API_KEY";

// =============================================================================
// Input
// =============================================================================

/// Input path meaning "read from stdin"
pub const STDIN_INPUT: &str = "-";

/// File extension marking an OTLP/JSON body
pub const JSON_EXTENSION: &str = "json";

/// File extension marking a gzip compressed body
pub const GZIP_EXTENSION: &str = "gz";
