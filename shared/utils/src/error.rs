use thiserror::Error;

#[derive(Error, Debug)]
pub enum BomError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Netlist parse error: {message}")]
    Parse { message: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BomError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Process exit status for this error. Bad parameters exit with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } | Self::Validation { .. } => 2,
            _ => 1,
        }
    }

    /// Whether the export can carry on after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ExternalService { .. })
    }
}

pub type BomResult<T> = Result<T, BomError>;

impl From<std::io::Error> for BomError {
    fn from(error: std::io::Error) -> Self {
        Self::io("<unknown>", error.to_string())
    }
}

impl From<csv::Error> for BomError {
    fn from(error: csv::Error) -> Self {
        Self::io("CSV output", error.to_string())
    }
}

impl From<quick_xml::Error> for BomError {
    fn from(error: quick_xml::Error) -> Self {
        Self::parse(error.to_string())
    }
}

impl From<reqwest::Error> for BomError {
    fn from(error: reqwest::Error) -> Self {
        Self::external_service("HTTP Client", error.to_string())
    }
}

impl From<serde_json::Error> for BomError {
    fn from(error: serde_json::Error) -> Self {
        Self::external_service("JSON", error.to_string())
    }
}

impl From<config::ConfigError> for BomError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
