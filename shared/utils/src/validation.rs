use crate::config::{AppConfig, PricingService};
use crate::error::{BomError, BomResult};
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationErrors};

pub fn validate_config(config: &AppConfig) -> BomResult<()> {
    match config.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(BomError::configuration(format_validation_errors(&errors))),
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (section, nested) in errors.errors() {
        match nested {
            validator::ValidationErrorsKind::Struct(inner) => {
                messages.push(format!("{}: {}", section, format_validation_errors(inner)));
            }
            validator::ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("Validation failed for field '{}': {}", section, error.code),
                    };
                    messages.push(message);
                }
            }
            validator::ValidationErrorsKind::List(_) => {
                messages.push(format!("Validation failed for list '{}'", section));
            }
        }
    }

    messages.join(", ")
}

/// Checks that an input netlist was given and exists
pub fn validate_input_file(input: Option<&Path>) -> BomResult<&Path> {
    let path = match input {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => return Err(BomError::configuration("Input filename missing")),
    };

    if !path.is_file() {
        return Err(BomError::configuration(format!(
            "Input file does not exist: {}",
            path.display()
        )));
    }

    Ok(path)
}

/// Online pricing needs an API key
pub fn validate_pricing_credentials(
    service: Option<PricingService>,
    api_key: Option<&str>,
) -> BomResult<()> {
    match service {
        Some(service) if api_key.map_or(true, |key| key.trim().is_empty()) => {
            Err(BomError::configuration(format!(
                "Have asked for online pricing {} but no API Key given",
                service
            )))
        }
        _ => Ok(()),
    }
}

/// Output base used when none is given: the input path without its
/// extension, suffixed with `_BOM`.
pub fn default_output_base(input: &Path) -> PathBuf {
    let mut base = input.with_extension("").into_os_string();
    base.push("_BOM");
    PathBuf::from(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_input_is_configuration_error() {
        let error = validate_input_file(None).unwrap_err();
        assert_eq!(error.error_code(), "CONFIGURATION_ERROR");
        assert_eq!(error.exit_code(), 2);

        let error = validate_input_file(Some(Path::new(""))).unwrap_err();
        assert!(error.to_string().contains("missing"));
    }

    #[test]
    fn test_nonexistent_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.xml");
        let error = validate_input_file(Some(&missing)).unwrap_err();
        assert!(error.to_string().contains("does not exist"));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_existing_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<export/>").unwrap();
        assert!(validate_input_file(Some(file.path())).is_ok());
    }

    #[test]
    fn test_pricing_requires_api_key() {
        assert!(validate_pricing_credentials(None, None).is_ok());
        assert!(validate_pricing_credentials(Some(PricingService::FindChips), Some("abc")).is_ok());

        let error = validate_pricing_credentials(Some(PricingService::FindChips), None).unwrap_err();
        assert!(error.to_string().contains("FindChips"));
        assert!(validate_pricing_credentials(Some(PricingService::FindChips), Some("  ")).is_err());
    }

    #[test]
    fn test_default_output_base() {
        assert_eq!(
            default_output_base(Path::new("/tmp/board/board.xml")),
            PathBuf::from("/tmp/board/board_BOM")
        );
        assert_eq!(default_output_base(Path::new("netlist")), PathBuf::from("netlist_BOM"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_config_reports_section() {
        let mut config = AppConfig::default();
        config.pricing.result_limit = 0;
        config.grouping.part_number_field.clear();

        let error = validate_config(&config).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Result limit"));
        assert!(message.contains("Part number field"));
    }
}
