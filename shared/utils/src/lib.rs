pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod bom;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use bom::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.pricing.base_url, "http://api.findchips.com");
        assert_eq!(config.pricing.result_limit, 15);
        assert_eq!(config.pricing.service, None);
        assert_eq!(config.grouping.part_number_field, "Mfg_Part_No");
        assert_eq!(config.grouping.no_part_sentinel, "-");
        assert!(!config.grouping.enabled);
        assert!(config
            .logging
            .resolved_file_path()
            .ends_with(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.toml");
        std::fs::write(
            &path,
            "[pricing]\nservice = \"findchips\"\nresult_limit = 5\n\n[grouping]\nenabled = true\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.pricing.service, Some(PricingService::FindChips));
        assert_eq!(config.pricing.result_limit, 5);
        assert_eq!(config.pricing.base_url, "http://api.findchips.com");
        assert!(config.grouping.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_error_handling() {
        let error = BomError::validation("input", "test message");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.exit_code(), 2);
        assert!(!error.is_recoverable());

        let error = BomError::external_service("FindChips", "HTTP 500");
        assert_eq!(error.exit_code(), 1);
        assert!(error.is_recoverable());
    }
}
