use super::{types::Config, ConfigError};
use crate::clock::parse_utc_offset;

/// Validate configuration
/// Currently validates:
/// - Ticket and timestamp columns are 1-based and distinct
/// - Template, folder and counter key are not blank
/// - Timezone is a fixed UTC offset
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let dataset = &config.dataset;
    if dataset.ticket_column == 0 {
        return Err(ConfigError::ValidationError(
            "dataset.ticket_column is 1-based and cannot be 0".to_string(),
        ));
    }
    if dataset.timestamp_column == 0 {
        return Err(ConfigError::ValidationError(
            "dataset.timestamp_column is 1-based and cannot be 0".to_string(),
        ));
    }
    if dataset.ticket_column == dataset.timestamp_column {
        return Err(ConfigError::ValidationError(format!(
            "dataset.ticket_column and dataset.timestamp_column are both {}",
            dataset.ticket_column
        )));
    }

    if config.documents.template_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "documents.template_id cannot be empty".to_string(),
        ));
    }
    if config.documents.folder_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "documents.folder_id cannot be empty".to_string(),
        ));
    }

    if config.state.counter_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "state.counter_key cannot be empty".to_string(),
        ));
    }

    if parse_utc_offset(&config.clock.timezone).is_none() {
        return Err(ConfigError::ValidationError(format!(
            "clock.timezone '{}' is not a UTC offset (expected \"UTC\" or \"+HH:MM\")",
            config.clock.timezone
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ClockConfig, DatasetConfig, DocumentsConfig, StateConfig, TicketingConfig,
    };
    use std::path::PathBuf;

    fn valid_config() -> Config {
        Config {
            dataset: DatasetConfig {
                path: PathBuf::from("responses.csv"),
                ticket_column: 1,
                timestamp_column: 2,
            },
            state: StateConfig::default(),
            documents: DocumentsConfig {
                root: PathBuf::from("drive"),
                template_id: "template.txt".to_string(),
                folder_id: "cards".to_string(),
            },
            clock: ClockConfig::default(),
            ticketing: TicketingConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_zero_ticket_column_fails() {
        let mut config = valid_config();
        config.dataset.ticket_column = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_same_columns_fails() {
        let mut config = valid_config();
        config.dataset.timestamp_column = 1;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("both 1"));
    }

    #[test]
    fn test_validate_blank_template_fails() {
        let mut config = valid_config();
        config.documents.template_id = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_blank_folder_fails() {
        let mut config = valid_config();
        config.documents.folder_id = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_timezone_fails() {
        let mut config = valid_config();
        config.clock.timezone = "Asia/Manila".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Asia/Manila"));
    }

    #[test]
    fn test_validate_offset_timezone_passes() {
        let mut config = valid_config();
        config.clock.timezone = "+08:00".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
