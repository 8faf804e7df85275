//! Configuration for the ticket runner.

use crate::card::CardTemplate;
use crate::config::{Config, ConfigError};
use crate::ticket::AssignerConfig;

/// Settings for one ticket run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Numbering scan settings.
    pub assigner: AssignerConfig,
    /// Card template and destination folder.
    pub template: CardTemplate,
    /// Whether to drain the pending-card queue after numbering.
    pub generate_cards: bool,
}

impl RunnerConfig {
    /// Build from the loaded configuration file.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            assigner: AssignerConfig::from_config(config)?,
            template: CardTemplate::new(
                config.documents.template_id.clone(),
                config.documents.folder_id.clone(),
            ),
            generate_cards: config.ticketing.generate_cards,
        })
    }

    /// Disable or enable the card stage.
    pub fn with_card_generation(mut self, enabled: bool) -> Self {
        self.generate_cards = enabled;
        self
    }
}
