use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub state: StateConfig,
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub ticketing: TicketingConfig,
}

/// Dataset (response sheet) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// CSV file holding the sheet, header in the first record.
    pub path: PathBuf,
    /// 1-based column holding the ticket identifier.
    #[serde(default = "default_ticket_column")]
    pub ticket_column: usize,
    /// 1-based column holding the submission timestamp.
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: usize,
}

fn default_ticket_column() -> usize {
    1
}

fn default_timestamp_column() -> usize {
    2
}

/// Persistent state (counter + pending cards) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
    /// Property key under which the last issued ticket number is stored.
    #[serde(default = "default_counter_key")]
    pub counter_key: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
            counter_key: default_counter_key(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("ticketcard.db")
}

fn default_counter_key() -> String {
    "lastTicketNumber".to_string()
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentsConfig {
    /// Directory that template and folder identifiers resolve against.
    pub root: PathBuf,
    /// Identifier of the card template.
    pub template_id: String,
    /// Identifier of the folder receiving generated cards.
    pub folder_id: String,
}

/// Clock configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClockConfig {
    /// Fixed UTC offset such as "UTC", "+08:00" or "-05:30".
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Ticketing behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketingConfig {
    /// Start numbering after the highest ticket already present in the sheet
    /// when it is ahead of the stored counter.
    #[serde(default = "default_true")]
    pub reconcile_counter: bool,
    /// Run the card stage after assigning tickets.
    #[serde(default = "default_true")]
    pub generate_cards: bool,
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self {
            reconcile_counter: true,
            generate_cards: true,
        }
    }
}

fn default_true() -> bool {
    true
}
