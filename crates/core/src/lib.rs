pub mod card;
pub mod clock;
pub mod config;
pub mod dataset;
pub mod document;
pub mod orchestrator;
pub mod state;
pub mod testing;
pub mod ticket;

pub use card::{CardError, CardFields, CardGenerator, CardTemplate, GeneratedCard};
pub use clock::{Clock, SystemClock};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use dataset::{CellValue, CsvDataset, Dataset, DatasetError};
pub use document::{DocumentError, DocumentStore, FsDocumentStore};
pub use orchestrator::{RunReport, RunnerConfig, RunnerError, TicketRunner};
pub use state::{CardQueue, PropertyStore, SqliteStateStore, StateError};
pub use ticket::{AssignerConfig, ScanReport, TicketAssigner, TicketError, TicketId};
