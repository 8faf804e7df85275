//! Document store for card output.
//!
//! A card is produced by duplicating a template into a destination folder,
//! editing the copy's text body and saving it:
//!
//! ```ignore
//! use ticketcard_core::document::{DocumentStore, FsDocumentStore};
//!
//! let store = FsDocumentStore::new("/srv/drive");
//! let handle = store.duplicate("card-template.txt", "cards", "1001 - 2021-00001 - REYES")?;
//! let mut body = store.open_body(&handle)?;
//! body.replace_text("{{LastName}}", "REYES");
//! store.save_and_close(&handle, body)?;
//! ```

mod error;
mod fs_store;
mod traits;
mod types;

pub use error::DocumentError;
pub use fs_store::FsDocumentStore;
pub use traits::DocumentStore;
pub use types::{DocumentBody, DocumentHandle};
