//! Card generation for a single sheet row.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fields::CardFields;
use crate::dataset::{Dataset, DatasetError, HeaderMap};
use crate::document::{DocumentError, DocumentHandle, DocumentStore};

/// Errors raised while generating a card.
#[derive(Debug, Error)]
pub enum CardError {
    /// Row 1 is the header; cards start at row 2.
    #[error("Row {row_number} cannot hold a card (data rows start at 2)")]
    InvalidRow { row_number: usize },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl CardError {
    /// Whether the error comes from configuration (template or folder) rather
    /// than from the row being processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CardError::Document(e) if e.is_fatal())
    }
}

/// Where cards come from and where they go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTemplate {
    pub template_id: String,
    pub folder_id: String,
}

impl CardTemplate {
    pub fn new(template_id: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            folder_id: folder_id.into(),
        }
    }
}

/// A card that was written.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCard {
    pub row_number: usize,
    pub fields: CardFields,
    pub document: DocumentHandle,
    /// Placeholder occurrences replaced in the body.
    pub replacements: usize,
}

/// Produces one card document per row from a template.
pub struct CardGenerator {
    dataset: Arc<dyn Dataset>,
    documents: Arc<dyn DocumentStore>,
    template: CardTemplate,
}

impl CardGenerator {
    pub fn new(
        dataset: Arc<dyn Dataset>,
        documents: Arc<dyn DocumentStore>,
        template: CardTemplate,
    ) -> Self {
        Self {
            dataset,
            documents,
            template,
        }
    }

    pub fn template(&self) -> &CardTemplate {
        &self.template
    }

    /// Read the header row into a lookup map.
    pub fn read_header(&self) -> Result<HeaderMap, CardError> {
        let header = self.dataset.read_row(1)?;
        Ok(HeaderMap::from_row(&header))
    }

    /// Generate the card for a 1-based row, reading the header first.
    pub fn generate(&self, row_number: usize) -> Result<GeneratedCard, CardError> {
        if row_number < 2 {
            return Err(CardError::InvalidRow { row_number });
        }
        let header = self.read_header()?;
        self.generate_with_header(&header, row_number)
    }

    /// Generate the card for a 1-based row using an already built header map.
    pub fn generate_with_header(
        &self,
        header: &HeaderMap,
        row_number: usize,
    ) -> Result<GeneratedCard, CardError> {
        if row_number < 2 {
            return Err(CardError::InvalidRow { row_number });
        }

        let row = self.dataset.read_row(row_number)?;
        let fields = CardFields::resolve(header, &row);
        let name = fields.document_name();

        let document =
            self.documents
                .duplicate(&self.template.template_id, &self.template.folder_id, &name)?;

        let replacements = match self.fill(&document, &fields) {
            Ok(replacements) => replacements,
            Err(e) => {
                // drop the half-filled copy so a retry reuses the name
                if let Err(discard_err) = self.documents.discard(&document) {
                    warn!(
                        "Could not remove unfinished card '{}': {}",
                        document.location, discard_err
                    );
                }
                return Err(e.into());
            }
        };

        debug!(
            "Card '{}' written with {} replacements",
            document.name, replacements
        );
        info!(
            "Card created for {} at row {}",
            fields.account_number, row_number
        );

        Ok(GeneratedCard {
            row_number,
            fields,
            document,
            replacements,
        })
    }

    fn fill(&self, document: &DocumentHandle, fields: &CardFields) -> Result<usize, DocumentError> {
        let mut body = self.documents.open_body(document)?;
        let mut replacements = 0;
        for (token, value) in fields.placeholders() {
            replacements += body.replace_text(token, value);
        }
        self.documents.save_and_close(document, body)?;
        Ok(replacements)
    }
}
