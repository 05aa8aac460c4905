//! Shared application state.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::TransactionSettings;
use crate::service::{
    CatalogService, ExamCompositionService, ExamHierarchyReader, SpreadsheetImporter,
    TransactionRunner,
};
use crate::storage::AttachmentStore;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub composition: ExamCompositionService,
    pub importer: SpreadsheetImporter,
    pub reader: ExamHierarchyReader,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        store: Arc<dyn AttachmentStore>,
        transaction: TransactionSettings,
    ) -> Self {
        let runner = TransactionRunner::new(db.clone(), transaction);
        Self {
            composition: ExamCompositionService::new(runner.clone(), store),
            importer: SpreadsheetImporter::new(runner.clone()),
            reader: ExamHierarchyReader::new(db),
            catalog: CatalogService::new(runner),
        }
    }
}
