#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use exambank_api_types::{OptionPayload, QuestionFields};
use exambank_core::domain::{ExamId, PartId};
use exambank_migration::{Migrator, MigratorTrait};
use exambank_server::config::TransactionSettings;
use exambank_server::repository::{
    ExamRepository, NewExam, NewPart, PartRepository, SubjectRepository,
};
use exambank_server::storage::{
    AttachmentStore, Result as StorageResult, StorageError, StoredAttachment, UploadDir,
    UploadedFile,
};
use sea_orm::{Database, DatabaseConnection};

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should open");
    Migrator::up(&db, None)
        .await
        .expect("migrations should apply");
    db
}

pub fn settings() -> TransactionSettings {
    TransactionSettings::default()
}

/// Keeps uploads in memory and records what was written and removed.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    removed: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl MemoryStore {
    pub fn stored_urls(&self) -> Vec<String> {
        self.files
            .lock()
            .expect("store lock")
            .keys()
            .cloned()
            .collect()
    }

    pub fn removed_urls(&self) -> Vec<String> {
        self.removed.lock().expect("store lock").clone()
    }
}

#[async_trait]
impl AttachmentStore for MemoryStore {
    async fn prepare_dir(&self, _dir: &UploadDir) -> StorageResult<()> {
        Ok(())
    }

    async fn save(&self, dir: &UploadDir, file: &UploadedFile) -> StorageResult<StoredAttachment> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let url = format!(
            "/uploads/{}/{n}-{}",
            dir.relative_path().display(),
            file.file_name
        );
        self.files
            .lock()
            .expect("store lock")
            .insert(url.clone(), file.bytes.clone());
        Ok(StoredAttachment { url })
    }

    async fn remove(&self, url: &str) -> StorageResult<()> {
        let existed = self.files.lock().expect("store lock").remove(url);
        if existed.is_none() {
            return Err(StorageError::NotManaged(url.to_string()));
        }
        self.removed
            .lock()
            .expect("store lock")
            .push(url.to_string());
        Ok(())
    }
}

pub struct Scope {
    pub exam_id: ExamId,
    pub part_id: PartId,
}

/// Seeds a subject, the named parts and one exam linked to all of them.
pub async fn seed_exam(db: &DatabaseConnection, exam: &str, parts: &[&str]) -> Vec<Scope> {
    let subject = SubjectRepository::new(db)
        .resolve_or_create("IELTS")
        .await
        .expect("subject");

    let mut part_ids = Vec::new();
    let part_repo = PartRepository::new(db);
    for name in parts {
        let part = match part_repo.find_by_name(name).await.expect("part lookup") {
            Some(part) => part,
            None => part_repo
                .create(NewPart {
                    name: name.to_string(),
                    order: None,
                })
                .await
                .expect("part"),
        };
        part_ids.push(part.id);
    }

    let exam = ExamRepository::new(db)
        .create(NewExam {
            subject_id: subject.id,
            name: exam.to_string(),
        })
        .await
        .expect("exam");

    part_ids
        .into_iter()
        .map(|part_id| Scope {
            exam_id: exam.id,
            part_id,
        })
        .collect()
}

pub fn question(title: &str) -> QuestionFields {
    QuestionFields {
        title: Some(title.to_string()),
        description: None,
        option: Some(OptionPayload::Map(BTreeMap::from([
            ("A".to_string(), "x".to_string()),
            ("B".to_string(), "y".to_string()),
        ]))),
        correct_option: Some("A".to_string()),
        score: Some("5".to_string()),
    }
}

pub fn image(name: &str) -> UploadedFile {
    UploadedFile {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

pub fn audio(name: &str) -> UploadedFile {
    UploadedFile {
        file_name: name.to_string(),
        content_type: "audio/mpeg".to_string(),
        bytes: vec![0xFF, 0xFB],
    }
}

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::default())
}
