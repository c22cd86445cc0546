use uuid::Uuid;

use crate::{
    entities::{
        document::{ContentKind, Document},
        upload::UploadedFile,
    },
    errors::AppError,
    use_cases::content::ContentHandler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Editing,
    Submitting,
}

/// One editable draft plus the id of the document being edited, if any.
///
/// `Idle -> Editing -> Submitting -> Idle`. A successful submit clears the
/// draft and the editing id. A failed one keeps both so the caller can retry.
pub struct FormController<K: ContentKind> {
    handler: ContentHandler<K>,
    draft: K::Draft,
    editing_id: Option<Uuid>,
    phase: FormPhase,
}

impl<K: ContentKind> FormController<K> {
    pub fn new(handler: ContentHandler<K>) -> Self {
        FormController {
            handler,
            draft: K::Draft::default(),
            editing_id: None,
            phase: FormPhase::Idle,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn draft(&self) -> &K::Draft {
        &self.draft
    }

    pub fn editing_id(&self) -> Option<Uuid> {
        self.editing_id
    }

    pub fn draft_mut(&mut self) -> &mut K::Draft {
        self.phase = FormPhase::Editing;
        &mut self.draft
    }

    /// Starts a fresh draft for a new document.
    pub fn start_new(&mut self, draft: K::Draft) {
        self.draft = draft;
        self.editing_id = None;
        self.phase = FormPhase::Editing;
    }

    /// Loads an existing document for editing.
    pub fn edit(&mut self, document: &Document<K>) {
        self.draft = document.data.to_draft();
        self.editing_id = Some(document.id);
        self.phase = FormPhase::Editing;
    }

    pub fn reset(&mut self) {
        self.draft = K::Draft::default();
        self.editing_id = None;
        self.phase = FormPhase::Idle;
    }

    pub async fn submit(&mut self) -> Result<Document<K>, AppError> {
        self.phase = FormPhase::Submitting;
        let result = self.handler.submit(self.draft.clone(), self.editing_id).await;
        self.finish(result)
    }

    pub async fn submit_with_upload(&mut self, file: UploadedFile) -> Result<Document<K>, AppError> {
        self.phase = FormPhase::Submitting;
        let result = self.handler
            .submit_with_upload(self.draft.clone(), self.editing_id, file)
            .await;
        self.finish(result)
    }

    fn finish(&mut self, result: Result<Document<K>, AppError>) -> Result<Document<K>, AppError> {
        match result {
            Ok(document) => {
                self.reset();
                Ok(document)
            }
            Err(e) => {
                tracing::warn!("{} form submit failed, keeping draft: {}", K::COLLECTION, e);
                self.phase = FormPhase::Editing;
                Err(e)
            }
        }
    }
}
