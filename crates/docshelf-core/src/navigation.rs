//! Navigation state machine
//!
//! A [`Session`] holds what the user is doing right now: browsing a
//! selected document, or filling in the upload, edit or delete form. The
//! [`Navigator`] owns the collaborators (repository, cache, renderer) and is
//! the only thing that moves a session from one [`Mode`] to another.
//!
//! ```ignore
//! let mut nav = Navigator::new(store, Renderer::builtin()?);
//! let mut session = Session::new();
//! nav.apply(&mut session, Action::select("SQL", "Tables"))?;
//! if let View::Markup(html) = session.view() { ... }
//! ```
//!
//! Store failures never escape `apply`: they become an error [`Notice`] and
//! the session stays where it was, pending form included. Only
//! [`RenderError`] propagates, since a broken template set is a
//! configuration problem and not something the user can fix from the UI.

use tracing::{debug, info, warn};

use crate::cache::{DocumentCache, MemoryCache};
use crate::catalog::Catalog;
use crate::models::{ContentType, DocumentKey, Payload, ValidationError};
use crate::render::{RenderContext, RenderError, Renderer};
use crate::storage::{StoreError, StoreResult};
use crate::store::DocumentRepository;

/// What the user is currently doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing { selection: Option<DocumentKey> },
    Uploading,
    Editing,
    Deleting,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Browsing { selection: None }
    }
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Browsing { .. } => "browsing",
            Mode::Uploading => "uploading",
            Mode::Editing => "editing",
            Mode::Deleting => "deleting",
        }
    }

    /// True while one of the forms is open
    pub fn is_form(&self) -> bool {
        !matches!(self, Mode::Browsing { .. })
    }
}

/// Values entered in the upload, edit or delete form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentForm {
    pub section: String,
    pub label: String,
    /// File content supplied by the UI shell
    pub file: Option<Vec<u8>>,
    /// Content type; upload falls back to pdf, edit keeps the stored one
    pub content_type: Option<ContentType>,
}

impl DocumentForm {
    pub fn new(section: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    /// Prefilled with an existing key
    pub fn for_key(key: &DocumentKey) -> Self {
        Self::new(key.section(), key.label())
    }

    pub fn with_file(mut self, content: Vec<u8>, content_type: Option<ContentType>) -> Self {
        self.file = Some(content);
        self.content_type = content_type;
        self
    }

    /// Section and label, as needed by delete
    pub fn key(&self) -> Result<DocumentKey, ValidationError> {
        DocumentKey::new(&self.section, &self.label)
    }

    /// Section, label and a non-empty file, as needed by upload and edit
    pub fn key_and_content(&self) -> Result<(DocumentKey, &[u8]), ValidationError> {
        let key = self.key()?;
        match self.file.as_deref() {
            Some(content) if !content.is_empty() => Ok((key, content)),
            _ => Err(ValidationError::MissingFile),
        }
    }
}

/// User actions fed into [`Navigator::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Select { section: String, label: String },
    BeginUpload,
    BeginEdit,
    BeginDelete,
    SubmitUpload(DocumentForm),
    SubmitEdit(DocumentForm),
    ConfirmDelete(DocumentForm),
    Cancel,
}

impl Action {
    pub fn select(section: impl Into<String>, label: impl Into<String>) -> Self {
        Action::Select {
            section: section.into(),
            label: label.into(),
        }
    }
}

/// Content of the main panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Empty,
    /// Rendered document markup
    Markup(String),
    /// Plain status text shown instead of a document
    Message(String),
}

/// Toast-style result of the last action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(msg) | Notice::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Per-user navigation context
///
/// Owned by the UI shell and changed only through [`Navigator::apply`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    mode: Mode,
    form: Option<DocumentForm>,
    view: View,
    notice: Option<Notice>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn selection(&self) -> Option<&DocumentKey> {
        match &self.mode {
            Mode::Browsing { selection } => selection.as_ref(),
            _ => None,
        }
    }

    /// The form being filled in, kept after a failed submit
    pub fn form(&self) -> Option<&DocumentForm> {
        self.form.as_ref()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Leaving a form without a selection also drops the old view
    fn browse(&mut self, selection: Option<DocumentKey>) {
        if selection.is_none() {
            self.view = View::Empty;
        }
        self.mode = Mode::Browsing { selection };
        self.form = None;
    }

    fn open_form(&mut self, mode: Mode, form: DocumentForm) {
        self.mode = mode;
        self.form = Some(form);
    }

    fn succeed(&mut self, message: String) {
        self.notice = Some(Notice::Success(message));
    }

    fn fail(&mut self, message: String) {
        self.notice = Some(Notice::Error(message));
    }
}

/// How an action ended
#[derive(Debug)]
pub enum Outcome {
    /// A document was rendered into the view
    Displayed,
    /// The selected key has no document
    Missing,
    /// A form was opened
    Entered,
    /// A form was closed without submitting
    Cancelled,
    /// The submitted write was persisted
    Completed,
    /// The form was incomplete; the store was not called
    Rejected(ValidationError),
    /// The store reported a failure; the session kept its state
    Failed(StoreError),
    /// The action does not apply to the current mode
    Ignored,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::Displayed | Outcome::Entered | Outcome::Cancelled | Outcome::Completed
        )
    }
}

/// Drives sessions against a repository, a cache and a renderer
pub struct Navigator<R: DocumentRepository> {
    repo: R,
    cache: Box<dyn DocumentCache>,
    renderer: Renderer,
    fallback: Catalog,
}

impl<R: DocumentRepository> Navigator<R> {
    /// Navigator with an in-memory cache and an empty fallback catalog
    pub fn new(repo: R, renderer: Renderer) -> Self {
        Self {
            repo,
            cache: Box::new(MemoryCache::new()),
            renderer,
            fallback: Catalog::new(),
        }
    }

    pub fn with_cache(mut self, cache: Box<dyn DocumentCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Catalog shown when the repository cannot list one
    pub fn with_fallback(mut self, catalog: Catalog) -> Self {
        self.fallback = catalog;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Current catalog, or the fallback when the store is unreachable
    pub fn catalog(&self) -> Catalog {
        match self.repo.list_catalog() {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "Listing catalog failed, using fallback");
                self.fallback.clone()
            }
        }
    }

    /// Read a payload through the cache
    pub fn fetch(&mut self, key: &DocumentKey) -> StoreResult<Option<Payload>> {
        if let Some(payload) = self.cache.get(key) {
            debug!(key = %key, "Cache hit");
            return Ok(Some(payload));
        }

        let payload = self.repo.read(key)?;
        if let Some(payload) = &payload {
            self.cache.put(key.clone(), payload.clone());
        }
        Ok(payload)
    }

    /// Drop every cached payload
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Apply one user action to a session
    ///
    /// The previous notice is cleared first, so after the call the session
    /// notice (if any) describes this action.
    pub fn apply(&mut self, session: &mut Session, action: Action) -> Result<Outcome, RenderError> {
        session.notice = None;

        let outcome = match action {
            Action::Select { section, label } => self.select(session, &section, &label)?,
            Action::BeginUpload => {
                session.open_form(Mode::Uploading, DocumentForm::default());
                Outcome::Entered
            }
            Action::BeginEdit => {
                let form = Self::prefill(session);
                session.open_form(Mode::Editing, form);
                Outcome::Entered
            }
            Action::BeginDelete => {
                let form = Self::prefill(session);
                session.open_form(Mode::Deleting, form);
                Outcome::Entered
            }
            Action::SubmitUpload(form) => {
                if session.mode != Mode::Uploading {
                    return Ok(Self::ignored(session, "upload"));
                }
                self.submit_upload(session, form)
            }
            Action::SubmitEdit(form) => {
                if session.mode != Mode::Editing {
                    return Ok(Self::ignored(session, "edit"));
                }
                self.submit_edit(session, form)
            }
            Action::ConfirmDelete(form) => {
                if session.mode != Mode::Deleting {
                    return Ok(Self::ignored(session, "delete"));
                }
                self.confirm_delete(session, form)
            }
            Action::Cancel => {
                if !session.mode.is_form() {
                    return Ok(Outcome::Ignored);
                }
                session.browse(None);
                Outcome::Cancelled
            }
        };

        debug!(mode = session.mode.name(), ?outcome, "Applied action");
        Ok(outcome)
    }

    fn select(
        &mut self,
        session: &mut Session,
        section: &str,
        label: &str,
    ) -> Result<Outcome, RenderError> {
        let key = match DocumentKey::new(section, label) {
            Ok(key) => key,
            Err(e) => {
                session.fail(e.to_string());
                return Ok(Outcome::Rejected(e));
            }
        };

        if session.mode.is_form() {
            debug!(mode = session.mode.name(), "Selection cancels pending form");
        }
        session.browse(Some(key.clone()));

        match self.fetch(&key) {
            Ok(Some(payload)) => {
                let markup = self
                    .renderer
                    .render(&key, &payload, RenderContext::Container)?;
                session.view = View::Markup(markup);
                Ok(Outcome::Displayed)
            }
            Ok(None) => {
                session.view = View::Message(format!("No document found for {}", key));
                Ok(Outcome::Missing)
            }
            Err(e) => {
                session.view = View::Message(format!("Could not load {}", key));
                session.fail(e.to_string());
                Ok(Outcome::Failed(e))
            }
        }
    }

    fn submit_upload(&mut self, session: &mut Session, form: DocumentForm) -> Outcome {
        let (key, content) = match form.key_and_content() {
            Ok(parts) => parts,
            Err(e) => return Self::reject(session, form, e),
        };
        let content_type = form.content_type.unwrap_or(ContentType::Pdf);

        match self.repo.create(&key, content, content_type) {
            Ok(()) => {
                info!(key = %key, %content_type, "Document uploaded");
                session.browse(None);
                session.succeed(format!("Uploaded {}", key));
                Outcome::Completed
            }
            Err(e) => Self::store_failed(session, form, e),
        }
    }

    fn submit_edit(&mut self, session: &mut Session, form: DocumentForm) -> Outcome {
        let (key, content) = match form.key_and_content() {
            Ok(parts) => parts,
            Err(e) => return Self::reject(session, form, e),
        };

        match self.repo.replace(&key, content, form.content_type) {
            Ok(()) => {
                self.cache.invalidate(&key);
                info!(key = %key, "Document replaced");
                session.browse(None);
                session.succeed(format!("Updated {}", key));
                Outcome::Completed
            }
            Err(e) => Self::store_failed(session, form, e),
        }
    }

    fn confirm_delete(&mut self, session: &mut Session, form: DocumentForm) -> Outcome {
        let key = match form.key() {
            Ok(key) => key,
            Err(e) => return Self::reject(session, form, e),
        };

        match self.repo.delete(&key) {
            Ok(()) => {
                self.cache.invalidate(&key);
                info!(key = %key, "Document deleted");
                session.browse(None);
                session.succeed(format!("Deleted {}", key));
                Outcome::Completed
            }
            Err(e) => Self::store_failed(session, form, e),
        }
    }

    fn prefill(session: &Session) -> DocumentForm {
        session
            .selection()
            .map(DocumentForm::for_key)
            .unwrap_or_default()
    }

    fn reject(session: &mut Session, form: DocumentForm, error: ValidationError) -> Outcome {
        session.form = Some(form);
        session.fail(error.to_string());
        Outcome::Rejected(error)
    }

    fn store_failed(session: &mut Session, form: DocumentForm, error: StoreError) -> Outcome {
        let message = match error.recovery_suggestion() {
            Some(hint) => format!("{}. {}", error, hint),
            None => error.to_string(),
        };
        session.form = Some(form);
        session.fail(message);
        Outcome::Failed(error)
    }

    fn ignored(session: &mut Session, submitted: &str) -> Outcome {
        debug!(
            mode = session.mode.name(),
            submitted, "Ignoring submit for a form that is not open"
        );
        session.fail(format!(
            "No {} form is open (currently {})",
            submitted,
            session.mode.name()
        ));
        Outcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Create(String, String),
        Replace(String, String),
        Delete(String, String),
    }

    /// In-memory repository that records writes and counts reads
    #[derive(Default)]
    struct FakeRepo {
        docs: Vec<(DocumentKey, Vec<u8>, ContentType)>,
        calls: Vec<Call>,
        reads: Cell<usize>,
        fail_with: Option<fn(&DocumentKey) -> StoreError>,
    }

    impl FakeRepo {
        fn with_doc(mut self, section: &str, label: &str, content: &[u8]) -> Self {
            let key = DocumentKey::new(section, label).unwrap();
            self.docs.push((key, content.to_vec(), ContentType::Pdf));
            self
        }

        fn position(&self, key: &DocumentKey) -> Option<usize> {
            self.docs.iter().position(|(k, _, _)| k == key)
        }

        fn failure(&self, key: &DocumentKey) -> StoreResult<()> {
            match self.fail_with {
                Some(make) => Err(make(key)),
                None => Ok(()),
            }
        }
    }

    fn call(make: fn(String, String) -> Call, key: &DocumentKey) -> Call {
        make(key.section().to_string(), key.label().to_string())
    }

    impl DocumentRepository for FakeRepo {
        fn create(
            &mut self,
            key: &DocumentKey,
            content: &[u8],
            content_type: ContentType,
        ) -> StoreResult<()> {
            self.calls.push(call(Call::Create, key));
            self.failure(key)?;
            if self.position(key).is_some() {
                return Err(StoreError::ConstraintViolation { key: key.clone() });
            }
            self.docs.push((key.clone(), content.to_vec(), content_type));
            Ok(())
        }

        fn replace(
            &mut self,
            key: &DocumentKey,
            content: &[u8],
            content_type: Option<ContentType>,
        ) -> StoreResult<()> {
            self.calls.push(call(Call::Replace, key));
            self.failure(key)?;
            let idx = self
                .position(key)
                .ok_or_else(|| StoreError::NotFound { key: key.clone() })?;
            let doc = &mut self.docs[idx];
            doc.1 = content.to_vec();
            if let Some(ct) = content_type {
                doc.2 = ct;
            }
            Ok(())
        }

        fn delete(&mut self, key: &DocumentKey) -> StoreResult<()> {
            self.calls.push(call(Call::Delete, key));
            self.failure(key)?;
            let idx = self
                .position(key)
                .ok_or_else(|| StoreError::NotFound { key: key.clone() })?;
            self.docs.remove(idx);
            Ok(())
        }

        fn read(&self, key: &DocumentKey) -> StoreResult<Option<Payload>> {
            self.reads.set(self.reads.get() + 1);
            if self.fail_with.is_some() {
                return Err(StoreError::Unavailable {
                    reason: "offline".to_string(),
                });
            }
            Ok(self
                .position(key)
                .map(|idx| Payload::from_content(self.docs[idx].2, self.docs[idx].1.clone())))
        }

        fn list_catalog(&self) -> StoreResult<Catalog> {
            if self.fail_with.is_some() {
                return Err(StoreError::Unavailable {
                    reason: "offline".to_string(),
                });
            }
            let mut catalog = Catalog::new();
            for (key, _, _) in &self.docs {
                catalog.push(key.section(), key.label());
            }
            Ok(catalog)
        }
    }

    fn unavailable(_key: &DocumentKey) -> StoreError {
        StoreError::Unavailable {
            reason: "offline".to_string(),
        }
    }

    fn navigator(repo: FakeRepo) -> Navigator<FakeRepo> {
        Navigator::new(repo, Renderer::builtin().unwrap())
    }

    fn pdf_form(section: &str, label: &str, content: &[u8]) -> DocumentForm {
        DocumentForm::new(section, label).with_file(content.to_vec(), Some(ContentType::Pdf))
    }

    fn key(section: &str, label: &str) -> DocumentKey {
        DocumentKey::new(section, label).unwrap()
    }

    /// Cache that logs every call into a shared list
    #[derive(Default)]
    struct RecordingCache {
        inner: MemoryCache,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl DocumentCache for RecordingCache {
        fn get(&self, key: &DocumentKey) -> Option<Payload> {
            self.log.borrow_mut().push(format!("get {}", key));
            self.inner.get(key)
        }

        fn put(&mut self, key: DocumentKey, payload: Payload) {
            self.log.borrow_mut().push(format!("put {}", key));
            self.inner.put(key, payload);
        }

        fn invalidate(&mut self, key: &DocumentKey) {
            self.log.borrow_mut().push(format!("invalidate {}", key));
            self.inner.invalidate(key);
        }

        fn clear(&mut self) {
            self.log.borrow_mut().push("clear".to_string());
            self.inner.clear();
        }
    }

    fn recording_navigator(repo: FakeRepo) -> (Navigator<FakeRepo>, Rc<RefCell<Vec<String>>>) {
        let cache = RecordingCache::default();
        let log = Rc::clone(&cache.log);
        (navigator(repo).with_cache(Box::new(cache)), log)
    }

    #[test]
    fn test_initial_state() {
        let session = Session::new();
        assert_eq!(session.mode(), &Mode::Browsing { selection: None });
        assert!(session.form().is_none());
        assert_eq!(session.view(), &View::Empty);
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_select_renders_document() {
        let mut nav = navigator(FakeRepo::default().with_doc("SQL", "Tables", b"%PDF"));
        let mut session = Session::new();

        let outcome = nav
            .apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();

        assert!(matches!(outcome, Outcome::Displayed));
        assert_eq!(session.selection(), Some(&key("SQL", "Tables")));
        match session.view() {
            View::Markup(html) => assert!(html.contains("JVBERg==")),
            other => panic!("expected markup, got {:?}", other),
        }
    }

    #[test]
    fn test_select_missing_shows_message() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();

        let outcome = nav
            .apply(&mut session, Action::select("SQL", "Nope"))
            .unwrap();

        assert!(matches!(outcome, Outcome::Missing));
        assert!(matches!(session.view(), View::Message(msg) if msg.contains("SQL / Nope")));
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_select_reads_through_cache() {
        let mut nav = navigator(FakeRepo::default().with_doc("SQL", "Tables", b"%PDF"));
        let mut session = Session::new();

        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();
        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();

        assert_eq!(nav.repository().reads.get(), 1);
    }

    #[test]
    fn test_begin_upload_from_any_state() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();

        nav.apply(&mut session, Action::BeginDelete).unwrap();
        let outcome = nav.apply(&mut session, Action::BeginUpload).unwrap();

        assert!(matches!(outcome, Outcome::Entered));
        assert_eq!(session.mode(), &Mode::Uploading);
        assert_eq!(session.form(), Some(&DocumentForm::default()));
    }

    #[test]
    fn test_upload_success_returns_to_browsing() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();

        nav.apply(&mut session, Action::BeginUpload).unwrap();
        let outcome = nav
            .apply(
                &mut session,
                Action::SubmitUpload(pdf_form("Python", "Intro", b"%PDF")),
            )
            .unwrap();

        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(session.mode(), &Mode::Browsing { selection: None });
        assert!(session.form().is_none());
        assert!(matches!(session.notice(), Some(Notice::Success(_))));
        assert!(nav.catalog().contains(&key("Python", "Intro")));
    }

    #[test]
    fn test_incomplete_upload_never_reaches_store() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();
        nav.apply(&mut session, Action::BeginUpload).unwrap();

        let no_file = DocumentForm::new("Python", "Intro");
        let outcome = nav
            .apply(&mut session, Action::SubmitUpload(no_file.clone()))
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(ValidationError::MissingFile)
        ));

        let empty_file = DocumentForm::new("Python", "Intro").with_file(Vec::new(), None);
        let outcome = nav
            .apply(&mut session, Action::SubmitUpload(empty_file))
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(ValidationError::MissingFile)
        ));

        let no_label = pdf_form("Python", "", b"%PDF");
        let outcome = nav
            .apply(&mut session, Action::SubmitUpload(no_label))
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(ValidationError::MissingLabel)
        ));
        assert_eq!(session.mode(), &Mode::Uploading);

        let no_section = pdf_form("  ", "Intro", b"%PDF");
        let outcome = nav
            .apply(&mut session, Action::SubmitUpload(no_section))
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(ValidationError::MissingSection)
        ));

        assert_eq!(session.mode(), &Mode::Uploading);
        assert!(session.notice().unwrap().is_error());
        assert!(nav.repository().calls.is_empty());
    }

    #[test]
    fn test_duplicate_upload_keeps_form() {
        let mut nav = navigator(FakeRepo::default().with_doc("SQL", "Tables", b"%PDF"));
        let mut session = Session::new();
        nav.apply(&mut session, Action::BeginUpload).unwrap();

        let form = pdf_form("SQL", "Tables", b"other");
        let outcome = nav
            .apply(&mut session, Action::SubmitUpload(form.clone()))
            .unwrap();

        assert!(matches!(
            outcome,
            Outcome::Failed(StoreError::ConstraintViolation { .. })
        ));
        assert_eq!(session.mode(), &Mode::Uploading);
        assert_eq!(session.form(), Some(&form));
        assert!(session.notice().unwrap().is_error());
    }

    #[test]
    fn test_upload_defaults_to_pdf() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();
        nav.apply(&mut session, Action::BeginUpload).unwrap();

        let form = DocumentForm::new("SQL", "Tables").with_file(b"%PDF".to_vec(), None);
        nav.apply(&mut session, Action::SubmitUpload(form)).unwrap();

        assert_eq!(nav.repository().docs[0].2, ContentType::Pdf);
    }

    #[test]
    fn test_edit_prefills_and_invalidates_cache() {
        let mut nav = navigator(FakeRepo::default().with_doc("SQL", "Tables", b"old"));
        let mut session = Session::new();

        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();
        nav.apply(&mut session, Action::BeginEdit).unwrap();
        assert_eq!(session.mode(), &Mode::Editing);
        assert_eq!(
            session.form(),
            Some(&DocumentForm::new("SQL", "Tables"))
        );

        let outcome = nav
            .apply(
                &mut session,
                Action::SubmitEdit(pdf_form("SQL", "Tables", b"new")),
            )
            .unwrap();
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(session.mode(), &Mode::Browsing { selection: None });

        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();
        assert_eq!(nav.repository().reads.get(), 2);
        match session.view() {
            // base64 of "new"
            View::Markup(html) => assert!(html.contains("bmV3")),
            other => panic!("expected markup, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_success_clears_displayed_document() {
        let mut nav = navigator(FakeRepo::default().with_doc("SQL", "Tables", b"old"));
        let mut session = Session::new();

        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();
        assert!(matches!(session.view(), View::Markup(_)));

        nav.apply(&mut session, Action::BeginEdit).unwrap();
        let outcome = nav
            .apply(
                &mut session,
                Action::SubmitEdit(pdf_form("SQL", "Tables", b"new")),
            )
            .unwrap();

        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(session.view(), &View::Empty);
    }

    #[test]
    fn test_upload_success_clears_displayed_document() {
        let mut nav = navigator(FakeRepo::default().with_doc("SQL", "Tables", b"%PDF"));
        let mut session = Session::new();

        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();
        nav.apply(&mut session, Action::BeginUpload).unwrap();
        let outcome = nav
            .apply(
                &mut session,
                Action::SubmitUpload(pdf_form("Python", "Intro", b"%PDF")),
            )
            .unwrap();

        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(session.view(), &View::Empty);
    }

    #[test]
    fn test_injected_cache_invalidated_on_replace_and_delete() {
        let repo = FakeRepo::default()
            .with_doc("SQL", "Tables", b"old")
            .with_doc("SQL", "Joins", b"%PDF");
        let (mut nav, log) = recording_navigator(repo);
        let mut session = Session::new();

        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();
        assert_eq!(*log.borrow(), vec!["get SQL / Tables", "put SQL / Tables"]);

        nav.apply(&mut session, Action::BeginEdit).unwrap();
        let outcome = nav
            .apply(
                &mut session,
                Action::SubmitEdit(pdf_form("SQL", "Tables", b"new")),
            )
            .unwrap();
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(log.borrow().last().unwrap(), "invalidate SQL / Tables");

        nav.apply(&mut session, Action::BeginDelete).unwrap();
        let outcome = nav
            .apply(
                &mut session,
                Action::ConfirmDelete(DocumentForm::new("SQL", "Joins")),
            )
            .unwrap();
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(log.borrow().last().unwrap(), "invalidate SQL / Joins");

        // The edited document is read from the store again
        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();
        assert_eq!(nav.repository().reads.get(), 2);
    }

    #[test]
    fn test_failed_replace_keeps_cache_entry() {
        let (mut nav, log) = recording_navigator(FakeRepo::default());
        let mut session = Session::new();
        nav.apply(&mut session, Action::BeginEdit).unwrap();

        let outcome = nav
            .apply(
                &mut session,
                Action::SubmitEdit(pdf_form("SQL", "Ghost", b"new")),
            )
            .unwrap();

        assert!(matches!(outcome, Outcome::Failed(StoreError::NotFound { .. })));
        assert!(log.borrow().iter().all(|entry| !entry.starts_with("invalidate")));
    }

    #[test]
    fn test_edit_missing_key_stays_editing() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();
        nav.apply(&mut session, Action::BeginEdit).unwrap();

        let outcome = nav
            .apply(
                &mut session,
                Action::SubmitEdit(pdf_form("SQL", "Ghost", b"new")),
            )
            .unwrap();

        assert!(matches!(outcome, Outcome::Failed(StoreError::NotFound { .. })));
        assert_eq!(session.mode(), &Mode::Editing);
        assert!(session.form().is_some());
    }

    #[test]
    fn test_delete_invalidates_cache() {
        let mut nav = navigator(FakeRepo::default().with_doc("SQL", "Tables", b"%PDF"));
        let mut session = Session::new();

        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();
        nav.apply(&mut session, Action::BeginDelete).unwrap();
        let outcome = nav
            .apply(
                &mut session,
                Action::ConfirmDelete(DocumentForm::new("SQL", "Tables")),
            )
            .unwrap();
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(session.view(), &View::Empty);

        let outcome = nav
            .apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();
        assert!(matches!(outcome, Outcome::Missing));
        assert!(nav.catalog().is_empty());
    }

    #[test]
    fn test_delete_needs_only_key() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();
        nav.apply(&mut session, Action::BeginDelete).unwrap();

        let outcome = nav
            .apply(
                &mut session,
                Action::ConfirmDelete(DocumentForm::new("SQL", "")),
            )
            .unwrap();

        assert!(matches!(
            outcome,
            Outcome::Rejected(ValidationError::MissingLabel)
        ));
        assert!(nav.repository().calls.is_empty());
    }

    #[test]
    fn test_submit_outside_matching_mode_is_ignored() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();

        let outcome = nav
            .apply(
                &mut session,
                Action::SubmitUpload(pdf_form("SQL", "Tables", b"%PDF")),
            )
            .unwrap();
        assert!(matches!(outcome, Outcome::Ignored));

        nav.apply(&mut session, Action::BeginEdit).unwrap();
        let outcome = nav
            .apply(
                &mut session,
                Action::ConfirmDelete(DocumentForm::new("SQL", "Tables")),
            )
            .unwrap();
        assert!(matches!(outcome, Outcome::Ignored));
        assert_eq!(session.mode(), &Mode::Editing);
        assert!(nav.repository().calls.is_empty());
    }

    #[test]
    fn test_select_cancels_pending_form() {
        let mut nav = navigator(FakeRepo::default().with_doc("SQL", "Tables", b"%PDF"));
        let mut session = Session::new();

        nav.apply(&mut session, Action::BeginUpload).unwrap();
        nav.apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();

        assert_eq!(session.selection(), Some(&key("SQL", "Tables")));
        assert!(session.form().is_none());
    }

    #[test]
    fn test_cancel() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();

        assert!(matches!(
            nav.apply(&mut session, Action::Cancel).unwrap(),
            Outcome::Ignored
        ));

        nav.apply(&mut session, Action::BeginUpload).unwrap();
        let outcome = nav.apply(&mut session, Action::Cancel).unwrap();
        assert!(matches!(outcome, Outcome::Cancelled));
        assert_eq!(session.mode(), &Mode::Browsing { selection: None });
        assert!(session.form().is_none());
    }

    #[test]
    fn test_store_failure_keeps_state() {
        let repo = FakeRepo {
            fail_with: Some(unavailable),
            ..FakeRepo::default()
        };
        let mut nav = navigator(repo);
        let mut session = Session::new();
        nav.apply(&mut session, Action::BeginUpload).unwrap();

        let form = pdf_form("SQL", "Tables", b"%PDF");
        let outcome = nav
            .apply(&mut session, Action::SubmitUpload(form.clone()))
            .unwrap();

        assert!(matches!(
            outcome,
            Outcome::Failed(StoreError::Unavailable { .. })
        ));
        assert_eq!(session.mode(), &Mode::Uploading);
        assert_eq!(session.form(), Some(&form));
    }

    #[test]
    fn test_select_on_unavailable_store() {
        let repo = FakeRepo {
            fail_with: Some(unavailable),
            ..FakeRepo::default()
        };
        let mut nav = navigator(repo);
        let mut session = Session::new();

        let outcome = nav
            .apply(&mut session, Action::select("SQL", "Tables"))
            .unwrap();

        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(matches!(session.view(), View::Message(_)));
        assert!(session.notice().unwrap().is_error());
    }

    #[test]
    fn test_catalog_falls_back_when_unavailable() {
        let repo = FakeRepo {
            fail_with: Some(unavailable),
            ..FakeRepo::default()
        };
        let mut seed = Catalog::new();
        seed.push("SQL", "Tables");
        let nav = navigator(repo).with_fallback(seed.clone());

        assert_eq!(nav.catalog(), seed);
        assert!(navigator(FakeRepo {
            fail_with: Some(unavailable),
            ..FakeRepo::default()
        })
        .catalog()
        .is_empty());
    }

    #[test]
    fn test_notice_describes_last_action() {
        let mut nav = navigator(FakeRepo::default());
        let mut session = Session::new();

        nav.apply(&mut session, Action::BeginUpload).unwrap();
        nav.apply(
            &mut session,
            Action::SubmitUpload(pdf_form("SQL", "Tables", b"%PDF")),
        )
        .unwrap();
        assert!(session.notice().is_some());

        nav.apply(&mut session, Action::BeginEdit).unwrap();
        assert!(session.notice().is_none());
    }
}
