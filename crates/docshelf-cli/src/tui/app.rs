//! Application state and logic

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use docshelf_core::{
    Action, Catalog, ContentType, DocumentForm, DocumentKey, DocumentStore, Mode, Navigator,
    Outcome, Session, View,
};

use crate::browser;

/// Which pane has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Sidebar,
    Content,
}

impl ActivePane {
    /// Move to the other pane
    pub fn toggle(self) -> Self {
        match self {
            ActivePane::Sidebar => ActivePane::Content,
            ActivePane::Content => ActivePane::Sidebar,
        }
    }
}

/// A row in the sidebar accordion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarItem {
    /// Collapsible section header
    Section(String),
    /// A document under an expanded section
    Label { section: String, label: String },
}

/// Which form is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Upload,
    Edit,
    Delete,
}

impl FormKind {
    pub fn title(self) -> &'static str {
        match self {
            FormKind::Upload => " Upload document ",
            FormKind::Edit => " Replace document ",
            FormKind::Delete => " Delete document ",
        }
    }

    fn for_mode(mode: &Mode) -> Option<Self> {
        match mode {
            Mode::Uploading => Some(FormKind::Upload),
            Mode::Editing => Some(FormKind::Edit),
            Mode::Deleting => Some(FormKind::Delete),
            Mode::Browsing { .. } => None,
        }
    }

    fn submit(self, form: DocumentForm) -> Action {
        match self {
            FormKind::Upload => Action::SubmitUpload(form),
            FormKind::Edit => Action::SubmitEdit(form),
            FormKind::Delete => Action::ConfirmDelete(form),
        }
    }
}

/// Input fields of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Section,
    Label,
    File,
    ContentType,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::Section => "Section",
            FormField::Label => "Label",
            FormField::File => "File",
            FormField::ContentType => "Type",
        }
    }
}

const WRITE_FIELDS: [FormField; 4] = [
    FormField::Section,
    FormField::Label,
    FormField::File,
    FormField::ContentType,
];
const DELETE_FIELDS: [FormField; 2] = [FormField::Section, FormField::Label];

/// Text being typed into the open form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub kind: FormKind,
    pub section: String,
    pub label: String,
    /// Path of the file to upload
    pub file: String,
    /// "pdf", "video", or blank to guess from the file extension
    pub content_type: String,
    focus: usize,
}

impl FormState {
    pub fn new(kind: FormKind, prefill: Option<&DocumentForm>) -> Self {
        let (section, label) = prefill
            .map(|f| (f.section.clone(), f.label.clone()))
            .unwrap_or_default();
        Self {
            kind,
            section,
            label,
            file: String::new(),
            content_type: String::new(),
            focus: 0,
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self.kind {
            FormKind::Delete => &DELETE_FIELDS,
            FormKind::Upload | FormKind::Edit => &WRITE_FIELDS,
        }
    }

    pub fn focused(&self) -> FormField {
        self.fields()[self.focus]
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Section => &self.section,
            FormField::Label => &self.label,
            FormField::File => &self.file,
            FormField::ContentType => &self.content_type,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Section => &mut self.section,
            FormField::Label => &mut self.label,
            FormField::File => &mut self.file,
            FormField::ContentType => &mut self.content_type,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn prev_field(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn insert_char(&mut self, c: char) {
        let field = self.focused();
        self.value_mut(field).push(c);
    }

    pub fn delete_char(&mut self) {
        let field = self.focused();
        self.value_mut(field).pop();
    }

    /// Build the submission, reading the file from disk
    ///
    /// A blank file path yields a form without content, which the
    /// navigator rejects without touching the store.
    pub fn to_form(&self) -> Result<DocumentForm> {
        let mut form = DocumentForm::new(self.section.trim(), self.label.trim());
        if self.kind == FormKind::Delete {
            return Ok(form);
        }

        let explicit = match self.content_type.trim() {
            "" => None,
            value => Some(value.parse::<ContentType>()?),
        };

        let path = self.file.trim();
        if path.is_empty() {
            form.content_type = explicit;
            return Ok(form);
        }

        let content = fs::read(path).with_context(|| format!("Failed to read {}", path))?;
        let content_type = explicit.or_else(|| ContentType::from_path(Path::new(path)));
        Ok(form.with_file(content, content_type))
    }
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Sidebar heading
    pub title: String,
    /// Which pane has focus
    pub active_pane: ActivePane,
    /// Sections and labels from the store (or the fallback)
    pub catalog: Catalog,
    /// Sections whose labels are shown
    pub expanded: HashSet<String>,
    /// Flattened sidebar rows
    pub items: Vec<SidebarItem>,
    /// Currently highlighted sidebar row
    pub sidebar_index: usize,
    /// Open form, if any
    pub form: Option<FormState>,
    /// Navigation context driven by the navigator
    pub session: Session,
    /// Scroll offset for the content pane
    pub content_scroll: u16,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
    nav: Navigator<DocumentStore>,
}

impl App {
    pub fn new(nav: Navigator<DocumentStore>, title: impl Into<String>) -> Self {
        let mut app = Self {
            should_quit: false,
            title: title.into(),
            active_pane: ActivePane::Sidebar,
            catalog: Catalog::new(),
            expanded: HashSet::new(),
            items: Vec::new(),
            sidebar_index: 0,
            form: None,
            session: Session::new(),
            content_scroll: 0,
            status_message: None,
            status_message_time: None,
            show_help: false,
            nav,
        };
        app.reload_catalog();

        if let Some(reason) = app.nav.repository().open_error() {
            app.set_status(format!("Database unavailable: {}", reason));
        }
        app
    }

    /// Reason the store could not be opened
    pub fn store_error(&self) -> Option<&str> {
        self.nav.repository().open_error()
    }

    fn reload_catalog(&mut self) {
        self.catalog = self.nav.catalog();
        self.rebuild_items();
    }

    /// Rebuild sidebar rows based on expanded state
    fn rebuild_items(&mut self) {
        let mut items = Vec::new();
        for section in self.catalog.sections() {
            items.push(SidebarItem::Section(section.name.clone()));
            if self.expanded.contains(&section.name) {
                for label in &section.labels {
                    items.push(SidebarItem::Label {
                        section: section.name.clone(),
                        label: label.clone(),
                    });
                }
            }
        }
        self.items = items;
        self.sidebar_index = self.sidebar_index.min(self.items.len().saturating_sub(1));
    }

    /// Get the currently highlighted sidebar row
    pub fn current_item(&self) -> Option<&SidebarItem> {
        self.items.get(self.sidebar_index)
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Move selection up in the current pane
    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Sidebar => {
                self.sidebar_index = self.sidebar_index.saturating_sub(1);
            }
            ActivePane::Content => {
                self.content_scroll = self.content_scroll.saturating_sub(1);
            }
        }
    }

    /// Move selection down in the current pane
    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Sidebar => {
                if self.sidebar_index < self.items.len().saturating_sub(1) {
                    self.sidebar_index += 1;
                }
            }
            ActivePane::Content => {
                self.content_scroll = self.content_scroll.saturating_add(1);
            }
        }
    }

    /// Move focus to the other pane
    pub fn switch_pane(&mut self) {
        self.active_pane = self.active_pane.toggle();
    }

    /// Expand/collapse a section or open a document
    pub fn activate(&mut self) -> Result<()> {
        match self.current_item().cloned() {
            Some(SidebarItem::Section(name)) => {
                if !self.expanded.remove(&name) {
                    self.expanded.insert(name);
                }
                self.rebuild_items();
            }
            Some(SidebarItem::Label { section, label }) => {
                self.form = None;
                self.content_scroll = 0;
                self.apply(Action::Select { section, label })?;
            }
            None => {}
        }
        Ok(())
    }

    /// Open the upload, edit or delete form
    pub fn begin(&mut self, kind: FormKind) -> Result<()> {
        let action = match kind {
            FormKind::Upload => Action::BeginUpload,
            FormKind::Edit => Action::BeginEdit,
            FormKind::Delete => Action::BeginDelete,
        };
        self.apply(action)?;
        self.form = FormKind::for_mode(self.session.mode())
            .map(|kind| FormState::new(kind, self.session.form()));
        Ok(())
    }

    /// Close the open form without submitting
    pub fn cancel_form(&mut self) -> Result<()> {
        self.form = None;
        self.apply(Action::Cancel)?;
        Ok(())
    }

    /// Submit the open form
    ///
    /// On success the form closes and the catalog is reloaded; otherwise the
    /// form stays open with what was typed.
    pub fn submit_form(&mut self) -> Result<()> {
        let Some(state) = &self.form else {
            return Ok(());
        };
        let kind = state.kind;

        let form = match state.to_form() {
            Ok(form) => form,
            Err(e) => {
                self.set_status(format!("{:#}", e));
                return Ok(());
            }
        };

        if let Outcome::Completed = self.apply(kind.submit(form))? {
            self.form = None;
            self.reload_catalog();
        }
        Ok(())
    }

    /// Drop cached documents and reload the catalog
    pub fn refresh(&mut self) {
        self.nav.clear_cache();
        self.reload_catalog();
        self.set_status("Refreshed");
    }

    /// Open the selected document as a page in the system browser
    pub fn open_in_browser(&mut self) -> Result<()> {
        let target = match (self.session.selection(), self.session.view()) {
            (Some(key), View::Markup(markup)) => {
                Some((key.clone(), self.nav.renderer().page(&key.to_string(), markup)?))
            }
            _ => None,
        };
        let Some((key, page)) = target else {
            self.set_status("Select a document first");
            return Ok(());
        };

        match browser::open_page(&key, &page) {
            Ok(_) => self.set_status(format!("Opened '{}'", key)),
            Err(e) => self.set_status(format!("Failed to open: {:#}", e)),
        }
        Ok(())
    }

    /// The document shown in the content pane
    pub fn selected_key(&self) -> Option<&DocumentKey> {
        self.session.selection()
    }

    /// Metadata line for the selected document
    pub fn selected_summary(&self) -> Option<String> {
        let key = self.session.selection()?;
        let info = self.nav.repository().info(key).ok()??;
        Some(format!(
            "{} · {} · updated {}",
            info.content_type,
            crate::output::human_size(info.size),
            info.updated_at.format("%Y-%m-%d %H:%M")
        ))
    }

    /// Feed an action to the navigator
    ///
    /// Store failures are already folded into the session notice; only a
    /// broken template set comes back as an error.
    fn apply(&mut self, action: Action) -> Result<Outcome> {
        let outcome = self
            .nav
            .apply(&mut self.session, action)
            .context("Rendering failed")?;
        if self.session.notice().is_some() {
            self.status_message = None;
        }
        Ok(outcome)
    }
}
