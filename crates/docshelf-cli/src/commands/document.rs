//! Document command handlers
//!
//! Writes go through the navigator, the same way the TUI drives them, so
//! validation and cache invalidation behave identically.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use docshelf_core::{
    Action, Config, ContentType, DocumentForm, DocumentKey, DocumentStore, Outcome,
    RenderContext, Session, View,
};

use super::open_navigator;
use crate::browser;
use crate::output::Output;
use crate::prompt::confirm;

/// Render a document, print it or open it in the browser
pub fn show(
    config: &Config,
    section: String,
    label: String,
    inline: bool,
    open: bool,
    output: &Output,
) -> Result<()> {
    let key = DocumentKey::new(&section, &label)?;
    let mut nav = open_navigator(config)?;

    let markup = if inline {
        let payload = nav
            .fetch(&key)?
            .ok_or_else(|| anyhow!("No document found for {}", key))?;
        nav.renderer().render(&key, &payload, RenderContext::Detail)?
    } else {
        let mut session = Session::new();
        match nav.apply(&mut session, Action::select(key.section(), key.label()))? {
            Outcome::Displayed => match session.view() {
                View::Markup(html) => html.clone(),
                _ => bail!("Nothing rendered for {}", key),
            },
            Outcome::Missing => bail!("No document found for {}", key),
            outcome => return finish(outcome, &session, output),
        }
    };

    if open {
        let page = nav.renderer().page(&key.to_string(), &markup)?;
        let path = browser::open_page(&key, &page)?;
        output.success(&format!("Opened {} ({})", key, path.display()));
    } else {
        output.print_markup(&key, &markup);
    }

    Ok(())
}

/// Show document metadata
pub fn info(config: &Config, section: String, label: String, output: &Output) -> Result<()> {
    let key = DocumentKey::new(&section, &label)?;
    let store = DocumentStore::open(config);

    let info = store
        .info(&key)?
        .ok_or_else(|| anyhow!("No document found for {}", key))?;

    output.print_info(&info)
}

/// Add a new document from a file
pub fn upload(
    config: &Config,
    section: String,
    label: String,
    file: PathBuf,
    content_type: Option<ContentType>,
    output: &Output,
) -> Result<()> {
    let content_type = content_type
        .or_else(|| ContentType::from_path(&file))
        .ok_or_else(|| {
            anyhow!(
                "Cannot tell the content type of {} from its extension. Pass --type pdf|video",
                file.display()
            )
        })?;
    let content = read_file(&file)?;

    let mut nav = open_navigator(config)?;
    let mut session = Session::new();
    nav.apply(&mut session, Action::BeginUpload)?;

    let form = DocumentForm::new(section, label).with_file(content, Some(content_type));
    let outcome = nav.apply(&mut session, Action::SubmitUpload(form))?;
    finish(outcome, &session, output)
}

/// Replace the content of an existing document
///
/// The stored content type is kept unless `--type` is given or the file
/// extension names one.
pub fn replace(
    config: &Config,
    section: String,
    label: String,
    file: PathBuf,
    content_type: Option<ContentType>,
    output: &Output,
) -> Result<()> {
    let content_type = content_type.or_else(|| ContentType::from_path(&file));
    let content = read_file(&file)?;

    let mut nav = open_navigator(config)?;
    let mut session = Session::new();
    nav.apply(&mut session, Action::BeginEdit)?;

    let form = DocumentForm::new(section, label).with_file(content, content_type);
    let outcome = nav.apply(&mut session, Action::SubmitEdit(form))?;
    finish(outcome, &session, output)
}

/// Delete a document
pub fn delete(
    config: &Config,
    section: String,
    label: String,
    yes: bool,
    output: &Output,
) -> Result<()> {
    delete_with_prompt(config, section, label, yes, output, confirm)
}

fn delete_with_prompt(
    config: &Config,
    section: String,
    label: String,
    yes: bool,
    output: &Output,
    ask: impl FnOnce(&str) -> Result<bool>,
) -> Result<()> {
    let key = DocumentKey::new(&section, &label)?;

    if !yes {
        if !output.should_prompt() {
            bail!("Refusing to delete {} without --yes", key);
        }
        if !ask(&format!("Delete {}?", key))? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    let mut nav = open_navigator(config)?;
    let mut session = Session::new();
    nav.apply(&mut session, Action::BeginDelete)?;

    let outcome = nav.apply(&mut session, Action::ConfirmDelete(DocumentForm::for_key(&key)))?;
    finish(outcome, &session, output)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Turn a navigator outcome into the command result
fn finish(outcome: Outcome, session: &Session, output: &Output) -> Result<()> {
    match outcome {
        Outcome::Completed => {
            if let Some(notice) = session.notice() {
                output.success(notice.message());
            }
            Ok(())
        }
        Outcome::Rejected(e) => Err(e.into()),
        Outcome::Failed(e) => {
            if let Some(hint) = e.recovery_suggestion() {
                output.warn(hint);
            }
            Err(e.into())
        }
        other => bail!("Unexpected result: {:?}", other),
    }
}
