//! Bringing a page to life: fetch the content document, bind its
//! fields, render the list sections, then wire up the footer year and
//! the contact form.

use std::{fmt, sync::Arc};

use kstring::KString;
use thiserror::Error;

use crate::binder::fill_simple_fields;
use crate::content::Content;
use crate::dom::Document;
use crate::form::{wire_form, Notifier, LogNotifier, PLACEHOLDER_MESSAGE};
use crate::renderers::{render_menu, render_gallery, render_hours};
use crate::source::{ContentSource, DEFAULT_RESOURCE};
use crate::time_util::{YearSource, SystemYear};

pub const YEAR_ELEMENT: &str = "year";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Fetching,
    Parsing,
    Binding,
    Rendering,
    Wiring,
    Done,
    Failed,
}

#[derive(Debug, Error)]
pub enum InitError {
    #[error("{resource} could not be loaded: {status}")]
    Status {
        resource: String,
        status: u16,
    },
    #[error("{resource} could not be loaded: {source}")]
    Transport {
        resource: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{resource} is not valid JSON: {source}")]
    Parse {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

/// What the bootstrap sequence needs besides the document and the
/// content source.
#[derive(Clone)]
pub struct InitEnv {
    pub year: Arc<dyn YearSource>,
    pub notifier: Arc<dyn Notifier>,
    pub form_message: KString,
    /// The name errors refer to the content resource by.
    pub resource_name: String,
}

impl Default for InitEnv {
    fn default() -> Self {
        InitEnv {
            year: Arc::new(SystemYear),
            notifier: Arc::new(LogNotifier),
            form_message: KString::from_static(PLACEHOLDER_MESSAGE),
            resource_name: DEFAULT_RESOURCE.into(),
        }
    }
}

impl fmt::Debug for InitEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitEnv")
            .field("year", &self.year.current_year())
            .field("form_message", &self.form_message)
            .field("resource_name", &self.resource_name)
            .finish()
    }
}

#[derive(Debug)]
pub struct InitReport {
    pub stage: Stage,
    /// Steps that failed on their own without stopping the others.
    pub failed_steps: Vec<(&'static str, anyhow::Error)>,
}

impl InitReport {
    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Done && self.failed_steps.is_empty()
    }
}

struct Bootstrap {
    stage: Stage,
    failed_steps: Vec<(&'static str, anyhow::Error)>,
}

impl Bootstrap {
    fn enter(&mut self, stage: Stage) {
        tracing::debug!("bootstrap: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Run one independent step; its failure is logged and recorded,
    /// and the sequence goes on.
    fn step(&mut self, name: &'static str, thunk: impl FnOnce() -> anyhow::Result<()>) {
        if let Err(e) = thunk() {
            tracing::error!("page step {name:?} failed: {e:#}");
            self.failed_steps.push((name, e));
        }
    }

    fn fail(&mut self, e: InitError) -> InitError {
        self.enter(Stage::Failed);
        e
    }
}

fn load_content(
    boot: &mut Bootstrap,
    source: &dyn ContentSource,
    resource: &str,
) -> Result<Content, InitError> {
    boot.enter(Stage::Fetching);
    tracing::debug!("fetching {source}");
    let response = match source.fetch() {
        Ok(r) => r,
        Err(e) => return Err(boot.fail(InitError::Transport {
            resource: resource.into(),
            source: e.into(),
        })),
    };
    if !response.is_success() {
        return Err(boot.fail(InitError::Status {
            resource: resource.into(),
            status: response.status,
        }))
    }
    boot.enter(Stage::Parsing);
    Content::from_json_str(&response.body).map_err(
        |e| boot.fail(InitError::Parse { resource: resource.into(), source: e }))
}

/// Run the whole sequence on `doc`. Fetch and parse failures end it
/// and are returned; failures of the later steps are only recorded
/// in the report.
pub fn init(
    doc: &mut Document,
    source: &dyn ContentSource,
    env: &InitEnv,
) -> Result<InitReport, InitError> {
    let mut boot = Bootstrap { stage: Stage::Idle, failed_steps: Vec::new() };
    let content = load_content(&mut boot, source, &env.resource_name)?;

    boot.enter(Stage::Binding);
    boot.step("fields", || Ok(fill_simple_fields(doc, &content, &*env.year)?));

    boot.enter(Stage::Rendering);
    boot.step("menu", || render_menu(doc, &content).map(|_| ()));
    boot.step("gallery", || render_gallery(doc, &content).map(|_| ()));
    boot.step("hours", || render_hours(doc, &content).map(|_| ()));

    boot.enter(Stage::Wiring);
    boot.step("year", || {
        if let Some(id) = doc.get_element_by_id(YEAR_ELEMENT) {
            doc.set_text_content(id, &env.year.current_year().to_string())?;
        }
        Ok(())
    });
    boot.step("form", || {
        wire_form(doc, env.notifier.clone(), env.form_message.clone())?;
        Ok(())
    });

    boot.enter(Stage::Done);
    Ok(InitReport { stage: boot.stage, failed_steps: boot.failed_steps })
}

/// Like `init`, but a failure only goes to the log; the page stays
/// as it is.
pub fn run(doc: &mut Document, source: &dyn ContentSource, env: &InitEnv) -> InitReport {
    match init(doc, source, env) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Template init failed: {e}");
            InitReport { stage: Stage::Failed, failed_steps: Vec::new() }
        }
    }
}
