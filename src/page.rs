//! A page template together with where its content comes from. Each
//! render works on a fresh copy of the parsed template and fetches the
//! content anew.

use std::{fmt, sync::Arc};

use anyhow::{Result, Context, anyhow};
use kstring::KString;

use crate::bootstrap::{self, InitEnv, InitReport};
use crate::config::Config;
use crate::dom::{Document, SubmitOutcome};
use crate::escape::escape_html;
use crate::form::{CollectingNotifier, Notifier, LogNotifier, CONTACT_FORM, PLACEHOLDER_MESSAGE};
use crate::io_util::my_read_to_string;
use crate::source::{ContentSource, FetchResponse, source_from_location};
use crate::time_util::{YearSource, SystemYear};

pub struct Page {
    template: Document,
    source: Box<dyn ContentSource>,
    year: Arc<dyn YearSource>,
    form_message: KString,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("source", &self.source.to_string())
            .field("form_message", &self.form_message)
            .finish()
    }
}

/// What a posted contact form led to.
#[derive(Debug)]
pub struct Submission {
    pub html: String,
    pub outcome: SubmitOutcome,
    pub notices: Vec<String>,
}

impl Page {
    pub fn new(template: Document, source: Box<dyn ContentSource>) -> Page {
        Page {
            template,
            source,
            year: Arc::new(SystemYear),
            form_message: KString::from_static(PLACEHOLDER_MESSAGE),
        }
    }

    pub fn with_year(mut self, year: Arc<dyn YearSource>) -> Page {
        self.year = year;
        self
    }

    pub fn with_form_message(mut self, message: KString) -> Page {
        self.form_message = message;
        self
    }

    /// Read and parse the template named in `config` and set up its
    /// content source.
    pub fn open(config: &Config) -> Result<Page> {
        let html = my_read_to_string(&config.template)?;
        let template = Document::parse(&html).with_context(
            || anyhow!("parsing template {:?}", config.template))?;
        let source = source_from_location(
            &config.content, &config.template_dir(), config.fetch_timeout)?;
        Ok(Page::new(template, source).with_form_message(config.form_message.clone()))
    }

    pub fn source(&self) -> &dyn ContentSource {
        &*self.source
    }

    /// The content resource as the origin has it, unparsed.
    pub fn fetch_raw(&self) -> Result<FetchResponse> {
        self.source.fetch()
    }

    fn env(&self, notifier: Arc<dyn Notifier>) -> InitEnv {
        InitEnv {
            year: self.year.clone(),
            notifier,
            form_message: self.form_message.clone(),
            resource_name: self.source.to_string(),
        }
    }

    /// Run the bootstrap sequence on a copy of the template. On
    /// failure the copy is returned unchanged.
    pub fn render_with(&self, notifier: Arc<dyn Notifier>) -> (Document, InitReport) {
        let mut doc = self.template.clone();
        let report = bootstrap::run(&mut doc, &*self.source, &self.env(notifier));
        (doc, report)
    }

    pub fn render_html(&self) -> String {
        self.render_with(Arc::new(LogNotifier)).0.to_html_string()
    }

    /// Fill the contact form with the posted `fields` and submit it,
    /// the way a visitor with a script-enabled browser would. Notices
    /// end up in an open dialog at the end of the body.
    pub fn submit_contact(&self, fields: &[(String, String)]) -> Result<Submission> {
        let notifier = Arc::new(CollectingNotifier::default());
        let (mut doc, _report) = self.render_with(notifier.clone());
        let form = doc.get_element_by_id(CONTACT_FORM).ok_or_else(
            || anyhow!("page has no #{CONTACT_FORM} form"))?;
        apply_fields(&mut doc, form, fields)?;
        let outcome = doc.submit(form)?;
        let notices = notifier.take_messages();
        if !notices.is_empty() {
            let container = doc.elements_by_tag_name("body").first().copied()
                .unwrap_or_else(|| doc.root());
            doc.append_html(container, &notice_dialog(&notices))?;
        }
        Ok(Submission { html: doc.to_html_string(), outcome, notices })
    }
}

fn apply_fields(
    doc: &mut Document,
    form: crate::dom::NodeId,
    fields: &[(String, String)],
) -> Result<()> {
    for id in doc.form_controls(form)? {
        let (name, checkable, own_value) = {
            let e = doc.element(id)?;
            match e.attribute("name") {
                Some(name) => (name.to_string(), e.is_checkable(),
                               e.attribute("value").unwrap_or("on").to_string()),
                None => continue,
            }
        };
        let mut posted = fields.iter().filter(|(k, _)| *k == name).map(|(_, v)| v);
        if checkable {
            let checked = posted.any(|v| *v == own_value);
            doc.set_checked(id, checked)?;
        } else if let Some(v) = posted.next() {
            doc.set_value(id, v)?;
        }
    }
    Ok(())
}

pub fn notice_dialog(notices: &[String]) -> String {
    let mut html = String::from("<dialog class=\"notice\" open>");
    for notice in notices {
        html.push_str("<p>");
        html.push_str(&escape_html(notice));
        html.push_str("</p>");
    }
    html.push_str("<form method=\"dialog\"><button>OK</button></form></dialog>");
    html
}
