//! The contact form isn't connected to anything yet: submitting it
//! shows a notice and clears it, nothing is sent.

use std::sync::{Arc, Mutex};

use kstring::KString;

use crate::dom::{Document, DomError, SubmitEvent};

pub const CONTACT_FORM: &str = "contactForm";

pub const PLACEHOLDER_MESSAGE: &str =
    "Demo: Formular ist nicht verbunden. Später kannst du hier z. B. \
     Formspree / Backend anbinden.";

/// Shows a message to the person using the page.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// For contexts without a user in front of the page.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("notice: {message}");
    }
}

/// Keeps the messages for whoever renders the page next.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn take_messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(mut m) => std::mem::take(&mut *m),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &str) {
        match self.messages.lock() {
            Ok(mut m) => m.push(message.into()),
            Err(poisoned) => poisoned.into_inner().push(message.into()),
        }
    }
}

/// Install the submit interceptor on `#contactForm`. Returns false
/// if the page has no such form.
pub fn wire_form(
    doc: &mut Document,
    notifier: Arc<dyn Notifier>,
    message: KString,
) -> Result<bool, DomError> {
    let form = match doc.get_element_by_id(CONTACT_FORM) {
        Some(id) => id,
        None => return Ok(false)
    };
    doc.add_submit_listener(form, Arc::new(
        move |doc: &mut Document, event: &mut SubmitEvent| {
            event.prevent_default();
            notifier.notify(&message);
            if let Err(e) = doc.reset_form(event.target()) {
                tracing::warn!("resetting {CONTACT_FORM}: {e}");
            }
        }))?;
    Ok(true)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::SubmitOutcome;

    const PAGE: &str = "<form action=\"https://formspree.example/f\" id=\"contactForm\" \
                        method=\"post\"><input name=\"name\"><input name=\"email\" \
                        type=\"email\"><textarea name=\"message\"></textarea>\
                        <button type=\"submit\">Senden</button></form>";

    #[test]
    fn t_submit_is_intercepted() {
        let mut doc = Document::parse(PAGE).unwrap();
        let notifier = Arc::new(CollectingNotifier::default());
        assert!(wire_form(&mut doc, notifier.clone(), KString::from_static(PLACEHOLDER_MESSAGE))
                .unwrap());
        let form = doc.get_element_by_id(CONTACT_FORM).unwrap();
        let controls = doc.form_controls(form).unwrap();
        assert_eq!(controls.len(), 3);
        for (id, v) in controls.iter().zip(["Eva", "eva@example.ch", "Tisch für 4?"]) {
            doc.set_value(*id, v).unwrap();
        }

        for _ in 0..2 {
            assert_eq!(doc.submit(form).unwrap(), SubmitOutcome::Prevented);
            for id in &controls {
                assert_eq!(doc.value(*id).unwrap(), "");
            }
        }
        assert_eq!(notifier.take_messages(),
                   vec![PLACEHOLDER_MESSAGE.to_string(), PLACEHOLDER_MESSAGE.to_string()]);
        assert!(notifier.take_messages().is_empty());
    }

    #[test]
    fn t_unwired_form_would_navigate() {
        let mut doc = Document::parse(PAGE).unwrap();
        let form = doc.get_element_by_id(CONTACT_FORM).unwrap();
        assert!(matches!(doc.submit(form).unwrap(), SubmitOutcome::Navigate { .. }));
    }

    #[test]
    fn t_no_form() {
        let mut doc = Document::parse("<p>Kein Formular</p>").unwrap();
        assert!(!wire_form(&mut doc, Arc::new(LogNotifier), KString::from_static("x")).unwrap());
    }
}
