//! Enquiry form: inline validation, captcha, submit gating, submission.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::js_sys::{self, Array};
use web_sys::{
    Element, FormData, HtmlButtonElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement,
};

use crate::captcha::Captcha;
use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteResult;
use crate::site::Page;
use crate::timing::Debounce;
use crate::toast::{Notifier, ToastKind};
use crate::validation::{self, FieldError, FieldRules};

pub const FORM_ID: &str = "enquiry-form";
pub const CAPTCHA_LABEL_ID: &str = "captcha-label";
const FIELD_SELECTOR: &str = "input, textarea";
const ERROR_SELECTOR: &str = ".error-message";
const SUBMIT_SELECTOR: &str = r#"button[type="submit"]"#;
const INVALID: &str = "invalid";
const FIX_FIELDS_MESSAGE: &str = "Please correct the highlighted fields before submitting.";

/// Submitted form contents as a flat name -> value map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Enquiry(BTreeMap<String, String>);

impl Enquiry {
    /// Later entries with the same name replace earlier ones.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Error)]
#[error("enquiry could not be delivered: {0}")]
pub struct SinkError(pub String);

/// Where submitted enquiries go. Integrators supply one that talks to their
/// backend; [`ConsoleSink`] only logs.
pub trait EnquirySink {
    fn submit(&self, enquiry: &Enquiry) -> Result<(), SinkError>;
}

pub struct ConsoleSink;

impl EnquirySink for ConsoleSink {
    fn submit(&self, enquiry: &Enquiry) -> Result<(), SinkError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        match enquiry.serialize(&serializer) {
            Ok(value) => gloo_console::log!("Form submitted:", value),
            Err(e) => log::info!("Form submitted: {:?} ({})", enquiry, e),
        }
        Ok(())
    }
}

enum Control {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

struct Field {
    control: Control,
    error: Option<Element>,
}

impl Field {
    fn from_element(element: Element) -> Option<Self> {
        let error = element
            .parent_element()
            .and_then(|parent| dom::query_in(&parent, ERROR_SELECTOR));
        let control = match element.dyn_into::<HtmlInputElement>() {
            Ok(input) => Control::Input(input),
            Err(element) => Control::TextArea(element.dyn_into::<HtmlTextAreaElement>().ok()?),
        };
        Some(Self { control, error })
    }

    fn element(&self) -> &Element {
        match &self.control {
            Control::Input(input) => input.as_ref(),
            Control::TextArea(area) => area.as_ref(),
        }
    }

    fn value(&self) -> String {
        match &self.control {
            Control::Input(input) => input.value(),
            Control::TextArea(area) => area.value(),
        }
    }

    fn rules(&self) -> FieldRules {
        let (name, input_type) = match &self.control {
            Control::Input(input) => (input.name(), input.type_()),
            Control::TextArea(area) => (area.name(), "textarea".to_string()),
        };
        let element = self.element();
        FieldRules::from_markup(
            &name,
            &input_type,
            element.has_attribute("required"),
            element.get_attribute("minlength").as_deref(),
        )
    }

    fn annotate(&self, result: &Result<(), FieldError>) {
        dom::set_class(self.element(), INVALID, result.is_err());
        if let Some(error) = &self.error {
            let message = result.as_ref().err().map(ToString::to_string);
            error.set_text_content(Some(message.as_deref().unwrap_or("")));
        }
    }
}

/// The page side of the enquiry form. [`FormElements`] drives the document;
/// the submission flow in [`EnquiryForm`] only talks to this trait.
pub trait FormView {
    /// Rules and current value of every field, in document order.
    fn fields(&self) -> Vec<(FieldRules, String)>;
    fn annotate(&self, index: usize, result: &Result<(), FieldError>);
    fn set_submit_enabled(&self, enabled: bool);
    fn show_captcha(&self, captcha: Captcha);
    fn entries(&self) -> SiteResult<Enquiry>;
    fn reset(&self);
    fn notify(&self, message: &str, kind: ToastKind);
}

pub struct FormElements {
    form: HtmlFormElement,
    fields: Vec<Field>,
    submit_button: Option<HtmlButtonElement>,
    captcha_label: Option<Element>,
    notifier: Notifier,
}

impl FormElements {
    pub fn find(page: &Page, notifier: Notifier) -> Option<Self> {
        let form = page
            .document
            .get_element_by_id(FORM_ID)?
            .dyn_into::<HtmlFormElement>()
            .ok()?;
        let fields = dom::query_all_in(&form, FIELD_SELECTOR)
            .into_iter()
            .filter_map(Field::from_element)
            .collect();
        let submit_button = dom::query_in(&form, SUBMIT_SELECTOR)
            .and_then(|b| b.dyn_into::<HtmlButtonElement>().ok());
        Some(Self {
            form,
            fields,
            submit_button,
            captcha_label: page.document.get_element_by_id(CAPTCHA_LABEL_ID),
            notifier,
        })
    }
}

impl FormView for FormElements {
    fn fields(&self) -> Vec<(FieldRules, String)> {
        self.fields.iter().map(|f| (f.rules(), f.value())).collect()
    }

    fn annotate(&self, index: usize, result: &Result<(), FieldError>) {
        if let Some(field) = self.fields.get(index) {
            field.annotate(result);
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        if let Some(button) = &self.submit_button {
            button.set_disabled(!enabled);
        }
    }

    fn show_captcha(&self, captcha: Captcha) {
        if let Some(label) = &self.captcha_label {
            label.set_text_content(Some(&captcha.to_string()));
        }
    }

    fn entries(&self) -> SiteResult<Enquiry> {
        let data = FormData::new_with_form(&self.form)?;
        let mut entries = Vec::new();
        if let Some(iter) = js_sys::try_iter(&data)? {
            for item in iter {
                let pair: Array = item?.unchecked_into();
                // File entries have no string value and are left out.
                if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                    entries.push((name, value));
                }
            }
        }
        Ok(Enquiry::from_entries(entries))
    }

    fn reset(&self) {
        self.form.reset();
    }

    fn notify(&self, message: &str, kind: ToastKind) {
        self.notifier.notify(message, kind);
    }
}

pub struct EnquiryForm<V = FormElements> {
    view: V,
    captcha: Cell<Captcha>,
    unit: RefCell<Box<dyn FnMut() -> f64>>,
    sink: Box<dyn EnquirySink>,
    submit_message: String,
    pending: Vec<Debounce>,
    submissions: Cell<u64>,
}

impl<V: FormView> EnquiryForm<V> {
    /// `unit` feeds captcha redraws with floats in `[0, 1)`.
    pub fn new(
        view: V,
        captcha: Captcha,
        unit: Box<dyn FnMut() -> f64>,
        sink: Box<dyn EnquirySink>,
        config: &SiteConfig,
    ) -> Self {
        let pending = view
            .fields()
            .iter()
            .map(|_| Debounce::new(config.validation_debounce_ms))
            .collect();
        Self {
            view,
            captcha: Cell::new(captcha),
            unit: RefCell::new(unit),
            sink,
            submit_message: config.submit_message.clone(),
            pending,
            submissions: Cell::new(0),
        }
    }

    fn show_captcha(&self) {
        self.view.show_captcha(self.captcha.get());
    }

    fn new_captcha(&self) {
        let next = self.captcha.get().redraw(&mut *self.unit.borrow_mut());
        self.captcha.set(next);
        self.show_captcha();
    }

    pub fn validate_field(&self, index: usize) -> bool {
        let Some((rules, value)) = self.view.fields().into_iter().nth(index) else {
            return false;
        };
        let result = rules.check(&value, self.captcha.get().answer());
        self.view.annotate(index, &result);
        result.is_ok()
    }

    /// Re-checks every field, annotates each one, and gates the submit control.
    pub fn validate_form(&self) -> bool {
        let results = validation::evaluate(&self.view.fields(), self.captcha.get().answer());
        for (index, result) in results.iter().enumerate() {
            self.view.annotate(index, result);
        }
        let valid = validation::submittable(&results);
        self.view.set_submit_enabled(valid);
        valid
    }

    /// Debounced whole-form pass scheduled after `submissions` submits. A
    /// submit since then has reset the form, so the pass is dropped.
    pub fn revalidate(&self, submissions: u64) -> Option<bool> {
        (submissions == self.submissions.get()).then(|| self.validate_form())
    }

    pub fn submit(&self) {
        if !self.validate_form() {
            log::warn!("Enquiry form submitted with invalid fields");
            self.view.notify(FIX_FIELDS_MESSAGE, ToastKind::Error);
            return;
        }

        let delivered = self
            .view
            .entries()
            .map_err(|e| e.to_string())
            .and_then(|enquiry| {
                log::info!(
                    "Submitting enquiry from {} ({} fields)",
                    enquiry.get("email").unwrap_or("unknown sender"),
                    enquiry.len()
                );
                self.sink.submit(&enquiry).map_err(|e| e.to_string())
            });
        if let Err(e) = delivered {
            log::error!("Enquiry submission failed: {}", e);
            self.view.notify(&e, ToastKind::Error);
            return;
        }

        self.view.notify(&self.submit_message, ToastKind::Success);
        self.submissions.set(self.submissions.get() + 1);
        for debounce in &self.pending {
            debounce.cancel();
        }
        self.view.reset();
        self.new_captcha();
        self.view.set_submit_enabled(false);
        for index in 0..self.pending.len() {
            self.view.annotate(index, &Ok(()));
        }
    }
}

impl EnquiryForm<FormElements> {
    pub fn find(page: &Page, notifier: Notifier, sink: Box<dyn EnquirySink>) -> Option<Rc<Self>> {
        let view = FormElements::find(page, notifier)?;
        Some(Rc::new(Self::new(
            view,
            Captcha::random(),
            Box::new(js_sys::Math::random),
            sink,
            &page.config,
        )))
    }

    fn schedule_validation(self: &Rc<Self>, index: usize) {
        let Some(debounce) = self.pending.get(index) else {
            return;
        };
        let form = Rc::downgrade(self);
        let submissions = self.submissions.get();
        debounce.call(move || {
            if let Some(form) = form.upgrade() {
                form.revalidate(submissions);
            }
        });
    }

    pub fn setup(self: &Rc<Self>) -> SiteResult<()> {
        self.show_captcha();

        for (index, field) in self.view.fields.iter().enumerate() {
            let form = self.clone();
            dom::listen(field.element(), "blur", move |_| {
                form.validate_field(index);
            })?;

            let form = self.clone();
            dom::listen(field.element(), "input", move |_| {
                form.schedule_validation(index);
            })?;
        }

        let form = self.clone();
        dom::listen(&self.view.form, "submit", move |e| {
            e.prevent_default();
            form.submit();
        })?;

        self.validate_form();
        log::debug!("Enquiry form ready with {} fields", self.pending.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn enquiry_is_a_flat_map() {
        let enquiry = Enquiry::from_entries(vec![
            entry("name", "Ada"),
            entry("email", "ada@example.com"),
        ]);
        assert_eq!(enquiry.len(), 2);
        assert_eq!(enquiry.get("name"), Some("Ada"));
        assert_eq!(enquiry.get("mobile"), None);
    }

    #[test]
    fn later_duplicates_win() {
        let enquiry = Enquiry::from_entries(vec![
            entry("interest", "trade"),
            entry("interest", "investment"),
        ]);
        assert_eq!(enquiry.len(), 1);
        assert_eq!(enquiry.get("interest"), Some("investment"));
    }

    #[test]
    fn serializes_as_a_plain_object() {
        let enquiry = Enquiry::from_entries(vec![entry("b", "2"), entry("a", "1")]);
        assert_eq!(
            serde_json::to_string(&enquiry).unwrap(),
            r#"{"a":"1","b":"2"}"#
        );
    }

    struct FailingSink;

    impl EnquirySink for FailingSink {
        fn submit(&self, _enquiry: &Enquiry) -> Result<(), SinkError> {
            Err(SinkError("endpoint unreachable".into()))
        }
    }

    #[test]
    fn sink_errors_describe_the_failure() {
        let err = FailingSink.submit(&Enquiry::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "enquiry could not be delivered: endpoint unreachable"
        );
    }

    struct FakeField {
        name: &'static str,
        rules: FieldRules,
        value: RefCell<String>,
        error: RefCell<Option<String>>,
    }

    /// In-memory stand-in for the enquiry form markup.
    #[derive(Default)]
    struct FakeForm {
        fields: Vec<FakeField>,
        submit_enabled: Cell<bool>,
        captcha_shown: Cell<Option<Captcha>>,
        toasts: RefCell<Vec<(String, ToastKind)>>,
    }

    impl FakeForm {
        fn enquiry() -> Self {
            let field = |name: &'static str, input_type: &str, min_length: Option<&str>| FakeField {
                name,
                rules: FieldRules::from_markup(name, input_type, true, min_length),
                value: RefCell::new(String::new()),
                error: RefCell::new(None),
            };
            Self {
                fields: vec![
                    field("name", "text", None),
                    field("email", "email", None),
                    field("mobile", "tel", None),
                    field("message", "textarea", Some("10")),
                    field("captcha", "number", None),
                ],
                ..Self::default()
            }
        }

        fn fill(&self, values: [&str; 5]) {
            for (field, value) in self.fields.iter().zip(values) {
                *field.value.borrow_mut() = value.to_string();
            }
        }

        fn values(&self) -> Vec<String> {
            self.fields.iter().map(|f| f.value.borrow().clone()).collect()
        }

        fn errors(&self) -> Vec<Option<String>> {
            self.fields.iter().map(|f| f.error.borrow().clone()).collect()
        }

        fn last_toast(&self) -> Option<(String, ToastKind)> {
            self.toasts.borrow().last().cloned()
        }
    }

    impl FormView for Rc<FakeForm> {
        fn fields(&self) -> Vec<(FieldRules, String)> {
            self.fields
                .iter()
                .map(|f| (f.rules.clone(), f.value.borrow().clone()))
                .collect()
        }

        fn annotate(&self, index: usize, result: &Result<(), FieldError>) {
            *self.fields[index].error.borrow_mut() = result.as_ref().err().map(ToString::to_string);
        }

        fn set_submit_enabled(&self, enabled: bool) {
            self.submit_enabled.set(enabled);
        }

        fn show_captcha(&self, captcha: Captcha) {
            self.captcha_shown.set(Some(captcha));
        }

        fn entries(&self) -> SiteResult<Enquiry> {
            Ok(Enquiry::from_entries(
                self.fields
                    .iter()
                    .map(|f| (f.name.to_string(), f.value.borrow().clone())),
            ))
        }

        fn reset(&self) {
            for field in &self.fields {
                field.value.borrow_mut().clear();
            }
        }

        fn notify(&self, message: &str, kind: ToastKind) {
            self.toasts.borrow_mut().push((message.to_string(), kind));
        }
    }

    #[derive(Default, Clone)]
    struct RecordingSink(Rc<RefCell<Vec<Enquiry>>>);

    impl EnquirySink for RecordingSink {
        fn submit(&self, enquiry: &Enquiry) -> Result<(), SinkError> {
            self.0.borrow_mut().push(enquiry.clone());
            Ok(())
        }
    }

    const VALID: [&str; 5] = [
        "Ada Lovelace",
        "ada@example.com",
        "0412 345 678",
        "Interested in a partnership.",
        "5",
    ];

    fn enquiry_form(sink: Box<dyn EnquirySink>) -> (Rc<FakeForm>, EnquiryForm<Rc<FakeForm>>) {
        let view = Rc::new(FakeForm::enquiry());
        let mut samples = [0.15, 0.85].into_iter().cycle();
        let form = EnquiryForm::new(
            view.clone(),
            Captcha::new(2, 3),
            Box::new(move || samples.next().unwrap()),
            sink,
            &SiteConfig::default(),
        );
        (view, form)
    }

    #[test]
    fn successful_submit_resets_the_form() {
        let sink = RecordingSink::default();
        let (view, form) = enquiry_form(Box::new(sink.clone()));
        view.fill(VALID);
        assert!(form.validate_form());
        assert!(view.submit_enabled.get());

        form.submit();

        let sent = sink.0.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].get("email"), Some("ada@example.com"));
        assert_eq!(sent[0].get("captcha"), Some("5"));

        assert!(view.values().iter().all(String::is_empty));
        assert!(view.errors().iter().all(Option::is_none));
        assert!(!view.submit_enabled.get());
        assert_eq!(form.captcha.get(), Captcha::new(2, 9));
        assert_eq!(view.captcha_shown.get(), Some(Captcha::new(2, 9)));
        assert_eq!(
            view.last_toast(),
            Some((SiteConfig::default().submit_message, ToastKind::Success))
        );
    }

    #[test]
    fn invalid_submit_is_blocked() {
        let sink = RecordingSink::default();
        let (view, form) = enquiry_form(Box::new(sink.clone()));
        let mut values = VALID;
        values[4] = "6";
        view.fill(values);

        form.submit();

        assert!(sink.0.borrow().is_empty());
        assert_eq!(view.values()[0], "Ada Lovelace");
        assert_eq!(view.errors()[4].as_deref(), Some("Incorrect answer"));
        assert!(!view.submit_enabled.get());
        assert_eq!(form.captcha.get(), Captcha::new(2, 3));
        assert_eq!(
            view.last_toast(),
            Some((FIX_FIELDS_MESSAGE.to_string(), ToastKind::Error))
        );
    }

    #[test]
    fn sink_failure_keeps_the_form() {
        let (view, form) = enquiry_form(Box::new(FailingSink));
        view.fill(VALID);

        form.submit();

        assert_eq!(view.values()[1], "ada@example.com");
        assert_eq!(form.captcha.get(), Captcha::new(2, 3));
        assert_eq!(
            view.last_toast(),
            Some((
                "enquiry could not be delivered: endpoint unreachable".to_string(),
                ToastKind::Error
            ))
        );
    }

    #[test]
    fn validation_scheduled_before_a_submit_is_dropped() {
        let (view, form) = enquiry_form(Box::new(RecordingSink::default()));
        view.fill(VALID);
        let scheduled = form.submissions.get();

        form.submit();

        assert_eq!(form.revalidate(scheduled), None);
        assert!(view.errors().iter().all(Option::is_none));

        // A pass scheduled after the reset still runs and flags empty fields.
        assert_eq!(form.revalidate(form.submissions.get()), Some(false));
        assert_eq!(view.errors()[0].as_deref(), Some("This field is required"));
    }

    #[test]
    fn blur_checks_a_single_field() {
        let (view, form) = enquiry_form(Box::new(RecordingSink::default()));
        view.fill(["Ada", "not-an-email", "", "", ""]);
        assert!(!form.validate_field(1));
        assert_eq!(
            view.errors()[1].as_deref(),
            Some("Please enter a valid email address")
        );
        assert_eq!(view.errors()[2], None);
        assert!(!form.validate_field(9));
    }
}
