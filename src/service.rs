//! Service layer API for the declaration editing and submit workflow
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::Config;
use super::error::DeclarationError;
use super::form::{FormPatch, FormState};
use super::mapper::{self, SubmissionPayload};
use super::reconciler;
use super::registry::{self, DetailClass, DetailSubtype, InstrumentTypeCode};
use super::utils;
use super::validation::{ValidationEngine, ValidationError, ValidationReport};

/// The state container holding the live form values.
pub trait FormStore {
    fn read(&self) -> FormState;
    fn write(&mut self, patch: FormPatch);
    /// Replaces the whole state, as happens when the instrument type changes.
    fn replace(&mut self, state: FormState);
}

#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: FormState,
}

impl InMemoryStore {
    pub fn new(state: FormState) -> Self {
        Self { state }
    }
}

impl FormStore for InMemoryStore {
    fn read(&self) -> FormState {
        self.state.clone()
    }
    fn write(&mut self, patch: FormPatch) {
        self.state.apply(patch);
    }
    fn replace(&mut self, state: FormState) {
        self.state = state;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitStatus {
    pub status: bool,
}

/// Posts a finished payload to the filing service.
pub trait Transport {
    fn submit(&self, payload: &SubmissionPayload) -> anyhow::Result<SubmitStatus>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Rejected(Vec<ValidationError>),
    Submitted { reference: String, digest: String },
}

pub struct DeclarationService<S: FormStore, T: Transport> {
    store: S,
    transport: T,
    engine: ValidationEngine,
    config: Config,
    last_report: Option<ValidationReport>,
}

impl<S: FormStore, T: Transport> DeclarationService<S, T> {
    pub fn new(store: S, transport: T, config: Config) -> Self {
        Self {
            store,
            transport,
            engine: ValidationEngine::new(&config),
            config,
            last_report: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn form(&self) -> FormState {
        self.store.read()
    }

    /// Edits a form value.
    pub fn write(&mut self, patch: FormPatch) {
        self.store.write(patch);
    }

    fn resolve_code(&self, code: &str) -> InstrumentTypeCode {
        match registry::lookup(code) {
            Some(descriptor) => descriptor.code,
            None => {
                warn!(
                    code,
                    fallback = %self.config.fallback_type,
                    "unknown instrument type code"
                );
                self.config.fallback_type
            }
        }
    }

    /// Starts a new declaration of type `code`.
    pub fn open(&mut self, code: &str, today: NaiveDate) {
        let code = self.resolve_code(code);
        self.store
            .replace(FormState::with_config(code.as_str(), today, &self.config));
        self.last_report = None;
    }

    /// Switches the instrument type. The form is reset apart from the party
    /// fields and any previous validation report is discarded.
    pub fn switch_type(&mut self, code: &str) {
        let code = self.resolve_code(code);
        let current = self.store.read();
        if current.instrument_type_code == code.as_str() {
            return;
        }
        info!(from = %current.instrument_type_code, to = %code, "switching instrument type");
        self.store.replace(current.switch_type(code.as_str()));
        self.last_report = None;
    }

    pub fn toggle_subtype(&mut self, class: DetailClass, subtype: DetailSubtype, selected: bool) {
        let current = self.store.read();
        let items =
            reconciler::toggle_subtype(&current.attached_details, class, subtype, selected);
        self.store.write(FormPatch::attached_details(items));
    }

    /// Changes the top-level category. A different choice clears the items of
    /// the mutually exclusive category classes.
    pub fn select_category(&mut self, action_type: &str) {
        let current = self.store.read();
        let items = reconciler::select_category(
            &current.attached_details,
            current.descriptor(),
            &current.action_type,
            action_type,
        );
        self.store.write(FormPatch {
            action_type: Some(action_type.trim().to_owned()),
            attached_details: Some(items),
            ..FormPatch::default()
        });
    }

    pub fn validate(&mut self) -> &ValidationReport {
        let form = self.store.read();
        let report = self.engine.report(&form, &form.attached_details);
        self.last_report.insert(report)
    }

    /// Errors of the last validation pass, or none if that pass was for
    /// another instrument type.
    pub fn errors(&self) -> &[ValidationError] {
        let current = self.store.read();
        match &self.last_report {
            Some(report) if report.type_code == current.descriptor().code.as_str() => {
                report.errors.as_slice()
            }
            _ => &[],
        }
    }

    /// Validates, maps and hands the payload to the transport. Nothing is
    /// sent unless validation comes back clean.
    pub fn submit(&mut self) -> anyhow::Result<SubmitOutcome> {
        let form = self.store.read();
        let report = self.engine.report(&form, &form.attached_details);

        if !report.is_clean() {
            info!(
                code = %report.type_code,
                errors = report.errors.len(),
                "declaration failed validation"
            );
            let errors = report.errors.clone();
            self.last_report = Some(report);
            return Ok(SubmitOutcome::Rejected(errors));
        }
        self.last_report = Some(report);

        let payload = mapper::map(&form, &form.instrument_type_code, &form.attached_details);
        let (digest, _cbor) = mapper::finalise(&payload)?;

        let status = self
            .transport
            .submit(&payload)
            .with_context(|| format!("Submitting declaration {digest} failed"))?;
        if !status.status {
            return Err(DeclarationError::Rejected(digest).into());
        }

        let reference = utils::new_uuid_to_bech32("stamp")?;
        info!(%reference, %digest, code = %form.instrument_type_code, "declaration submitted");

        Ok(SubmitOutcome::Submitted { reference, digest })
    }
}
