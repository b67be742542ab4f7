//! Resumable multi-step intake wizard.
//!
//! States are `Active(1..=N)` and `Completed`. A step only advances on a
//! commit whose payload validates; committed steps stay reopenable no matter
//! what happens to later steps. The engine itself is side-effect free: every
//! successful commit returns the notification body the caller is expected to
//! send, and `start` returns the aggregate record.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::error::{Result, WorkspaceError};
use crate::validation::FieldValidator;

/// Validated values of one step, keyed by field key
pub type StepPayload = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Text,
    Choice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key in the aggregate record
    pub key: String,
    /// Key in the per-step notification body
    pub wire_name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Choice field that must hold one of its options before this one is enabled
    #[serde(default)]
    pub depends_on: Option<String>,
}

impl FieldSpec {
    fn new(key: &str, wire_name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            wire_name: wire_name.to_string(),
            label: label.to_string(),
            kind,
            required: true,
            depends_on: None,
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn enabled_by(mut self, key: &str) -> Self {
        self.depends_on = Some(key.to_string());
        self
    }

    fn options(&self) -> Option<Vec<&str>> {
        match &self.kind {
            FieldKind::Choice(options) => Some(options.iter().map(String::as_str).collect()),
            _ => None,
        }
    }

    fn validate(&self, value: &str) -> Result<()> {
        match &self.kind {
            FieldKind::Number => FieldValidator::validate_positive_number(&self.key, value),
            FieldKind::Text => FieldValidator::validate_text(&self.key, value),
            FieldKind::Choice(_) => {
                let options = self.options().unwrap_or_default();
                FieldValidator::validate_choice(&self.key, value, &options)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

impl StepSpec {
    fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

fn choice(options: &[&str]) -> FieldKind {
    FieldKind::Choice(options.iter().map(|o| o.to_string()).collect())
}

/// The built-in four-step sales intake
pub fn intake_steps() -> Vec<StepSpec> {
    vec![
        StepSpec {
            title: "Targets".to_string(),
            fields: vec![FieldSpec::new(
                "targetCustomers",
                "target_count",
                "How many customers do you want to reach?",
                FieldKind::Number,
            )],
        },
        StepSpec {
            title: "Audience".to_string(),
            fields: vec![
                FieldSpec::new(
                    "companySize",
                    "company_size",
                    "Company size",
                    choice(&["1-10", "11-50", "51-200", "201-1000", "1000+"]),
                ),
                FieldSpec::new("jobTitles", "job_titles", "Job titles", FieldKind::Text),
            ],
        },
        StepSpec {
            title: "Channel".to_string(),
            fields: vec![
                FieldSpec::new(
                    "channel",
                    "channel",
                    "Primary channel",
                    choice(&["Email", "LinkedIn", "Phone", "Other"]),
                ),
                FieldSpec::new(
                    "channelDetails",
                    "channel_details",
                    "Channel details",
                    FieldKind::Text,
                )
                .enabled_by("channel"),
            ],
        },
        StepSpec {
            title: "Offer".to_string(),
            fields: vec![
                FieldSpec::new(
                    "valueProposition",
                    "value_proposition",
                    "Value proposition",
                    FieldKind::Text,
                ),
                FieldSpec::new("dailyLimit", "daily_limit", "Daily send limit", FieldKind::Number)
                    .optional(),
            ],
        },
    ]
}

/// Check a wizard definition before running it
pub fn validate_definitions(steps: &[StepSpec]) -> Result<()> {
    if steps.is_empty() {
        return Err(WorkspaceError::Configuration(
            "Wizard needs at least one step".to_string(),
        ));
    }

    let mut keys = HashSet::new();
    for (index, step) in steps.iter().enumerate() {
        for (position, field) in step.fields.iter().enumerate() {
            if field.key.trim().is_empty() || field.wire_name.trim().is_empty() {
                return Err(WorkspaceError::Configuration(format!(
                    "Step {} has a field without a key",
                    index + 1
                )));
            }
            if !keys.insert(field.key.as_str()) {
                return Err(WorkspaceError::Configuration(format!(
                    "Duplicate field key '{}'",
                    field.key
                )));
            }
            if let FieldKind::Choice(options) = &field.kind {
                if options.is_empty() {
                    return Err(WorkspaceError::Configuration(format!(
                        "Choice field '{}' has no options",
                        field.key
                    )));
                }
            }
            if let Some(dependency) = &field.depends_on {
                let controller = step.fields[..position].iter().find(|f| &f.key == dependency);
                match controller {
                    Some(f) if matches!(f.kind, FieldKind::Choice(_)) => {}
                    _ => {
                        return Err(WorkspaceError::Configuration(format!(
                            "Field '{}' must depend on an earlier choice field, got '{dependency}'",
                            field.key
                        )))
                    }
                }
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardState {
    /// 1-based index of the step being edited
    Active(usize),
    Completed,
}

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq)]
pub struct StepCommit {
    pub step: usize,
    pub payload: StepPayload,
    /// Body of the outbound notification: this step's values under wire names
    pub notification: serde_json::Value,
}

/// Union of all committed payloads, handed to the workspace by `start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OnboardingRecord {
    pub fields: BTreeMap<String, String>,
}

impl OnboardingRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Step engine for the intake wizard
#[derive(Debug, Clone)]
pub struct StepEngine {
    steps: Vec<StepSpec>,
    drafts: Vec<StepPayload>,
    committed: Vec<Option<StepPayload>>,
    state: WizardState,
    furthest: usize,
    started: bool,
}

impl StepEngine {
    /// Build an engine from custom definitions
    pub fn new(steps: Vec<StepSpec>) -> Result<Self> {
        validate_definitions(&steps)?;
        Ok(Self::build(steps))
    }

    /// Engine over the built-in intake steps
    pub fn intake() -> Self {
        Self::build(intake_steps())
    }

    fn build(steps: Vec<StepSpec>) -> Self {
        let n = steps.len();
        Self {
            steps,
            drafts: vec![StepPayload::new(); n],
            committed: vec![None; n],
            state: WizardState::Active(1),
            furthest: 1,
            started: false,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            WizardState::Active(step) => Some(step),
            WizardState::Completed => None,
        }
    }

    pub fn spec(&self, step: usize) -> Option<&StepSpec> {
        step.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn draft(&self, step: usize) -> Option<&StepPayload> {
        step.checked_sub(1).and_then(|i| self.drafts.get(i))
    }

    pub fn committed(&self, step: usize) -> Option<&StepPayload> {
        step.checked_sub(1)
            .and_then(|i| self.committed.get(i))
            .and_then(Option::as_ref)
    }

    pub fn all_committed(&self) -> bool {
        self.committed.iter().all(Option::is_some)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Highest step index the wizard has advanced to so far
    pub fn furthest_reached(&self) -> usize {
        self.furthest
    }

    fn active_index(&self) -> Result<usize> {
        if self.started {
            return Err(WorkspaceError::InvalidState(
                "Onboarding has already been started".to_string(),
            ));
        }
        match self.state {
            WizardState::Active(step) => Ok(step - 1),
            WizardState::Completed => Err(WorkspaceError::InvalidState(
                "No step is open for editing".to_string(),
            )),
        }
    }

    /// Whether `key` on the current step may be edited
    pub fn field_enabled(&self, key: &str) -> bool {
        let Some(step) = self.current_step() else {
            return false;
        };
        let spec = &self.steps[step - 1];
        let Some(field) = spec.field(key) else {
            return false;
        };
        self.dependency_satisfied(step - 1, field)
    }

    fn dependency_satisfied(&self, index: usize, field: &FieldSpec) -> bool {
        let Some(dependency) = &field.depends_on else {
            return true;
        };
        let spec = &self.steps[index];
        match (spec.field(dependency), self.drafts[index].get(dependency)) {
            (Some(controller), Some(value)) => controller.validate(value).is_ok(),
            _ => false,
        }
    }

    /// Edit a field of the current step
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let index = self.active_index()?;
        let spec = &self.steps[index];
        let field = spec.field(key).ok_or_else(|| {
            WorkspaceError::Validation(format!("Unknown field '{key}' on step {}", index + 1))
        })?;

        if let Some(dependency) = &field.depends_on {
            if !self.dependency_satisfied(index, field) {
                return Err(WorkspaceError::FieldDisabled(key.to_string(), dependency.clone()));
            }
        }

        let is_choice = matches!(field.kind, FieldKind::Choice(_));
        let dependents: Vec<String> = spec
            .fields
            .iter()
            .filter(|f| f.depends_on.as_deref() == Some(key))
            .map(|f| f.key.clone())
            .collect();

        self.drafts[index].insert(key.to_string(), value.into());

        if is_choice {
            let controller = &self.steps[index].fields;
            let still_valid = controller
                .iter()
                .find(|f| f.key == key)
                .zip(self.drafts[index].get(key))
                .is_some_and(|(f, v)| f.validate(v).is_ok());
            if !still_valid {
                for dependent in dependents {
                    self.drafts[index].remove(&dependent);
                }
            }
        }

        Ok(())
    }

    fn validate_step(&self, index: usize) -> Result<StepPayload> {
        let spec = &self.steps[index];
        let draft = &self.drafts[index];
        let mut payload = StepPayload::new();

        for field in &spec.fields {
            if !self.dependency_satisfied(index, field) {
                if field.required {
                    return Err(WorkspaceError::empty_field(&field.key));
                }
                continue;
            }

            let value = draft.get(&field.key).map(|v| v.trim()).unwrap_or_default();
            if value.is_empty() {
                if field.required {
                    return Err(WorkspaceError::empty_field(&field.key));
                }
                continue;
            }

            field.validate(value)?;
            payload.insert(field.key.clone(), value.to_string());
        }

        Ok(payload)
    }

    /// Validation predicate for the current step; drives the commit button
    pub fn can_commit(&self) -> bool {
        self.active_index()
            .and_then(|index| self.validate_step(index))
            .is_ok()
    }

    /// Commit the current step and advance.
    ///
    /// On validation failure nothing changes and no notification is produced.
    pub fn commit(&mut self) -> Result<StepCommit> {
        let index = self.active_index()?;
        let payload = self.validate_step(index)?;
        let step = index + 1;

        let notification: serde_json::Map<String, serde_json::Value> = self.steps[index]
            .fields
            .iter()
            .filter_map(|f| {
                payload
                    .get(&f.key)
                    .map(|v| (f.wire_name.clone(), serde_json::Value::String(v.clone())))
            })
            .collect();

        self.committed[index] = Some(payload.clone());
        self.drafts[index] = payload.clone();

        self.state = if step == self.steps.len() {
            WizardState::Completed
        } else {
            WizardState::Active(step + 1)
        };
        self.furthest = self.furthest.max((step + 1).min(self.steps.len()));

        info!(step, next = ?self.state, "Wizard step committed");

        Ok(StepCommit {
            step,
            payload,
            notification: serde_json::Value::Object(notification),
        })
    }

    /// A step is reachable when the previous one has committed data or the
    /// wizard has already advanced past it.
    pub fn is_reachable(&self, step: usize) -> bool {
        if step == 0 || step > self.steps.len() {
            return false;
        }
        step == 1 || self.committed[step - 2].is_some() || step <= self.furthest
    }

    /// Navigate to a reachable step without committing anything
    pub fn go_to(&mut self, step: usize) -> Result<()> {
        if self.started || !self.is_reachable(step) {
            return Err(WorkspaceError::InvalidStep(step));
        }
        debug!(step, "Wizard navigating");
        self.state = WizardState::Active(step);
        Ok(())
    }

    /// Navigate one step back
    pub fn back(&mut self) -> Result<()> {
        match self.state {
            WizardState::Active(1) => Err(WorkspaceError::InvalidStep(0)),
            WizardState::Active(step) => self.go_to(step - 1),
            WizardState::Completed => self.go_to(self.steps.len()),
        }
    }

    /// Reopen a committed step for editing; the draft starts from its
    /// committed payload.
    pub fn reopen(&mut self, step: usize) -> Result<()> {
        let committed = self
            .committed(step)
            .cloned()
            .ok_or(WorkspaceError::InvalidStep(step))?;
        if self.started {
            return Err(WorkspaceError::InvalidState(
                "Onboarding has already been started".to_string(),
            ));
        }
        self.drafts[step - 1] = committed;
        self.state = WizardState::Active(step);
        info!(step, "Wizard step reopened");
        Ok(())
    }

    /// Aggregate every committed payload into one record.
    ///
    /// Only valid once, and only after all steps are committed.
    pub fn start(&mut self) -> Result<OnboardingRecord> {
        if self.started {
            return Err(WorkspaceError::InvalidState(
                "Onboarding has already been started".to_string(),
            ));
        }
        if !self.all_committed() {
            return Err(WorkspaceError::InvalidState(
                "All steps must be committed before starting".to_string(),
            ));
        }

        let mut fields = BTreeMap::new();
        for payload in self.committed.iter().flatten() {
            for (key, value) in payload {
                if fields.insert(key.clone(), value.clone()).is_some() {
                    return Err(WorkspaceError::Internal(format!(
                        "Field '{key}' committed by more than one step"
                    )));
                }
            }
        }

        self.started = true;
        info!(fields = fields.len(), "Onboarding started");
        Ok(OnboardingRecord { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fill_all(engine: &mut StepEngine) {
        engine.set_field("targetCustomers", "100").unwrap();
        engine.commit().unwrap();
        engine.set_field("companySize", "11-50").unwrap();
        engine.set_field("jobTitles", "Head of Sales").unwrap();
        engine.commit().unwrap();
        engine.set_field("channel", "Email").unwrap();
        engine.set_field("channelDetails", "Cold sequences").unwrap();
        engine.commit().unwrap();
        engine.set_field("valueProposition", "Book more demos").unwrap();
        engine.commit().unwrap();
    }

    #[test]
    fn test_builtin_definitions_are_valid() {
        assert!(validate_definitions(&intake_steps()).is_ok());
        assert_eq!(StepEngine::intake().step_count(), 4);
    }

    #[test]
    fn test_first_step_notification_payload() {
        let mut engine = StepEngine::intake();
        engine.set_field("targetCustomers", "100").unwrap();
        let commit = engine.commit().unwrap();
        assert_eq!(commit.step, 1);
        assert_eq!(commit.notification, json!({ "target_count": "100" }));
        assert_eq!(engine.state(), WizardState::Active(2));
    }

    #[test]
    fn test_empty_required_text_keeps_step() {
        let mut engine = StepEngine::intake();
        engine.set_field("targetCustomers", "100").unwrap();
        engine.commit().unwrap();

        engine.set_field("companySize", "1-10").unwrap();
        engine.set_field("jobTitles", "   ").unwrap();
        assert!(!engine.can_commit());
        let err = engine.commit().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(engine.state(), WizardState::Active(2));
        assert!(engine.committed(2).is_none());
    }

    #[test]
    fn test_number_fields_must_be_positive() {
        let mut engine = StepEngine::intake();
        for bad in ["0", "-3", "lots", ""] {
            engine.set_field("targetCustomers", bad).unwrap();
            assert!(!engine.can_commit(), "{bad:?} should not commit");
        }
        engine.set_field("targetCustomers", "12.5").unwrap();
        assert!(engine.can_commit());
    }

    #[test]
    fn test_dependent_field_disabled_until_choice() {
        let mut engine = StepEngine::intake();
        fill_all(&mut engine);
        engine.reopen(3).unwrap();
        engine.set_field("channel", "").unwrap();

        assert!(!engine.field_enabled("channelDetails"));
        assert_eq!(engine.draft(3).unwrap().get("channelDetails"), None);
        let err = engine.set_field("channelDetails", "x").unwrap_err();
        assert_eq!(
            err,
            WorkspaceError::FieldDisabled("channelDetails".into(), "channel".into())
        );

        engine.set_field("channel", "Fax").unwrap();
        assert!(!engine.field_enabled("channelDetails"));

        engine.set_field("channel", "Phone").unwrap();
        assert!(engine.field_enabled("channelDetails"));
        engine.set_field("channelDetails", "Warm calls").unwrap();
        assert!(engine.can_commit());
    }

    #[test]
    fn test_reachability() {
        let mut engine = StepEngine::intake();
        assert!(engine.is_reachable(1));
        assert!(!engine.is_reachable(2));
        assert_eq!(engine.go_to(3), Err(WorkspaceError::InvalidStep(3)));

        engine.set_field("targetCustomers", "5").unwrap();
        engine.commit().unwrap();
        assert!(engine.is_reachable(2));
        assert!(!engine.is_reachable(3));

        engine.go_to(1).unwrap();
        assert_eq!(engine.state(), WizardState::Active(1));
        assert!(engine.is_reachable(2));
    }

    #[test]
    fn test_reopen_and_recommit_overwrites() {
        let mut engine = StepEngine::intake();
        fill_all(&mut engine);
        assert_eq!(engine.state(), WizardState::Completed);

        engine.reopen(1).unwrap();
        assert_eq!(engine.draft(1).unwrap().get("targetCustomers").unwrap(), "100");
        engine.set_field("targetCustomers", "250").unwrap();
        let commit = engine.commit().unwrap();
        assert_eq!(commit.notification, json!({ "target_count": "250" }));
        assert_eq!(engine.committed(1).unwrap().get("targetCustomers").unwrap(), "250");
        assert_eq!(engine.state(), WizardState::Active(2));
        // Later steps keep their data and stay reachable
        assert!(engine.committed(4).is_some());
        assert!(engine.is_reachable(4));
    }

    #[test]
    fn test_reopen_uncommitted_step_fails() {
        let mut engine = StepEngine::intake();
        assert_eq!(engine.reopen(2), Err(WorkspaceError::InvalidStep(2)));
        assert_eq!(engine.reopen(0), Err(WorkspaceError::InvalidStep(0)));
    }

    #[test]
    fn test_start_aggregates_union() {
        let mut engine = StepEngine::intake();
        assert!(engine.start().is_err());
        fill_all(&mut engine);

        let record = engine.start().unwrap();
        let expected: BTreeMap<String, String> = [
            ("targetCustomers", "100"),
            ("companySize", "11-50"),
            ("jobTitles", "Head of Sales"),
            ("channel", "Email"),
            ("channelDetails", "Cold sequences"),
            ("valueProposition", "Book more demos"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(record.fields, expected);
        assert_eq!(record.get("targetCustomers"), Some("100"));

        assert!(engine.is_started());
        assert!(engine.start().is_err());
        assert!(engine.reopen(1).is_err());
    }

    #[test]
    fn test_completing_last_step_does_not_start() {
        let mut engine = StepEngine::intake();
        fill_all(&mut engine);
        assert_eq!(engine.state(), WizardState::Completed);
        assert!(!engine.is_started());
    }

    #[test]
    fn test_optional_number_included_when_present() {
        let mut engine = StepEngine::intake();
        fill_all(&mut engine);
        engine.reopen(4).unwrap();
        engine.set_field("dailyLimit", "abc").unwrap();
        assert!(!engine.can_commit());
        engine.set_field("dailyLimit", "40").unwrap();
        let commit = engine.commit().unwrap();
        assert_eq!(
            commit.notification,
            json!({ "value_proposition": "Book more demos", "daily_limit": "40" })
        );
        assert_eq!(engine.state(), WizardState::Completed);
    }

    #[test]
    fn test_back_navigation() {
        let mut engine = StepEngine::intake();
        assert!(engine.back().is_err());
        fill_all(&mut engine);
        engine.back().unwrap();
        assert_eq!(engine.state(), WizardState::Active(4));
        engine.back().unwrap();
        assert_eq!(engine.state(), WizardState::Active(3));
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(StepEngine::new(vec![]).is_err());

        let mut steps = intake_steps();
        steps[1].fields[1].key = "targetCustomers".to_string();
        assert!(StepEngine::new(steps).is_err());

        let mut steps = intake_steps();
        steps[2].fields[1].depends_on = Some("valueProposition".to_string());
        assert!(StepEngine::new(steps).is_err());
    }

    #[test]
    fn test_unknown_field() {
        let mut engine = StepEngine::intake();
        assert!(engine.set_field("jobTitles", "CTO").unwrap_err().is_validation());
    }
}
