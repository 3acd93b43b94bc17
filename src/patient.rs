use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SelectorConfig;
use crate::consts::RESTRICTION_ID_SEPARATOR;
use crate::endpoint::{Candidate, EndpointError, SearchPage, SearchRequest, SubmitEndpoint};
use crate::mask::{DateField, InputRejected};
use crate::prelude::*;
use crate::search::{DebouncedSearchSelector, FireOutcome, ResponseOutcome};
use crate::selection::SelectionSet;
use crate::timer::TimerToken;
use crate::{CalendarDate, DateError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct PatientId(u64);

impl PatientId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// A stored patient as returned by the backend, used to pre-fill the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub name: String,
    pub date_of_birth: String,
    #[serde(default)]
    pub food_restrictions: Vec<Candidate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionTarget {
    Register,
    Edit(PatientId),
}

/// Registration or edit payload. Restriction ids are joined with `&`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSubmission {
    pub patient: String,
    pub date_of_birth: String,
    pub food_restrictions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("Patient has no name")]
    MissingName,
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// Register/edit screen: name, date of birth and food restrictions.
#[derive(Debug, Clone)]
pub struct PatientForm {
    name: String,
    date_of_birth: DateField,
    restrictions: DebouncedSearchSelector,
    editing: Option<PatientId>,
    message: Option<String>,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self::new(&SelectorConfig::default())
    }
}

impl PatientForm {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            name: String::new(),
            date_of_birth: DateField::new(),
            restrictions: DebouncedSearchSelector::new(config),
            editing: None,
            message: None,
        }
    }

    /// Switches to editing `id` and pre-fills the fields from `info`.
    ///
    /// # Errors
    /// `InputRejected` if the stored date of birth is not a date buffer shape;
    /// the form is left unchanged in that case.
    pub fn load(&mut self, id: PatientId, info: PatientInfo) -> Result<(), InputRejected> {
        self.date_of_birth = DateField::with_value(&info.date_of_birth)?;
        self.name = info.name;
        self.restrictions.clear_search();
        self.restrictions
            .load_selection(info.food_restrictions.into_iter().collect::<SelectionSet>());
        self.editing = Some(id);
        self.message = None;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn date_of_birth(&self) -> &DateField {
        &self.date_of_birth
    }

    pub const fn restrictions(&self) -> &DebouncedSearchSelector {
        &self.restrictions
    }

    pub const fn target(&self) -> SubmissionTarget {
        match self.editing {
            Some(id) => SubmissionTarget::Edit(id),
            None => SubmissionTarget::Register,
        }
    }

    /// The message currently shown under the form, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.message = None;
    }

    /// Runs the raw field value through the date mask.
    pub fn input_date_of_birth(&mut self, raw: &str) -> bool {
        let changed = self.date_of_birth.input(raw);
        if changed {
            self.message = None;
        }
        changed
    }

    pub fn input_restriction_query(&mut self, text: impl Into<String>) -> TimerToken {
        self.message = None;
        self.restrictions.on_query_change(text)
    }

    pub fn on_restriction_timer(&mut self, token: TimerToken) -> FireOutcome {
        self.restrictions.on_timer_fired(token)
    }

    /// Feeds a search response to the restriction selector; a failure is
    /// shown as the form message.
    pub fn on_restriction_response(
        &mut self,
        request: &SearchRequest,
        result: Result<SearchPage, EndpointError>,
    ) -> ResponseOutcome {
        let outcome = self.restrictions.on_search_response(request, result);
        if let ResponseOutcome::Failed(err) = &outcome {
            self.message = Some(err.to_string());
        }
        outcome
    }

    pub fn choose_restriction(&mut self, candidate: Candidate) -> bool {
        self.restrictions.on_candidate_chosen(candidate)
    }

    pub fn dismiss_restriction(&mut self, candidate: &Candidate) -> Option<Candidate> {
        self.restrictions.on_candidate_dismissed(candidate)
    }

    /// Validates the form and builds its payload. Checks run in order: the
    /// date shape, the calendar date, then the name. A failure becomes the
    /// form message.
    ///
    /// # Errors
    /// `FormError::Date` or `FormError::MissingName`.
    pub fn prepare_submission(
        &mut self,
    ) -> Result<(SubmissionTarget, PatientSubmission), FormError> {
        match self.build_submission() {
            Ok(submission) => Ok((self.target(), submission)),
            Err(err) => {
                self.message = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn build_submission(&self) -> Result<PatientSubmission, FormError> {
        let date: CalendarDate = self.date_of_birth.validate()?;
        if self.name.is_empty() {
            return Err(FormError::MissingName);
        }
        Ok(PatientSubmission {
            patient: self.name.clone(),
            date_of_birth: date.to_string(),
            food_restrictions: self
                .restrictions
                .selection()
                .joined_ids(RESTRICTION_ID_SEPARATOR),
        })
    }

    /// Applies the endpoint's answer. Success clears every field; a failure
    /// keeps them and shows the endpoint message verbatim.
    pub fn finish_submission(&mut self, result: &Result<(), EndpointError>) {
        match result {
            Ok(()) => {
                let message = match self.target() {
                    SubmissionTarget::Register => "Patient registered successfully",
                    SubmissionTarget::Edit(_) => "Patient updated successfully",
                };
                self.clear_fields();
                self.message = Some(message.to_owned());
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    /// Validates, sends and applies the result in one go.
    ///
    /// # Errors
    /// Validation failures, or the endpoint's error.
    pub async fn submit<E: SubmitEndpoint>(&mut self, endpoint: &E) -> Result<(), FormError> {
        let (target, submission) = self.prepare_submission()?;
        info!(?target, restrictions = %submission.food_restrictions, "submitting patient");
        let result = endpoint.submit(target, &submission).await;
        if let Err(err) = &result {
            warn!(?target, error = %err, "patient submission failed");
        }
        self.finish_submission(&result);
        result.map_err(FormError::from)
    }

    /// Empties name, date, search box, results and selection.
    pub fn clear_fields(&mut self) {
        self.name.clear();
        self.date_of_birth.clear();
        self.restrictions.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::record::RecordSubmission;

    #[derive(Default)]
    struct RecordingEndpoint {
        fail_with: Option<&'static str>,
        submissions: RefCell<Vec<(SubmissionTarget, PatientSubmission)>>,
    }

    impl SubmitEndpoint for RecordingEndpoint {
        async fn submit(
            &self,
            target: SubmissionTarget,
            submission: &PatientSubmission,
        ) -> Result<(), EndpointError> {
            self.submissions
                .borrow_mut()
                .push((target, submission.clone()));
            self.fail_with.map_or(Ok(()), |message| Err(message.into()))
        }

        async fn add_record(
            &self,
            _patient: PatientId,
            _record: &RecordSubmission,
        ) -> Result<(), EndpointError> {
            Ok(())
        }
    }

    fn type_date(form: &mut PatientForm, keys: &str) {
        for (i, _) in keys.char_indices() {
            let next = format!("{}{}", form.date_of_birth().as_str(), &keys[i..=i]);
            form.input_date_of_birth(&next);
        }
    }

    fn filled_form() -> PatientForm {
        let mut form = PatientForm::default();
        form.set_name("Maria Silva");
        type_date(&mut form, "29022000");
        form.choose_restriction(Candidate::new(12, "Lactose"));
        form.choose_restriction(Candidate::new(4, "Peanut"));
        form
    }

    #[test]
    fn test_prepare_submission_builds_payload() {
        let mut form = filled_form();
        let (target, submission) = form.prepare_submission().unwrap();
        assert_eq!(target, SubmissionTarget::Register);
        assert_eq!(
            submission,
            PatientSubmission {
                patient: "Maria Silva".to_owned(),
                date_of_birth: "29/02/2000".to_owned(),
                food_restrictions: "12&4".to_owned(),
            }
        );
    }

    #[test]
    fn test_submission_serializes_to_backend_fields() {
        let mut form = filled_form();
        let (_, submission) = form.prepare_submission().unwrap();
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "patient": "Maria Silva",
                "date_of_birth": "29/02/2000",
                "food_restrictions": "12&4"
            })
        );
    }

    #[test]
    fn test_incomplete_date_blocks_submission() {
        let mut form = PatientForm::default();
        form.set_name("Maria");
        type_date(&mut form, "2902");
        assert!(matches!(
            form.prepare_submission(),
            Err(FormError::Date(DateError::IncompleteFormat(_)))
        ));
        assert!(form.message().unwrap().contains("DD/MM/YYYY"));
    }

    #[test]
    fn test_invalid_date_checked_before_name() {
        let mut form = PatientForm::default();
        type_date(&mut form, "29021900");
        assert!(matches!(
            form.prepare_submission(),
            Err(FormError::Date(DateError::InvalidDay { .. }))
        ));
    }

    #[test]
    fn test_missing_name_blocks_submission() {
        let mut form = PatientForm::default();
        type_date(&mut form, "01012000");
        assert_eq!(form.prepare_submission(), Err(FormError::MissingName));
        assert_eq!(form.message(), Some("Patient has no name"));
    }

    #[test]
    fn test_editing_clears_message() {
        let mut form = PatientForm::default();
        let _ = form.prepare_submission();
        assert!(form.message().is_some());
        form.set_name("M");
        assert!(form.message().is_none());
    }

    #[test]
    fn test_load_switches_to_edit_mode() {
        let mut form = PatientForm::default();
        let info: PatientInfo = serde_json::from_str(
            r#"{
                "name": "João",
                "date_of_birth": "05/08/1991",
                "food_restrictions": [{"id": 3, "food_name": "Shrimp"}]
            }"#,
        )
        .unwrap();
        form.load(PatientId::new(42), info).unwrap();

        assert_eq!(form.target(), SubmissionTarget::Edit(PatientId::new(42)));
        let (_, submission) = form.prepare_submission().unwrap();
        assert_eq!(submission.patient, "João");
        assert_eq!(submission.food_restrictions, "3");
    }

    #[test]
    fn test_load_rejects_malformed_stored_date() {
        let mut form = filled_form();
        let info = PatientInfo {
            name: "Other".to_owned(),
            date_of_birth: "1991-08-05".to_owned(),
            food_restrictions: Vec::new(),
        };
        assert_eq!(form.load(PatientId::new(1), info), Err(InputRejected));
        assert_eq!(form.name(), "Maria Silva");
        assert_eq!(form.target(), SubmissionTarget::Register);
    }

    #[test]
    fn test_restriction_search_failure_becomes_message() {
        let mut form = PatientForm::default();
        let token = form.input_restriction_query("lac");
        let FireOutcome::Dispatch(request) = form.on_restriction_timer(token) else {
            panic!("expected dispatch");
        };
        let outcome = form.on_restriction_response(&request, Err("Erro de conexão".into()));
        assert!(matches!(outcome, ResponseOutcome::Failed(_)));
        assert_eq!(form.message(), Some("Erro de conexão"));
    }

    #[tokio::test]
    async fn test_submit_success_clears_fields() {
        let endpoint = RecordingEndpoint::default();
        let mut form = filled_form();
        form.submit(&endpoint).await.unwrap();

        assert_eq!(endpoint.submissions.borrow().len(), 1);
        assert_eq!(form.message(), Some("Patient registered successfully"));
        assert_eq!(form.name(), "");
        assert_eq!(form.date_of_birth().as_str(), "");
        assert!(form.restrictions().selection().is_empty());
    }

    #[tokio::test]
    async fn test_submit_edit_reports_update() {
        let endpoint = RecordingEndpoint::default();
        let mut form = filled_form();
        form.load(
            PatientId::new(7),
            PatientInfo {
                name: "Ana".to_owned(),
                date_of_birth: "01/01/1980".to_owned(),
                food_restrictions: Vec::new(),
            },
        )
        .unwrap();
        form.submit(&endpoint).await.unwrap();

        let submissions = endpoint.submissions.borrow();
        assert_eq!(submissions[0].0, SubmissionTarget::Edit(PatientId::new(7)));
        assert_eq!(form.message(), Some("Patient updated successfully"));
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_fields() {
        let endpoint = RecordingEndpoint {
            fail_with: Some("Paciente já cadastrado"),
            ..RecordingEndpoint::default()
        };
        let mut form = filled_form();
        let result = form.submit(&endpoint).await;

        assert!(matches!(result, Err(FormError::Endpoint(_))));
        assert_eq!(form.message(), Some("Paciente já cadastrado"));
        assert_eq!(form.name(), "Maria Silva");
        assert_eq!(form.restrictions().selection().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_form_is_never_sent() {
        let endpoint = RecordingEndpoint::default();
        let mut form = PatientForm::default();
        form.set_name("Maria");
        type_date(&mut form, "31042021");
        assert!(form.submit(&endpoint).await.is_err());
        assert!(endpoint.submissions.borrow().is_empty());
    }
}
