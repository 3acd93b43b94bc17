use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::consts::{MAX_HEIGHT_M, MAX_WEIGHT_KG, MIN_HEIGHT_M, MIN_WEIGHT_KG};
use crate::endpoint::{EndpointError, SubmitEndpoint};
use crate::patient::PatientId;

lazy_static! {
    static ref WEIGHT_SHAPE: Regex =
        Regex::new(r"^(?:[0-9]{0,3}\.[0-9]{0,2}|[0-9]{0,3})$").expect("static weight pattern");
    static ref HEIGHT_SHAPE: Regex =
        Regex::new(r"^(?:[0-9]?\.[0-9]{0,2}|[0-9]?)$").expect("static height pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    /// Kilograms, up to three integer and two decimal digits.
    Weight,
    /// Metres, one integer and two decimal digits.
    Height,
}

impl MetricField {
    fn accepts(self, raw: &str) -> bool {
        match self {
            Self::Weight => WEIGHT_SHAPE.is_match(raw),
            Self::Height => HEIGHT_SHAPE.is_match(raw),
        }
    }
}

/// A body-metric record ready to send. Numbers carry two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSubmission {
    pub corporal_mass: String,
    pub height: String,
    #[serde(rename = "BMI")]
    pub bmi: String,
    pub observations: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid height or weight")]
    InvalidMetrics,
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// Weight, height and free-text observations for one patient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordForm {
    weight: String,
    height: String,
    observations: String,
    message: Option<String>,
}

impl RecordForm {
    pub const fn new() -> Self {
        Self {
            weight: String::new(),
            height: String::new(),
            observations: String::new(),
            message: None,
        }
    }

    pub fn weight(&self) -> &str {
        &self.weight
    }

    pub fn height(&self) -> &str {
        &self.height
    }

    pub fn observations(&self) -> &str {
        &self.observations
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Replaces `field` with `raw` if it still fits the field's mask.
    /// Returns whether the value was taken.
    pub fn input(&mut self, field: MetricField, raw: &str) -> bool {
        if !field.accepts(raw) {
            return false;
        }
        let slot = match field {
            MetricField::Weight => &mut self.weight,
            MetricField::Height => &mut self.height,
        };
        raw.clone_into(slot);
        self.message = None;
        true
    }

    pub fn set_observations(&mut self, text: impl Into<String>) {
        self.observations = text.into();
        self.message = None;
    }

    /// Checks both metrics against their exclusive bounds and derives the BMI.
    ///
    /// # Errors
    /// `RecordError::InvalidMetrics` when either value is missing or out of
    /// range; the error also becomes the form message.
    pub fn prepare_submission(&mut self) -> Result<RecordSubmission, RecordError> {
        let metrics = parse_metric(&self.weight, MIN_WEIGHT_KG, MAX_WEIGHT_KG)
            .zip(parse_metric(&self.height, MIN_HEIGHT_M, MAX_HEIGHT_M));
        let Some((weight, height)) = metrics else {
            let err = RecordError::InvalidMetrics;
            self.message = Some(err.to_string());
            return Err(err);
        };
        Ok(RecordSubmission {
            corporal_mass: format!("{weight:.2}"),
            height: format!("{height:.2}"),
            bmi: format!("{:.2}", weight / (height * height)),
            observations: self.observations.clone(),
        })
    }

    pub fn finish_submission(&mut self, result: &Result<(), EndpointError>) {
        match result {
            Ok(()) => {
                self.clear_fields();
                self.message = Some("Record added successfully".to_owned());
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    /// # Errors
    /// Invalid metrics, or the endpoint's error.
    pub async fn submit<E: SubmitEndpoint>(
        &mut self,
        endpoint: &E,
        patient: PatientId,
    ) -> Result<(), RecordError> {
        let record = self.prepare_submission()?;
        info!(%patient, bmi = %record.bmi, "adding record");
        let result = endpoint.add_record(patient, &record).await;
        if let Err(err) = &result {
            warn!(%patient, error = %err, "record submission failed");
        }
        self.finish_submission(&result);
        result.map_err(RecordError::from)
    }

    pub fn clear_fields(&mut self) {
        self.weight.clear();
        self.height.clear();
        self.observations.clear();
    }
}

fn parse_metric(raw: &str, min: f64, max: f64) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    (value > min && value < max).then_some(value)
}
