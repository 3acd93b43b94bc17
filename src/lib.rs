mod config;
mod consts;
mod driver;
mod endpoint;
mod mask;
mod patient;
mod prelude;
mod record;
mod search;
mod selection;
mod timer;
mod types;

pub use config::SelectorConfig;
pub use driver::{SearchEvent, SearchView, run_search};
pub use consts::*;
pub use endpoint::{
    Candidate, CandidateId, EndpointError, PageDirection, RequestId, SearchEndpoint, SearchPage,
    SearchRequest, SubmitEndpoint,
};
pub use mask::{DateBuffer, DateField, DateMaskParser, InputRejected};
pub use patient::{
    FormError, PatientForm, PatientId, PatientInfo, PatientSubmission, SubmissionTarget,
};
pub use record::{MetricField, RecordError, RecordForm, RecordSubmission};
pub use search::{
    DebouncedSearchSelector, FireOutcome, QueryState, ResponseOutcome, SearchPhase,
};
pub use selection::SelectionSet;
pub use timer::{DebounceTimer, TimerToken};
pub use types::{Day, Month, Year, days_in_month, is_leap_year};

use crate::prelude::*;
use std::str::FromStr;

/// A calendar-valid date of birth, derived from a complete `DD/MM/YYYY` buffer.
///
/// Field order gives chronological ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{day}/{month}/{year}")]
pub struct CalendarDate {
    year: Year,
    month: Month,
    day: Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DateError {
    #[display(fmt = "Date is not in DD/MM/YYYY format: {_0:?}")]
    IncompleteFormat(String),
    #[display(fmt = "Invalid day {day} for month {month:02}/{year:04}")]
    InvalidDay { day: u8, month: u8, year: u16 },
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid year: {} (must be 0-{})", "_0", MAX_YEAR)]
    InvalidYear(u16),
}

impl std::error::Error for DateError {}

impl CalendarDate {
    /// Checks raw components against the month-length table.
    ///
    /// Rules apply in order and the first failure wins: a zero day, then a
    /// month outside `1..=12`, then the day count of the month.
    ///
    /// # Errors
    /// `DateError::InvalidDay`, `DateError::InvalidMonth` or `DateError::InvalidYear`.
    pub fn from_parts(day: u8, month: u8, year: u16) -> Result<Self, DateError> {
        if day == 0 {
            return Err(DateError::InvalidDay { day, month, year });
        }
        let month = Month::new(month)?;
        let year = Year::new(year)?;
        let day = Day::new(day, month, year)?;
        Ok(Self { year, month, day })
    }

    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    pub const fn year(&self) -> u16 {
        self.year.get()
    }

    pub const fn day_typed(&self) -> Day {
        self.day
    }

    pub const fn month_typed(&self) -> Month {
        self.month
    }

    pub const fn year_typed(&self) -> Year {
        self.year
    }

    fn parse_component<T: FromStr>(s: &str, width: usize, whole: &str) -> Result<T, DateError> {
        if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateError::IncompleteFormat(whole.to_owned()));
        }
        s.parse::<T>()
            .map_err(|_| DateError::IncompleteFormat(whole.to_owned()))
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(DATE_SEPARATOR).collect();
        let [day, month, year] = parts.as_slice() else {
            return Err(DateError::IncompleteFormat(s.to_owned()));
        };
        let day = Self::parse_component::<u8>(day, 2, s)?;
        let month = Self::parse_component::<u8>(month, 2, s)?;
        let year = Self::parse_component::<u16>(year, 4, s)?;
        Self::from_parts(day, month, year)
    }
}

impl TryFrom<&DateBuffer> for CalendarDate {
    type Error = DateError;

    fn try_from(buffer: &DateBuffer) -> Result<Self, Self::Error> {
        buffer.as_str().parse()
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
