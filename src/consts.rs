/// Maximum valid year (four digits)
pub const MAX_YEAR: u16 = 9999;

/// Maximum valid month (December)
pub const MAX_MONTH: u8 = 12;

/// Smallest valid day of a month
pub const MIN_DAY: u8 = 1;

/// Month number for February
pub const FEBRUARY: u8 = 2;
/// Month number for August, where the 31-day parity flips
pub const AUGUST: u8 = 8;

/// Day counts used by the month-length table
pub const LONG_MONTH_DAYS: u8 = 31;
pub const SHORT_MONTH_DAYS: u8 = 30;
pub const FEBRUARY_DAYS: u8 = 28;
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: u16 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: u16 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: u16 = 400;

/// Separator between day, month and year in a date buffer
pub const DATE_SEPARATOR: char = '/';

/// Length of a complete `DD/MM/YYYY` buffer
pub const DATE_BUFFER_LEN: usize = 10;

/// Trailing-edge delay applied to search input, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Separator between restriction ids in a patient submission
pub const RESTRICTION_ID_SEPARATOR: char = '&';

/// Exclusive bounds accepted for body metrics
pub const MIN_WEIGHT_KG: f64 = 0.1;
pub const MAX_WEIGHT_KG: f64 = 1000.0;
pub const MIN_HEIGHT_M: f64 = 0.1;
pub const MAX_HEIGHT_M: f64 = 3.0;
