use thiserror::Error;

/// The page could not be retrieved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid source url: {0}")]
    Url(String),
    #[error("transport failure fetching {url}: {cause}")]
    Transport { url: String, cause: String },
    #[error("{url} answered HTTP {status}: {cause}")]
    Status {
        url: String,
        status: u16,
        cause: String,
    },
}

/// The page was retrieved but does not have the expected shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no element with id `{id}` in page")]
    StructureNotFound { id: String },
    #[error("invalid selector for container `{id}`: {reason}")]
    Selector { id: String, reason: String },
}

/// A single published time could not be turned into a wall-clock time.
///
/// Always absorbed per entry: the entry is kept with an unset time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimeFormatError {
    #[error("no time published")]
    Empty,
    #[error("`{0}` has no `:` separator")]
    MissingSeparator(String),
    #[error("`{0}` is not a valid hour")]
    InvalidHour(String),
    #[error("`{0}` is not a valid minute")]
    InvalidMinute(String),
    #[error("{0} does not exist in the local time zone")]
    NonexistentLocalTime(String),
}

/// Everything that can stop a refresh from producing a schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("refresh task failed: {0}")]
    Task(String),
}
