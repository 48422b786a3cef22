//! Status code classification.

/// Outcome class of an HTTP status code, partitioned by the hundreds digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
    Unclassified,
}

impl StatusClass {
    /// Classify any integer. Total: values outside 100..=599 are `Unclassified`.
    pub fn of(code: i64) -> Self {
        match code {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Unclassified,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == StatusClass::Success
    }

    /// Client and server errors fail the call; every other non-success class
    /// resolves leniently.
    pub fn is_error(&self) -> bool {
        matches!(self, StatusClass::ClientError | StatusClass::ServerError)
    }
}

impl From<u16> for StatusClass {
    fn from(code: u16) -> Self {
        StatusClass::of(i64::from(code))
    }
}
