/// Rejected fee setting key or value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Key is not one of the payout fee settings.
    UnknownKey(String),
    /// Not a finite number in `[0, 100]`.
    InvalidPercentage(String),
    /// More digits than an `f64` holds, so the calculator would see another value.
    ImprecisePercentage(String),
    /// Not a non-negative integer.
    InvalidCents(String),
    /// A whole-record check failed on the named field.
    OutOfRange(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKey(_) => write!(f, "Invalid payout fee key"),
            Self::InvalidPercentage(_) => write!(f, "Percentage must be between 0 and 100"),
            Self::ImprecisePercentage(_) => {
                write!(f, "Percentage has more precision than can be stored")
            }
            Self::InvalidCents(_) => write!(f, "Cents must be a non-negative integer"),
            Self::OutOfRange(field) => write!(f, "{field} is out of range"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tag is not one of the four payout methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl std::fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown payout method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}
