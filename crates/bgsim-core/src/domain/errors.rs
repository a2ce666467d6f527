use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SimsResult<T> = Result<T, SimsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimsErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl SimsErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimsError {
    category: SimsErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl SimsError {
    pub fn new(
        category: SimsErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            SimsErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SimsErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SimsErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SimsErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> SimsErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }
}

impl Display for SimsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for SimsError {}

/// Failures raised while turning matched documents into normalized rates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("emission rate is zero; livetime is undefined")]
    ZeroEmissionRate,
    #[error("matched documents represent zero livetime; rate is undefined")]
    ZeroLivetime,
    #[error("histogram '{hit}' has no bin edges and no canonical edges are configured")]
    MissingBinEdges { hit: &'static str },
    #[error("invalid bin edges: {reason}")]
    InvalidBinEdges { reason: String },
    #[error("invalid energy range [{low}, {high}]")]
    InvalidEnergyRange { low: f64, high: f64 },
    #[error("detector mass must be finite and positive, got {mass_kg} kg")]
    InvalidDetectorMass { mass_kg: f64 },
}

impl EvaluationError {
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::ZeroEmissionRate => "RUN.ZERO_EMISSION_RATE",
            Self::ZeroLivetime => "RUN.ZERO_LIVETIME",
            Self::MissingBinEdges { .. } => "INPUT.MISSING_BIN_EDGES",
            Self::InvalidBinEdges { .. } => "INPUT.INVALID_BIN_EDGES",
            Self::InvalidEnergyRange { .. } => "INPUT.INVALID_ENERGY_RANGE",
            Self::InvalidDetectorMass { .. } => "INPUT.INVALID_DETECTOR_MASS",
        }
    }
}

impl From<EvaluationError> for SimsError {
    fn from(error: EvaluationError) -> Self {
        let placeholder = error.placeholder();
        match error {
            EvaluationError::ZeroEmissionRate | EvaluationError::ZeroLivetime => {
                SimsError::computation(placeholder, error.to_string())
            }
            _ => SimsError::input_validation(placeholder, error.to_string()),
        }
    }
}
