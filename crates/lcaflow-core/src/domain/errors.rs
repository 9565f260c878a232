use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LcaResult<T> = Result<T, LcaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LcaErrorCategory {
    Success,
    ValidationError,
    IoSystemError,
    CyclicDependencyError,
    IncompatibleUnitsError,
    InternalError,
}

impl LcaErrorCategory {
    pub const fn exit_placeholder(self) -> ExitPlaceholder {
        match self {
            Self::Success => ExitPlaceholder {
                exit_code: 0,
                rust_category: "Success",
                status_class: "OK",
            },
            Self::ValidationError => ExitPlaceholder {
                exit_code: 2,
                rust_category: "ValidationError",
                status_class: "INPUT_INVALID",
            },
            Self::IoSystemError => ExitPlaceholder {
                exit_code: 3,
                rust_category: "IoSystemError",
                status_class: "IO_FATAL",
            },
            Self::CyclicDependencyError => ExitPlaceholder {
                exit_code: 4,
                rust_category: "CyclicDependencyError",
                status_class: "RUN_FATAL",
            },
            Self::IncompatibleUnitsError => ExitPlaceholder {
                exit_code: 5,
                rust_category: "IncompatibleUnitsError",
                status_class: "UNITS_FATAL",
            },
            Self::InternalError => ExitPlaceholder {
                exit_code: 6,
                rust_category: "InternalError",
                status_class: "SYS_FATAL",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_placeholder().exit_code
    }

    pub const fn rust_category(self) -> &'static str {
        self.exit_placeholder().rust_category
    }

    pub const fn status_class(self) -> &'static str {
        self.exit_placeholder().status_class
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPlaceholder {
    pub exit_code: i32,
    pub rust_category: &'static str,
    pub status_class: &'static str,
}

/// Engine failure carrying a stable dotted code and a process-named message.
///
/// Validation errors abort only the current computation; cyclic dependencies
/// and incompatible units abort the whole run. Nothing partial is returned in
/// either case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcaError {
    category: LcaErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl LcaError {
    pub fn new(
        category: LcaErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LcaErrorCategory::ValidationError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LcaErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn cyclic_dependency(processes: &[String]) -> Self {
        Self::new(
            LcaErrorCategory::CyclicDependencyError,
            "RUN.CYCLIC_DEPENDENCY",
            format!(
                "inputs from another stage never resolve; processes involved: {}",
                processes
                    .iter()
                    .map(|name| format!("\"{name}\""))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
    }

    pub fn incompatible_units(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LcaErrorCategory::IncompatibleUnitsError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LcaErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> LcaErrorCategory {
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

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for LcaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.rust_category(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for LcaError {}
