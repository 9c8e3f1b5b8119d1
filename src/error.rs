//! Error types for the registry and auto-registrars.

use std::fmt;

/// Registry and registration errors.
///
/// Every variant names the type that triggered it. These are programmer
/// errors in plugin code (missing constructor support, a wiring target of
/// the wrong type, a broken post-construct hook) and are intended to stop
/// host startup rather than be recovered from. The auto-registrars contain
/// per-item failures themselves; anything that escapes as a
/// `RegistryError` is fatal.
///
/// # Examples
///
/// ```rust
/// use plugin_bootstrap::RegistryError;
///
/// let err = RegistryError::MarkerRequired("myplugin::SneakyHelper");
/// assert!(err.to_string().contains("SneakyHelper"));
/// ```
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// The type could not be constructed (no usable constructor shape).
    ConstructionFailed {
        /// The type that failed to construct.
        type_name: &'static str,
        /// What the constructor reported.
        reason: String,
    },
    /// A wiring step failed while filling injected dependency slots.
    InjectionFailed {
        /// The type being wired.
        type_name: &'static str,
        /// The underlying failure.
        reason: String,
    },
    /// A post-construct hook reported a failure.
    ActivationFailed {
        /// The type whose hook failed.
        type_name: &'static str,
        /// What the hook reported.
        reason: String,
    },
    /// The registry requires the manager marker and this type has none.
    MarkerRequired(&'static str),
    /// A host-injection target asked for a different concrete host type
    /// than the one seeded at registry construction.
    HostTypeMismatch {
        /// The host type the injection target declared.
        expected: &'static str,
        /// The concrete host type the registry was built with.
        actual: &'static str,
    },
    /// Circular wiring detected (includes the full resolution path).
    Circular(Vec<&'static str>),
    /// A cached instance failed to downcast to the requested type.
    TypeMismatch(&'static str),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::ConstructionFailed { type_name, reason } => {
                write!(f, "Failed to construct {}: {}", type_name, reason)
            }
            RegistryError::InjectionFailed { type_name, reason } => {
                write!(f, "Failed to wire {}: {}", type_name, reason)
            }
            RegistryError::ActivationFailed { type_name, reason } => {
                write!(f, "Post-construct hook failed on {}: {}", type_name, reason)
            }
            RegistryError::MarkerRequired(name) => {
                write!(f, "{} is not a registered manager (marker required)", name)
            }
            RegistryError::HostTypeMismatch { expected, actual } => {
                write!(f, "Host injection expected {} but the registry holds {}", expected, actual)
            }
            RegistryError::Circular(path) => {
                write!(f, "Circular wiring: {}", path.join(" -> "))
            }
            RegistryError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
        }
    }
}

impl std::error::Error for RegistryError {}

impl RegistryError {
    /// Shorthand for a `ConstructionFailed` with a displayable reason.
    pub fn construction<E: fmt::Display>(type_name: &'static str, reason: E) -> Self {
        RegistryError::ConstructionFailed { type_name, reason: reason.to_string() }
    }

    /// Shorthand for an `InjectionFailed` with a displayable reason.
    pub fn injection<E: fmt::Display>(type_name: &'static str, reason: E) -> Self {
        RegistryError::InjectionFailed { type_name, reason: reason.to_string() }
    }

    /// Shorthand for an `ActivationFailed` with a displayable reason.
    pub fn activation<E: fmt::Display>(type_name: &'static str, reason: E) -> Self {
        RegistryError::ActivationFailed { type_name, reason: reason.to_string() }
    }
}

/// Result type for registry operations.
pub type RegResult<T> = Result<T, RegistryError>;
