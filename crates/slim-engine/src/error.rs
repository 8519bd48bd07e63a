use thiserror::Error;

/// Exception tags returned to FitNesse, formatted as `__EXCEPTION__:<TAG>`
/// (plus a message for the ones that carry one) inside a result entry.
///
/// These strings are part of the wire contract — FitNesse pattern-matches
/// on them to decide how to render a failing test cell — so they are never
/// reworded, only ever matched exactly as below.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("MALFORMED_INSTRUCTION {0}")]
    Malformed(String),

    #[error("NO_CLASS {0}")]
    NoClass(String),

    #[error("COULD_NOT_INVOKE_CONSTRUCTOR {0}")]
    ConstructorFailed(String),

    #[error("NO_INSTANCE {0}")]
    NoInstance(String),

    #[error("NO_METHOD_IN_CLASS {class}[{method}]")]
    NoMethod { class: String, method: String },

    /// `make` reused an instance name that is already bound. spec.md §3/§4.3
    /// require this to fail rather than silently replace the prior instance;
    /// the five-tag table in §4.5 has no entry for it, so this tag is this
    /// implementation's own (see DESIGN.md).
    #[error("INSTANCE_ALREADY_BOUND {0}")]
    InstanceAlreadyBound(String),

    /// A fixture method raised something outside the known tag set. Carries
    /// the fixture's own message text, wrapped in a generic tag rather than
    /// dropped.
    #[error("APPLICATION_EXCEPTION {0}")]
    MethodFailed(String),
}

impl EngineError {
    /// The bare tag FitNesse matches on, without the trailing detail.
    pub fn tag(&self) -> &'static str {
        match self {
            EngineError::Malformed(_) => "MALFORMED_INSTRUCTION",
            EngineError::NoClass(_) => "NO_CLASS",
            EngineError::ConstructorFailed(_) => "COULD_NOT_INVOKE_CONSTRUCTOR",
            EngineError::NoInstance(_) => "NO_INSTANCE",
            EngineError::NoMethod { .. } => "NO_METHOD_IN_CLASS",
            EngineError::InstanceAlreadyBound(_) => "INSTANCE_ALREADY_BOUND",
            EngineError::MethodFailed(_) => "APPLICATION_EXCEPTION",
        }
    }

    /// Render as the `__EXCEPTION__: message:<<TAG detail>>` wire literal an
    /// instruction result carries when it raised rather than completed.
    /// Bit-exact per spec.md §4.5/§8 scenario 3 — FitNesse pattern-matches
    /// on this shape.
    pub fn to_wire(&self) -> String {
        format!("__EXCEPTION__: message:<<{}>>", self)
    }
}
