use miette::Diagnostic;
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("`{name}` expected {expected} arguments but received {received}")]
    #[diagnostic(code(prime::arity))]
    ArityMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("no `{trait_name}` instance provides `{method}` for type `{type_name}`")]
    #[diagnostic(
        code(prime::dispatch_miss),
        help("declare an instance for this type or bind a global function with the same name")
    )]
    DispatchMiss {
        trait_name: String,
        method: String,
        type_name: String,
    },
    #[error("`{trait_name}.{method}` expected {expected}, found `{found}`")]
    #[diagnostic(code(prime::shape_mismatch))]
    ShapeMismatch {
        trait_name: String,
        method: String,
        expected: String,
        found: String,
    },
    #[error("cannot decide which `{trait_name}` instance `{method}` should use")]
    #[diagnostic(
        code(prime::witness_unresolved),
        help("pass a dictionary explicitly or annotate the expression with its type")
    )]
    WitnessUnresolved { trait_name: String, method: String },
    #[error("`{transformer}` over `{inner}` requires `{capability}`, which `{inner}` does not provide")]
    #[diagnostic(code(prime::inner_capability))]
    InnerCapabilityMissing {
        transformer: String,
        inner: String,
        capability: String,
    },
    #[error("`{trait_name}.unwrap` called on an empty `{type_name}`")]
    #[diagnostic(code(prime::unwrap_empty))]
    UnwrapEmpty {
        trait_name: String,
        type_name: String,
    },
    #[error("Unknown symbol `{name}`")]
    UnknownSymbol { name: String },
    #[error("Type mismatch: {message}")]
    TypeMismatch { message: String },
    #[error("Runtime panic: {message}")]
    Panic { message: String },
}

impl RuntimeError {
    pub fn shape(
        trait_name: impl ToString,
        method: &str,
        expected: &str,
        found: impl Into<String>,
    ) -> Self {
        RuntimeError::ShapeMismatch {
            trait_name: trait_name.to_string(),
            method: method.to_string(),
            expected: expected.to_string(),
            found: found.into(),
        }
    }

    pub fn witness_unresolved(trait_name: impl ToString, method: &str) -> Self {
        RuntimeError::WitnessUnresolved {
            trait_name: trait_name.to_string(),
            method: method.to_string(),
        }
    }
}
