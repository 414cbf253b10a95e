use crate::{config::ConfigError, language::parser::TypeParseError, runtime::error::RuntimeError};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(prime::type_syntax))]
pub struct TypeSyntaxDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
    label: String,
}

impl TypeSyntaxDiagnostic {
    pub fn from_error(origin: &str, err: &TypeParseError) -> Self {
        let remaining = err.input.len().saturating_sub(err.offset);
        Self {
            src: NamedSource::new(origin, err.input.clone()),
            span: (err.offset, remaining.min(1)).into(),
            help: Some("type expressions look like `Writer (List Int) ()` or `OptionT Identity`".into()),
            message: format!("invalid type expression `{}`", err.input),
            label: err.message.clone(),
        }
    }
}

pub fn emit_type_error(origin: &str, err: &TypeParseError) {
    eprintln!("{:?}", Report::new(TypeSyntaxDiagnostic::from_error(origin, err)));
}

pub fn report_runtime_error(error: &RuntimeError) {
    eprintln!("{:?}", Report::new(error.clone()));
}

pub fn report_config_error(error: &ConfigError) {
    eprintln!("Failed to load configuration: {}", error);
}
