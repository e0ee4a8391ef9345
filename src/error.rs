use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasError>;

/// Recoverable errors of the text front end. Mathematical failures are node
/// kinds (`Undefined`, `Fail`), never errors.
#[derive(Debug, Error)]
pub enum CasError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{name} takes {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },
}
