use thiserror::Error;

/// Errors raised while tokenizing, converting or evaluating an expression.
///
/// Every variant is a validation failure of the submitted text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("empty expression")]
    EmptyExpression,

    #[error("invalid character '{0}' at position {1}")]
    InvalidCharacter(char, usize),

    #[error("mismatched parentheses")]
    MismatchedParentheses,

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("number out of range: {0}")]
    OutOfRange(String),

    #[error("parentheses nested deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
