use calcgrid_core::{CalcError, Calculator, Token};

/// Parser/evaluator consumed by the scheduler.
///
/// `evaluate` validates submissions and computes final values; `postfix`
/// supplies the operator-last sequence the task graph is built from.
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, expression: &str) -> Result<f64, CalcError>;

    fn postfix(&self, expression: &str) -> Result<Vec<Token>, CalcError>;
}

impl ExpressionEvaluator for Calculator {
    fn evaluate(&self, expression: &str) -> Result<f64, CalcError> {
        Calculator::evaluate(self, expression)
    }

    fn postfix(&self, expression: &str) -> Result<Vec<Token>, CalcError> {
        Calculator::postfix(self, expression)
    }
}
