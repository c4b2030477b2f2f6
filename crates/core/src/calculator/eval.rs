use crate::error::CalcError;
use crate::task::Operation;

use super::Token;

/// Deepest parenthesis nesting the evaluator accepts.
pub const MAX_NESTING: usize = 512;

/// Recursive-descent evaluator over a token slice.
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/') factor)*
/// factor := number | '(' expr ')'
/// ```
pub(super) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

fn finite(value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::OutOfRange(value.to_string()))
    }
}

impl<'a> Parser<'a> {
    pub(super) fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    pub(super) fn parse(mut self) -> Result<f64, CalcError> {
        let value = self.expr()?;
        match self.peek() {
            None => Ok(value),
            Some(Token::RightParen) => Err(CalcError::MismatchedParentheses),
            Some(t) => Err(CalcError::InvalidExpression(format!(
                "unexpected token {:?} at position {}",
                t, self.pos
            ))),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(Token::Operator(op @ (Operation::Add | Operation::Sub))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = finite(if op == Operation::Add { value + rhs } else { value - rhs })?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        while let Some(Token::Operator(op @ (Operation::Mul | Operation::Div))) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = finite(if op == Operation::Mul {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value / rhs
            })?;
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LeftParen) => {
                if self.depth >= MAX_NESTING {
                    return Err(CalcError::TooDeep(MAX_NESTING));
                }
                self.depth += 1;
                let value = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RightParen) => Ok(value),
                    _ => Err(CalcError::MismatchedParentheses),
                }
            }
            Some(t) => Err(CalcError::InvalidExpression(format!(
                "unexpected token {:?} at position {}",
                t,
                self.pos - 1
            ))),
            None => Err(CalcError::InvalidExpression("unexpected end of expression".to_string())),
        }
    }
}
