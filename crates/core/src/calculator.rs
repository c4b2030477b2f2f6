//! Arithmetic calculator: tokenizer, shunting-yard postfix conversion and
//! direct recursive-descent evaluation.
//!
//! The orchestrator uses it twice per expression: once to validate and
//! decompose the submitted text, and once more to compute the final value
//! after every task has reported back.

mod eval;

pub use eval::MAX_NESTING;

use crate::error::CalcError;
use crate::task::Operation;

/// A lexical token. Postfix sequences only contain `Number` and `Operator`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Operator(Operation),
    LeftParen,
    RightParen,
}

/// Stateless calculator; cheap to construct and share.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Self
    }

    /// Split `expr` into tokens.
    pub fn tokenize(&self, expr: &str) -> Result<Vec<Token>, CalcError> {
        if expr.trim().is_empty() {
            return Err(CalcError::EmptyExpression);
        }

        let mut tokens = Vec::new();
        let chars: Vec<char> = expr.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c.is_ascii_whitespace() {
                i += 1;
                continue;
            }

            if c.is_ascii_digit() || c == '.' {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal.parse::<f64>().map_err(|_| {
                    CalcError::InvalidExpression(format!("malformed number '{}'", literal))
                })?;
                if !value.is_finite() {
                    return Err(CalcError::OutOfRange(literal));
                }
                tokens.push(Token::Number(value));
                continue;
            }

            let token = match c {
                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                _ => match Operation::from_symbol(c) {
                    Some(op) => Token::Operator(op),
                    None => return Err(CalcError::InvalidCharacter(c, i)),
                },
            };
            tokens.push(token);
            i += 1;
        }

        Ok(tokens)
    }

    /// Convert infix tokens to postfix (reverse Polish) order.
    pub fn to_postfix(&self, tokens: &[Token]) -> Result<Vec<Token>, CalcError> {
        let mut output = Vec::with_capacity(tokens.len());
        let mut operators: Vec<Token> = Vec::new();

        for &token in tokens {
            match token {
                Token::Number(_) => output.push(token),
                Token::Operator(op) => {
                    // Left-associative: pop while the stacked operator binds at least as tight.
                    while let Some(&Token::Operator(top)) = operators.last() {
                        if top.priority() < op.priority() {
                            break;
                        }
                        output.push(Token::Operator(top));
                        operators.pop();
                    }
                    operators.push(token);
                }
                Token::LeftParen => operators.push(token),
                Token::RightParen => loop {
                    match operators.pop() {
                        Some(Token::LeftParen) => break,
                        Some(t) => output.push(t),
                        None => return Err(CalcError::MismatchedParentheses),
                    }
                },
            }
        }

        while let Some(token) = operators.pop() {
            if token == Token::LeftParen {
                return Err(CalcError::MismatchedParentheses);
            }
            output.push(token);
        }

        Ok(output)
    }

    /// Tokenize and convert to postfix in one step.
    pub fn postfix(&self, expr: &str) -> Result<Vec<Token>, CalcError> {
        let tokens = self.tokenize(expr)?;
        self.to_postfix(&tokens)
    }

    /// Evaluate `expr` directly, honouring precedence and parentheses.
    ///
    /// Fails when parentheses nest deeper than [`MAX_NESTING`] or when any
    /// intermediate value leaves the finite `f64` range.
    pub fn evaluate(&self, expr: &str) -> Result<f64, CalcError> {
        let tokens = self.tokenize(expr)?;
        eval::Parser::new(&tokens).parse()
    }
}
