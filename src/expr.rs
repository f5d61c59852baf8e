//! Restricted arithmetic evaluator for learner-submitted expressions.
//!
//! Input is normalized (whitespace removed, lowercased) and then parsed
//! directly; nothing is ever handed to a general-purpose interpreter.
//!
//! Grammar:
//!   expr   := term (('+' | '-') term)*
//!   term   := unary (('*' | '/') unary)*
//!   unary  := ('+' | '-') unary | atom
//!   atom   := NUMBER | 'x' | '(' expr ')'
//!
//! A digit or `)` immediately followed by the unknown is an implicit
//! multiplication: `2x` is `2*x`, `(3+1)x` is `(3+1)*x`.

use crate::error::EvalError;
use crate::util::normalize;

/// The single unknown symbol accepted in expressions.
pub const UNKNOWN: char = 'x';

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
  Num(f64),
  Plus,
  Minus,
  Star,
  Slash,
  LParen,
  RParen,
}

/// Evaluate `expr` with the unknown bound to `x`.
pub fn evaluate(expr: &str, x: f64) -> Result<f64, EvalError> {
  let tokens = tokenize(&normalize(expr), x)?;
  let mut parser = Parser { tokens: &tokens, pos: 0, depth: 0 };
  let value = parser.expr()?;
  if let Some(tok) = parser.peek() {
    return Err(match tok {
      Token::RParen => EvalError::UnbalancedParens,
      _ => EvalError::UnexpectedToken(parser.pos),
    });
  }
  if !value.is_finite() {
    return Err(EvalError::NonFinite);
  }
  Ok(value)
}

/// Lex the normalized input, substituting the unknown by its value.
fn tokenize(src: &str, x: f64) -> Result<Vec<Token>, EvalError> {
  let mut out = Vec::new();
  let mut chars = src.chars().peekable();

  while let Some(ch) = chars.next() {
    match ch {
      '0'..='9' | '.' => {
        let mut buf = String::from(ch);
        while let Some(&next @ ('0'..='9' | '.')) = chars.peek() {
          buf.push(next);
          chars.next();
        }
        let v: f64 = buf.parse().map_err(|_| EvalError::InvalidNumber(buf.clone()))?;
        out.push(Token::Num(v));
        if chars.peek() == Some(&UNKNOWN) {
          out.push(Token::Star);
        }
      }
      ')' => {
        out.push(Token::RParen);
        if chars.peek() == Some(&UNKNOWN) {
          out.push(Token::Star);
        }
      }
      c if c == UNKNOWN => out.push(Token::Num(x)),
      '+' => out.push(Token::Plus),
      '-' => out.push(Token::Minus),
      '*' => out.push(Token::Star),
      '/' => out.push(Token::Slash),
      '(' => out.push(Token::LParen),
      other => return Err(EvalError::InvalidCharacter(other)),
    }
  }
  Ok(out)
}

struct Parser<'a> {
  tokens: &'a [Token],
  pos: usize,
  depth: usize,
}

impl<'a> Parser<'a> {
  fn peek(&self) -> Option<Token> {
    self.tokens.get(self.pos).copied()
  }

  fn bump(&mut self) -> Option<Token> {
    let tok = self.peek();
    if tok.is_some() {
      self.pos += 1;
    }
    tok
  }

  fn expr(&mut self) -> Result<f64, EvalError> {
    let mut acc = self.term()?;
    loop {
      match self.peek() {
        Some(Token::Plus) => {
          self.pos += 1;
          acc += self.term()?;
        }
        Some(Token::Minus) => {
          self.pos += 1;
          acc -= self.term()?;
        }
        _ => return Ok(acc),
      }
    }
  }

  fn term(&mut self) -> Result<f64, EvalError> {
    let mut acc = self.unary()?;
    loop {
      match self.peek() {
        Some(Token::Star) => {
          self.pos += 1;
          acc *= self.unary()?;
        }
        Some(Token::Slash) => {
          self.pos += 1;
          let divisor = self.unary()?;
          if divisor == 0.0 {
            return Err(EvalError::DivisionByZero);
          }
          acc /= divisor;
        }
        _ => return Ok(acc),
      }
    }
  }

  fn unary(&mut self) -> Result<f64, EvalError> {
    match self.peek() {
      Some(Token::Plus) => {
        self.pos += 1;
        self.nested(|p| p.unary())
      }
      Some(Token::Minus) => {
        self.pos += 1;
        self.nested(|p| p.unary()).map(|v| -v)
      }
      _ => self.atom(),
    }
  }

  fn atom(&mut self) -> Result<f64, EvalError> {
    let at = self.pos;
    match self.bump() {
      Some(Token::Num(v)) => Ok(v),
      Some(Token::LParen) => {
        let inner = self.nested(|p| p.expr())?;
        match self.bump() {
          Some(Token::RParen) => Ok(inner),
          None => Err(EvalError::UnbalancedParens),
          Some(_) => Err(EvalError::UnexpectedToken(self.pos - 1)),
        }
      }
      Some(Token::RParen) => Err(EvalError::UnbalancedParens),
      Some(_) => Err(EvalError::UnexpectedToken(at)),
      None => Err(EvalError::UnexpectedEnd),
    }
  }

  /// Run a recursive production with a bounded nesting depth.
  fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<f64, EvalError>) -> Result<f64, EvalError> {
    if self.depth >= MAX_DEPTH {
      return Err(EvalError::TooDeep);
    }
    self.depth += 1;
    let out = f(self);
    self.depth -= 1;
    out
  }
}
