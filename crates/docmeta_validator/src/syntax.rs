//! Schema expression syntax.
//!
//! Schema leaves are short call expressions such as
//! `str(required=False, upper_start=True)`, `include('example')` or
//! `map(list(str()), key=service_name())`.
//!
//! ```text
//! expr    := call | literal | '[' [expr (',' expr)*] ']'
//! call    := IDENT '(' [arg (',' arg)*] [','] ')'
//! arg     := IDENT '=' expr | IDENT | expr
//! literal := STRING | NUMBER | True | False | None
//! ```
//!
//! A bare identifier argument is shorthand for `IDENT=True`, so
//! `str(required, upper_start)` reads the same as
//! `str(required=True, upper_start=True)`.

use crate::{SyntaxError, SyntaxResult, Validator, ValidatorRegistry};
use docmeta_core::DataValue;

/// An evaluated call argument.
#[derive(Debug, Clone)]
pub enum Arg {
    /// Literal value
    Value(DataValue),
    /// Nested validator call
    Validator(Validator),
}

impl Arg {
    /// Returns the literal value, if this is one.
    pub fn as_value(&self) -> Option<&DataValue> {
        match self {
            Arg::Value(v) => Some(v),
            Arg::Validator(_) => None,
        }
    }

    /// Returns the validator, if this is one.
    pub fn as_validator(&self) -> Option<&Validator> {
        match self {
            Arg::Validator(v) => Some(v),
            Arg::Value(_) => None,
        }
    }
}

/// Positional and keyword arguments of a validator call.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Positional arguments in call order
    pub positional: Vec<Arg>,
    /// Keyword arguments in call order
    pub keywords: Vec<(String, Arg)>,
}

impl Args {
    /// Creates empty arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a positional argument.
    pub fn arg(mut self, arg: Arg) -> Self {
        self.positional.push(arg);
        self
    }

    /// Adds a keyword argument.
    pub fn kwarg(mut self, key: impl Into<String>, arg: Arg) -> Self {
        self.keywords.push((key.into(), arg));
        self
    }

    /// Looks up a keyword argument. The last occurrence wins.
    pub fn keyword(&self, key: &str) -> Option<&Arg> {
        self.keywords
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Reads a boolean keyword, falling back to `default` when absent.
    pub fn flag(&self, key: &str, default: bool) -> SyntaxResult<bool> {
        match self.keyword(key) {
            None => Ok(default),
            Some(Arg::Value(DataValue::Bool(b))) => Ok(*b),
            Some(Arg::Value(DataValue::Int(i))) => Ok(*i != 0),
            Some(_) => Err(SyntaxError::new(format!("{} is not a bool", key))),
        }
    }

    /// Positional arguments that must all be validators.
    pub fn validators(&self, tag: &str) -> SyntaxResult<Vec<Validator>> {
        self.positional
            .iter()
            .map(|arg| {
                arg.as_validator().cloned().ok_or_else(|| {
                    SyntaxError::new(format!("{} arguments must be validators", tag))
                })
            })
            .collect()
    }

    /// Positional arguments that must all be literal values.
    pub fn values(&self, tag: &str) -> SyntaxResult<Vec<DataValue>> {
        self.positional
            .iter()
            .map(|arg| {
                arg.as_value()
                    .cloned()
                    .ok_or_else(|| SyntaxError::new(format!("{} arguments must be values", tag)))
            })
            .collect()
    }
}

/// Parse `expression` into a validator using the validators in `registry`.
///
/// ```rust
/// use docmeta_validator::{parse, ValidatorRegistry};
///
/// let registry = ValidatorRegistry::builtin();
/// let validator = parse("str(required=False, min=3)", &registry).unwrap();
///
/// assert!(validator.is_optional);
/// assert_eq!(validator.tag, "str");
/// ```
pub fn parse(expression: &str, registry: &ValidatorRegistry) -> SyntaxResult<Validator> {
    let invalid = |detail: String| {
        SyntaxError::new(format!(
            "Invalid schema expression: '{}'. {}",
            expression, detail
        ))
    };

    let tokens = tokenize(expression).map_err(&invalid)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr().map_err(&invalid)?;
    if parser.pos != parser.tokens.len() {
        return Err(invalid("Unexpected trailing input".to_string()));
    }

    match evaluate(expr, registry).map_err(|e| invalid(e.message))? {
        Arg::Validator(validator) => Ok(validator),
        Arg::Value(_) => Err(invalid("Expression must be a validator call".to_string())),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Equals,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Equals);
                i += 1;
            }
            '\'' | '"' => {
                let quote = c;
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err("Unterminated string literal".to_string()),
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = chars
                                .get(i + 1)
                                .ok_or_else(|| "Unterminated string literal".to_string())?;
                            match escaped {
                                'n' => text.push('\n'),
                                't' => text.push('\t'),
                                '\\' | '\'' | '"' => text.push(*escaped),
                                other => {
                                    // Unknown escapes are kept, so regex classes like \d survive.
                                    text.push('\\');
                                    text.push(*other);
                                }
                            }
                            i += 2;
                        }
                        Some(&ch) => {
                            text.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let start = i;
                i += 1;
                while i < chars.len()
                    && (chars[i].is_ascii_digit() || matches!(chars[i], '.' | 'e' | 'E' | '_'))
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().filter(|c| **c != '_').collect();
                if let Ok(int) = text.parse::<i64>() {
                    tokens.push(Token::Int(int));
                } else if let Ok(float) = text.parse::<f64>() {
                    tokens.push(Token::Float(float));
                } else {
                    return Err(format!("Invalid number '{}'", text));
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("Unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone)]
enum Expr {
    Call {
        name: String,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    Literal(DataValue),
    List(Vec<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(format!("Expected {:?}, found {:?}", expected, token)),
            None => Err(format!("Expected {:?}, found end of input", expected)),
        }
    }

    fn expr(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Ident(name)) => match self.peek() {
                Some(Token::LParen) => self.call(name),
                _ => literal_ident(&name)
                    .map(Expr::Literal)
                    .ok_or_else(|| format!("Unknown name '{}'", name)),
            },
            Some(Token::Str(s)) => Ok(Expr::Literal(DataValue::String(s))),
            Some(Token::Int(i)) => Ok(Expr::Literal(DataValue::Int(i))),
            Some(Token::Float(f)) => Ok(Expr::Literal(DataValue::Float(f))),
            Some(Token::LBracket) => {
                let mut items = Vec::new();
                while self.peek() != Some(&Token::RBracket) {
                    items.push(self.expr()?);
                    if self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                self.expect(Token::RBracket)?;
                Ok(Expr::List(items))
            }
            Some(token) => Err(format!("Unexpected token {:?}", token)),
            None => Err("Empty expression".to_string()),
        }
    }

    fn call(&mut self, name: String) -> Result<Expr, String> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        let mut kwargs = Vec::new();

        while self.peek() != Some(&Token::RParen) {
            let keyword = match (self.peek(), self.peek_at(1)) {
                (Some(Token::Ident(key)), Some(Token::Equals)) => Some(key.clone()),
                _ => None,
            };

            if let Some(key) = keyword {
                self.pos += 2;
                kwargs.push((key, self.expr()?));
            } else if let (Some(Token::Ident(flag)), Some(Token::Comma | Token::RParen)) =
                (self.peek(), self.peek_at(1))
            {
                let flag = flag.clone();
                self.pos += 1;
                match literal_ident(&flag) {
                    Some(value) => args.push(Expr::Literal(value)),
                    None => kwargs.push((flag, Expr::Literal(DataValue::Bool(true)))),
                }
            } else {
                if !kwargs.is_empty() {
                    return Err("Positional argument follows keyword argument".to_string());
                }
                args.push(self.expr()?);
            }

            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
            } else {
                break;
            }
        }

        self.expect(Token::RParen)?;
        Ok(Expr::Call { name, args, kwargs })
    }
}

fn literal_ident(name: &str) -> Option<DataValue> {
    match name {
        "True" | "true" => Some(DataValue::Bool(true)),
        "False" | "false" => Some(DataValue::Bool(false)),
        "None" | "null" => Some(DataValue::Null),
        _ => None,
    }
}

fn evaluate(expr: Expr, registry: &ValidatorRegistry) -> SyntaxResult<Arg> {
    match expr {
        Expr::Literal(value) => Ok(Arg::Value(value)),
        Expr::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match evaluate(item, registry)? {
                    Arg::Value(value) => values.push(value),
                    Arg::Validator(_) => {
                        return Err(SyntaxError::new("List literals may only hold values"));
                    }
                }
            }
            Ok(Arg::Value(DataValue::List(values)))
        }
        Expr::Call { name, args, kwargs } => {
            let mut call = Args::new();
            for arg in args {
                call.positional.push(evaluate(arg, registry)?);
            }
            for (key, value) in kwargs {
                call.keywords.push((key, evaluate(value, registry)?));
            }
            registry.build(&name, call).map(Arg::Validator)
        }
    }
}
