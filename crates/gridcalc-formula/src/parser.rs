//! Expression parser
//!
//! A recursive descent parser for substituted formula text with a closed
//! operator set and explicit precedence.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};

/// Deepest parenthesis/unary nesting accepted before giving up
const MAX_NESTING: usize = 256;

/// Most binary operators accepted in one expression
const MAX_OPERATORS: usize = 1024;

/// Parse expression text into an AST
///
/// A leading `=` is not expected here; callers strip it before substitution.
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse_expression;
///
/// let ast = parse_expression("1+2").unwrap();
/// let ast = parse_expression("(7 - 2) * 3 >= 15").unwrap();
/// let ast = parse_expression("\"a\" & \"b\" == \"ab\"").unwrap();
/// ```
pub fn parse_expression(text: &str) -> FormulaResult<Expr> {
    let mut parser = FormulaParser::new(text)?;
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if *parser.current_token() != Token::Eof {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    String(String),
    Boolean(bool),

    Identifier(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Ampersand,
    Bang,
    AndAnd,
    OrOr,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

/// Expression parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Option<Token>,
    nesting: usize,
    operators: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: None,
            nesting: 0,
            operators: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = Some(self.scan_token()?);
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        // Single-character tokens
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '%' => Some(Token::Percent),
            '^' => Some(Token::Caret),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        // One- or two-character operators
        match c {
            '&' => {
                self.advance();
                if self.peek_char() == Some('&') {
                    self.advance();
                    return Ok(Token::AndAnd);
                }
                return Ok(Token::Ampersand);
            }
            '|' => {
                self.advance();
                if self.peek_char() == Some('|') {
                    self.advance();
                    return Ok(Token::OrOr);
                }
                return Err(FormulaError::Parse("Unexpected '|'".into()));
            }
            '<' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    return Ok(Token::LessEqual);
                } else if self.peek_char() == Some('>') {
                    self.advance();
                    return Ok(Token::NotEqual);
                }
                return Ok(Token::LessThan);
            }
            '>' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    return Ok(Token::GreaterEqual);
                }
                return Ok(Token::GreaterThan);
            }
            '=' => {
                // `=`, `==` and `===` all mean loose equality
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                    }
                }
                return Ok(Token::Equal);
            }
            '!' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                    }
                    return Ok(Token::NotEqual);
                }
                return Ok(Token::Bang);
            }
            _ => {}
        }

        // String literal
        if c == '"' || c == '\'' {
            return self.scan_string(c);
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Identifier or boolean
        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            return Ok(self.scan_identifier());
        }

        Err(FormulaError::Parse(format!(
            "Unexpected character '{}' at position {}",
            c, self.pos
        )))
    }

    fn scan_string(&mut self, quote: char) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                None => {
                    return Err(FormulaError::Parse(format!(
                        "Unterminated string starting at position {}",
                        start
                    )))
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(Token::String(s));
                }
                Some('\\') => {
                    self.advance();
                    let escaped = self.peek_char().ok_or_else(|| {
                        FormulaError::Parse("Dangling escape at end of string".into())
                    })?;
                    s.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                    self.advance();
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part (only when digits follow)
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            let sign = self.peek_char_at(1).map_or(false, |c| c == '+' || c == '-');
            let digit_at = if sign { 2 } else { 1 };
            if self
                .peek_char_at(digit_at)
                .map_or(false, |c| c.is_ascii_digit())
            {
                for _ in 0..digit_at {
                    self.advance();
                }
                while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse()
            .map(Token::Number)
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", num_str)))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        if text.eq_ignore_ascii_case("true") {
            return Token::Boolean(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return Token::Boolean(false);
        }

        Token::Identifier(text.to_string())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    fn enter(&mut self) -> FormulaResult<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(FormulaError::Parse(format!(
                "Expression nested deeper than {} levels",
                MAX_NESTING
            )));
        }
        Ok(())
    }

    /// Build a binary node, counting it against the operator cap
    fn binary(&mut self, op: BinaryOperator, left: Expr, right: Expr) -> FormulaResult<Expr> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(FormulaError::Parse(format!(
                "Expression has more than {} operators",
                MAX_OPERATORS
            )));
        }
        Ok(Expr::binary(op, left, right))
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Logical or: ||
    // 2. Logical and: &&
    // 3. Comparison (single, non-chaining): = == != <> < <= > >=
    // 4. Concatenation: &
    // 5. Addition/Subtraction: +, -
    // 6. Multiplication/Division/Modulo: *, /, %
    // 7. Exponentiation: ^ (right associative)
    // 8. Unary: -, +, !
    // 9. Primary: literals, variables, parentheses

    fn parse_expression(&mut self) -> FormulaResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_and()?;

        while matches!(self.current_token(), Token::OrOr) {
            self.consume()?;
            let right = self.parse_and()?;
            left = self.binary(BinaryOperator::Or, left, right)?;
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_comparison()?;

        while matches!(self.current_token(), Token::AndAnd) {
            self.consume()?;
            let right = self.parse_comparison()?;
            left = self.binary(BinaryOperator::And, left, right)?;
        }

        Ok(left)
    }

    fn comparison_operator(&self) -> Option<BinaryOperator> {
        match self.current_token() {
            Token::Equal => Some(BinaryOperator::Equal),
            Token::NotEqual => Some(BinaryOperator::NotEqual),
            Token::LessThan => Some(BinaryOperator::LessThan),
            Token::LessEqual => Some(BinaryOperator::LessEqual),
            Token::GreaterThan => Some(BinaryOperator::GreaterThan),
            Token::GreaterEqual => Some(BinaryOperator::GreaterEqual),
            _ => None,
        }
    }

    fn parse_comparison(&mut self) -> FormulaResult<Expr> {
        let left = self.parse_concatenation()?;

        let op = match self.comparison_operator() {
            Some(op) => op,
            None => return Ok(left),
        };
        self.consume()?;
        let right = self.parse_concatenation()?;

        if self.comparison_operator().is_some() {
            return Err(FormulaError::Parse(
                "Chained comparisons are not supported".into(),
            ));
        }

        self.binary(op, left, right)
    }

    fn parse_concatenation(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_additive()?;

        while matches!(self.current_token(), Token::Ampersand) {
            self.consume()?;
            let right = self.parse_additive()?;
            left = self.binary(BinaryOperator::Concat, left, right)?;
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_exponent()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                Token::Percent => BinaryOperator::Modulo,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_exponent()?;
            left = self.binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> FormulaResult<Expr> {
        let base = self.parse_unary()?;

        if matches!(self.current_token(), Token::Caret) {
            self.consume()?;
            self.enter()?;
            let exponent = self.parse_exponent()?;
            self.nesting -= 1;
            return self.binary(BinaryOperator::Power, base, exponent);
        }

        Ok(base)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        let op = match self.current_token() {
            Token::Minus => Some(UnaryOperator::Negate),
            Token::Plus => Some(UnaryOperator::Plus),
            Token::Bang => Some(UnaryOperator::Not),
            _ => None,
        };

        match op {
            Some(op) => {
                self.consume()?;
                self.enter()?;
                let operand = self.parse_unary()?;
                self.nesting -= 1;
                Ok(Expr::unary(op, operand))
            }
            None => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.consume()? {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::String(s) => Ok(Expr::String(s)),
            Token::Boolean(b) => Ok(Expr::Boolean(b)),
            Token::Identifier(name) => Ok(Expr::Variable(name)),
            Token::LeftParen => {
                self.enter()?;
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                self.nesting -= 1;
                Ok(expr)
            }
            Token::Eof => Err(FormulaError::Parse("Unexpected end of expression".into())),
            token => Err(FormulaError::Parse(format!("Unexpected token {:?}", token))),
        }
    }
}
