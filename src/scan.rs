//! Check-constraint condition scanner.
//!
//! Parses the boolean-expression subset that appears in check constraints
//! and reports which columns a condition references. The grammar covers
//! comparisons, `IN`, `LIKE`, `BETWEEN`, `IS [NOT] NULL`, `AND`/`OR`/`NOT`,
//! parentheses, and function calls. Anything outside that subset is a
//! [`MetaError::Parse`] carrying the offending input, never a guess.

use std::collections::BTreeSet;

use crate::error::{MetaError, Result};

/// Parsed condition node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column reference. Qualified names keep only the column segment.
    Column(String),
    Literal(Literal),
    Function { name: String, args: Vec<Expr> },
    Not(Box<Expr>),
    IsNull { operand: Box<Expr>, negated: bool },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    In { operand: Box<Expr>, items: Vec<Expr>, negated: bool },
    Like { operand: Box<Expr>, pattern: Box<Expr>, negated: bool },
    Between { operand: Box<Expr>, low: Box<Expr>, high: Box<Expr>, negated: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(String),
    Text(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Concat,
}

impl Expr {
    /// Collect every referenced column into `out`.
    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Column(name) => {
                out.insert(name.clone());
            }
            Expr::Literal(_) => {}
            Expr::Function { args, .. } => {
                for arg in args {
                    arg.collect_columns(out);
                }
            }
            Expr::Not(inner) => inner.collect_columns(out),
            Expr::IsNull { operand, .. } => operand.collect_columns(out),
            Expr::Binary { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::In { operand, items, .. } => {
                operand.collect_columns(out);
                for item in items {
                    item.collect_columns(out);
                }
            }
            Expr::Like { operand, pattern, .. } => {
                operand.collect_columns(out);
                pattern.collect_columns(out);
            }
            Expr::Between { operand, low, high, .. } => {
                operand.collect_columns(out);
                low.collect_columns(out);
                high.collect_columns(out);
            }
        }
    }

    /// The set of column names this expression references, sorted.
    pub fn referenced_columns(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_columns(&mut out);
        out
    }
}

/// Parse a check condition into an expression tree.
pub fn parse_condition(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0, input };
    let expr = parser.or_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(MetaError::parse(
            format!("unexpected trailing token {:?}", parser.tokens[parser.pos]),
            input,
        ));
    }
    Ok(expr)
}

/// Parse a check condition and return the columns it references.
pub fn referenced_columns(condition: &str) -> Result<BTreeSet<String>> {
    Ok(parse_condition(condition)?.referenced_columns())
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Unquoted identifier or keyword, original case preserved.
    Ident(String),
    /// Quoted identifier, quotes stripped.
    QuotedIdent(String),
    Number(String),
    Str(String),
    Symbol(&'static str),
}

impl Token {
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Ident(word) if word.eq_ignore_ascii_case(keyword))
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '#' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(word));
            }
            c if c.is_ascii_digit() => {
                let mut number = String::new();
                let mut seen_dot = false;
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                        seen_dot |= c == '.';
                        number.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(number));
            }
            '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => {
                            // Doubled quote is an escaped quote inside the literal
                            if chars.peek() == Some(&'\'') {
                                text.push('\'');
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        Some(c) => text.push(c),
                        None => {
                            return Err(MetaError::parse("unterminated string literal", input))
                        }
                    }
                }
                tokens.push(Token::Str(text));
            }
            '"' | '`' | '[' => {
                let closing = match c {
                    '[' => ']',
                    other => other,
                };
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == closing => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(MetaError::parse("unterminated quoted identifier", input))
                        }
                    }
                }
                tokens.push(Token::QuotedIdent(name));
            }
            '<' => {
                chars.next();
                match chars.peek() {
                    Some('=') => {
                        chars.next();
                        tokens.push(Token::Symbol("<="));
                    }
                    Some('>') => {
                        chars.next();
                        tokens.push(Token::Symbol("<>"));
                    }
                    _ => tokens.push(Token::Symbol("<")),
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Symbol(">="));
                } else {
                    tokens.push(Token::Symbol(">"));
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Symbol("<>"));
                } else {
                    return Err(MetaError::parse("unexpected character '!'", input));
                }
            }
            '|' => {
                chars.next();
                if chars.peek() == Some(&'|') {
                    chars.next();
                    tokens.push(Token::Symbol("||"));
                } else {
                    return Err(MetaError::parse("unexpected character '|'", input));
                }
            }
            '=' | '(' | ')' | ',' | '+' | '-' | '*' | '/' | '.' => {
                chars.next();
                let symbol = match c {
                    '=' => "=",
                    '(' => "(",
                    ')' => ")",
                    ',' => ",",
                    '+' => "+",
                    '-' => "-",
                    '*' => "*",
                    '/' => "/",
                    _ => ".",
                };
                tokens.push(Token::Symbol(symbol));
            }
            other => {
                return Err(MetaError::parse(
                    format!("unexpected character {:?}", other),
                    input,
                ))
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    input: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if matches!(self.peek(), Some(Token::Symbol(s)) if *s == symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &'static str) -> Result<()> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected '{}'", symbol)))
        }
    }

    fn unexpected(&self, wanted: &str) -> MetaError {
        match self.peek() {
            Some(token) => {
                MetaError::parse(format!("{}, found {:?}", wanted, token), self.input)
            }
            None => MetaError::parse(format!("{} at end of input", wanted), self.input),
        }
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            let right = self.and_expr()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut left = self.not_expr()?;
        while self.eat_keyword("and") {
            let right = self.not_expr()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.eat_keyword("not") {
            return Ok(Expr::Not(Box::new(self.not_expr()?)));
        }
        self.predicate()
    }

    /// An arithmetic operand, optionally followed by one predicate suffix:
    /// comparison, `IS [NOT] NULL`, `[NOT] IN`, `[NOT] LIKE`, `[NOT] BETWEEN`.
    fn predicate(&mut self) -> Result<Expr> {
        let operand = self.additive()?;

        if self.eat_keyword("is") {
            let negated = self.eat_keyword("not");
            if !self.eat_keyword("null") {
                return Err(self.unexpected("expected NULL after IS"));
            }
            return Ok(Expr::IsNull {
                operand: Box::new(operand),
                negated,
            });
        }

        let negated = self.eat_keyword("not");
        if self.eat_keyword("in") {
            self.expect_symbol("(")?;
            let mut items = vec![self.additive()?];
            while self.eat_symbol(",") {
                items.push(self.additive()?);
            }
            self.expect_symbol(")")?;
            return Ok(Expr::In {
                operand: Box::new(operand),
                items,
                negated,
            });
        }
        if self.eat_keyword("like") {
            let pattern = self.additive()?;
            return Ok(Expr::Like {
                operand: Box::new(operand),
                pattern: Box::new(pattern),
                negated,
            });
        }
        if self.eat_keyword("between") {
            let low = self.additive()?;
            if !self.eat_keyword("and") {
                return Err(self.unexpected("expected AND in BETWEEN"));
            }
            let high = self.additive()?;
            return Ok(Expr::Between {
                operand: Box::new(operand),
                low: Box::new(low),
                high: Box::new(high),
                negated,
            });
        }
        if negated {
            return Err(self.unexpected("expected IN, LIKE or BETWEEN after NOT"));
        }

        let op = match self.peek() {
            Some(Token::Symbol("=")) => Some(BinaryOp::Eq),
            Some(Token::Symbol("<>")) => Some(BinaryOp::NotEq),
            Some(Token::Symbol("<")) => Some(BinaryOp::Lt),
            Some(Token::Symbol("<=")) => Some(BinaryOp::LtEq),
            Some(Token::Symbol(">")) => Some(BinaryOp::Gt),
            Some(Token::Symbol(">=")) => Some(BinaryOp::GtEq),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let right = self.additive()?;
            return Ok(Expr::Binary {
                op,
                left: Box::new(operand),
                right: Box::new(right),
            });
        }
        Ok(operand)
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Symbol("+")) => BinaryOp::Add,
                Some(Token::Symbol("-")) => BinaryOp::Sub,
                Some(Token::Symbol("||")) => BinaryOp::Concat,
                _ => break,
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.primary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Symbol("*")) => BinaryOp::Mul,
                Some(Token::Symbol("/")) => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.primary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Literal(Literal::Number(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Literal::Text(s))),
            Some(Token::Symbol("-")) => {
                // Negative numeric literal
                match self.next() {
                    Some(Token::Number(n)) => Ok(Expr::Literal(Literal::Number(format!("-{n}")))),
                    _ => Err(self.unexpected("expected number after '-'")),
                }
            }
            Some(Token::Symbol("(")) => {
                let inner = self.or_expr()?;
                self.expect_symbol(")")?;
                Ok(inner)
            }
            Some(Token::QuotedIdent(name)) => self.name_or_column(name),
            Some(Token::Ident(word)) => {
                const KEYWORDS: &[&str] = &["and", "or", "not", "in", "like", "between", "is"];
                if KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k)) {
                    return Err(MetaError::parse(
                        format!("keyword {:?} cannot start an operand", word),
                        self.input,
                    ));
                }
                if word.eq_ignore_ascii_case("null") {
                    return Ok(Expr::Literal(Literal::Null));
                }
                if word.eq_ignore_ascii_case("true") {
                    return Ok(Expr::Literal(Literal::Bool(true)));
                }
                if word.eq_ignore_ascii_case("false") {
                    return Ok(Expr::Literal(Literal::Bool(false)));
                }
                if self.eat_symbol("(") {
                    let mut args = Vec::new();
                    if !self.eat_symbol(")") {
                        args.push(self.additive()?);
                        while self.eat_symbol(",") {
                            args.push(self.additive()?);
                        }
                        self.expect_symbol(")")?;
                    }
                    return Ok(Expr::Function { name: word, args });
                }
                self.name_or_column(word)
            }
            Some(token) => Err(MetaError::parse(
                format!("unexpected token {:?}", token),
                self.input,
            )),
            None => Err(MetaError::parse("unexpected end of input", self.input)),
        }
    }

    /// A possibly qualified name; only the final segment counts as the column.
    fn name_or_column(&mut self, first: String) -> Result<Expr> {
        let mut column = first;
        while self.eat_symbol(".") {
            column = match self.next() {
                Some(Token::Ident(name)) | Some(Token::QuotedIdent(name)) => name,
                _ => return Err(self.unexpected("expected identifier after '.'")),
            };
        }
        Ok(Expr::Column(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(condition: &str) -> Vec<String> {
        referenced_columns(condition)
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(columns("col1 is null or col2 is not null"), ["col1", "col2"]);
    }

    #[test]
    fn test_nested_boolean_logic() {
        assert_eq!(
            columns("(col1 in ('X','Y') and col2 is not null) or (col1='Z' and col3 is not null)"),
            ["col1", "col2", "col3"]
        );
        assert_eq!(
            columns("(col1 = 1 and col2 in ('a', 'b', 'c')) or col3 between 1 and 10"),
            ["col1", "col2", "col3"]
        );
    }

    #[test]
    fn test_comparisons_and_arithmetic() {
        assert_eq!(columns("qty * price >= 100"), ["price", "qty"]);
        assert_eq!(columns("start_date <= end_date"), ["end_date", "start_date"]);
    }

    #[test]
    fn test_like_and_negation() {
        assert_eq!(columns("code like 'AB%'"), ["code"]);
        assert_eq!(columns("not (status in ('x'))"), ["status"]);
        assert_eq!(columns("name not like '%tmp%'"), ["name"]);
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(columns("length(trim(name)) > 0"), ["name"]);
        assert_eq!(columns("coalesce(a, b, 0) <> 1"), ["a", "b"]);
    }

    #[test]
    fn test_nested_parens_and_argument_lists() {
        assert_eq!(columns("f(a, (b + c) * 2) > 0"), ["a", "b", "c"]);
        assert_eq!(columns("((qty)) >= ((1))"), ["qty"]);
    }

    #[test]
    fn test_quoted_and_qualified_names() {
        assert_eq!(columns("\"Order Total\" > 0"), ["Order Total"]);
        assert_eq!(columns("[state] = 'CA'"), ["state"]);
        assert_eq!(columns("t.amount > 0"), ["amount"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(columns("a > 0 and a < 100"), ["a"]);
    }

    #[test]
    fn test_string_escape() {
        let expr = parse_condition("note <> 'it''s'").unwrap();
        assert_eq!(
            expr.referenced_columns().into_iter().collect::<Vec<_>>(),
            ["note"]
        );
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        assert!(parse_condition("col1 >").is_err());
        assert!(parse_condition("col1 is maybe null").is_err());
        assert!(parse_condition("in (1, 2)").is_err());
        assert!(parse_condition("col1 = 'unterminated").is_err());
        assert!(parse_condition("col1 = 1 extra junk ?").is_err());
    }

    #[test]
    fn test_parse_error_carries_input() {
        let err = parse_condition("a ? b").unwrap_err();
        match err {
            MetaError::Parse { input, .. } => assert_eq!(input, "a ? b"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
