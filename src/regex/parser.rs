use crate::error::SyntaxError;

/// A node of a parsed regular expression. The variant set is closed: every
/// consumer matches exhaustively, so a new node kind cannot be added without
/// updating all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexAst {
    /// A single literal symbol
    Char(char),
    /// The left expression followed by the right one
    Concat(Box<RegexAst>, Box<RegexAst>),
    /// Either the left or the right expression
    Union(Box<RegexAst>, Box<RegexAst>),
    /// Zero or more repetitions of the body
    Star(Box<RegexAst>),
}

struct Parser {
    input: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// atom = symbol | '(' expression ')'
    fn parse_atom(&mut self) -> Result<RegexAst, SyntaxError> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Err(SyntaxError::UnexpectedEnd { pos: self.pos });
        };

        if c == '(' {
            self.pos += 1;
            let expr = self.parse_expression()?;
            self.skip_whitespace();
            if self.peek() != Some(')') {
                return Err(SyntaxError::UnbalancedGroup { pos: self.pos });
            }
            self.pos += 1;
            return Ok(expr);
        }

        self.pos += 1;
        Ok(RegexAst::Char(c))
    }

    /// concatenation = (atom '*'*)+
    fn parse_concatenation(&mut self) -> Result<RegexAst, SyntaxError> {
        let mut parts: Vec<RegexAst> = Vec::new();

        loop {
            self.skip_whitespace();

            match self.peek() {
                None => break,
                Some('|') | Some('+') | Some(')') => break,
                Some(_) => {},
            }

            let mut atom = self.parse_atom()?;

            /* Postfix stars bind to the atom just parsed. */
            while self.peek() == Some('*') {
                self.pos += 1;
                atom = RegexAst::Star(Box::new(atom));
            }

            parts.push(atom);
        }

        let Some(first) = parts.first().cloned() else {
            return Err(SyntaxError::EmptyAlternative { pos: self.pos });
        };

        Ok(parts
            .into_iter()
            .skip(1)
            .fold(first, |left, right| {
                RegexAst::Concat(Box::new(left), Box::new(right))
            }))
    }

    /// expression = concatenation (('|' | '+') concatenation)*
    fn parse_expression(&mut self) -> Result<RegexAst, SyntaxError> {
        let mut result = self.parse_concatenation()?;

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('|') | Some('+') => {
                    self.pos += 1;
                    let right = self.parse_concatenation()?;
                    result = RegexAst::Union(Box::new(result), Box::new(right));
                },
                _ => return Ok(result),
            }
        }
    }
}

/// Parse a regular expression into an AST.
///
/// An optional `name=` prefix before the expression body is recognized and
/// discarded. Unbalanced grouping, a trailing unconsumed rest, an empty
/// alternative and a second `=` are syntax errors carrying the offending
/// position.
pub fn parse(input: &str) -> Result<RegexAst, SyntaxError> {
    let trimmed = input.trim();

    let body = match trimmed.split_once('=') {
        Some((_, rest)) => {
            if let Some(offset) = rest.find('=') {
                let consumed = trimmed.chars().count() - rest.chars().count();
                let pos = consumed + rest[..offset].chars().count();
                return Err(SyntaxError::UnexpectedChar { found: '=', pos });
            }
            rest
        },
        None => trimmed,
    };

    let mut parser = Parser::new(body);
    let ast = parser.parse_expression()?;

    parser.skip_whitespace();
    if parser.pos < parser.input.len() {
        return Err(SyntaxError::TrailingInput { pos: parser.pos });
    }

    Ok(ast)
}
