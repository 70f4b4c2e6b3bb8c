//! A reader for programs in a plain text syntax.

use std::rc::Rc;

use crate::{
    structures::{
        atom::{Atom, BasicAtom, ComparisonAtom, ComparisonOp, ExternalAtom, IntervalAtom},
        program::Program,
        rule::{BodyLiteral, Head, Rule},
        term::{ArithmeticOp, Term},
    },
    types::err::{self},
};

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Identifier(Rc<str>),
    Variable(Rc<str>),
    Anonymous,
    Integer(i64),
    String(Rc<str>),
    Not,

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    DotDot,
    If,
    WeakIf,
    At,
    Ampersand,

    Plus,
    Minus,
    Times,
    Div,
    Modulo,

    Comparison(ComparisonOp),
}

/// Splits `input` into tokens, each paired with the line it was found on.
fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, err::ParseError> {
    let mut tokens = Vec::default();
    let mut chars = input.chars().peekable();
    let mut line = 1;

    while let Some(c) = chars.next() {
        let token = match c {
            '\n' => {
                line += 1;
                continue;
            }
            c if c.is_whitespace() => continue,

            '%' => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        line += 1;
                        break;
                    }
                }
                continue;
            }

            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '@' => Token::At,
            '&' => Token::Ampersand,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Times,
            '/' => Token::Div,
            '\\' => Token::Modulo,

            '.' => match chars.peek() {
                Some('.') => {
                    chars.next();
                    Token::DotDot
                }
                _ => Token::Dot,
            },

            ':' => match chars.next() {
                Some('-') => Token::If,
                Some('~') => Token::WeakIf,
                _ => return Err(err::ParseError::Line(line)),
            },

            '=' => {
                if chars.peek() == Some(&'=') {
                    chars.next();
                }
                Token::Comparison(ComparisonOp::Eq)
            }

            '!' => match chars.next() {
                Some('=') => Token::Comparison(ComparisonOp::Ne),
                _ => return Err(err::ParseError::Line(line)),
            },

            '<' => match chars.peek() {
                Some('=') => {
                    chars.next();
                    Token::Comparison(ComparisonOp::Le)
                }
                Some('>') => {
                    chars.next();
                    Token::Comparison(ComparisonOp::Ne)
                }
                _ => Token::Comparison(ComparisonOp::Lt),
            },

            '>' => match chars.peek() {
                Some('=') => {
                    chars.next();
                    Token::Comparison(ComparisonOp::Ge)
                }
                _ => Token::Comparison(ComparisonOp::Gt),
            },

            '"' => {
                let mut string = String::default();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\n') => return Err(err::ParseError::Line(line)),
                        Some(c) => string.push(c),
                        None => return Err(err::ParseError::UnexpectedEnd),
                    }
                }
                Token::String(string.into())
            }

            c if c.is_ascii_digit() => {
                let mut digits = String::from(c);
                while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    digits.push(*d);
                    chars.next();
                }
                match digits.parse::<i64>() {
                    Ok(integer) => Token::Integer(integer),
                    Err(_) => return Err(err::ParseError::Line(line)),
                }
            }

            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(d) = chars.peek().filter(|d| d.is_alphanumeric() || **d == '_') {
                    word.push(*d);
                    chars.next();
                }
                match word.as_str() {
                    "_" => Token::Anonymous,
                    "not" => Token::Not,
                    _ if c.is_uppercase() || c == '_' => Token::Variable(word.into()),
                    _ => Token::Identifier(word.into()),
                }
            }

            unknown => return Err(err::ParseError::UnknownCharacter(line, unknown)),
        };
        tokens.push((token, line));
    }

    Ok(tokens)
}

/// Reads a program from `input`.
///
/// The syntax is that of normal rules, with constraints, comparisons, intervals, external atoms, and weak constraints.
///
/// ```rust
/// # use otter_asp::builder::parse_program;
/// let program = parse_program("
///   p(1..2).
///   q(X) :- p(X), not r(X), X > 1.
///   :~ q(X). [X@1, X]
/// ").unwrap();
///
/// assert_eq!(program.facts.len(), 0);
/// assert_eq!(program.rules.len(), 3);
/// ```
pub fn parse_program(input: &str) -> Result<Program, err::ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        fresh: 0,
        intervals: Vec::default(),
    };

    let mut program = Program::default();
    while parser.peek().is_some() {
        parser.statement(&mut program)?;
    }
    Ok(program)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    position: usize,

    /// A counter for fresh variables.
    fresh: usize,

    /// Intervals found in arguments of the current statement.
    intervals: Vec<IntervalAtom>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(token, _)| token)
    }

    fn line(&self) -> usize {
        match self.tokens.get(self.position) {
            Some((_, line)) => *line,
            None => self.tokens.last().map(|(_, line)| *line).unwrap_or(0),
        }
    }

    fn next(&mut self) -> Result<Token, err::ParseError> {
        match self.tokens.get(self.position) {
            Some((token, _)) => {
                self.position += 1;
                Ok(token.clone())
            }
            None => Err(err::ParseError::UnexpectedEnd),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), err::ParseError> {
        let line = self.line();
        match self.next()? {
            token if token == expected => Ok(()),
            _ => Err(err::ParseError::Line(line)),
        }
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek() == Some(&token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn fresh_variable(&mut self, prefix: &str) -> Term {
        let variable = Term::Variable(format!("_{prefix}{}", self.fresh).into());
        self.fresh += 1;
        variable
    }

    fn statement(&mut self, program: &mut Program) -> Result<(), err::ParseError> {
        self.intervals.clear();
        let line = self.line();

        match self.peek() {
            Some(Token::If) => {
                self.next()?;
                let mut body = self.body()?;
                self.expect(Token::Dot)?;
                self.push_intervals(&mut body);
                program.add_rule(Rule::constraint(body));
            }

            Some(Token::WeakIf) => {
                self.next()?;
                let mut body = self.body()?;
                self.expect(Token::Dot)?;
                if !self.eat(Token::LBracket) {
                    return Err(err::ParseError::MissingWeight(line));
                }
                let weight = self.term()?;
                let level = match self.eat(Token::At) {
                    true => self.term()?,
                    false => Term::Integer(0),
                };
                let mut terms = Vec::default();
                while self.eat(Token::Comma) {
                    terms.push(self.term()?);
                }
                self.expect(Token::RBracket)?;
                self.push_intervals(&mut body);
                program.add_rule(Rule::new(
                    Some(Head::Weak {
                        weight,
                        level,
                        terms,
                    }),
                    body,
                ));
            }

            _ => {
                let head = match self.literal_atom()? {
                    Atom::Basic(basic) => basic,
                    _ => return Err(err::ParseError::Line(line)),
                };
                let mut body = Vec::default();
                if self.eat(Token::If) {
                    body = self.body()?;
                }
                self.expect(Token::Dot)?;
                self.push_intervals(&mut body);

                if body.is_empty() && head.is_ground() {
                    program.add_fact(head);
                } else {
                    program.add_rule(Rule::basic(head, body));
                }
            }
        }
        Ok(())
    }

    /// Adds a literal for each interval found in the statement to `body`.
    fn push_intervals(&mut self, body: &mut Vec<BodyLiteral>) {
        for interval in self.intervals.drain(..) {
            body.push(BodyLiteral::positive(Atom::Interval(interval)));
        }
    }

    fn body(&mut self) -> Result<Vec<BodyLiteral>, err::ParseError> {
        let mut body = vec![self.body_literal()?];
        while self.eat(Token::Comma) {
            body.push(self.body_literal()?);
        }
        Ok(body)
    }

    fn body_literal(&mut self) -> Result<BodyLiteral, err::ParseError> {
        let negated = self.eat(Token::Not);
        let atom = self.literal_atom()?;
        Ok(BodyLiteral { atom, negated })
    }

    /// Reads a basic, external, or comparison atom.
    fn literal_atom(&mut self) -> Result<Atom, err::ParseError> {
        let line = self.line();

        if self.eat(Token::Ampersand) {
            return self.external();
        }

        let left = self.term()?;
        if let Some(Token::Comparison(op)) = self.peek().cloned() {
            self.next()?;
            let right = self.term()?;
            if self.eat(Token::DotDot) {
                if op != ComparisonOp::Eq {
                    return Err(err::ParseError::MisplacedInterval(line));
                }
                let upper = self.term()?;
                return Ok(Atom::Interval(IntervalAtom {
                    term: left,
                    lower: right,
                    upper,
                }));
            }
            return Ok(Atom::Comparison(ComparisonAtom { op, left, right }));
        }

        match left {
            Term::Constant(name) => Ok(Atom::Basic(BasicAtom::new(&name, Vec::default()))),
            Term::Function { name, args } => Ok(Atom::Basic(BasicAtom::new(&name, args))),
            _ => Err(err::ParseError::Line(line)),
        }
    }

    fn external(&mut self) -> Result<Atom, err::ParseError> {
        let line = self.line();
        let Token::Identifier(name) = self.next()? else {
            return Err(err::ParseError::Line(line));
        };

        let mut input = Vec::default();
        if self.eat(Token::LBracket) {
            input = self.terms_until(Token::RBracket)?;
        }
        let mut output = Vec::default();
        if self.eat(Token::LParen) {
            output = self.terms_until(Token::RParen)?;
        }
        Ok(Atom::External(ExternalAtom {
            name,
            input,
            output,
        }))
    }

    /// Reads a comma separated list of arguments, and the closing token.
    fn terms_until(&mut self, close: Token) -> Result<Vec<Term>, err::ParseError> {
        let mut terms = Vec::default();
        if self.eat(close.clone()) {
            return Ok(terms);
        }
        loop {
            terms.push(self.argument()?);
            if self.eat(Token::Comma) {
                continue;
            }
            self.expect(close)?;
            return Ok(terms);
        }
    }

    /// Reads an argument of an atom, replacing an interval by a fresh variable.
    fn argument(&mut self) -> Result<Term, err::ParseError> {
        let term = self.term()?;
        if self.eat(Token::DotDot) {
            let upper = self.term()?;
            let variable = self.fresh_variable("I");
            self.intervals.push(IntervalAtom {
                term: variable.clone(),
                lower: term,
                upper,
            });
            return Ok(variable);
        }
        Ok(term)
    }

    fn term(&mut self) -> Result<Term, err::ParseError> {
        let mut term = self.product()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithmeticOp::Plus,
                Some(Token::Minus) => ArithmeticOp::Minus,
                _ => return Ok(term),
            };
            self.next()?;
            let right = self.product()?;
            term = Term::arithmetic(op, term, right);
        }
    }

    fn product(&mut self) -> Result<Term, err::ParseError> {
        let mut term = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Times) => ArithmeticOp::Times,
                Some(Token::Div) => ArithmeticOp::Div,
                Some(Token::Modulo) => ArithmeticOp::Modulo,
                _ => return Ok(term),
            };
            self.next()?;
            let right = self.unary()?;
            term = Term::arithmetic(op, term, right);
        }
    }

    fn unary(&mut self) -> Result<Term, err::ParseError> {
        if self.eat(Token::Minus) {
            return match self.unary()? {
                Term::Integer(integer) => Ok(Term::Integer(-integer)),
                term => Ok(Term::arithmetic(ArithmeticOp::Minus, Term::Integer(0), term)),
            };
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Term, err::ParseError> {
        let line = self.line();
        match self.next()? {
            Token::Integer(integer) => Ok(Term::Integer(integer)),
            Token::String(string) => Ok(Term::String(string)),
            Token::Variable(name) => Ok(Term::Variable(name)),
            Token::Anonymous => Ok(self.fresh_variable("V")),

            Token::Identifier(name) => match self.eat(Token::LParen) {
                true => {
                    let args = self.terms_until(Token::RParen)?;
                    Ok(Term::Function { name, args })
                }
                false => Ok(Term::Constant(name)),
            },

            Token::LParen => {
                let term = self.term()?;
                self.expect(Token::RParen)?;
                Ok(term)
            }

            _ => Err(err::ParseError::Line(line)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_and_rules() {
        let program = parse_program(
            "
            b1. b2.
            b3 :- not nb3.
            h :- b1, b2, not b3.
            :- b1, b2.
            ",
        );
        let Ok(program) = program else {
            panic!("Failed to parse");
        };
        assert_eq!(program.facts.len(), 2);
        assert_eq!(program.rules.len(), 3);
        assert!(program.rules[2].is_constraint());
        assert_eq!(program.rules[0].to_string(), "b3 :- not nb3.");
    }

    #[test]
    fn intervals_become_literals() {
        let Ok(program) = parse_program("p(1..3).") else {
            panic!("Failed to parse");
        };
        assert!(program.facts.is_empty());
        assert_eq!(program.rules[0].to_string(), "p(_I0) :- _I0 = 1..3.");
    }

    #[test]
    fn comparisons_and_arithmetic() {
        let Ok(program) = parse_program("q(X) :- p(X, Y), X < Y + 1, Z = X * 2, r(Z).") else {
            panic!("Failed to parse");
        };
        assert_eq!(
            program.rules[0].to_string(),
            "q(X) :- p(X,Y), X < (Y+1), Z = (X*2), r(Z)."
        );
    }

    #[test]
    fn weak_constraints() {
        let Ok(program) = parse_program(":~ p(X). [X@2, X] :~ q. [1]") else {
            panic!("Failed to parse");
        };
        assert_eq!(program.rules.len(), 2);
        assert!(program.rules.iter().all(|rule| rule.is_weak()));
        assert_eq!(program.rules[0].to_string(), ":~ p(X). [X@2,X]");
        assert_eq!(program.rules[1].to_string(), ":~ q. [1@0]");
    }

    #[test]
    fn externals() {
        let Ok(program) = parse_program("q(Y) :- p(X), &succ[X](Y).") else {
            panic!("Failed to parse");
        };
        assert_eq!(program.rules[0].to_string(), "q(Y) :- p(X), &succ[X](Y).");
    }

    #[test]
    fn errors() {
        assert_eq!(parse_program("p :- q").err(), Some(err::ParseError::UnexpectedEnd));
        assert_eq!(parse_program("p.\nq :- .\n").err(), Some(err::ParseError::Line(2)));
        assert_eq!(
            parse_program(":~ p.").err(),
            Some(err::ParseError::MissingWeight(1))
        );
        assert_eq!(
            parse_program("p # q.").err(),
            Some(err::ParseError::UnknownCharacter(1, '#'))
        );
    }
}
