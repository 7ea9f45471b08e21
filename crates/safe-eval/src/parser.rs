//! A `nom`-based parser for the Python-like template expression language.
//!
//! The grammar follows Python's expression grammar closely enough that every
//! construct a user might type is recognized and can be rejected by name.
//! Top-level statement forms are detected but not parsed any further.

use crate::error::ValidationError;
use crate::syntax::{
    Argument, BinOp, BoolOp, CmpOp, ComprehensionKind, Constant, Generator, Node, StatementKind,
    UnaryOp,
};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1, take_while_m_n},
    character::complete::{char, digit1, multispace0, one_of, satisfy},
    combinator::{map, not, opt, recognize, value, verify},
    error::{Error, ErrorKind},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};
use std::iter::Peekable;
use std::num::IntErrorKind;
use std::str::Chars;

/// Longest template source accepted, in bytes.
pub const MAX_SOURCE_LEN: usize = 1000;

/// Deepest combination of brackets and prefix operators accepted.
pub const MAX_NESTING: usize = 32;

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

const STATEMENT_KEYWORDS: &[&str] = &[
    "import", "from", "def", "class", "if", "for", "while", "with", "try", "del", "pass",
    "return", "raise", "global", "nonlocal", "assert", "break", "continue", "async", "elif",
    "else", "except", "finally",
];

// Prefix keywords bind like a unary operator; their operand ends at the next
// infix token.
const TIGHT_PREFIX_KEYWORDS: &[&str] = &["not", "await"];

// Prefix keywords whose operand runs to the end of the enclosing expression.
const LOOSE_PREFIX_KEYWORDS: &[&str] = &["lambda", "yield", "else"];

const INFIX_KEYWORDS: &[&str] = &["and", "or", "in", "is", "if", "not"];

// --- Main Public Parser ---

/// Parses a template source string into a raw syntax tree.
pub fn parse(source: &str) -> Result<Node, ValidationError> {
    let lead = source.len() - source.trim_start().len();
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(syntax_error(lead, "empty expression"));
    }
    if trimmed.len() > MAX_SOURCE_LEN {
        return Err(syntax_error(
            lead,
            format!("expression is longer than {} bytes", MAX_SOURCE_LEN),
        ));
    }
    if let Err(offset) = check_nesting(trimmed) {
        return Err(syntax_error(
            lead + offset,
            format!("expression is nested more than {} levels deep", MAX_NESTING),
        ));
    }

    match statement(trimmed) {
        Ok(("", node)) => Ok(node),
        Ok((rest, _)) => {
            let consumed = &trimmed[..trimmed.len() - rest.len()];
            let on_new_line = consumed
                .trim_end_matches([' ', '\t'])
                .ends_with(['\n', '\r']);
            if rest.starts_with(';') || on_new_line {
                Ok(Node::Statement(StatementKind::Suite))
            } else {
                Err(syntax_error(
                    lead + consumed.len(),
                    format!("unexpected '{}'", snippet(rest)),
                ))
            }
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = trimmed.len() - e.input.len();
            let message = match e.code {
                ErrorKind::TooLarge => "integer literal is too large".to_string(),
                ErrorKind::Eof => "unterminated string literal".to_string(),
                _ if e.input.is_empty() => "unexpected end of expression".to_string(),
                _ => format!("unexpected '{}'", snippet(e.input)),
            };
            Err(syntax_error(lead + offset, message))
        }
        Err(nom::Err::Incomplete(_)) => Err(syntax_error(
            lead + trimmed.len(),
            "unexpected end of expression",
        )),
    }
}

fn syntax_error(offset: usize, message: impl Into<String>) -> ValidationError {
    ValidationError::Syntax {
        offset,
        message: message.into(),
    }
}

fn snippet(input: &str) -> String {
    let mut s: String = input.chars().take(12).collect();
    if input.chars().nth(12).is_some() {
        s.push_str("...");
    }
    s
}

/// Prefix operators still waiting for their operand at one bracket level.
#[derive(Debug, Default)]
struct PendingPrefixes {
    tight: usize,
    loose: usize,
}

/// Running recursion depth of the pre-scan.
#[derive(Debug)]
struct NestingDepth {
    levels: Vec<PendingPrefixes>,
    depth: usize,
}

impl NestingDepth {
    fn new() -> Self {
        Self {
            levels: vec![PendingPrefixes::default()],
            depth: 0,
        }
    }

    fn open_bracket(&mut self) {
        self.levels.push(PendingPrefixes::default());
        self.depth += 1;
    }

    /// Releases the bracket and everything still pending inside it.
    fn close_bracket(&mut self) {
        if self.levels.len() > 1 {
            if let Some(level) = self.levels.pop() {
                self.depth -= level.tight + level.loose + 1;
            }
        }
    }

    fn open_prefix(&mut self, loose: bool) {
        if let Some(level) = self.levels.last_mut() {
            if loose {
                level.loose += 1;
            } else {
                level.tight += 1;
            }
            self.depth += 1;
        }
    }

    fn release(&mut self, loose: bool) {
        if let Some(level) = self.levels.last_mut() {
            self.depth -= level.tight;
            level.tight = 0;
            if loose {
                self.depth -= level.loose;
                level.loose = 0;
            }
        }
    }
}

/// Bounds recursion before the parser runs. Every open bracket adds a level
/// until it is closed. A prefix operator adds a level until its operand is
/// complete: unary operators, `not` and `await` at the next infix token,
/// `lambda`, `yield` and `else` at the next `,`, `;` or `for`. Returns the
/// offending offset.
fn check_nesting(source: &str) -> Result<(), usize> {
    let mut nesting = NestingDepth::new();
    let mut expect_operand = true;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = source.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                expect_operand = false;
            }
            '(' | '[' | '{' => {
                nesting.open_bracket();
                expect_operand = true;
            }
            ')' | ']' | '}' => {
                nesting.close_bracket();
                expect_operand = false;
            }
            '-' | '+' | '~' if expect_operand => nesting.open_prefix(false),
            ',' | ';' => {
                nesting.release(true);
                expect_operand = true;
            }
            c if is_ident_start(c) => {
                let mut end = offset + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !is_ident_continue(next) {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let word = &source[offset..end];
                if expect_operand && TIGHT_PREFIX_KEYWORDS.contains(&word) {
                    nesting.open_prefix(false);
                } else if LOOSE_PREFIX_KEYWORDS.contains(&word) {
                    nesting.release(false);
                    nesting.open_prefix(true);
                    expect_operand = true;
                } else if word == "for" {
                    nesting.release(true);
                    expect_operand = true;
                } else if INFIX_KEYWORDS.contains(&word) {
                    nesting.release(false);
                    expect_operand = true;
                } else {
                    expect_operand = false;
                }
            }
            c if c.is_whitespace() => {}
            c if "*/%<>=!&|^:@.+-".contains(c) => {
                nesting.release(false);
                expect_operand = true;
            }
            _ => expect_operand = false,
        }
        if nesting.depth > MAX_NESTING {
            return Err(offset);
        }
    }
    Ok(())
}

// --- Combinators & Helpers ---

/// A combinator that takes a parser `inner` and produces a parser that consumes surrounding whitespace.
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn keyword<'a>(kw: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = Error<&'a str>> {
    terminated(tag(kw), not(satisfy(is_ident_continue)))
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_ident_start), take_while(is_ident_continue))).parse(input)
}

fn identifier(input: &str) -> IResult<&str, String> {
    map(verify(word, |w: &str| !KEYWORDS.contains(&w)), str::to_string).parse(input)
}

fn single_or_tuple(mut items: Vec<Node>) -> Node {
    if items.len() == 1 {
        if let Some(node) = items.pop() {
            return node;
        }
    }
    Node::Tuple(items)
}

fn build_binary_expr_parser<'a, F, G>(
    sub_expr_parser: F,
    op_parser: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, Node>
where
    F: Parser<&'a str, Output = Node, Error = Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = BinOp, Error = Error<&'a str>> + Clone,
{
    move |input: &'a str| {
        let (input, mut left) = sub_expr_parser.clone().parse(input)?;
        let (input, remainder) =
            many0(pair(ws(op_parser.clone()), sub_expr_parser.clone())).parse(input)?;

        for (op, right) in remainder {
            left = Node::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok((input, left))
    }
}

// --- Statements ---

fn statement(input: &str) -> IResult<&str, Node> {
    alt((keyword_statement, expression_statement)).parse(input)
}

/// A statement introduced by a reserved word. The rest of the input is not parsed.
fn keyword_statement(input: &str) -> IResult<&str, Node> {
    let (_, w) = word(input)?;
    let kind = match STATEMENT_KEYWORDS.iter().copied().find(|kw| *kw == w) {
        Some("import") => StatementKind::Import,
        Some("from") => StatementKind::ImportFrom,
        Some(kw) => StatementKind::Keyword(kw),
        None => return Err(nom::Err::Error(Error::new(input, ErrorKind::Tag))),
    };
    Ok(("", Node::Statement(kind)))
}

/// An expression, or the target of an assignment whose value is left unparsed.
fn expression_statement(input: &str) -> IResult<&str, Node> {
    let (rest, node) = expression_list(input)?;
    match opt(ws(assignment_op)).parse(rest)? {
        (_, Some(kind)) => Ok(("", Node::Statement(kind))),
        (_, None) => Ok((rest, node)),
    }
}

fn assignment_op(input: &str) -> IResult<&str, StatementKind> {
    alt((
        value(
            StatementKind::AugAssign,
            alt((
                tag("+="),
                tag("-="),
                tag("*="),
                tag("/="),
                tag("//="),
                tag("%="),
                tag("**="),
                tag("@="),
                tag("&="),
                tag("|="),
                tag("^="),
                tag(">>="),
                tag("<<="),
            )),
        ),
        value(StatementKind::Assign, terminated(char('='), not(char('=')))),
        value(StatementKind::AnnAssign, terminated(char(':'), not(char('=')))),
    ))
    .parse(input)
}

// --- Expression Parsers (in order of precedence) ---

fn expression_list(input: &str) -> IResult<&str, Node> {
    let (input, first) = star_or_named(input)?;
    let (input, (items, trailing)) = remaining_elements(input, first)?;
    Ok((input, tuple_unless_single(items, trailing)))
}

/// The elements following an already parsed `first` element, and whether a
/// trailing comma closed the list.
fn remaining_elements(input: &str, first: Node) -> IResult<&str, (Vec<Node>, bool)> {
    let (input, rest) = many0(preceded(ws(char(',')), star_or_named)).parse(input)?;
    let (input, trailing) = opt(ws(char(','))).parse(input)?;
    let mut items = vec![first];
    items.extend(rest);
    Ok((input, (items, trailing.is_some())))
}

fn tuple_unless_single(items: Vec<Node>, trailing: bool) -> Node {
    if trailing {
        Node::Tuple(items)
    } else {
        single_or_tuple(items)
    }
}

fn star_or_named(input: &str) -> IResult<&str, Node> {
    alt((
        map(
            preceded(ws(terminated(char('*'), not(char('*')))), bitor_expr),
            |node| Node::Starred(Box::new(node)),
        ),
        named_expression,
    ))
    .parse(input)
}

fn named_expression(input: &str) -> IResult<&str, Node> {
    alt((
        map(
            pair(ws(identifier), preceded(ws(tag(":=")), expression)),
            |(target, value)| Node::NamedExpr {
                target,
                value: Box::new(value),
            },
        ),
        expression,
    ))
    .parse(input)
}

fn expression(input: &str) -> IResult<&str, Node> {
    ws(alt((lambda_expr, yield_expr, conditional_expr))).parse(input)
}

fn lambda_expr(input: &str) -> IResult<&str, Node> {
    let (input, _) = keyword("lambda").parse(input)?;
    let (input, raw_params) = take_until(":").parse(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, body) = expression(input)?;
    let params = raw_params
        .split(',')
        .filter_map(|p| p.split('=').next())
        .map(|p| p.trim().trim_start_matches('*').trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    Ok((
        input,
        Node::Lambda {
            params,
            body: Box::new(body),
        },
    ))
}

fn yield_expr(input: &str) -> IResult<&str, Node> {
    let (input, _) = keyword("yield").parse(input)?;
    let (input, value) = opt(alt((
        preceded(ws(keyword("from")), expression),
        expression_list,
    )))
    .parse(input)?;
    Ok((input, Node::Yield(value.map(Box::new))))
}

fn conditional_expr(input: &str) -> IResult<&str, Node> {
    let (input, body) = or_test(input)?;
    let (input, branch) = opt(pair(
        preceded(ws(keyword("if")), or_test),
        preceded(ws(keyword("else")), expression),
    ))
    .parse(input)?;
    let node = match branch {
        Some((test, orelse)) => Node::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        },
        None => body,
    };
    Ok((input, node))
}

fn bool_chain<'a>(
    input: &'a str,
    operand: fn(&'a str) -> IResult<&'a str, Node>,
    kw: &'static str,
    op: BoolOp,
) -> IResult<&'a str, Node> {
    let (input, first) = operand(input)?;
    let (input, rest) = many0(preceded(ws(keyword(kw)), operand)).parse(input)?;
    if rest.is_empty() {
        return Ok((input, first));
    }
    let mut values = vec![first];
    values.extend(rest);
    Ok((input, Node::BoolOp { op, values }))
}

fn or_test(input: &str) -> IResult<&str, Node> {
    bool_chain(input, and_test, "or", BoolOp::Or)
}

fn and_test(input: &str) -> IResult<&str, Node> {
    bool_chain(input, not_test, "and", BoolOp::And)
}

fn not_test(input: &str) -> IResult<&str, Node> {
    alt((
        map(preceded(ws(keyword("not")), not_test), |operand| {
            Node::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            }
        }),
        comparison,
    ))
    .parse(input)
}

fn comparison_op(input: &str) -> IResult<&str, CmpOp> {
    alt((
        value(CmpOp::Eq, tag("==")),
        value(CmpOp::NotEq, tag("!=")),
        value(CmpOp::LtE, tag("<=")),
        value(CmpOp::GtE, tag(">=")),
        value(CmpOp::Lt, terminated(char('<'), not(char('<')))),
        value(CmpOp::Gt, terminated(char('>'), not(char('>')))),
        value(CmpOp::NotIn, pair(keyword("not"), ws(keyword("in")))),
        value(CmpOp::IsNot, pair(keyword("is"), ws(keyword("not")))),
        value(CmpOp::Is, keyword("is")),
        value(CmpOp::In, keyword("in")),
    ))
    .parse(input)
}

fn comparison(input: &str) -> IResult<&str, Node> {
    let (input, left) = bitor_expr(input)?;
    let (input, pairs) = many0(pair(ws(comparison_op), bitor_expr)).parse(input)?;
    if pairs.is_empty() {
        return Ok((input, left));
    }
    let (ops, comparators) = pairs.into_iter().unzip();
    Ok((
        input,
        Node::Compare {
            left: Box::new(left),
            ops,
            comparators,
        },
    ))
}

fn bitor_op(input: &str) -> IResult<&str, BinOp> {
    value(BinOp::BitOr, char('|')).parse(input)
}

fn bitxor_op(input: &str) -> IResult<&str, BinOp> {
    value(BinOp::BitXor, char('^')).parse(input)
}

fn bitand_op(input: &str) -> IResult<&str, BinOp> {
    value(BinOp::BitAnd, char('&')).parse(input)
}

fn shift_op(input: &str) -> IResult<&str, BinOp> {
    alt((
        value(BinOp::LShift, tag("<<")),
        value(BinOp::RShift, tag(">>")),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinOp> {
    alt((value(BinOp::Add, char('+')), value(BinOp::Sub, char('-')))).parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinOp> {
    alt((
        value(BinOp::FloorDiv, tag("//")),
        value(BinOp::Div, char('/')),
        value(BinOp::Mul, terminated(char('*'), not(char('*')))),
        value(BinOp::Mod, char('%')),
        value(BinOp::MatMul, char('@')),
    ))
    .parse(input)
}

fn bitor_expr(input: &str) -> IResult<&str, Node> {
    build_binary_expr_parser(bitxor_expr, bitor_op)(input)
}

fn bitxor_expr(input: &str) -> IResult<&str, Node> {
    build_binary_expr_parser(bitand_expr, bitxor_op)(input)
}

fn bitand_expr(input: &str) -> IResult<&str, Node> {
    build_binary_expr_parser(shift_expr, bitand_op)(input)
}

fn shift_expr(input: &str) -> IResult<&str, Node> {
    build_binary_expr_parser(additive_expr, shift_op)(input)
}

fn additive_expr(input: &str) -> IResult<&str, Node> {
    build_binary_expr_parser(multiplicative_expr, additive_op)(input)
}

fn multiplicative_expr(input: &str) -> IResult<&str, Node> {
    build_binary_expr_parser(factor, multiplicative_op)(input)
}

fn unary_op(input: &str) -> IResult<&str, UnaryOp> {
    alt((
        value(UnaryOp::Neg, char('-')),
        value(UnaryOp::Pos, char('+')),
        value(UnaryOp::Invert, char('~')),
    ))
    .parse(input)
}

fn factor(input: &str) -> IResult<&str, Node> {
    alt((
        map(pair(ws(unary_op), factor), |(op, operand)| Node::UnaryOp {
            op,
            operand: Box::new(operand),
        }),
        power,
    ))
    .parse(input)
}

fn power(input: &str) -> IResult<&str, Node> {
    let (input, base) = await_primary(input)?;
    let (input, exponent) = opt(preceded(ws(tag("**")), factor)).parse(input)?;
    let node = match exponent {
        Some(exponent) => Node::BinOp {
            left: Box::new(base),
            op: BinOp::Pow,
            right: Box::new(exponent),
        },
        None => base,
    };
    Ok((input, node))
}

fn await_primary(input: &str) -> IResult<&str, Node> {
    alt((
        map(preceded(ws(keyword("await")), primary), |node| {
            Node::Await(Box::new(node))
        }),
        primary,
    ))
    .parse(input)
}

// --- Trailers: attribute access, calls and subscripts ---

enum Trailer {
    Attribute(String),
    Call(Vec<Argument>),
    Subscript(Node),
}

fn primary(input: &str) -> IResult<&str, Node> {
    let (input, atom) = atom(input)?;
    let (input, trailers) = many0(trailer).parse(input)?;
    let node = trailers
        .into_iter()
        .fold(atom, |node, trailer| match trailer {
            Trailer::Attribute(attr) => Node::Attribute {
                value: Box::new(node),
                attr,
            },
            Trailer::Call(args) => Node::Call {
                func: Box::new(node),
                args,
            },
            Trailer::Subscript(index) => Node::Subscript {
                value: Box::new(node),
                index: Box::new(index),
            },
        });
    Ok((input, node))
}

fn trailer(input: &str) -> IResult<&str, Trailer> {
    alt((
        map(preceded(ws(char('.')), identifier), Trailer::Attribute),
        map(
            delimited(ws(char('(')), call_arguments, ws(char(')'))),
            Trailer::Call,
        ),
        map(
            delimited(ws(char('[')), subscript_list, ws(char(']'))),
            Trailer::Subscript,
        ),
    ))
    .parse(input)
}

fn call_arguments(input: &str) -> IResult<&str, Vec<Argument>> {
    let (input, first) = opt(argument).parse(input)?;
    let Some(first) = first else {
        return Ok((input, Vec::new()));
    };
    // A lone generator expression needs no parentheses of its own.
    let (input, first) = match first {
        Argument::Positional(element) => match opt(comprehension_clauses).parse(input)? {
            (input, Some(generators)) => {
                let generator =
                    comprehension(ComprehensionKind::Generator, element, None, generators);
                return Ok((input, vec![Argument::Positional(generator)]));
            }
            (input, None) => (input, Argument::Positional(element)),
        },
        other => (input, other),
    };
    let (input, rest) = many0(preceded(ws(char(',')), argument)).parse(input)?;
    let (input, _) = opt(ws(char(','))).parse(input)?;
    let mut args = vec![first];
    args.extend(rest);
    Ok((input, args))
}

fn argument(input: &str) -> IResult<&str, Argument> {
    alt((
        map(preceded(ws(tag("**")), expression), Argument::DoubleStarred),
        map(preceded(ws(char('*')), expression), Argument::Starred),
        map(
            pair(
                ws(identifier),
                preceded(ws(terminated(char('='), not(char('=')))), expression),
            ),
            |(name, value)| Argument::Keyword { name, value },
        ),
        map(named_expression, Argument::Positional),
    ))
    .parse(input)
}

fn subscript_list(input: &str) -> IResult<&str, Node> {
    let (input, items) = separated_list1(ws(char(',')), subscript_item).parse(input)?;
    let (input, trailing) = opt(ws(char(','))).parse(input)?;
    Ok((input, tuple_unless_single(items, trailing.is_some())))
}

/// An index or a slice. The lower bound is parsed once; a following colon
/// decides which.
fn subscript_item(input: &str) -> IResult<&str, Node> {
    let (input, lower) = opt(star_or_named).parse(input)?;
    let (input, colon) = opt(ws(slice_colon)).parse(input)?;
    match (lower, colon) {
        (lower, Some(_)) => slice(input, lower),
        (Some(index), None) => Ok((input, index)),
        (None, None) => Err(nom::Err::Error(Error::new(input, ErrorKind::Alt))),
    }
}

fn slice_colon(input: &str) -> IResult<&str, char> {
    terminated(char(':'), not(char('='))).parse(input)
}

fn slice(input: &str, lower: Option<Node>) -> IResult<&str, Node> {
    let (input, upper) = opt(expression).parse(input)?;
    let (input, step) = opt(preceded(ws(slice_colon), opt(expression))).parse(input)?;
    Ok((
        input,
        Node::Slice {
            lower: lower.map(Box::new),
            upper: upper.map(Box::new),
            step: step.flatten().map(Box::new),
        },
    ))
}

// --- Comprehensions ---

fn comprehension(
    kind: ComprehensionKind,
    element: Node,
    value: Option<Node>,
    generators: Vec<Generator>,
) -> Node {
    Node::Comprehension {
        kind,
        element: Box::new(element),
        value: value.map(Box::new),
        generators,
    }
}

fn comprehension_clauses(input: &str) -> IResult<&str, Vec<Generator>> {
    many1(comprehension_for).parse(input)
}

fn comprehension_for(input: &str) -> IResult<&str, Generator> {
    let (input, _) = opt(ws(keyword("async"))).parse(input)?;
    let (input, _) = ws(keyword("for")).parse(input)?;
    let (input, targets) = separated_list1(ws(char(',')), bitor_expr).parse(input)?;
    let (input, _) = ws(keyword("in")).parse(input)?;
    let (input, iter) = or_test(input)?;
    let (input, conditions) = many0(preceded(ws(keyword("if")), or_test)).parse(input)?;
    Ok((
        input,
        Generator {
            target: single_or_tuple(targets),
            iter,
            conditions,
        },
    ))
}

// --- Atoms ---

fn atom(input: &str) -> IResult<&str, Node> {
    ws(alt((
        parenthesized,
        list_display,
        brace_display,
        strings,
        number,
        value(Node::Constant(Constant::Ellipsis), tag("...")),
        value(Node::Constant(Constant::Bool(true)), keyword("True")),
        value(Node::Constant(Constant::Bool(false)), keyword("False")),
        value(Node::Constant(Constant::None), keyword("None")),
        map(identifier, Node::Name),
    )))
    .parse(input)
}

fn parenthesized(input: &str) -> IResult<&str, Node> {
    let (input, _) = char('(').parse(input)?;
    let (input, _) = multispace0(input)?;
    let closed: IResult<&str, char> = char(')').parse(input);
    if let Ok((rest, _)) = closed {
        return Ok((rest, Node::Tuple(Vec::new())));
    }
    let (input, first) = star_or_named(input)?;
    let (input, node) = match opt(comprehension_clauses).parse(input)? {
        (input, Some(generators)) => (
            input,
            comprehension(ComprehensionKind::Generator, first, None, generators),
        ),
        (input, None) => {
            let (input, (items, trailing)) = remaining_elements(input, first)?;
            (input, tuple_unless_single(items, trailing))
        }
    };
    let (input, _) = ws(char(')')).parse(input)?;
    Ok((input, node))
}

fn list_display(input: &str) -> IResult<&str, Node> {
    let (input, _) = char('[').parse(input)?;
    let (input, _) = multispace0(input)?;
    let closed: IResult<&str, char> = char(']').parse(input);
    if let Ok((rest, _)) = closed {
        return Ok((rest, Node::List(Vec::new())));
    }
    let (input, first) = star_or_named(input)?;
    let (input, node) = match opt(comprehension_clauses).parse(input)? {
        (input, Some(generators)) => (
            input,
            comprehension(ComprehensionKind::List, first, None, generators),
        ),
        (input, None) => {
            let (input, (items, _)) = remaining_elements(input, first)?;
            (input, Node::List(items))
        }
    };
    let (input, _) = ws(char(']')).parse(input)?;
    Ok((input, node))
}

fn dict_item(input: &str) -> IResult<&str, (Node, Node)> {
    pair(expression, preceded(ws(char(':')), expression)).parse(input)
}

/// A dict or set display. The first element is parsed once; a following
/// colon makes it a dict key.
fn brace_display(input: &str) -> IResult<&str, Node> {
    let (input, _) = char('{').parse(input)?;
    let (input, _) = multispace0(input)?;
    let closed: IResult<&str, char> = char('}').parse(input);
    if let Ok((rest, _)) = closed {
        return Ok((rest, Node::Dict(Vec::new())));
    }
    let (input, first) = star_or_named(input)?;
    let (input, value) = opt(preceded(ws(char(':')), expression)).parse(input)?;
    let (input, node) = match value {
        Some(value) => dict_rest(input, first, value)?,
        None => set_rest(input, first)?,
    };
    let (input, _) = ws(char('}')).parse(input)?;
    Ok((input, node))
}

fn dict_rest(input: &str, key: Node, value: Node) -> IResult<&str, Node> {
    if let (input, Some(generators)) = opt(comprehension_clauses).parse(input)? {
        let node = comprehension(ComprehensionKind::Dict, key, Some(value), generators);
        return Ok((input, node));
    }
    let (input, rest) = many0(preceded(ws(char(',')), dict_item)).parse(input)?;
    let (input, _) = opt(ws(char(','))).parse(input)?;
    let mut items = vec![(key, value)];
    items.extend(rest);
    Ok((input, Node::Dict(items)))
}

fn set_rest(input: &str, first: Node) -> IResult<&str, Node> {
    if let (input, Some(generators)) = opt(comprehension_clauses).parse(input)? {
        let node = comprehension(ComprehensionKind::Set, first, None, generators);
        return Ok((input, node));
    }
    let (input, (items, _)) = remaining_elements(input, first)?;
    Ok((input, Node::Set(items)))
}

// --- Literal Parsers ---

enum StringPiece {
    Text(String),
    Bytes(Vec<u8>),
    Formatted(String),
}

impl StringPiece {
    fn into_text(self) -> String {
        match self {
            StringPiece::Text(s) | StringPiece::Formatted(s) => s,
            StringPiece::Bytes(b) => String::from_utf8_lossy(&b).into_owned(),
        }
    }
}

/// One or more adjacent string literals, concatenated as Python does.
fn strings(input: &str) -> IResult<&str, Node> {
    let (input, pieces) = many1(ws(string_piece)).parse(input)?;

    if pieces.iter().any(|p| matches!(p, StringPiece::Formatted(_))) {
        let body = pieces.into_iter().map(StringPiece::into_text).collect();
        return Ok((input, Node::FString(body)));
    }
    if pieces.iter().any(|p| matches!(p, StringPiece::Bytes(_))) {
        let bytes = pieces
            .into_iter()
            .flat_map(|p| match p {
                StringPiece::Bytes(b) => b,
                other => other.into_text().into_bytes(),
            })
            .collect();
        return Ok((input, Node::Constant(Constant::Bytes(bytes))));
    }
    let text = pieces.into_iter().map(StringPiece::into_text).collect();
    Ok((input, Node::Constant(Constant::Str(text))))
}

fn string_piece(input: &str) -> IResult<&str, StringPiece> {
    let (rest, prefix) =
        take_while_m_n(0, 2, |c: char| "rRbBuUfF".contains(c)).parse(input)?;
    let quote = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|q| rest.starts_with(*q))
        .ok_or_else(|| nom::Err::Error(Error::new(input, ErrorKind::Char)))?;

    let (raw, bytes, formatted) = match prefix.to_ascii_lowercase().as_str() {
        "" | "u" => (false, false, false),
        "r" => (true, false, false),
        "b" => (false, true, false),
        "br" | "rb" => (true, true, false),
        "f" => (false, false, true),
        "fr" | "rf" => (true, false, true),
        _ => return Err(nom::Err::Error(Error::new(input, ErrorKind::Char))),
    };

    let body_start = &rest[quote.len()..];
    let end = find_closing_quote(body_start, quote)
        .ok_or_else(|| nom::Err::Failure(Error::new(input, ErrorKind::Eof)))?;
    let body = &body_start[..end];
    let remaining = &body_start[end + quote.len()..];

    let piece = if formatted {
        StringPiece::Formatted(body.to_string())
    } else {
        let text = if raw { body.to_string() } else { unescape(body) };
        if bytes {
            StringPiece::Bytes(text.into_bytes())
        } else {
            StringPiece::Text(text)
        }
    };
    Ok((remaining, piece))
}

fn find_closing_quote(body: &str, quote: &str) -> Option<usize> {
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if quote.len() == 1 && (c == '\n' || c == '\r') {
            return None;
        }
        if body[i..].starts_with(quote) {
            return Some(i);
        }
    }
    None
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => out.push('\\'),
            Some('\n') => {}
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\x0b'),
            Some('x') => push_code_point(&mut out, &mut chars, 2, 'x'),
            Some('u') => push_code_point(&mut out, &mut chars, 4, 'u'),
            Some('U') => push_code_point(&mut out, &mut chars, 8, 'U'),
            Some(first @ '0'..='7') => {
                let mut code = first.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.next_if(|c| ('0'..='7').contains(c)) {
                        Some(d) => code = code * 8 + d.to_digit(8).unwrap_or(0),
                        None => break,
                    }
                }
                out.extend(char::from_u32(code));
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn push_code_point(out: &mut String, chars: &mut Peekable<Chars<'_>>, digits: usize, marker: char) {
    let hex: String = (0..digits)
        .map_while(|_| chars.next_if(|c| c.is_ascii_hexdigit()))
        .collect();
    let decoded = u32::from_str_radix(&hex, 16)
        .ok()
        .filter(|_| hex.len() == digits)
        .and_then(char::from_u32);
    match decoded {
        Some(ch) => out.push(ch),
        None => {
            out.push('\\');
            out.push(marker);
            out.push_str(&hex);
        }
    }
}

fn number(input: &str) -> IResult<&str, Node> {
    let (rest, node) = alt((radix_integer, decimal_number)).parse(input)?;
    let (rest, _) = not(satisfy(is_ident_continue)).parse(rest)?;
    Ok((rest, node))
}

fn integer_error<'a>(input: &'a str, kind: &IntErrorKind) -> nom::Err<Error<&'a str>> {
    match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            nom::Err::Failure(Error::new(input, ErrorKind::TooLarge))
        }
        _ => nom::Err::Error(Error::new(input, ErrorKind::Digit)),
    }
}

fn radix_integer(input: &str) -> IResult<&str, Node> {
    let (rest, (radix, digits)) = alt((
        pair(
            value(16, alt((tag("0x"), tag("0X")))),
            take_while1(|c: char| c.is_ascii_hexdigit() || c == '_'),
        ),
        pair(
            value(8, alt((tag("0o"), tag("0O")))),
            take_while1(|c: char| ('0'..='7').contains(&c) || c == '_'),
        ),
        pair(
            value(2, alt((tag("0b"), tag("0B")))),
            take_while1(|c: char| c == '0' || c == '1' || c == '_'),
        ),
    ))
    .parse(input)?;
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let n = i64::from_str_radix(&cleaned, radix).map_err(|e| integer_error(input, e.kind()))?;
    Ok((rest, Node::Constant(Constant::Int(n))))
}

fn digit_run(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        digit1,
        take_while(|c: char| c.is_ascii_digit() || c == '_'),
    ))
    .parse(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize((one_of("eE"), opt(one_of("+-")), digit_run)).parse(input)
}

fn decimal_number(input: &str) -> IResult<&str, Node> {
    let (rest, text) = recognize(pair(
        alt((
            recognize(pair(digit_run, opt(pair(char('.'), opt(digit_run))))),
            recognize(pair(char('.'), digit_run)),
        )),
        opt(exponent),
    ))
    .parse(input)?;
    let (rest, imaginary) = opt(one_of("jJ")).parse(rest)?;

    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let float_error = |_| nom::Err::Error(Error::new(input, ErrorKind::Float));
    let constant = if imaginary.is_some() {
        Constant::Complex(cleaned.parse().map_err(float_error)?)
    } else if cleaned.contains(['.', 'e', 'E']) {
        Constant::Float(cleaned.parse().map_err(float_error)?)
    } else {
        Constant::Int(
            cleaned
                .parse()
                .map_err(|e: std::num::ParseIntError| integer_error(input, e.kind()))?,
        )
    };
    Ok((rest, Node::Constant(constant)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn name(id: &str) -> Box<Node> {
        Box::new(Node::Name(id.to_string()))
    }

    #[test]
    fn test_parse_concatenation_is_left_associative() {
        let result = parse("a + b + c").unwrap();
        assert_eq!(
            result,
            Node::BinOp {
                left: Box::new(Node::BinOp {
                    left: name("a"),
                    op: BinOp::Add,
                    right: name("b"),
                }),
                op: BinOp::Add,
                right: name("c"),
            }
        );
    }

    #[test]
    fn test_parse_method_call_chain() {
        let result = parse("level_name.upper().strip()").unwrap();
        let Node::Call { func, args } = result else {
            panic!("expected a call");
        };
        assert!(args.is_empty());
        let Node::Attribute { value, attr } = *func else {
            panic!("expected an attribute");
        };
        assert_eq!(attr, "strip");
        assert!(matches!(*value, Node::Call { .. }));
    }

    #[test]
    fn test_parse_negative_index() {
        let result = parse("scope_box_name[-1]").unwrap();
        assert_eq!(
            result,
            Node::Subscript {
                value: name("scope_box_name"),
                index: Box::new(Node::UnaryOp {
                    op: UnaryOp::Neg,
                    operand: Box::new(Node::Constant(Constant::Int(1))),
                }),
            }
        );
    }

    #[test]
    fn test_parse_slices() {
        let result = parse("level_name[0:3]").unwrap();
        assert_eq!(
            result,
            Node::Subscript {
                value: name("level_name"),
                index: Box::new(Node::Slice {
                    lower: Some(Box::new(Node::Constant(Constant::Int(0)))),
                    upper: Some(Box::new(Node::Constant(Constant::Int(3)))),
                    step: None,
                }),
            }
        );

        let open = parse("x[::-1]").unwrap();
        let Node::Subscript { index, .. } = open else {
            panic!("expected a subscript");
        };
        let Node::Slice { lower, upper, step } = *index else {
            panic!("expected a slice");
        };
        assert!(lower.is_none());
        assert!(upper.is_none());
        assert!(step.is_some());
    }

    #[test]
    fn test_parse_multiplication_binds_tighter() {
        let result = parse("a + b * 2").unwrap();
        let Node::BinOp { op, right, .. } = result else {
            panic!("expected a binary op");
        };
        assert_eq!(op, BinOp::Add);
        assert!(matches!(*right, Node::BinOp { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_parse_string_literals() {
        assert_eq!(
            parse(r#""a\tb""#).unwrap(),
            Node::Constant(Constant::Str("a\tb".into()))
        );
        assert_eq!(
            parse(r"r'a\tb'").unwrap(),
            Node::Constant(Constant::Str("a\\tb".into()))
        );
        assert_eq!(
            parse("'ab' \"cd\"").unwrap(),
            Node::Constant(Constant::Str("abcd".into()))
        );
        assert_eq!(
            parse("b'x'").unwrap(),
            Node::Constant(Constant::Bytes(b"x".to_vec()))
        );
        assert_eq!(
            parse("f'{level_name}'").unwrap(),
            Node::FString("{level_name}".into())
        );
        assert_eq!(
            parse(r"'\x41é'").unwrap(),
            Node::Constant(Constant::Str("Aé".into()))
        );
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse("42").unwrap(), Node::Constant(Constant::Int(42)));
        assert_eq!(parse("1_000").unwrap(), Node::Constant(Constant::Int(1000)));
        assert_eq!(parse("0x1F").unwrap(), Node::Constant(Constant::Int(31)));
        assert_eq!(parse("2.5").unwrap(), Node::Constant(Constant::Float(2.5)));
        assert_eq!(parse("1e3").unwrap(), Node::Constant(Constant::Float(1000.0)));
        assert_eq!(parse("2j").unwrap(), Node::Constant(Constant::Complex(2.0)));
    }

    #[test]
    fn test_parse_keyword_constants() {
        assert_eq!(parse("True").unwrap(), Node::Constant(Constant::Bool(true)));
        assert_eq!(parse("None").unwrap(), Node::Constant(Constant::None));
        assert_eq!(parse("...").unwrap(), Node::Constant(Constant::Ellipsis));
    }

    #[test]
    fn test_parse_recognizes_disallowed_expressions() {
        assert!(matches!(parse("a < b").unwrap(), Node::Compare { .. }));
        assert!(matches!(parse("a not in b").unwrap(), Node::Compare { .. }));
        assert!(matches!(parse("a and b or c").unwrap(), Node::BoolOp { op: BoolOp::Or, .. }));
        assert!(matches!(parse("not a").unwrap(), Node::UnaryOp { op: UnaryOp::Not, .. }));
        assert!(matches!(parse("lambda x: x").unwrap(), Node::Lambda { .. }));
        assert!(matches!(parse("a if b else c").unwrap(), Node::IfExp { .. }));
        assert!(matches!(parse("(a := 1)").unwrap(), Node::NamedExpr { .. }));
        assert!(matches!(parse("[x for x in y]").unwrap(), Node::Comprehension { kind: ComprehensionKind::List, .. }));
        assert!(matches!(parse("{k: v for k in y}").unwrap(), Node::Comprehension { kind: ComprehensionKind::Dict, .. }));
        assert!(matches!(parse("{1, 2}").unwrap(), Node::Set(_)));
        assert!(matches!(parse("{'a': 1}").unwrap(), Node::Dict(_)));
        assert!(matches!(parse("a, b").unwrap(), Node::Tuple(_)));
        assert!(matches!(parse("2 ** 8").unwrap(), Node::BinOp { op: BinOp::Pow, .. }));
        assert!(matches!(parse("7 // 2").unwrap(), Node::BinOp { op: BinOp::FloorDiv, .. }));
    }

    #[test]
    fn test_parse_call_arguments() {
        let Node::Call { args, .. } = parse("f(1, x=2, *a, **k)").unwrap() else {
            panic!("expected a call");
        };
        assert_eq!(args.len(), 4);
        assert!(matches!(args[0], Argument::Positional(_)));
        assert!(matches!(args[1], Argument::Keyword { .. }));
        assert!(matches!(args[2], Argument::Starred(_)));
        assert!(matches!(args[3], Argument::DoubleStarred(_)));

        let Node::Call { args, .. } = parse("f(x for x in y)").unwrap() else {
            panic!("expected a call");
        };
        assert!(matches!(
            args[0],
            Argument::Positional(Node::Comprehension { kind: ComprehensionKind::Generator, .. })
        ));
    }

    #[test]
    fn test_parse_statements() {
        assert_eq!(parse("import os").unwrap(), Node::Statement(StatementKind::Import));
        assert_eq!(
            parse("from os import system").unwrap(),
            Node::Statement(StatementKind::ImportFrom)
        );
        assert_eq!(parse("x = 1").unwrap(), Node::Statement(StatementKind::Assign));
        assert_eq!(parse("x += 1").unwrap(), Node::Statement(StatementKind::AugAssign));
        assert_eq!(parse("x: int = 1").unwrap(), Node::Statement(StatementKind::AnnAssign));
        assert_eq!(
            parse("def f(): pass").unwrap(),
            Node::Statement(StatementKind::Keyword("def"))
        );
        assert_eq!(parse("a; b").unwrap(), Node::Statement(StatementKind::Suite));
        assert_eq!(parse("a\nb").unwrap(), Node::Statement(StatementKind::Suite));
    }

    #[test]
    fn test_equality_is_not_assignment() {
        assert!(matches!(parse("a == 1").unwrap(), Node::Compare { .. }));
    }

    #[test]
    fn test_keywords_are_not_names() {
        assert!(parse("lambda_name").is_ok());
        assert!(matches!(parse("import_count").unwrap(), Node::Name(_)));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse(""), Err(ValidationError::Syntax { .. })));
        assert!(matches!(parse("   "), Err(ValidationError::Syntax { .. })));
        assert!(matches!(parse("a +"), Err(ValidationError::Syntax { .. })));
        assert!(matches!(parse("(a"), Err(ValidationError::Syntax { .. })));
        assert!(matches!(parse("'abc"), Err(ValidationError::Syntax { .. })));
        assert!(matches!(
            parse("99999999999999999999"),
            Err(ValidationError::Syntax { .. })
        ));
    }

    #[test]
    fn test_syntax_error_offset_points_at_remainder() {
        let Err(ValidationError::Syntax { offset, .. }) = parse("a b") else {
            panic!("expected a syntax error");
        };
        assert_eq!(offset, 2);
    }

    fn nested(open: &str, inner: &str, close: &str, depth: usize) -> String {
        format!("{}{}{}", open.repeat(depth), inner, close.repeat(depth))
    }

    #[test]
    fn test_nesting_limit() {
        let deep = nested("(", "x", ")", MAX_NESTING + 1);
        assert!(matches!(parse(&deep), Err(ValidationError::Syntax { .. })));

        let minus = format!("{}1", "-".repeat(MAX_NESTING + 1));
        assert!(matches!(parse(&minus), Err(ValidationError::Syntax { .. })));

        let not = format!("{}x", "not ".repeat(MAX_NESTING + 1));
        assert!(matches!(parse(&not), Err(ValidationError::Syntax { .. })));

        let shallow = nested("(", "x", ")", 4);
        assert!(parse(&shallow).is_ok());
    }

    #[test]
    fn test_deepest_allowed_nesting_parses_quickly() {
        let started = Instant::now();
        let cases = [
            nested("(", "level_name", ")", MAX_NESTING),
            nested("str(", "level_name", ")", MAX_NESTING),
            nested("{", "1", "}", MAX_NESTING),
            nested("[", "1", "]", MAX_NESTING),
            nested("x[", "0", "]", MAX_NESTING),
            nested("x[", ":", "]", MAX_NESTING),
            nested("f(a=", "1", ")", MAX_NESTING),
            nested("{1: ", "2", "}", MAX_NESTING),
        ];
        for case in &cases {
            assert!(parse(case).is_ok(), "failed to parse {}", case);
        }

        // Unbalanced input fails after a single pass, not after backtracking.
        for case in &cases {
            let unbalanced = &case[..case.len() - 1];
            assert!(matches!(parse(unbalanced), Err(ValidationError::Syntax { .. })));
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_flat_prefix_chains_do_not_nest() {
        let sum = vec!["-1"; MAX_NESTING + 8].join(" + ");
        assert!(parse(&sum).is_ok());

        let products = vec!["-x * ~y"; MAX_NESTING].join(" - ");
        assert!(parse(&products).is_ok());

        let negations = vec!["not a"; MAX_NESTING + 8].join(" and ");
        assert!(matches!(parse(&negations).unwrap(), Node::BoolOp { op: BoolOp::And, .. }));

        let elements = format!("[{}]", vec!["lambda: -x"; MAX_NESTING + 8].join(", "));
        assert!(matches!(parse(&elements).unwrap(), Node::List(_)));

        let nested_minus = format!("{}1", "-".repeat(MAX_NESTING));
        assert!(parse(&nested_minus).is_ok());
    }

    #[test]
    fn test_parse_displays_and_subscripts() {
        assert!(matches!(parse("(x for x in y)").unwrap(), Node::Comprehension { kind: ComprehensionKind::Generator, .. }));
        assert!(matches!(parse("{x for x in y}").unwrap(), Node::Comprehension { kind: ComprehensionKind::Set, .. }));
        assert_eq!(parse("(a,)").unwrap(), Node::Tuple(vec![Node::Name("a".into())]));
        assert_eq!(parse("(a)").unwrap(), Node::Name("a".into()));
        assert_eq!(parse("[a, b,]").unwrap(), Node::List(vec![Node::Name("a".into()), Node::Name("b".into())]));
        assert!(matches!(parse("{'a': 1, 'b': 2,}").unwrap(), Node::Dict(items) if items.len() == 2));
        assert!(matches!(parse("x[a:=1]").unwrap(), Node::Subscript { index, .. } if matches!(*index, Node::NamedExpr { .. })));
        assert!(matches!(parse("x[1, 2:3]").unwrap(), Node::Subscript { index, .. } if matches!(*index, Node::Tuple(_))));
        assert!(parse("x[]").is_err());
        assert!(parse("f(,)").is_err());
    }

    #[test]
    fn test_length_limit() {
        let long = format!("'{}'", "a".repeat(MAX_SOURCE_LEN));
        assert!(matches!(parse(&long), Err(ValidationError::Syntax { .. })));
    }
}
