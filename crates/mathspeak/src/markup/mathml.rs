//! MathML reader built on winnow.
//!
//! Reads the XML subset MathML needs: elements, attributes, text, comments,
//! CDATA sections, an optional prolog, and character/entity references.
//! Structure errors carry the line and column where reading stopped.

use std::collections::BTreeMap;

use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, preceded, repeat};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, take_till, take_until, take_while};

use super::error::ParseError;
use super::node::{ExpressionNode, NodeKind};

/// Deepest element nesting accepted before giving up.
pub const MAX_NESTING: usize = 512;

/// Parse MathML text into an expression tree.
///
/// The root is always a `math` node: a root element with another name is
/// wrapped in one.
///
/// # Example
///
/// ```
/// use mathspeak::markup::{parse, NodeKind};
///
/// let tree = parse("<math><mi>x</mi></math>").unwrap();
/// assert_eq!(tree.kind(), &NodeKind::Math);
/// assert_eq!(tree.children()[0].text(), Some("x"));
/// ```
pub fn parse(markup: &str) -> Result<ExpressionNode, ParseError> {
    let mut reader = Reader {
        original: markup,
        input: markup,
    };
    reader.skip_misc()?;
    if !reader.input.starts_with('<') || reader.input.starts_with("</") {
        return Err(reader.malformed("expected a MathML element"));
    }
    let root = reader.element(0)?;
    reader.skip_misc()?;
    if !reader.input.is_empty() {
        return Err(reader.malformed("unexpected content after the root element"));
    }
    if root.kind() == &NodeKind::Math {
        Ok(root)
    } else {
        Ok(ExpressionNode::new(NodeKind::Math, vec![root]))
    }
}

/// Content read between an element's start and end tags.
enum Content {
    Element(ExpressionNode),
    Text(String),
}

struct Reader<'i> {
    original: &'i str,
    input: &'i str,
}

impl<'i> Reader<'i> {
    /// Run a winnow parser on the remaining input, restoring the input and
    /// reporting `expected` on failure.
    fn run<O, P>(&mut self, mut parser: P, expected: &str) -> Result<O, ParseError>
    where
        P: Parser<&'i str, O, ErrMode<ContextError>>,
    {
        let start = self.input;
        match parser.parse_next(&mut self.input) {
            Ok(output) => Ok(output),
            Err(_) => {
                self.input = start;
                Err(self.malformed(&format!("expected {expected}")))
            }
        }
    }

    fn malformed(&self, message: &str) -> ParseError {
        let (line, column) = calculate_position(self.original, self.input);
        ParseError::Malformed {
            line,
            column,
            message: message.to_string(),
        }
    }

    /// Skip whitespace, comments, the XML prolog and a doctype.
    fn skip_misc(&mut self) -> Result<(), ParseError> {
        loop {
            let _ = self.run(multispace0, "whitespace")?;
            if self.input.starts_with("<!--") {
                self.run(comment, "end of comment '-->'")?;
            } else if self.input.starts_with("<?") {
                self.run(processing_instruction, "end of declaration '?>'")?;
            } else if self.input.starts_with("<!DOCTYPE") {
                self.run(doctype, "end of doctype '>'")?;
            } else {
                return Ok(());
            }
        }
    }

    /// Read one element, starting at its `<`.
    fn element(&mut self, depth: usize) -> Result<ExpressionNode, ParseError> {
        if depth >= MAX_NESTING {
            let (line, column) = calculate_position(self.original, self.input);
            return Err(ParseError::TooDeep {
                line,
                column,
                limit: MAX_NESTING,
            });
        }

        self.run('<', "'<'")?;
        let tag = self.run(tag_name, "an element name")?;
        let attributes: Vec<(&str, String)> =
            self.run(repeat(0.., preceded(multispace0, attribute)), "attributes")?;
        let _ = self.run(multispace0, "whitespace")?;

        let content = if self.input.starts_with("/>") {
            self.run("/>", "'/>'")?;
            Vec::new()
        } else {
            self.run('>', "'>' or '/>' to end the start tag")?;
            let content = self.content(depth)?;
            self.end_tag(tag)?;
            content
        };

        let attributes: BTreeMap<String, String> = attributes
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        Ok(build_node(local_name(tag), content).with_attributes(attributes))
    }

    /// Read element content up to (not including) the end tag.
    fn content(&mut self, depth: usize) -> Result<Vec<Content>, ParseError> {
        let mut content = Vec::new();
        loop {
            if self.input.is_empty() {
                return Err(self.malformed("unexpected end of input inside an element"));
            }
            if self.input.starts_with("</") {
                return Ok(content);
            }
            if self.input.starts_with("<!--") {
                self.run(comment, "end of comment '-->'")?;
            } else if self.input.starts_with("<![CDATA[") {
                let text = self.run(cdata, "end of CDATA section ']]>'")?;
                content.push(Content::Text(text.to_string()));
            } else if self.input.starts_with('<') {
                content.push(Content::Element(self.element(depth + 1)?));
            } else {
                let raw = self.run(take_till(1.., '<'), "text")?;
                content.push(Content::Text(decode_entities(raw)));
            }
        }
    }

    /// Read an end tag and check it closes `open`.
    fn end_tag(&mut self, open: &str) -> Result<(), ParseError> {
        let start = self.input;
        self.run("</", "an end tag")?;
        let close = self.run(tag_name, "an element name")?;
        let _ = self.run(multispace0, "whitespace")?;
        self.run('>', "'>' to end the end tag")?;
        if close != open {
            self.input = start;
            return Err(self.malformed(&format!(
                "end tag </{close}> does not match start tag <{open}>"
            )));
        }
        Ok(())
    }
}

/// Build a node from a tag name and its content.
fn build_node(tag: &str, content: Vec<Content>) -> ExpressionNode {
    let kind = NodeKind::from_tag(tag);
    if kind.is_token() {
        let mut raw = String::new();
        for item in &content {
            match item {
                Content::Text(text) => raw.push_str(text),
                Content::Element(element) => raw.push_str(&element.literal_text()),
            }
        }
        return ExpressionNode::leaf(kind, normalize_whitespace(&raw));
    }

    let children = content
        .into_iter()
        .filter_map(|item| match item {
            Content::Element(element) => Some(element),
            Content::Text(text) => {
                let text = normalize_whitespace(&text);
                (!text.is_empty()).then(|| ExpressionNode::leaf(NodeKind::Text, text))
            }
        })
        .collect();
    ExpressionNode::new(kind, children)
}

/// Collapse runs of whitespace to single spaces and trim the ends.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip a namespace prefix (`m:mi` -> `mi`).
fn local_name(tag: &str) -> &str {
    tag.rsplit(':').next().unwrap_or(tag)
}

/// Calculate line and column from original input and remaining input.
fn calculate_position(original: &str, remaining: &str) -> (usize, usize) {
    let consumed = original.len() - remaining.len();
    let consumed_str = &original[..consumed];
    let line = consumed_str.chars().filter(|&c| c == '\n').count() + 1;
    let column = match consumed_str.rfind('\n') {
        Some(pos) => consumed_str[pos + 1..].chars().count() + 1,
        None => consumed_str.chars().count() + 1,
    };
    (line, column)
}

/// Parse an element or attribute name.
fn tag_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
    })
    .parse_next(input)
}

/// Parse an attribute: name = "value" or name = 'value'.
fn attribute<'i>(input: &mut &'i str) -> ModalResult<(&'i str, String)> {
    let name = tag_name(input)?;
    (multispace0, '=', multispace0).void().parse_next(input)?;
    let raw = alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)?;
    Ok((name, decode_entities(raw)))
}

/// Parse a comment: <!-- ... -->
fn comment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited("<!--", take_until(0.., "-->"), "-->").parse_next(input)
}

/// Parse a CDATA section and return its raw text.
fn cdata<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited("<![CDATA[", take_until(0.., "]]>"), "]]>").parse_next(input)
}

/// Parse an XML declaration or processing instruction: <? ... ?>
fn processing_instruction<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited("<?", take_until(0.., "?>"), "?>").parse_next(input)
}

/// Parse a doctype without an internal subset.
fn doctype<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited("<!DOCTYPE", take_till(0.., '>'), '>').parse_next(input)
}

/// Replace character and entity references in raw text.
///
/// Unknown or unterminated references are kept literally.
pub(crate) fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut input = raw;
    let decoded: ModalResult<String> = repeat(0.., alt((reference, plain_run, any.map(String::from))))
        .fold(String::new, |mut acc, piece: String| {
            acc.push_str(&piece);
            acc
        })
        .parse_next(&mut input);
    decoded.unwrap_or_else(|_| raw.to_string())
}

/// Parse a run of text without references.
fn plain_run(input: &mut &str) -> ModalResult<String> {
    take_till(1.., '&').map(str::to_string).parse_next(input)
}

/// Parse a known reference: &name; &#123; &#x1F;
fn reference(input: &mut &str) -> ModalResult<String> {
    delimited(
        '&',
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '#'),
        ';',
    )
    .verify_map(resolve_reference)
    .parse_next(input)
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    if let Some(decimal) = name.strip_prefix('#') {
        return decimal
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    named_entity(name).map(str::to_string)
}

/// XML predefined entities plus the MathML names seen most in practice.
fn named_entity(name: &str) -> Option<&'static str> {
    let text = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" | "NonBreakingSpace" => "\u{a0}",
        "ThinSpace" | "thinsp" => "\u{2009}",
        "minus" => "−",
        "plus" => "+",
        "times" => "×",
        "divide" | "div" => "÷",
        "plusmn" | "pm" | "PlusMinus" => "±",
        "sdot" | "dot" => "⋅",
        "middot" | "centerdot" | "CenterDot" => "·",
        "InvisibleTimes" | "it" => "\u{2062}",
        "ApplyFunction" | "af" => "\u{2061}",
        "InvisibleComma" | "ic" => "\u{2063}",
        "equals" => "=",
        "ne" => "≠",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "approx" => "≈",
        "equiv" => "≡",
        "isin" | "in" | "Element" => "∈",
        "notin" => "∉",
        "rarr" | "rightarrow" | "RightArrow" => "→",
        "infin" | "infty" => "∞",
        "sum" | "Sum" => "∑",
        "prod" | "Product" => "∏",
        "int" | "Integral" => "∫",
        "part" | "PartialD" => "∂",
        "nabla" | "Del" => "∇",
        "prime" => "′",
        "deg" => "°",
        "radic" | "Sqrt" => "√",
        "lpar" => "(",
        "rpar" => ")",
        "lsqb" => "[",
        "rsqb" => "]",
        "lcub" => "{",
        "rcub" => "}",
        "verbar" | "vert" => "|",
        "comma" => ",",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ε",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" => "φ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Omega" => "Ω",
        _ => return None,
    };
    Some(text)
}
