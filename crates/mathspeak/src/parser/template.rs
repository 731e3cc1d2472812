//! Speech template parser using winnow.
//!
//! Parses template strings into an AST. Handles:
//! - Literal text segments
//! - Child references with transforms: `{@caps $base}`
//! - Node text and numbers: `{text}`, `{number}`, `{index}`, `{count}`
//! - Pauses and groups: `{pause:medium}`, `{begin}`, `{end 'end root'}`
//! - Escape sequences: `{{` `}}`

use winnow::combinator::{alt, cut_err, delimited, fail, opt, preceded, repeat, terminated};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

use super::ast::{PauseStrength, Segment, Template, Transform};
use super::error::{ParseError, calculate_position, expected, label, syntax_error};

/// Parse a template string into an AST.
///
/// # Example
///
/// ```
/// use mathspeak::parser::{parse_template, Segment};
///
/// let template = parse_template("the square root of {$body}{end 'end root'}").unwrap();
/// assert_eq!(template.segments.len(), 3);
/// assert!(matches!(template.segments[0], Segment::Literal(_)));
/// ```
pub fn parse_template(input: &str) -> Result<Template, ParseError> {
    let mut remaining = input;
    match template_body(&mut remaining, false) {
        Ok(template) => {
            if remaining.is_empty() {
                Ok(template)
            } else {
                let (line, column) = calculate_position(input, remaining);
                Err(ParseError::Syntax {
                    line,
                    column,
                    message: format!(
                        "unexpected character: '{}'",
                        remaining.chars().next().unwrap_or('?')
                    ),
                })
            }
        }
        Err(e) => Err(syntax_error(input, remaining, e)),
    }
}

/// Parse a double-quoted template as it appears in a rule file.
pub(super) fn quoted_template(input: &mut &str) -> ModalResult<Template> {
    '"'.parse_next(input)?;
    let template = template_body(input, true)?;
    cut_err('"'.context(expected("'\"' to close the template")))
        .parse_next(input)?;
    Ok(template)
}

/// Parse segments until end of input, or until `"` when quoted.
fn template_body(input: &mut &str, quoted: bool) -> ModalResult<Template> {
    let mut segments = Vec::new();
    loop {
        if input.is_empty() || (quoted && input.starts_with('"')) {
            break;
        }
        let segment = if input.starts_with("{{") || input.starts_with("}}") {
            escape_sequence(input)?
        } else if input.starts_with('{') {
            interpolation(input)?
        } else if input.starts_with('}') {
            return cut_err(fail.context(label("'}', write '}}' for a literal brace")))
                .parse_next(input);
        } else {
            literal_run(input, quoted)?
        };
        segments.push(segment);
    }
    Ok(Template {
        segments: merge_literals(segments),
    })
}

/// Merge adjacent Literal segments into single segments.
fn merge_literals(segments: Vec<Segment>) -> Vec<Segment> {
    let mut result = Vec::with_capacity(segments.len());

    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                if let Some(Segment::Literal(prev)) = result.last_mut() {
                    prev.push_str(&text);
                } else {
                    result.push(Segment::Literal(text));
                }
            }
            other => result.push(other),
        }
    }

    result
}

/// Parse escape sequences: {{ -> {, }} -> }
fn escape_sequence(input: &mut &str) -> ModalResult<Segment> {
    alt((
        "{{".value(Segment::Literal("{".to_string())),
        "}}".value(Segment::Literal("}".to_string())),
    ))
    .parse_next(input)
}

/// Parse a run of literal text.
fn literal_run(input: &mut &str, quoted: bool) -> ModalResult<Segment> {
    let text = if quoted {
        take_till(1.., ['{', '}', '"']).parse_next(input)?
    } else {
        take_till(1.., ['{', '}']).parse_next(input)?
    };
    Ok(Segment::Literal(text.to_string()))
}

/// Parse an interpolation: { transforms* item }
fn interpolation(input: &mut &str) -> ModalResult<Segment> {
    '{'.parse_next(input)?;
    ws(input)?;
    let segment = cut_err(interpolation_content).parse_next(input)?;
    ws(input)?;
    cut_err('}'.context(expected("'}' to close the interpolation"))).parse_next(input)?;
    Ok(segment)
}

/// Parse the content inside an interpolation.
fn interpolation_content(input: &mut &str) -> ModalResult<Segment> {
    let transforms: Vec<Transform> = repeat(0.., terminated(transform, ws)).parse_next(input)?;

    if input.starts_with('$') {
        '$'.parse_next(input)?;
        let name = identifier
            .context(expected("a child name after '$'"))
            .parse_next(input)?;
        return Ok(Segment::Child {
            name: name.to_string(),
            transforms,
        });
    }

    let keyword = identifier
        .context(expected("$child, text, number, index, count, pause, begin or end"))
        .parse_next(input)?;
    let segment = match keyword {
        "text" => return Ok(Segment::Text { transforms }),
        "number" => Segment::Number,
        "index" => Segment::Index,
        "count" => Segment::Count,
        "pause" => {
            let strength = opt(preceded(':', cut_err(pause_strength))).parse_next(input)?;
            Segment::Pause(strength.unwrap_or(PauseStrength::Short))
        }
        "begin" => Segment::GroupStart,
        "end" => Segment::GroupEnd {
            marker: opt(preceded(ws, marker)).parse_next(input)?,
        },
        _ => return fail.context(label("interpolation keyword")).parse_next(input),
    };

    if !transforms.is_empty() {
        return fail
            .context(label("transform target, transforms apply to $child and text"))
            .parse_next(input);
    }
    Ok(segment)
}

/// Parse a transform: @name
fn transform(input: &mut &str) -> ModalResult<Transform> {
    preceded('@', identifier)
        .map(|name| Transform {
            name: name.to_string(),
        })
        .parse_next(input)
}

/// Parse a pause strength name.
fn pause_strength(input: &mut &str) -> ModalResult<PauseStrength> {
    identifier
        .verify_map(PauseStrength::from_name)
        .context(expected("short, medium or long"))
        .parse_next(input)
}

/// Parse a group marker: 'end root'
fn marker(input: &mut &str) -> ModalResult<String> {
    delimited(
        '\'',
        cut_err(take_till(0.., ['\'', '"', '}'])),
        cut_err('\''.context(expected("\"'\" to close the marker"))),
    )
    .map(|text: &str| text.trim().to_string())
    .parse_next(input)
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

/// Parse an identifier.
fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}
