//! `.rules` file format parser.
//!
//! Parses rule files containing directives and rule definitions:
//!
//! ```text
//! // Comments run to end of line.
//! @pause.short = ",";
//! equals = mo[text = "=", !next = leaf] :priority(1) => "is equal to{pause}";
//! ```

use winnow::ascii::{dec_int, dec_uint};
use winnow::combinator::{
    alt, cut_err, delimited, fail, opt, preceded, repeat, separated, terminated,
};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, none_of, take_while};

use super::ast::*;
use super::error::{ParseError, calculate_position, expected, label, syntax_error};
use super::template::quoted_template;
use crate::markup::OperatorRole;
use crate::prefs::Verbosity;

/// Parse an entire `.rules` file into items, in declaration order.
pub fn parse_file(input: &str) -> Result<Vec<Item>, ParseError> {
    let mut remaining = input;
    let mut items = Vec::new();
    loop {
        if let Err(e) = skip_ws_and_comments(&mut remaining) {
            return Err(syntax_error(input, remaining, e));
        }
        if remaining.is_empty() {
            return Ok(items);
        }

        let (line, _) = calculate_position(input, remaining);
        match item(&mut remaining) {
            Ok(Item::Directive(directive)) => {
                items.push(Item::Directive(Directive { line, ..directive }));
            }
            Ok(Item::Rule(rule)) => items.push(Item::Rule(RuleDefinition { line, ..rule })),
            Err(e) => return Err(syntax_error(input, remaining, e)),
        }
    }
}

/// Skip whitespace and line comments.
fn skip_ws_and_comments(input: &mut &str) -> ModalResult<()> {
    let _: Vec<()> = repeat(0.., alt((ws_only.void(), line_comment.void()))).parse_next(input)?;
    Ok(())
}

/// Parse whitespace (no comments).
fn ws_only<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_whitespace()).parse_next(input)
}

/// Parse a line comment: // ... newline
fn line_comment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded("//", take_while(0.., |c| c != '\n')).parse_next(input)
}

/// Parse one directive or rule.
fn item(input: &mut &str) -> ModalResult<Item> {
    if input.starts_with('@') {
        directive.map(Item::Directive).parse_next(input)
    } else {
        rule_definition.map(Item::Rule).parse_next(input)
    }
}

/// Parse a directive: @dotted.name = "value";
fn directive(input: &mut &str) -> ModalResult<Directive> {
    '@'.parse_next(input)?;
    let name = cut_err(dotted_name.context(expected("a directive name"))).parse_next(input)?;
    skip_ws_and_comments(input)?;
    cut_err('='.context(expected("'=' after the directive name"))).parse_next(input)?;
    skip_ws_and_comments(input)?;
    let value = cut_err(quoted_string.context(expected("a quoted directive value")))
        .parse_next(input)?;
    skip_ws_and_comments(input)?;
    cut_err(';'.context(expected("';' to end the directive"))).parse_next(input)?;

    Ok(Directive {
        name: name.to_string(),
        value,
        line: 0,
    })
}

/// Parse a rule: name = pattern modifiers* => "template";
fn rule_definition(input: &mut &str) -> ModalResult<RuleDefinition> {
    let name = rule_name
        .context(expected("a rule name or '@' directive"))
        .parse_next(input)?;
    skip_ws_and_comments(input)?;
    cut_err('='.context(expected("'=' after the rule name"))).parse_next(input)?;
    skip_ws_and_comments(input)?;

    let pattern = cut_err(pattern).parse_next(input)?;
    skip_ws_and_comments(input)?;

    let priorities: Vec<i32> =
        repeat(0.., terminated(priority_modifier, skip_ws_and_comments)).parse_next(input)?;

    cut_err("=>".context(expected("'=>' before the template"))).parse_next(input)?;
    skip_ws_and_comments(input)?;
    let template = cut_err(quoted_template.context(expected("a quoted template")))
        .parse_next(input)?;
    skip_ws_and_comments(input)?;
    cut_err(';'.context(expected("';' to end the rule"))).parse_next(input)?;

    Ok(RuleDefinition {
        name: name.to_string(),
        pattern,
        priority: priorities.into_iter().sum(),
        template,
        line: 0,
    })
}

/// Parse a snake_case rule name (lowercase start, alphanumeric + underscore).
fn rule_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    let ident: &str =
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;

    // Validate: must start with lowercase letter or underscore
    let first = ident.chars().next().unwrap_or('0');
    if !(first.is_ascii_lowercase() || first == '_') {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }

    Ok(ident)
}

/// Parse a :priority(n) modifier.
fn priority_modifier(input: &mut &str) -> ModalResult<i32> {
    preceded(
        ":priority",
        cut_err(delimited(
            ('(', ws),
            dec_int.context(expected("an integer priority")),
            (ws, ')'),
        )),
    )
    .parse_next(input)
}

/// Parse a pattern: kind or kind[conditions]
fn pattern(input: &mut &str) -> ModalResult<Pattern> {
    let kind = alt((
        '*'.value(KindPattern::Any),
        kind_name.map(|name| KindPattern::Named(name.to_string())),
    ))
    .context(expected("a node kind or '*'"))
    .parse_next(input)?;

    let conditions = opt(delimited(
        ('[', skip_ws_and_comments),
        conditions,
        cut_err((skip_ws_and_comments, ']').context(expected("',' or ']' in the condition list"))),
    ))
    .parse_next(input)?
    .unwrap_or_default();

    Ok(Pattern { kind, conditions })
}

/// Parse a comma-separated condition list with optional trailing comma.
fn conditions(input: &mut &str) -> ModalResult<Vec<Condition>> {
    let conditions: Vec<Condition> = separated(
        0..,
        condition,
        (skip_ws_and_comments, ',', skip_ws_and_comments),
    )
    .parse_next(input)?;

    // Allow trailing comma
    let _ = opt((skip_ws_and_comments, ',')).parse_next(input)?;

    Ok(conditions)
}

/// Parse a condition, possibly negated with `!`.
fn condition(input: &mut &str) -> ModalResult<Condition> {
    if input.starts_with('!') {
        '!'.parse_next(input)?;
        ws(input)?;
        let inner = cut_err(condition_body).parse_next(input)?;
        return Ok(Condition::Not(Box::new(inner)));
    }
    condition_body(input)
}

/// Parse a single condition.
fn condition_body(input: &mut &str) -> ModalResult<Condition> {
    if input.starts_with('@') {
        return attribute_condition(input);
    }
    if input.starts_with('$') {
        return child_condition(input);
    }

    let keyword = identifier.context(label("condition")).parse_next(input)?;
    match keyword {
        "text" => {
            equals(input)?;
            cut_err(quoted_string.context(expected("a quoted string")))
                .map(Condition::Text)
                .parse_next(input)
        }
        "role" => {
            equals(input)?;
            cut_err(
                identifier
                    .verify_map(OperatorRole::from_name)
                    .context(expected("relation, binary, fence, separator or other")),
            )
            .map(Condition::Role)
            .parse_next(input)
        }
        "parent" => {
            equals(input)?;
            cut_err(kind_name.context(expected("a node kind")))
                .map(|kind| Condition::Parent(kind.to_string()))
                .parse_next(input)
        }
        "next" => {
            equals(input)?;
            cut_err(sibling_test).map(Condition::Next).parse_next(input)
        }
        "prev" => {
            equals(input)?;
            cut_err(sibling_test).map(Condition::Prev).parse_next(input)
        }
        "depth" => {
            let (op, n) = cut_err(numeric_comparison).parse_next(input)?;
            Ok(Condition::Depth(op, n))
        }
        "children" => {
            let (op, n) = cut_err(numeric_comparison).parse_next(input)?;
            Ok(Condition::ChildCount(op, n))
        }
        "verbosity" => {
            equals(input)?;
            cut_err(
                identifier
                    .verify_map(|name: &str| name.parse::<Verbosity>().ok())
                    .context(expected("terse, medium or verbose")),
            )
            .map(Condition::Verbosity)
            .parse_next(input)
        }
        "root" => Ok(Condition::Root),
        "leaf" => Ok(Condition::Leaf),
        "first" => Ok(Condition::First),
        "last" => Ok(Condition::Last),
        _ => cut_err(fail.context(label("condition keyword"))).parse_next(input),
    }
}

/// Parse `@name = "value"`.
fn attribute_condition(input: &mut &str) -> ModalResult<Condition> {
    '@'.parse_next(input)?;
    let name = cut_err(kind_name.context(expected("an attribute name"))).parse_next(input)?;
    equals(input)?;
    let value = cut_err(quoted_string.context(expected("a quoted attribute value")))
        .parse_next(input)?;
    Ok(Condition::Attribute {
        name: name.to_string(),
        value,
    })
}

/// Parse `$child.text = "..."` or `$child.kind = kind`.
fn child_condition(input: &mut &str) -> ModalResult<Condition> {
    '$'.parse_next(input)?;
    let name = cut_err(identifier.context(expected("a child name"))).parse_next(input)?;
    cut_err('.'.context(expected("'.text' or '.kind' after the child name")))
        .parse_next(input)?;
    let field = cut_err(identifier.context(expected("text or kind"))).parse_next(input)?;
    let test = match field {
        "text" => {
            equals(input)?;
            ChildTest::Text(cut_err(quoted_string).parse_next(input)?)
        }
        "kind" => {
            equals(input)?;
            ChildTest::Kind(cut_err(kind_name).parse_next(input)?.to_string())
        }
        _ => return cut_err(fail.context(label("child field"))).parse_next(input),
    };
    Ok(Condition::Child {
        name: name.to_string(),
        test,
    })
}

/// Parse `leaf`, `none`, or a node kind.
fn sibling_test(input: &mut &str) -> ModalResult<SiblingTest> {
    kind_name
        .map(|name| match name {
            "leaf" => SiblingTest::Leaf,
            "none" => SiblingTest::None,
            other => SiblingTest::Kind(other.to_string()),
        })
        .context(expected("leaf, none or a node kind"))
        .parse_next(input)
}

/// Parse a comparison operator followed by an unsigned number.
fn numeric_comparison(input: &mut &str) -> ModalResult<(Comparison, usize)> {
    ws(input)?;
    let op = alt((
        ">=".value(Comparison::Ge),
        "<=".value(Comparison::Le),
        '='.value(Comparison::Eq),
        '<'.value(Comparison::Lt),
        '>'.value(Comparison::Gt),
    ))
    .context(expected("=, <, <=, > or >="))
    .parse_next(input)?;
    ws(input)?;
    let n: usize = dec_uint.context(expected("a number")).parse_next(input)?;
    Ok((op, n))
}

/// Parse `=` surrounded by optional whitespace.
fn equals(input: &mut &str) -> ModalResult<()> {
    cut_err((ws, '=', ws).void().context(expected("'='"))).parse_next(input)
}

/// Parse a node kind name (lowercase letters, digits and `-`).
fn kind_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        .verify(|name: &str| name.starts_with(|c: char| c.is_ascii_lowercase()))
        .parse_next(input)
}

/// Parse a dotted directive name: pause.short, digit.0
fn dotted_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        .parse_next(input)
}

/// Parse an identifier.
fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

/// Parse a double-quoted string with `\"`, `\\`, `\n` and `\u{XXXX}` escapes.
fn quoted_string(input: &mut &str) -> ModalResult<String> {
    delimited(
        '"',
        repeat(0.., alt((escaped_char, none_of(['"', '\\', '\n'])))).fold(
            String::new,
            |mut acc, c| {
                acc.push(c);
                acc
            },
        ),
        cut_err('"'.context(expected("'\"' to close the string"))),
    )
    .parse_next(input)
}

/// Parse one escape sequence inside a quoted string.
fn escaped_char(input: &mut &str) -> ModalResult<char> {
    '\\'.parse_next(input)?;
    let c = cut_err(any.context(expected("an escape sequence"))).parse_next(input)?;
    match c {
        '"' => Ok('"'),
        '\\' => Ok('\\'),
        'n' => Ok('\n'),
        'u' => cut_err(unicode_escape).parse_next(input),
        _ => cut_err(fail.context(label("escape sequence"))).parse_next(input),
    }
}

/// Parse the `{XXXX}` part of a `\u{XXXX}` escape.
fn unicode_escape(input: &mut &str) -> ModalResult<char> {
    delimited(
        '{',
        take_while(1..=6, |c: char| c.is_ascii_hexdigit()),
        '}',
    )
    .verify_map(|hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32))
    .context(expected("\\u{XXXX} with a valid code point"))
    .parse_next(input)
}
