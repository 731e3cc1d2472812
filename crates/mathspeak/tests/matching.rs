//! Integration tests for rule matching.

use std::sync::Arc;

use mathspeak::markup::{ExpressionNode, parse};
use mathspeak::prefs::{PreferenceSet, Verbosity};
use mathspeak::rules::{ResolvedRules, RulePack};
use mathspeak::speech::{MatchError, RenderContext, match_rule};

const BASE: &str = r#"@version = "1.0.0";"#;

fn resolve(language_rules: &str) -> Arc<ResolvedRules> {
    RulePack::from_sources([("base.rules", BASE), ("en/language.rules", language_rules)])
        .unwrap()
        .resolve("en", "ClearSpeak")
}

/// Name of the rule matched by the `index`th child of the root.
fn matched_child(rules: &ResolvedRules, markup: &str, index: usize) -> String {
    matched_child_with(rules, markup, index, &PreferenceSet::default())
}

fn matched_child_with(
    rules: &ResolvedRules,
    markup: &str,
    index: usize,
    prefs: &PreferenceSet,
) -> String {
    let tree = parse(markup).unwrap();
    let root = RenderContext::root(&tree, prefs);
    let context = root.child(&tree, index).unwrap();
    let node: &ExpressionNode = &tree.children()[index];
    match_rule(node, &context, rules).unwrap().name.clone()
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn more_conditions_win() {
    let rules = resolve(
        r#"
        op = mo => "{text}";
        eq = mo[text = "="] => "equals";
        eq_leaf = mo[text = "=", next = leaf] => "equals";
        "#,
    );
    let markup = "<math><mo>=</mo><mn>5</mn></math>";
    assert_eq!(matched_child(&rules, markup, 0), "eq_leaf");
    let markup = "<math><mo>=</mo><msqrt><mn>5</mn></msqrt></math>";
    assert_eq!(matched_child(&rules, markup, 0), "eq");
    let markup = "<math><mo>+</mo></math>";
    assert_eq!(matched_child(&rules, markup, 0), "op");
}

#[test]
fn priority_adds_to_specificity() {
    let rules = resolve(
        r#"
        eq = mo[text = "="] => "equals";
        op = mo :priority(5) => "{text}";
        "#,
    );
    assert_eq!(matched_child(&rules, "<math><mo>=</mo></math>", 0), "op");
}

#[test]
fn declaration_order_breaks_score_ties() {
    let rules = resolve(
        r#"
        first = mi[text = "x"] => "ex";
        second = mi[leaf] => "leaf";
        "#,
    );
    assert_eq!(matched_child(&rules, "<math><mi>x</mi></math>", 0), "first");
}

#[test]
fn wildcards_compete_on_score_and_order() {
    let rules = resolve(
        r#"
        any_leaf = *[leaf] => "{text}";
        ident = mi => "{text}";
        "#,
    );
    // mi (1) ties *[leaf] (1); the wildcard was declared first.
    assert_eq!(matched_child(&rules, "<math><mi>x</mi></math>", 0), "any_leaf");
    assert_eq!(matched_child(&rules, "<math><mrow/></math>", 0), "any_leaf");
}

#[test]
fn higher_layers_win_regardless_of_score() {
    let pack = RulePack::from_sources([
        ("base.rules", r#"@version = "1.0.0"; very = mi[text = "x", leaf, first, last] => "base";"#),
        ("en/language.rules", r#"plain = mi => "language";"#),
    ])
    .unwrap();
    let rules = pack.resolve("en", "ClearSpeak");
    assert_eq!(matched_child(&rules, "<math><mi>x</mi></math>", 0), "plain");
}

// =============================================================================
// Conditions
// =============================================================================

#[test]
fn sibling_and_position_conditions() {
    let rules = resolve(
        r#"
        leading = mo[text = "-", first] => "negative";
        trailing = mo[last] => "{text}";
        before_none = mo[next = none, !first] => "{text}";
        between = mo[prev = mi, next = mn] => "{text}";
        op = mo => "{text}";
        "#,
    );
    let markup = "<math><mo>-</mo><mi>x</mi><mo>+</mo><mn>1</mn><mo>!</mo></math>";
    assert_eq!(matched_child(&rules, markup, 0), "leading");
    assert_eq!(matched_child(&rules, markup, 2), "between");
    // `before_none` and `trailing` both hold; two conditions beat one.
    assert_eq!(matched_child(&rules, markup, 4), "before_none");
}

#[test]
fn child_conditions() {
    let rules = resolve(
        r#"
        squared = msup[$superscript.text = "2"] => "{$base} squared";
        ident_base = msup[$base.kind = mi] => "{$base}";
        power = msup => "{$base}";
        "#,
    );
    let markup = "<math><msup><mi>x</mi><mn>2</mn></msup></math>";
    assert_eq!(matched_child(&rules, markup, 0), "squared");
    let markup = "<math><msup><mi>x</mi><mn>3</mn></msup></math>";
    assert_eq!(matched_child(&rules, markup, 0), "ident_base");
    let markup = "<math><msup><mn>2</mn><mn>3</mn></msup></math>";
    assert_eq!(matched_child(&rules, markup, 0), "power");
}

#[test]
fn missing_named_child_fails_the_condition() {
    let rules = resolve(
        r#"
        squared = msup[$superscript.text = "2"] => "{$base}";
        power = msup => "{$children}";
        "#,
    );
    let markup = "<math><msup><mi>x</mi></msup></math>";
    assert_eq!(matched_child(&rules, markup, 0), "power");
}

#[test]
fn attribute_role_and_count_conditions() {
    let rules = resolve(
        r#"
        bold = mi[@mathvariant = "bold"] => "bold {text}";
        ident = mi => "{text}";
        relation = mo[role = relation] => "{text}";
        op = mo => "{text}";
        pair = mrow[children = 2] => "{$children}";
        row = mrow => "{$children}";
        "#,
    );
    let markup = r#"<math><mi mathvariant="bold">v</mi><mo>≤</mo><mrow><mi>a</mi><mi>b</mi></mrow><mrow/></math>"#;
    assert_eq!(matched_child(&rules, markup, 0), "bold");
    assert_eq!(matched_child(&rules, markup, 1), "relation");
    assert_eq!(matched_child(&rules, markup, 2), "pair");
    assert_eq!(matched_child(&rules, markup, 3), "row");
}

#[test]
fn verbosity_condition_uses_preferences() {
    let rules = resolve(
        r#"
        terse = msqrt[verbosity = terse] => "root {$body}";
        sqrt = msqrt => "square root of {$body}";
        "#,
    );
    let markup = "<math><msqrt><mn>2</mn></msqrt></math>";
    assert_eq!(matched_child(&rules, markup, 0), "sqrt");
    let terse = PreferenceSet::builder().verbosity(Verbosity::Terse).build();
    assert_eq!(matched_child_with(&rules, markup, 0, &terse), "terse");
}

#[test]
fn root_and_depth_conditions() {
    let rules = resolve(
        r#"
        top = math[root] => "{$children}";
        deep = mi[depth >= 2] => "deep {text}";
        ident = mi => "{text}";
        "#,
    );
    let tree = parse("<math><mrow><mi>x</mi></mrow></math>").unwrap();
    let prefs = PreferenceSet::default();
    let root = RenderContext::root(&tree, &prefs);
    assert_eq!(match_rule(&tree, &root, &rules).unwrap().name, "top");

    let row = &tree.children()[0];
    let row_context = root.child(&tree, 0).unwrap();
    let ident_context = row_context.child(row, 0).unwrap();
    assert_eq!(ident_context.depth(), 2);
    let rule = match_rule(&row.children()[0], &ident_context, &rules).unwrap();
    assert_eq!(rule.name, "deep");
}

// =============================================================================
// Failures and Determinism
// =============================================================================

#[test]
fn no_candidate_is_no_match() {
    let rules = resolve(r#"ident = mi => "{text}";"#);
    let tree = parse("<math><mi>x</mi></math>").unwrap();
    let prefs = PreferenceSet::default();
    let context = RenderContext::root(&tree, &prefs);
    let err = match_rule(&tree, &context, &rules).unwrap_err();
    assert_eq!(
        err,
        MatchError::NoMatch {
            kind: "math".to_string()
        }
    );
}

#[test]
fn matching_is_deterministic() {
    let pack = RulePack::builtin().unwrap();
    let rules = pack.resolve("en", "ClearSpeak");
    let markup = "<math><mi>x</mi><mo>=</mo><mfrac><mn>1</mn><mn>2</mn></mfrac></math>";
    let first: Vec<String> = (0..3).map(|i| matched_child(&rules, markup, i)).collect();
    for _ in 0..10 {
        let again: Vec<String> = (0..3).map(|i| matched_child(&rules, markup, i)).collect();
        assert_eq!(again, first);
    }
    assert_eq!(first, vec!["identifier", "equals", "simple_fraction"]);
}

#[test]
fn max_depth_limits_descent() {
    let tree = parse("<math><mrow><mi>x</mi></mrow></math>").unwrap();
    let prefs = PreferenceSet::default();
    let root = RenderContext::with_max_depth(&tree, &prefs, 1);
    let row_context = root.child(&tree, 0).unwrap();
    assert!(row_context.child(&tree.children()[0], 0).is_err());
}
