//! Integration tests for rendering speech with the built-in rule pack.

use mathspeak::markup::parse;
use mathspeak::prefs::{NumericFormat, PreferenceSet, SpeechStyle, Verbosity};
use mathspeak::rules::RulePack;
use mathspeak::speech::{FragmentMarker, MAX_DEPTH, RenderError, render, render_speech};
use mathspeak::{Engine, SpeechError};

const SCENARIO: &str = "<math><mi>x</mi><mo>=</mo><msqrt><mn>5</mn></msqrt><mo>+</mo><mn>4</mn></math>";

fn engine() -> Engine {
    Engine::builtin().unwrap()
}

fn speak(markup: &str) -> String {
    engine().speak(markup).unwrap()
}

fn speak_with(markup: &str, prefs: &PreferenceSet) -> String {
    engine().speak_with(markup, prefs).unwrap()
}

fn german() -> PreferenceSet {
    PreferenceSet::builder().language("de".parse().unwrap()).build()
}

fn simple_speak(language: &str) -> PreferenceSet {
    PreferenceSet::builder()
        .language(language.parse().unwrap())
        .speech_style(SpeechStyle::SimpleSpeak)
        .build()
}

// =============================================================================
// Core Scenarios
// =============================================================================

#[test]
fn single_identifier() {
    insta::assert_snapshot!(speak("<math><mi>x</mi></math>"), @"x");
}

#[test]
fn simple_equation() {
    insta::assert_snapshot!(
        speak("<math><mi>x</mi><mo>=</mo><mn>5</mn></math>"),
        @"x is equal to 5"
    );
}

#[test]
fn equation_with_square_root() {
    insta::assert_snapshot!(
        speak(SCENARIO),
        @"x is equal to, the square root of 5, end root; plus 4"
    );
}

#[test]
fn equation_with_square_root_in_german() {
    insta::assert_snapshot!(
        speak_with(SCENARIO, &german()),
        @"x ist gleich, die quadratwurzel von 5, ende der wurzel; plus 4"
    );
}

#[test]
fn output_depends_on_language() {
    assert_ne!(speak(SCENARIO), speak_with(SCENARIO, &german()));
}

#[test]
fn rendering_is_idempotent() {
    let engine = engine();
    let first = engine.speak(SCENARIO).unwrap();
    let second = engine.speak(SCENARIO).unwrap();
    assert_eq!(first, second);

    let pack = RulePack::builtin().unwrap();
    let rules = pack.resolve("en", "ClearSpeak");
    let tree = parse(SCENARIO).unwrap();
    let prefs = PreferenceSet::default();
    assert_eq!(
        render(&tree, &rules, &prefs).unwrap(),
        render(&tree, &rules, &prefs).unwrap()
    );
}

// =============================================================================
// Structures
// =============================================================================

#[test]
fn fractions_by_style() {
    let numeric = "<math><mfrac><mn>1</mn><mn>2</mn></mfrac></math>";
    let symbolic = "<math><mfrac><mi>a</mi><mi>b</mi></mfrac></math>";
    insta::assert_snapshot!(speak(numeric), @"1 over 2");
    insta::assert_snapshot!(speak(symbolic), @"a over b, end fraction");
    insta::assert_snapshot!(
        speak_with(symbolic, &simple_speak("en")),
        @"fraction a over b, end fraction"
    );
    insta::assert_snapshot!(
        speak_with(symbolic, &simple_speak("de")),
        @"bruch a durch b, ende des bruchs"
    );
}

#[test]
fn simple_speak_short_roots() {
    insta::assert_snapshot!(
        speak_with(SCENARIO, &simple_speak("en")),
        @"x is equal to, the square root of 5 plus 4"
    );
}

#[test]
fn powers() {
    insta::assert_snapshot!(
        speak("<math><msup><mi>x</mi><mn>2</mn></msup></math>"),
        @"x squared"
    );
    insta::assert_snapshot!(
        speak("<math><msup><mi>x</mi><mi>n</mi></msup><mo>+</mo><mn>1</mn></math>"),
        @"x raised to the n power, plus 1"
    );
    insta::assert_snapshot!(
        speak_with("<math><msup><mi>x</mi><mn>2</mn></msup></math>", &german()),
        @"x quadrat"
    );
}

#[test]
fn nested_groups_collapse_pauses() {
    let markup = "<math><msqrt><mfrac><mi>a</mi><mi>b</mi></mfrac></msqrt></math>";
    insta::assert_snapshot!(
        speak(markup),
        @"the square root of, a over b, end fraction; end root"
    );
}

#[test]
fn indexed_root() {
    insta::assert_snapshot!(
        speak("<math><mroot><mi>x</mi><mn>3</mn></mroot></math>"),
        @"the 3 root of x, end root"
    );
}

#[test]
fn tables_count_and_index_rows() {
    let markup = "<math><mtable>\
        <mtr><mtd><mn>1</mn></mtd><mtd><mn>2</mn></mtd></mtr>\
        <mtr><mtd><mn>3</mn></mtd></mtr>\
        </mtable></math>";
    insta::assert_snapshot!(
        speak(markup),
        @"table with 2 rows, row 1; 1 2. row 2; 3. end table"
    );
}

#[test]
fn operators() {
    insta::assert_snapshot!(
        speak("<math><mo>-</mo><mn>3</mn><mo>×</mo><mo>(</mo><mi>a</mi><mo>-</mo><mi>b</mi><mo>)</mo></math>"),
        @"negative 3 times open paren a minus b close paren"
    );
    insta::assert_snapshot!(
        speak("<math><mn>2</mn><mo>&InvisibleTimes;</mo><mi>x</mi></math>"),
        @"2 x"
    );
}

#[test]
fn semantics_speaks_presentation_only() {
    let markup = "<math><semantics><mi>x</mi><annotation encoding=\"TeX\">x</annotation></semantics></math>";
    insta::assert_snapshot!(speak(markup), @"x");
}

#[test]
fn unknown_elements_speak_their_children() {
    let speech = engine()
        .render("<math><mblink><mi>x</mi><mo>+</mo></mblink></math>", &PreferenceSet::default())
        .unwrap();
    assert_eq!(speech.text, "x plus");
    assert!(speech.issues.is_empty());
}

// =============================================================================
// Preferences
// =============================================================================

#[test]
fn terse_verbosity() {
    let prefs = PreferenceSet::builder().verbosity(Verbosity::Terse).build();
    insta::assert_snapshot!(
        speak_with(SCENARIO, &prefs),
        @"x is equal to, root 5; plus 4"
    );
}

#[test]
fn numeric_formats() {
    let grouped = PreferenceSet::builder()
        .numeric_format(NumericFormat::Grouped)
        .build();
    insta::assert_snapshot!(speak_with("<math><mn>1234567</mn></math>", &grouped), @"1,234,567");

    let digits = PreferenceSet::builder()
        .numeric_format(NumericFormat::DigitByDigit)
        .build();
    insta::assert_snapshot!(
        speak_with("<math><mn>3.14</mn></math>", &digits),
        @"three point one four"
    );
}

#[test]
fn numeric_formats_follow_language_directives() {
    let grouped = PreferenceSet::builder()
        .language("de".parse().unwrap())
        .numeric_format(NumericFormat::Grouped)
        .build();
    insta::assert_snapshot!(speak_with("<math><mn>1234567</mn></math>", &grouped), @"1.234.567");

    let digits = PreferenceSet::builder()
        .language("de".parse().unwrap())
        .numeric_format(NumericFormat::DigitByDigit)
        .build();
    insta::assert_snapshot!(
        speak_with("<math><mn>3,14</mn></math>", &digits),
        @"drei komma eins vier"
    );
    insta::assert_snapshot!(
        speak_with("<math><mn>-3,14</mn></math>", &digits),
        @"minus drei komma eins vier"
    );
}

#[test]
fn capital_letters_use_language_word() {
    let markup = r#"<math><mi mathvariant="bold">Ab</mi></math>"#;
    insta::assert_snapshot!(speak(markup), @"bold cap A b");
    insta::assert_snapshot!(speak_with(markup, &german()), @"fett groß A b");
}

#[test]
fn per_call_preferences_do_not_persist() {
    let engine = engine();
    engine.speak_with(SCENARIO, &german()).unwrap();
    assert_eq!(engine.preference("Language").unwrap(), "en");
    assert!(engine.speak(SCENARIO).unwrap().starts_with("x is equal to"));
}

#[test]
fn unsupported_language_uses_base_rules() {
    let prefs = PreferenceSet::builder().language("fr".parse().unwrap()).build();
    insta::assert_snapshot!(speak_with(SCENARIO, &prefs), @"x = 5 + 4");
}

// =============================================================================
// Recovery
// =============================================================================

#[test]
fn broken_subtree_falls_back_to_literal_text() {
    let speech = engine()
        .render(
            "<math><mi>x</mi><mo>+</mo><mfrac><mn>1</mn></mfrac></math>",
            &PreferenceSet::default(),
        )
        .unwrap();
    assert_eq!(speech.text, "x plus 1");
    assert_eq!(speech.issues.len(), 1);
    let issue = &speech.issues[0];
    assert_eq!(issue.kind, "mfrac");
    assert_eq!(issue.depth, 1);
    assert_eq!(issue.fallback, "1");
    assert!(issue.message.contains("denominator"), "message: {}", issue.message);
}

#[test]
fn deep_trees_stop_at_the_depth_limit() {
    let depth = MAX_DEPTH + 40;
    let markup = format!(
        "<math>{}<mi>x</mi>{}</math>",
        "<mrow>".repeat(depth),
        "</mrow>".repeat(depth)
    );
    let speech = engine().render(&markup, &PreferenceSet::default()).unwrap();
    assert_eq!(speech.text, "x");
    assert_eq!(speech.issues.len(), 1);
    assert!(speech.issues[0].message.contains("256"));
}

#[test]
fn root_failure_without_text_is_an_error() {
    let pack = RulePack::from_sources([
        ("base.rules", r#"@version = "1.0.0"; ident = mi => "{text}";"#),
    ])
    .unwrap();
    let rules = pack.resolve("en", "ClearSpeak");
    let tree = parse("<math><mrow/></math>").unwrap();
    let err = render(&tree, &rules, &PreferenceSet::default()).unwrap_err();
    assert!(matches!(err, RenderError::NoMatch(_)));
}

#[test]
fn root_failure_with_text_falls_back() {
    let pack = RulePack::from_sources([
        ("base.rules", r#"@version = "1.0.0"; ident = mi => "{text}";"#),
    ])
    .unwrap();
    let rules = pack.resolve("en", "ClearSpeak");
    let tree = parse("<math><mi>x</mi><mo>+</mo><mi>y</mi></math>").unwrap();
    let speech = render_speech(&tree, &rules, &PreferenceSet::default()).unwrap();
    assert_eq!(speech.text, "x + y");
    assert_eq!(speech.issues[0].depth, 0);
}

#[test]
fn silent_expression_is_empty() {
    let err = engine().speak("<math><mspace/></math>").unwrap_err();
    assert_eq!(err, SpeechError::Render(RenderError::Empty));
}

#[test]
fn fragments_keep_group_markers() {
    let speech = engine().render(SCENARIO, &PreferenceSet::default()).unwrap();
    let markers: Vec<FragmentMarker> = speech.fragments.iter().map(|f| f.marker).collect();
    assert!(markers.contains(&FragmentMarker::StartGroup));
    let end = speech
        .fragments
        .iter()
        .find(|f| f.marker == FragmentMarker::EndGroup)
        .unwrap();
    assert_eq!(end.text, "end root");
}

// =============================================================================
// Engine Errors
// =============================================================================

#[test]
fn uninitialized_engine() {
    let err = Engine::new().speak("<math><mi>x</mi></math>").unwrap_err();
    assert_eq!(err, SpeechError::NotInitialized);
}

#[test]
fn malformed_markup() {
    let err = engine().speak("not valid xml").unwrap_err();
    assert!(matches!(err, SpeechError::Parse(_)));
}
