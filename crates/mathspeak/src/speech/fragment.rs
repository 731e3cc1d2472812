//! Speech fragments and the join that turns them into text.

use serde::Serialize;

use crate::parser::PauseStrength;
use crate::rules::Settings;

/// What a fragment contributes besides its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentMarker {
    /// Spoken words.
    Plain,
    /// Start of a prosodic group; spoken as a short pause.
    StartGroup,
    /// End of a group; the fragment text is the optional end marker.
    EndGroup,
    /// A pause between words.
    Pause(PauseStrength),
}

/// One piece of rendered speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechFragment {
    pub text: String,
    pub marker: FragmentMarker,
}

impl SpeechFragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marker: FragmentMarker::Plain,
        }
    }

    pub fn start_group() -> Self {
        Self {
            text: String::new(),
            marker: FragmentMarker::StartGroup,
        }
    }

    pub fn end_group(marker: Option<&str>) -> Self {
        Self {
            text: marker.unwrap_or_default().to_string(),
            marker: FragmentMarker::EndGroup,
        }
    }

    pub fn pause(strength: PauseStrength) -> Self {
        Self {
            text: String::new(),
            marker: FragmentMarker::Pause(strength),
        }
    }
}

enum Token<'a> {
    Word(&'a str),
    Pause(PauseStrength),
}

/// Join fragments into speech text.
///
/// Words are separated by single spaces. Runs of adjacent pauses collapse to
/// the strongest one, which is written as the language's pause punctuation
/// attached to the preceding word. Pauses before the first word or after the
/// last are dropped.
pub fn join(fragments: &[SpeechFragment], settings: &Settings) -> String {
    let mut tokens = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        match fragment.marker {
            FragmentMarker::Plain => {
                let text = fragment.text.trim();
                if !text.is_empty() {
                    tokens.push(Token::Word(text));
                }
            }
            FragmentMarker::StartGroup => tokens.push(Token::Pause(PauseStrength::Short)),
            FragmentMarker::EndGroup => {
                tokens.push(Token::Pause(PauseStrength::Short));
                let marker = fragment.text.trim();
                if !marker.is_empty() {
                    tokens.push(Token::Word(marker));
                }
                tokens.push(Token::Pause(PauseStrength::Medium));
            }
            FragmentMarker::Pause(strength) => tokens.push(Token::Pause(strength)),
        }
    }

    let mut output = String::new();
    let mut pending: Option<PauseStrength> = None;
    for token in tokens {
        match token {
            Token::Pause(strength) => {
                pending = Some(pending.map_or(strength, |current| current.max(strength)));
            }
            Token::Word(word) => {
                if !output.is_empty() {
                    if let Some(strength) = pending {
                        output.push_str(settings.pause(strength));
                    }
                    output.push(' ');
                }
                pending = None;
                output.push_str(word);
            }
        }
    }
    output
}
