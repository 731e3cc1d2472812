//! Rule matching and speech rendering.

mod context;
mod error;
mod fragment;
mod matcher;
mod numbers;
mod renderer;
mod transforms;

pub use context::{MAX_DEPTH, RenderContext};
pub use error::{MatchError, RenderError};
pub use fragment::{FragmentMarker, SpeechFragment, join};
pub use matcher::{condition_holds, match_rule};
pub use numbers::speak_number;
pub use renderer::{RenderIssue, Speech, render, render_speech};
pub use transforms::{TransformContext, TransformFn, TransformRegistry};
