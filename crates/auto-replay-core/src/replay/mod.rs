pub mod enigo_synthesizer;
/// RAII guards around synthesis.
pub mod guard;
pub mod replayer;
/// The OS input injection seam.
pub mod synthesizer;

pub use {
    enigo_synthesizer::EnigoSynthesizer,
    guard::{ButtonReleaseGuard, EchoGuard},
    replayer::{ActionReplayer, LoopOptions, ReplayOutcome},
    synthesizer::{InputSynthesizer, SharedSynthesizer},
};
