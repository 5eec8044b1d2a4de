/// Story playback: the pure state machine and its timer-driven runner
pub mod player;
pub mod viewer;

pub use player::{ClickZone, ExitReason, Phase, StoryPlayer, Transition};
pub use viewer::{StoryViewer, ViewerCommand, ViewerEvent, ViewerFrame};
