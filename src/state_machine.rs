//! Objective-progression state machine
//!
//! Pure state transitions in the Elm Architecture style: the transition
//! function decides, the runtime performs the resulting effects.

mod effect;
pub mod event;
pub mod log;
pub mod reply;
pub mod state;
pub(crate) mod transition;
pub mod turn;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use log::{ConversationLog, Speaker, Utterance};
pub use reply::{parse_reply, AgentReply, DecodeError, Flag};
pub use state::{
    ConvContext, ConvState, ObjectiveCursor, ObjectiveList, Phase, Script, ScriptError, TurnMode,
};
pub use transition::{transition, TransitionError, TransitionResult};
pub use turn::TurnResult;
