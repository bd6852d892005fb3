pub mod commands;
pub mod events;
pub mod types;

pub use commands::AiCommand;
pub use events::AiEvent;
pub use types::{AiFeature, ChatMessage, Destination, MessageRole, SuggestedSpotInfo, Trip};
