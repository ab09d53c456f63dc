pub mod chat;
pub mod event;
pub mod message;

pub use chat::*;
pub use event::*;
pub use message::*;
