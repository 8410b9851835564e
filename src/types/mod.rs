// Public modules
pub mod chat_request;
pub mod chat_response;
pub mod message;
pub mod reply;
pub mod transcript;
pub mod usage;

// Re-exports
pub use chat_request::ChatRequest;
pub use chat_response::{ChatResponse, Choice, ChoiceMessage, ResponderErrorObject};
pub use message::{Message, MessageRole};
pub use reply::Reply;
pub use transcript::Transcript;
pub use usage::Usage;
