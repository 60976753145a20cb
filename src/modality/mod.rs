pub mod chat;
pub mod gemini;
pub mod helpers;
pub mod image;
pub mod search;
