//! Domain logic

pub mod chat;

pub use chat::{ChatService, ImageResolver, RuntimeGenerator, TextGenerator};
