pub mod client;
pub mod types;

pub use client::NotionClient;
pub use types::{Annotation, Block, Color, HeadingLevel, RichText};
