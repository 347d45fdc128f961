pub mod embedding;
pub mod key;
pub mod metadata;
pub mod outcome;
pub mod render;
