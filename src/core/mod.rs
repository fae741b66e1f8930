pub mod annotate;
pub mod events;
pub mod progress;
pub mod scanner;
pub mod session;
pub mod trash;
