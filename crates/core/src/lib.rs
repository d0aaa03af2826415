pub mod dialogue;
pub mod parser;
pub mod scene;
pub mod service;
