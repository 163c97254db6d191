pub mod chat_engine;
pub mod directory;
pub mod events;
pub mod grouping;
pub mod orchestrator;
pub mod roster;
pub mod session;
pub mod store;
pub mod validation;
