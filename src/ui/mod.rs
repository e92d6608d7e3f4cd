pub mod conversation;
pub mod shell;
