//! Chat front end state and the terminal client built on it.

pub mod backend;
pub mod session;
pub mod terminal;
