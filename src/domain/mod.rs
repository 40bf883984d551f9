pub mod classify;
pub mod format;
pub mod scores;
pub mod ticket;
