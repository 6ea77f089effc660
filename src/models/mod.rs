// Module exports for models

pub mod event;
pub mod occurrence;
pub mod recurrence;
pub mod settings;
pub mod time_span;
