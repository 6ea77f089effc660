// Service module exports

pub mod conflict;
pub mod database;
pub mod event;
pub mod recurrence;
pub mod scheduler;
pub mod settings;
pub mod store;
