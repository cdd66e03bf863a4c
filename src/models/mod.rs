pub mod coordinator;
pub mod faculty;
pub mod record;
