pub mod rings;
pub mod view_state;
