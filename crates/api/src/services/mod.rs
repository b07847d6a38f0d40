//! External services behind trait objects held in [`AppState`](crate::state::AppState).

pub mod quiz_generator;
pub mod storage;
