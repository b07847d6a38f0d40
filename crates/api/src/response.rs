//! Response envelopes shared by the handlers.
//!
//! Single resources are returned under `{ "data": ... }`; lists return a
//! [`Page`](tnc_core::pagination::Page) inside the same envelope.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
