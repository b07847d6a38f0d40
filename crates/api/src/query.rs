//! Query parameter types shared across handler modules.

use serde::Deserialize;
use tnc_core::calendar::Locale;
use tnc_core::error::CoreError;
use tnc_core::pagination::{decode_cursor, page_limit};
use tnc_core::types::DbId;

/// `?limit=&next_token=` accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub next_token: Option<String>,
}

impl PageParams {
    /// Clamped page size.
    pub fn limit(&self) -> i64 {
        page_limit(self.limit)
    }

    /// Decoded keyset cursor; malformed tokens are a validation error.
    pub fn cursor(&self) -> Result<Option<DbId>, CoreError> {
        decode_cursor(self.next_token.as_deref())
    }
}

/// `?locale=ko|en` for localized calendar reads.
#[derive(Debug, Default, Deserialize)]
pub struct LocaleParams {
    pub locale: Option<String>,
}

impl LocaleParams {
    pub fn locale(&self) -> Result<Option<Locale>, CoreError> {
        self.locale.as_deref().map(Locale::parse).transpose()
    }
}
