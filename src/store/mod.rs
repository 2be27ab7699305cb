pub mod error;
pub mod json;

use std::future::Future;

use crate::GeneratedAd;

pub use error::StoreError;
pub use json::{JsonAdStore, NewAd};

/// Read access to a user's generated ads, in storage order.
pub trait AdStore {
    fn list_ads(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<GeneratedAd>, StoreError>> + Send;
}
