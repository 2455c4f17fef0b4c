use serde::de::DeserializeOwned;
use serde_json::Value;

use guestlist_core::ApiError;

use crate::{ClientError, ClientResult};

/// Deserializes a response body into its typed form
pub(crate) fn decode<T>(value: Value) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(|e| ClientError::Api(ApiError::Parse(e.to_string())))
}
