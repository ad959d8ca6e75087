use serde::{Deserialize, Serialize};

/// JWT payload: the user id travels in `iss`, nothing else besides expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String, // user ID
    pub exp: i64,    // expires at (unix timestamp)
}
