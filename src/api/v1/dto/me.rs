use serde::Serialize;

use crate::services::identity::Claim;

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
    pub value_type: String,
}

impl From<&Claim> for ClaimResponse {
    fn from(c: &Claim) -> Self {
        Self {
            claim_type: c.claim_type().to_string(),
            value: c.value().to_string(),
            value_type: c.value_type().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub name: Option<String>,
    pub user_identifier: Option<String>,
    pub mail_address: Option<String>,
    pub display_name: Option<String>,
    pub authentication_type: String,
    pub claims: Vec<ClaimResponse>,
}
