use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HouseholdResponse {
    pub household_id: String,
    pub role: String,
}
