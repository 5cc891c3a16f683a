use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub name: Option<String>,
    pub display_name: Option<String>,
}

impl SessionResponse {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            name: None,
            display_name: None,
        }
    }
}
