use async_trait::async_trait;

use crate::repos::membership_repo::{MembershipRepo, MembershipRow};
use crate::services::claim_store::store::{ClaimStoreError, SupplementaryClaimStore};
use crate::services::identity::claims::{Claim, claim_types};

/// Claim store backed by the household membership tables.
#[derive(Debug, Clone)]
pub struct PgMembershipClaimStore {
    repo: MembershipRepo,
}

impl PgMembershipClaimStore {
    pub fn new(repo: MembershipRepo) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SupplementaryClaimStore for PgMembershipClaimStore {
    fn store_name(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_supplementary_claims(
        &self,
        user_identifier: &str,
    ) -> Result<Vec<Claim>, ClaimStoreError> {
        let rows = self.repo.list_for_user(user_identifier).await?;
        Ok(claims_from_rows(&rows))
    }
}

/// Profile claims come from the first row; household claims from every row.
pub fn claims_from_rows(rows: &[MembershipRow]) -> Vec<Claim> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let mut claims = vec![Claim::new(
        claim_types::NAME_IDENTIFIER,
        first.user_id.to_string(),
    )];
    if let Some(email) = first.email.as_deref().filter(|e| !e.is_empty()) {
        claims.push(Claim::new(claim_types::EMAIL, email));
    }
    if let Some(name) = first.display_name.as_deref().filter(|n| !n.is_empty()) {
        claims.push(Claim::new(claim_types::DISPLAY_NAME, name));
    }

    for row in rows {
        if let (Some(household_id), Some(role)) = (row.household_id, row.role.as_deref()) {
            claims.push(Claim::new(
                claim_types::HOUSEHOLD_ID,
                household_id.to_string(),
            ));
            claims.push(Claim::new(claim_types::HOUSEHOLD_ROLE, role));
        }
    }

    claims
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(household: Option<(Uuid, &str)>) -> MembershipRow {
        MembershipRow {
            user_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap(),
            email: Some("bob@x.com".to_string()),
            display_name: None,
            household_id: household.map(|(id, _)| id),
            role: household.map(|(_, r)| r.to_string()),
        }
    }

    #[test]
    fn unknown_user_has_no_claims() {
        assert!(claims_from_rows(&[]).is_empty());
    }

    #[test]
    fn user_without_household_gets_profile_claims_only() {
        let claims = claims_from_rows(&[row(None)]);

        let types: Vec<&str> = claims.iter().map(Claim::claim_type).collect();
        assert_eq!(types, vec!["name-identifier", "email"]);
    }

    #[test]
    fn every_membership_becomes_a_household_pair() {
        let h1 = Uuid::new_v4();
        let h2 = Uuid::new_v4();

        let claims = claims_from_rows(&[row(Some((h1, "owner"))), row(Some((h2, "member")))]);

        let households: Vec<(&str, &str)> = claims
            .iter()
            .filter(|c| c.claim_type().starts_with("household-"))
            .map(|c| (c.claim_type(), c.value()))
            .collect();
        let (h1, h2) = (h1.to_string(), h2.to_string());
        assert_eq!(
            households,
            vec![
                ("household-id", h1.as_str()),
                ("household-role", "owner"),
                ("household-id", h2.as_str()),
                ("household-role", "member"),
            ]
        );
    }
}
