//! Consent endpoints and models.
//!
//! A consent represents the payer's authorization for the SDK to initiate
//! payments at their institution. Consents are created, polled until
//! authorized, and eventually revoked; the institution drives the state
//! transitions, the API merely reports them.

// self
use crate::{
	_prelude::*,
	api::{ApiClient, ConsentId, InstitutionId, encode_body},
	http::{ApiTransport, HttpMethod},
	obs::CallKind,
};

/// Lifecycle status reported for a consent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsentStatus {
	/// Created but not yet authorized by the payer.
	AwaitingAuthorization,
	/// Authorized and usable for payment initiation.
	Authorized,
	/// Used for a payment and no longer reusable.
	Consumed,
	/// Rejected by the payer or the institution.
	Rejected,
	/// Revoked by the payer or via [`ConsentsApi::revoke`].
	Revoked,
	/// Lapsed without being consumed.
	Expired,
}

/// Request payload for creating a payment consent.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRequest {
	/// Institution the payer banks with.
	pub institution_id: InstitutionId,
	/// URL the payer is sent back to after authorizing at the institution.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub callback_url: Option<String>,
}

/// A consent resource as reported by the API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
	/// Consent identifier.
	pub id: ConsentId,
	/// Current lifecycle status.
	pub status: ConsentStatus,
	/// Institution the consent was created against.
	pub institution_id: InstitutionId,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Authorization URL the payer must visit while the consent is pending.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authorization_url: Option<String>,
}

/// Consent operations.
pub struct ConsentsApi<'a, T>(pub(crate) &'a ApiClient<T>)
where
	T: ?Sized + ApiTransport;
impl<T> ConsentsApi<'_, T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a payment consent against the payer's institution.
	pub async fn create(&self, request: &ConsentRequest) -> Result<Consent> {
		self.0
			.request_json(
				CallKind::Consents,
				"create",
				HttpMethod::Post,
				"consents",
				Some(encode_body(request)?),
			)
			.await
	}

	/// Fetches a consent by identifier.
	pub async fn get(&self, id: &ConsentId) -> Result<Consent> {
		self.0
			.request_json(CallKind::Consents, "get", HttpMethod::Get, &format!("consents/{id}"), None)
			.await
	}

	/// Revokes a consent; the institution rejects future payments against it.
	pub async fn revoke(&self, id: &ConsentId) -> Result<()> {
		self.0
			.request_empty(CallKind::Consents, "revoke", HttpMethod::Delete, &format!("consents/{id}"))
			.await
	}
}
