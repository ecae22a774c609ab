//! Refund endpoints and models.

// self
use crate::{
	_prelude::*,
	api::{Amount, ApiClient, ApiPage, PaymentId, RefundId, encode_body},
	http::{ApiTransport, HttpMethod},
	obs::CallKind,
};

/// Lifecycle status reported for a refund.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
	/// Accepted and awaiting execution.
	Pending,
	/// Funds returned to the payer.
	Completed,
	/// Rejected or failed at the institution.
	Failed,
}

/// Request payload for refunding a payment, fully or partially.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
	/// Amount to return; omitted means a full refund.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub amount: Option<Amount>,
	/// Free-text reason recorded against the refund.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
}

/// A refund resource as reported by the API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
	/// Refund identifier.
	pub id: RefundId,
	/// Payment the refund applies to.
	pub payment_id: PaymentId,
	/// Current lifecycle status.
	pub status: RefundStatus,
	/// Amount being returned.
	pub amount: Amount,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

/// Refund operations.
pub struct RefundsApi<'a, T>(pub(crate) &'a ApiClient<T>)
where
	T: ?Sized + ApiTransport;
impl<T> RefundsApi<'_, T>
where
	T: ?Sized + ApiTransport,
{
	/// Requests a refund against a completed payment.
	pub async fn create(&self, payment: &PaymentId, request: &RefundRequest) -> Result<Refund> {
		self.0
			.request_json(
				CallKind::Refunds,
				"create",
				HttpMethod::Post,
				&format!("payments/{payment}/refunds"),
				Some(encode_body(request)?),
			)
			.await
	}

	/// Lists every refund recorded against a payment.
	pub async fn list(&self, payment: &PaymentId) -> Result<Vec<Refund>> {
		self.0
			.request_json::<ApiPage<Refund>>(
				CallKind::Refunds,
				"list",
				HttpMethod::Get,
				&format!("payments/{payment}/refunds"),
				None,
			)
			.await
			.map(|page| page.data)
	}
}
