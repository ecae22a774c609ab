//! Payment endpoints and models.

// self
use crate::{
	_prelude::*,
	api::{ApiClient, ConsentId, PaymentId, encode_body},
	http::{ApiTransport, HttpMethod},
	obs::CallKind,
};

/// Monetary amount expressed as a decimal string plus ISO 4217 currency code.
///
/// Amounts stay as strings end to end; the API is the authority on decimal
/// semantics and the SDK never does arithmetic on them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
	/// Decimal amount, e.g. `"12.50"`.
	pub amount: String,
	/// ISO 4217 currency code, e.g. `"GBP"`.
	pub currency: String,
}

/// Account identification for the payee side of a payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdentification {
	/// Identification scheme, e.g. `"IBAN"` or `"SORT_CODE_ACCOUNT_NUMBER"`.
	pub scheme: String,
	/// Scheme-specific identification string.
	pub identification: String,
}

/// Payee details for a payment request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
	/// Account holder name.
	pub name: String,
	/// Account the funds are sent to.
	pub account: AccountIdentification,
}

/// Lifecycle status reported for a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
	/// Accepted and awaiting execution at the institution.
	Pending,
	/// Funds left the payer's account.
	Completed,
	/// Rejected or failed at the institution.
	Failed,
}

/// Request payload for initiating a payment under an authorized consent.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
	/// Authorized consent the payment executes under.
	pub consent_id: ConsentId,
	/// Caller-chosen idempotency key; retried submissions reuse it.
	pub idempotency_id: String,
	/// Amount to transfer.
	pub amount: Amount,
	/// Payee receiving the funds.
	pub payee: Payee,
	/// Statement reference shown to both parties.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reference: Option<String>,
}

/// A payment resource as reported by the API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
	/// Payment identifier.
	pub id: PaymentId,
	/// Current lifecycle status.
	pub status: PaymentStatus,
	/// Amount being transferred.
	pub amount: Amount,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Completion instant, once the institution reports one.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub completed_at: Option<OffsetDateTime>,
}

/// Payment operations.
pub struct PaymentsApi<'a, T>(pub(crate) &'a ApiClient<T>)
where
	T: ?Sized + ApiTransport;
impl<T> PaymentsApi<'_, T>
where
	T: ?Sized + ApiTransport,
{
	/// Initiates a payment under an authorized consent.
	pub async fn create(&self, request: &PaymentRequest) -> Result<Payment> {
		self.0
			.request_json(
				CallKind::Payments,
				"create",
				HttpMethod::Post,
				"payments",
				Some(encode_body(request)?),
			)
			.await
	}

	/// Fetches a payment by identifier.
	pub async fn get(&self, id: &PaymentId) -> Result<Payment> {
		self.0
			.request_json(CallKind::Payments, "get", HttpMethod::Get, &format!("payments/{id}"), None)
			.await
	}
}
