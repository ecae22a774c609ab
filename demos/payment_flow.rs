//! Walks the full consent-then-pay flow against a mock API, reusing one cached
//! bearer token across every call.

// crates.io
use httpmock::prelude::*;
// self
use openbanking_client::{
	api::{
		AccountIdentification, Amount, ConsentRequest, InstitutionId, Payee, PaymentRequest,
		ReqwestApiClient,
	},
	config::ApiConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-bearer\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/consents");
			then.status(201).header("content-type", "application/json").body(
				"{\"id\":\"cst-demo\",\"status\":\"AUTHORIZED\",\"institutionId\":\"demo-bank\",\
				 \"createdAt\":\"2025-06-01T12:00:00Z\"}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/payments");
			then.status(201).header("content-type", "application/json").body(
				"{\"id\":\"pmt-demo\",\"status\":\"PENDING\",\
				 \"amount\":{\"amount\":\"12.50\",\"currency\":\"GBP\"},\
				 \"createdAt\":\"2025-06-01T12:00:05Z\"}",
			);
		})
		.await;

	let config = ApiConfig::new(
		&server.url("/v1"),
		&server.url("/oauth/token"),
		"demo-client",
		"demo-secret",
	)?;
	let client = ReqwestApiClient::new(config);
	let consent = client
		.consents()
		.create(&ConsentRequest {
			institution_id: InstitutionId::new("demo-bank")?,
			callback_url: None,
		})
		.await?;

	println!("Consent {} is {:?}.", consent.id, consent.status);

	let payment = client
		.payments()
		.create(&PaymentRequest {
			consent_id: consent.id,
			idempotency_id: "demo-idem-1".into(),
			amount: Amount { amount: "12.50".into(), currency: "GBP".into() },
			payee: Payee {
				name: "Acme Ltd".into(),
				account: AccountIdentification {
					scheme: "SORT_CODE_ACCOUNT_NUMBER".into(),
					identification: "12345612345678".into(),
				},
			},
			reference: Some("Invoice 42".into()),
		})
		.await?;

	println!("Payment {} is {:?}.", payment.id, payment.status);

	// One token mint serves both API calls.
	token_mock.assert_calls_async(1).await;

	Ok(())
}
