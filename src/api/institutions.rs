//! Institution metadata endpoints and models.

// self
use crate::{
	_prelude::*,
	api::{ApiClient, ApiPage, InstitutionId},
	http::{ApiTransport, HttpMethod},
	obs::CallKind,
};

/// A financial institution reachable through the payment API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
	/// Institution identifier used when creating consents.
	pub id: InstitutionId,
	/// Human-readable institution name.
	pub name: String,
	/// ISO 3166-1 alpha-2 country codes the institution operates in.
	#[serde(default)]
	pub countries: Vec<String>,
	/// Feature labels advertised by the institution (e.g. refunds support).
	#[serde(default)]
	pub features: Vec<String>,
}

/// Institution metadata operations.
pub struct InstitutionsApi<'a, T>(pub(crate) &'a ApiClient<T>)
where
	T: ?Sized + ApiTransport;
impl<T> InstitutionsApi<'_, T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists every institution available to this tenant.
	pub async fn list(&self) -> Result<Vec<Institution>> {
		self.0
			.request_json::<ApiPage<Institution>>(
				CallKind::Institutions,
				"list",
				HttpMethod::Get,
				"institutions",
				None,
			)
			.await
			.map(|page| page.data)
	}

	/// Fetches one institution by identifier.
	pub async fn get(&self, id: &InstitutionId) -> Result<Institution> {
		self.0
			.request_json(
				CallKind::Institutions,
				"get",
				HttpMethod::Get,
				&format!("institutions/{id}"),
				None,
			)
			.await
	}
}
