use std::time::Duration;

use serde::Deserialize;
use thiserror::Error as ThisError;

use caderneta_format::only_digits;

const VIACEP_BASE_URL: &str = "https://viacep.com.br";

#[derive(Debug, ThisError)]
pub enum LookupError {
    #[error("Address lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Address data behind a postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Wire format of the ViaCEP service. Unknown postal codes come back
/// as a payload carrying only an `erro` marker.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViaCepResponse {
    erro: Option<serde_json::Value>,
    logradouro: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
}

impl From<ViaCepResponse> for Address {
    fn from(payload: ViaCepResponse) -> Self {
        Address {
            street: payload.logradouro.unwrap_or_default(),
            neighborhood: payload.bairro.unwrap_or_default(),
            city: payload.localidade.unwrap_or_default(),
            state: payload.uf.unwrap_or_default(),
        }
    }
}

/// Client for the external postal-code lookup service.
pub struct AddressLookup {
    client: reqwest::Client,
    base_url: String,
}

impl AddressLookup {
    pub fn new() -> Self {
        Self::with_base_url(VIACEP_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Look up a postal code. Anything other than exactly 8 digits
    /// short-circuits to not-found without touching the network; an
    /// `erro` payload from the service maps to not-found as well.
    pub async fn lookup(
        &self,
        postal_code: &str,
    ) -> Result<Option<Address>, LookupError> {
        let digits = only_digits(postal_code);
        if digits.len() != 8 {
            return Ok(None);
        }

        let url = format!("{}/ws/{}/json/", self.base_url, digits);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let payload: ViaCepResponse = response.json().await?;
        if payload.erro.is_some() {
            return Ok(None);
        }
        Ok(Some(payload.into()))
    }
}

impl Default for AddressLookup {
    fn default() -> Self {
        Self::new()
    }
}
