use base64::{engine::general_purpose::STANDARD, Engine};
use metavec_storage::StorageError;
use reqwest::Url;

const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

#[derive(Clone)]
pub enum Credentials {
    SharedKey { account: String, key: Vec<u8> },
    SharedAccessSignature(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SharedKey { account, .. } => f
                .debug_struct("SharedKey")
                .field("account", account)
                .finish_non_exhaustive(),
            Self::SharedAccessSignature(_) => f.write_str("SharedAccessSignature(..)"),
        }
    }
}

/// The parts of a storage account connection string this crate needs.
#[derive(Clone, Debug)]
pub struct ConnectionString {
    pub blob_endpoint: Url,
    pub credentials: Credentials,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let mut protocol = "https";
        let mut account_name = None;
        let mut account_key = None;
        let mut endpoint_suffix = "core.windows.net";
        let mut blob_endpoint = None;
        let mut sas = None;
        let mut development = false;

        for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                StorageError::InvalidConfig(format!("malformed connection string segment {pair:?}"))
            })?;
            match key {
                "DefaultEndpointsProtocol" => protocol = value,
                "AccountName" => account_name = Some(value),
                "AccountKey" => account_key = Some(value),
                "EndpointSuffix" => endpoint_suffix = value,
                "BlobEndpoint" => blob_endpoint = Some(value),
                "SharedAccessSignature" => sas = Some(value),
                "UseDevelopmentStorage" => development = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if development {
            account_name = account_name.or(Some(DEV_ACCOUNT_NAME));
            account_key = account_key.or(Some(DEV_ACCOUNT_KEY));
            blob_endpoint = blob_endpoint.or(Some(DEV_BLOB_ENDPOINT));
        }

        let blob_endpoint = match (blob_endpoint, account_name) {
            (Some(endpoint), _) => endpoint.to_owned(),
            (None, Some(account)) => format!("{protocol}://{account}.blob.{endpoint_suffix}"),
            (None, None) => {
                return Err(StorageError::InvalidConfig(
                    "connection string has neither BlobEndpoint nor AccountName".into(),
                ))
            }
        };
        let blob_endpoint = Url::parse(&blob_endpoint)
            .map_err(|e| StorageError::InvalidConfig(format!("invalid blob endpoint: {e}")))?;

        let credentials = match (sas, account_name, account_key) {
            (Some(sas), _, _) => {
                Credentials::SharedAccessSignature(sas.trim_start_matches('?').to_owned())
            }
            (None, Some(account), Some(key)) => Credentials::SharedKey {
                account: account.to_owned(),
                key: STANDARD
                    .decode(key)
                    .map_err(|e| StorageError::InvalidConfig(format!("invalid AccountKey: {e}")))?,
            },
            _ => {
                return Err(StorageError::InvalidConfig(
                    "connection string needs AccountName and AccountKey, or SharedAccessSignature"
                        .into(),
                ))
            }
        };

        Ok(Self {
            blob_endpoint,
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_account_key_connection_string() {
        let parsed = ConnectionString::parse(
            "DefaultEndpointsProtocol=https;AccountName=weez;AccountKey=c2VjcmV0;EndpointSuffix=core.windows.net",
        )
        .unwrap();

        assert_eq!(
            parsed.blob_endpoint.as_str(),
            "https://weez.blob.core.windows.net/"
        );
        match parsed.credentials {
            Credentials::SharedKey { account, key } => {
                assert_eq!(account, "weez");
                assert_eq!(key, b"secret");
            }
            other => panic!("unexpected credentials {other:?}"),
        }
    }

    #[test]
    fn parses_sas_connection_string() {
        let parsed = ConnectionString::parse(
            "BlobEndpoint=https://weez.blob.core.windows.net/;SharedAccessSignature=sv=2021-08-06&sig=abc%3D",
        )
        .unwrap();

        assert_eq!(parsed.blob_endpoint.host_str(), Some("weez.blob.core.windows.net"));
        assert!(matches!(
            parsed.credentials,
            Credentials::SharedAccessSignature(sas) if sas == "sv=2021-08-06&sig=abc%3D"
        ));
    }

    #[test]
    fn development_storage_points_at_azurite() {
        let parsed = ConnectionString::parse("UseDevelopmentStorage=true").unwrap();

        assert_eq!(
            parsed.blob_endpoint.as_str(),
            "http://127.0.0.1:10000/devstoreaccount1"
        );
        assert!(matches!(
            parsed.credentials,
            Credentials::SharedKey { account, .. } if account == DEV_ACCOUNT_NAME
        ));
    }

    #[test]
    fn rejects_missing_credentials() {
        assert!(matches!(
            ConnectionString::parse("AccountName=weez"),
            Err(StorageError::InvalidConfig(_))
        ));
        assert!(matches!(
            ConnectionString::parse("garbage"),
            Err(StorageError::InvalidConfig(_))
        ));
    }
}
