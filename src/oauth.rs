//! OAuth 1.0a request signing (RFC 5849) in the form NetSuite token-based
//! authentication expects it.
//!
//! The signature covers:
//! - the uppercase HTTP method,
//! - the base URL (scheme and host lowercased, default port dropped, no query),
//! - the URL's query parameters, any registered form parameters, and the
//!   `oauth_*` protocol parameters, percent-encoded and sorted.
//!
//! JSON request bodies are never part of the signature, and neither is `realm`.
//!
//! Flow:
//! 1. Build the protocol parameters from the credentials plus a nonce/timestamp
//! 2. Build the signature base string
//! 3. HMAC it with `enc(consumer_secret)&enc(token_secret)` and base64 the digest
//! 4. Format the `Authorization: OAuth ...` header

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderValue, InvalidHeaderValue};
use reqwest::{Method, Url};
use sha1::Sha1;
use sha2::Sha256;

use crate::nonce;

pub const OAUTH_VERSION: &str = "1.0";

/// HMAC flavour used for `oauth_signature_method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureMethod {
    HmacSha1,
    #[default]
    HmacSha256,
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HmacSha1 => "HMAC-SHA1",
            Self::HmacSha256 => "HMAC-SHA256",
        }
    }

    fn digest(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>, SigningError> {
        match self {
            Self::HmacSha1 => {
                let mut mac = Hmac::<Sha1>::new_from_slice(key)
                    .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            Self::HmacSha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(key)
                    .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = UnknownSignatureMethod;

    /// Accepts `HMAC-SHA1` / `HMAC-SHA256` in any case, plus the bare hash names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HMAC-SHA1" | "SHA1" => Ok(Self::HmacSha1),
            "HMAC-SHA256" | "SHA256" => Ok(Self::HmacSha256),
            _ => Err(UnknownSignatureMethod(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported signature method `{0}`, expected HMAC-SHA1 or HMAC-SHA256")]
pub struct UnknownSignatureMethod(pub String);

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("HMAC key rejected: {0}")]
    InvalidKey(String),
    #[error("authorization header is not a valid header value")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
}

/// Integration and access-token credentials for one NetSuite account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token_id: String,
    pub token_secret: String,
}

impl Credentials {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token_id: token_id.into(),
            token_secret: token_secret.into(),
        }
    }

    fn signing_key(&self) -> String {
        format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.token_secret)
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token_id", &self.token_id)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

/// The single-use part of a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolParams {
    pub nonce: String,
    pub timestamp: u64,
}

impl ProtocolParams {
    pub fn new(nonce: impl Into<String>, timestamp: u64) -> Self {
        Self {
            nonce: nonce.into(),
            timestamp,
        }
    }

    /// A new random nonce and the current time.
    pub fn fresh() -> Self {
        Self::new(nonce::generate_nonce(), nonce::unix_timestamp())
    }
}

/// The parts of an outbound request that go into the signature.
#[derive(Debug, Clone)]
pub struct SignableRequest<'a> {
    method: Method,
    url: &'a Url,
    extra_params: Vec<(String, String)>,
}

impl<'a> SignableRequest<'a> {
    pub fn new(method: Method, url: &'a Url) -> Self {
        Self {
            method,
            url,
            extra_params: Vec::new(),
        }
    }

    /// Register a decoded `application/x-www-form-urlencoded` body parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.push((key.into(), value.into()));
        self
    }
}

/// A formatted `Authorization` header value plus the pieces it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationHeader {
    value: String,
    signature: String,
    nonce: String,
    timestamp: u64,
}

impl AuthorizationHeader {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The base64 signature, before percent-encoding.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn to_header_value(&self) -> Result<HeaderValue, SigningError> {
        Ok(HeaderValue::from_str(&self.value)?)
    }
}

impl fmt::Display for AuthorizationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Signs outbound requests for one set of credentials.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
    method: SignatureMethod,
    realm: Option<String>,
}

impl Signer {
    pub fn new(credentials: Credentials, method: SignatureMethod) -> Self {
        Self {
            credentials,
            method,
            realm: None,
        }
    }

    /// Prefix headers with `realm="<realm>"`. NetSuite expects the account id here.
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    pub fn method(&self) -> SignatureMethod {
        self.method
    }

    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    /// Sign with a fresh nonce and timestamp.
    pub fn sign(&self, request: &SignableRequest<'_>) -> Result<AuthorizationHeader, SigningError> {
        self.sign_with(request, &ProtocolParams::fresh())
    }

    /// Sign with caller-supplied nonce and timestamp. Deterministic.
    pub fn sign_with(
        &self,
        request: &SignableRequest<'_>,
        params: &ProtocolParams,
    ) -> Result<AuthorizationHeader, SigningError> {
        let protocol = self.protocol_params(params);
        let base_string = signature_base_string(request, &protocol);
        let digest = self
            .method
            .digest(self.credentials.signing_key().as_bytes(), base_string.as_bytes())?;
        let signature = base64::engine::general_purpose::STANDARD.encode(digest);

        Ok(AuthorizationHeader {
            value: format_header(self.realm.as_deref(), &protocol, &signature),
            signature,
            nonce: params.nonce.clone(),
            timestamp: params.timestamp,
        })
    }

    /// The exact string [`Signer::sign_with`] would HMAC.
    pub fn base_string(&self, request: &SignableRequest<'_>, params: &ProtocolParams) -> String {
        signature_base_string(request, &self.protocol_params(params))
    }

    fn protocol_params(&self, params: &ProtocolParams) -> Vec<(&'static str, String)> {
        vec![
            ("oauth_consumer_key", self.credentials.consumer_key.clone()),
            ("oauth_nonce", params.nonce.clone()),
            ("oauth_signature_method", self.method.as_str().to_string()),
            ("oauth_timestamp", params.timestamp.to_string()),
            ("oauth_token", self.credentials.token_id.clone()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ]
    }
}

/// RFC 3986 percent-encoding: everything except `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Scheme, host, non-default port and path of `url`.
pub fn base_url(url: &Url) -> String {
    let mut base = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        base.push(':');
        base.push_str(&port.to_string());
    }
    base.push_str(url.path());
    base
}

fn signature_base_string(request: &SignableRequest<'_>, protocol: &[(&str, String)]) -> String {
    let mut pairs: Vec<(String, String)> = request
        .url
        .query_pairs()
        .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
        .chain(
            request
                .extra_params
                .iter()
                .map(|(k, v)| (percent_encode(k), percent_encode(v))),
        )
        .chain(
            protocol
                .iter()
                .map(|(k, v)| (percent_encode(k), percent_encode(v))),
        )
        .collect();
    pairs.sort();

    let param_string = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        request.method.as_str().to_ascii_uppercase(),
        percent_encode(&base_url(request.url)),
        percent_encode(&param_string)
    )
}

fn format_header(realm: Option<&str>, protocol: &[(&str, String)], signature: &str) -> String {
    let mut oauth: Vec<(&str, &str)> = protocol.iter().map(|(k, v)| (*k, v.as_str())).collect();
    oauth.push(("oauth_signature", signature));
    oauth.sort();

    let fields = realm
        .map(|r| ("realm", r))
        .into_iter()
        .chain(oauth)
        .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
        .collect::<Vec<_>>();

    format!("OAuth {}", fields.join(", "))
}

/// Split an `OAuth k="v", ...` header into decoded pairs, in header order.
///
/// Returns `None` if the value is not an OAuth header or a field is malformed.
pub fn parse_authorization_header(value: &str) -> Option<Vec<(String, String)>> {
    let fields = value.strip_prefix("OAuth ")?;
    fields
        .split(',')
        .map(|field| {
            let (key, quoted) = field.trim().split_once('=')?;
            let raw = quoted.strip_prefix('"')?.strip_suffix('"')?;
            let decoded = urlencoding::decode(raw).ok()?;
            Some((key.to_string(), decoded.into_owned()))
        })
        .collect()
}
