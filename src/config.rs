//! Process configuration, read once from the environment at startup.

use std::env;

use regex::Regex;
use reqwest::Url;

use crate::oauth::{Credentials, SignatureMethod, Signer};
use crate::restlet::{InvalidRestletUrl, RestletEndpoint};

pub const NETSUITE_ACCOUNT: &str = "NETSUITE_ACCOUNT";
pub const CONSUMER_KEY: &str = "CONSUMER_KEY";
pub const CONSUMER_SECRET: &str = "CONSUMER_SECRET";
pub const TOKEN_ID: &str = "TOKEN_ID";
pub const TOKEN_SECRET: &str = "TOKEN_SECRET";
pub const RESTLET_SCRIPT_ID: &str = "RESTLET_SCRIPT_ID";
pub const RESTLET_DEPLOY_ID: &str = "RESTLET_DEPLOY_ID";
pub const OAUTH_SIGNATURE_METHOD: &str = "OAUTH_SIGNATURE_METHOD";
pub const NETSUITE_INCLUDE_COMPID: &str = "NETSUITE_INCLUDE_COMPID";
pub const NETSUITE_OAUTH_REALM: &str = "NETSUITE_OAUTH_REALM";
pub const NETSUITE_RESTLET_BASE_URL: &str = "NETSUITE_RESTLET_BASE_URL";

const REQUIRED: [&str; 7] = [
    NETSUITE_ACCOUNT,
    CONSUMER_KEY,
    CONSUMER_SECRET,
    TOKEN_ID,
    TOKEN_SECRET,
    RESTLET_SCRIPT_ID,
    RESTLET_DEPLOY_ID,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("NETSUITE_ACCOUNT `{0}` may only contain letters, digits, `_` and `-`")]
    InvalidAccountId(String),
    #[error("OAUTH_SIGNATURE_METHOD: {0}")]
    InvalidSignatureMethod(#[from] crate::oauth::UnknownSignatureMethod),
    #[error("{name} must be a boolean, got `{value}`")]
    InvalidFlag { name: &'static str, value: String },
    #[error("{name} is not an absolute URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
    #[error(transparent)]
    Endpoint(#[from] InvalidRestletUrl),
}

/// Everything needed to sign and forward a lead to one RESTlet deployment.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub account_id: String,
    pub credentials: Credentials,
    pub script_id: String,
    pub deploy_id: String,
    pub signature_method: SignatureMethod,
    /// Append `compid=<account_id>` to the RESTlet query.
    pub include_compid: bool,
    /// Send `realm="<account_id>"` in the Authorization header.
    pub include_realm: bool,
    /// Replaces `https://{account}.restlets.api.netsuite.com/app/site/hosting/restlet.nl`.
    pub restlet_base_url: Option<Url>,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Values are trimmed and blank means unset.
    ///
    /// Every missing required variable is reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&'static str> = REQUIRED
            .iter()
            .copied()
            .filter(|&name| get(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(vec![name]));

        let account_id = required(NETSUITE_ACCOUNT)?;
        if !is_valid_account_id(&account_id) {
            return Err(ConfigError::InvalidAccountId(account_id));
        }

        let signature_method = match get(OAUTH_SIGNATURE_METHOD) {
            Some(method) => method.parse()?,
            None => SignatureMethod::default(),
        };

        let restlet_base_url = match get(NETSUITE_RESTLET_BASE_URL) {
            Some(raw) => Some(Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
                name: NETSUITE_RESTLET_BASE_URL,
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            credentials: Credentials::new(
                required(CONSUMER_KEY)?,
                required(CONSUMER_SECRET)?,
                required(TOKEN_ID)?,
                required(TOKEN_SECRET)?,
            ),
            script_id: required(RESTLET_SCRIPT_ID)?,
            deploy_id: required(RESTLET_DEPLOY_ID)?,
            signature_method,
            include_compid: parse_flag(NETSUITE_INCLUDE_COMPID, get(NETSUITE_INCLUDE_COMPID), true)?,
            include_realm: parse_flag(NETSUITE_OAUTH_REALM, get(NETSUITE_OAUTH_REALM), true)?,
            restlet_base_url,
            account_id,
        })
    }

    /// The RESTlet URL requests are signed for and sent to.
    pub fn endpoint(&self) -> Result<RestletEndpoint, ConfigError> {
        let Some(base) = &self.restlet_base_url else {
            return Ok(RestletEndpoint::for_account(
                &self.account_id,
                &self.script_id,
                &self.deploy_id,
                self.include_compid,
            )?);
        };
        let compid = self.include_compid.then_some(self.account_id.as_str());
        Ok(RestletEndpoint::new(base.clone(), &self.script_id, &self.deploy_id, compid))
    }

    pub fn signer(&self) -> Signer {
        let signer = Signer::new(self.credentials.clone(), self.signature_method);
        if self.include_realm {
            signer.with_realm(&self.account_id)
        } else {
            signer
        }
    }
}

/// The account id becomes a hostname label, so only allow characters that are safe there.
fn is_valid_account_id(account_id: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_-]+$")
        .map(|re| re.is_match(account_id))
        .unwrap_or(false)
}

fn parse_flag(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}
