//! NetSuite RESTlet endpoint addressing.

use reqwest::Url;

const RESTLET_PATH: &str = "/app/site/hosting/restlet.nl";

/// A fully resolved RESTlet URL, query string included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestletEndpoint {
    url: Url,
}

impl RestletEndpoint {
    /// Append `script`, `deploy` and optionally `compid` to `base`.
    ///
    /// Any query already on `base` is kept ahead of the RESTlet parameters.
    pub fn new(mut base: Url, script_id: &str, deploy_id: &str, compid: Option<&str>) -> Self {
        {
            let mut query = base.query_pairs_mut();
            query.append_pair("script", script_id);
            query.append_pair("deploy", deploy_id);
            if let Some(compid) = compid {
                query.append_pair("compid", compid);
            }
        }
        Self { url: base }
    }

    /// The production RESTlet host for `account_id`.
    pub fn for_account(
        account_id: &str,
        script_id: &str,
        deploy_id: &str,
        include_compid: bool,
    ) -> Result<Self, InvalidRestletUrl> {
        let base = default_base_url(account_id)?;
        let compid = include_compid.then_some(account_id);
        Ok(Self::new(base, script_id, deploy_id, compid))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// `https://{account-host}.restlets.api.netsuite.com/app/site/hosting/restlet.nl`
pub fn default_base_url(account_id: &str) -> Result<Url, InvalidRestletUrl> {
    let url = format!(
        "https://{}.restlets.api.netsuite.com{}",
        account_host(account_id),
        RESTLET_PATH
    );
    Url::parse(&url).map_err(|e| InvalidRestletUrl {
        url,
        reason: e.to_string(),
    })
}

/// Hostname label for an account id: lowercase, `_` becomes `-`.
///
/// Sandbox accounts are issued ids like `1234567_SB1`, which NetSuite serves
/// from `1234567-sb1.restlets.api.netsuite.com`.
pub fn account_host(account_id: &str) -> String {
    account_id.to_ascii_lowercase().replace('_', "-")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid RESTlet URL `{url}`: {reason}")]
pub struct InvalidRestletUrl {
    pub url: String,
    pub reason: String,
}
