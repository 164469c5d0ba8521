use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::error::AffinyxError;

const USER_AGENT: &str = "affinyx/0.1 (research)";

/// A sandbox-capped HTTP client that only allows requests to approved domains.
/// Every remote call in this workspace goes through one of these, so a typo'd
/// or attacker-supplied URL can never reach an unexpected host.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist: the two
    /// scientific database hosts this workspace talks to, plus localhost
    /// for tests against stub servers.
    pub fn new() -> Result<Self, AffinyxError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "www.ebi.ac.uk",   // ChEMBL
            "search.rcsb.org", // PDB search
            "data.rcsb.org",   // PDB data + GraphQL
            "localhost",       // test stubs
            "127.0.0.1",       // test stubs alt
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AffinyxError::Sandbox(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for GET requests.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, AffinyxError> {
        if !self.is_allowed(url) {
            return Err(AffinyxError::Sandbox(format!(
                "domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for POST requests.
    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, AffinyxError> {
        if !self.is_allowed(url) {
            return Err(AffinyxError::Sandbox(format!(
                "domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist_covers_database_hosts() {
        let client = SandboxClient::new().unwrap();
        assert!(client.is_allowed("https://www.ebi.ac.uk/chembl/api/data/target.json"));
        assert!(client.is_allowed("https://search.rcsb.org/rcsbsearch/v2/query"));
        assert!(client.is_allowed("https://data.rcsb.org/rest/v1/core/entry/6W8I"));
    }

    #[test]
    fn test_unknown_host_is_denied() {
        let client = SandboxClient::new().unwrap();
        assert!(!client.is_allowed("https://example.com/anything"));
        assert!(client.get("https://example.com/anything").is_err());
    }

    #[test]
    fn test_allow_domain_extends_policy() {
        let mut client = SandboxClient::new().unwrap();
        assert!(!client.is_allowed("https://files.rcsb.org/download/6W8I.pdb"));
        client.allow_domain("files.rcsb.org");
        assert!(client.is_allowed("https://files.rcsb.org/download/6W8I.pdb"));
    }

    #[test]
    fn test_garbage_url_is_denied() {
        let client = SandboxClient::new().unwrap();
        assert!(!client.is_allowed("not a url"));
    }
}
