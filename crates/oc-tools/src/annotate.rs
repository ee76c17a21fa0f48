//! OpenCRAVAT annotate API client
//!
//! Each lookup is one GET against the fixed upstream base. URLs are built by
//! string interpolation into fixed templates so that semantically identical
//! inputs always produce byte-identical request URLs.

use reqwest::Client;
use tracing::{debug, error, info};

use oc_core::{Error, Result};

/// Fixed upstream base URL
pub const OC_API_BASE: &str = "https://run.opencravat.org";

/// Annotators queried when the caller does not name any
pub const DEFAULT_ANNOTATORS: &[&str] = &["clinvar", "go", "gnomad4"];

/// The default annotator set as an owned list, for serde defaults.
pub fn default_annotators() -> Vec<String> {
    DEFAULT_ANNOTATORS.iter().map(|s| s.to_string()).collect()
}

/// Build the annotate URL for a chromosomal allele.
pub fn allele_url(
    base: &str,
    chrom: &str,
    pos: i64,
    ref_base: &str,
    alt_base: &str,
    annotators: &[String],
) -> String {
    format!(
        "{}/api/annotate?chrom={}&pos={}&ref_base={}&alt_base={}&annotators={}",
        base,
        chrom,
        pos,
        ref_base,
        alt_base,
        annotators.join(",")
    )
}

/// Build the annotate URL for a dbSNP rsID.
pub fn rsid_url(base: &str, rsid: &str, annotators: &[String]) -> String {
    format!(
        "{}/api/annotate?dbsnp={}&annotators={}",
        base,
        rsid,
        annotators.join(",")
    )
}

/// Build the annotate URL for a ClinGen allele registry id.
pub fn caid_url(base: &str, caid: &str, annotators: &[String]) -> String {
    format!(
        "{}/api/annotate?clingen={}&annotators={}",
        base,
        caid,
        annotators.join(",")
    )
}

/// HTTP client for the annotate API
#[derive(Clone)]
pub struct AnnotateClient {
    client: Client,
    base_url: String,
}

impl AnnotateClient {
    /// Create a client against the fixed upstream base
    pub fn new() -> Self {
        Self::with_base_url(OC_API_BASE)
    }

    /// Create a client against a custom base (tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Get the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one annotate URL and return the JSON body wrapped in newlines.
    ///
    /// The body is parsed and re-serialized so a non-JSON upstream response
    /// fails here instead of reaching the model as garbage.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        info!("annotate request: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("annotate request failed: {}: {}", url, e);
            Error::Upstream(format!("request failed: {}", e))
        })?;

        let status = response.status();
        info!("annotate response status: {}", status);

        if !status.is_success() {
            error!("annotate HTTP error for {}: {}", url, status);
            return Err(Error::Upstream(format!("HTTP {}", status)));
        }

        let data: serde_json::Value = response.json().await.map_err(|e| {
            error!("annotate returned non-JSON body for {}: {}", url, e);
            Error::Upstream(format!("invalid JSON body: {}", e))
        })?;

        let out = serde_json::to_string(&data)?;
        debug!("annotate payload: {}", out);

        Ok(format!("\n{}\n", out))
    }
}

impl Default for AnnotateClient {
    fn default() -> Self {
        Self::new()
    }
}
