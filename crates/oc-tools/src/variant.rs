//! Variant annotation tools
//!
//! Three lookups against the annotate API, one per variant discriminator:
//! chromosomal allele, dbSNP rsID, and ClinGen allele registry id.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use oc_core::{Error, Result, Tool, ToolResult};

use crate::annotate::{allele_url, caid_url, default_annotators, rsid_url, AnnotateClient};

fn parse_input<T: serde::de::DeserializeOwned>(tool: &str, input: JsonValue) -> Result<T> {
    serde_json::from_value(input).map_err(|e| Error::tool(tool, format!("invalid input: {}", e)))
}

/// JSON schema fragment shared by all three annotate tools.
fn annotators_property() -> JsonValue {
    json!({
        "type": "array",
        "items": {"type": "string"},
        "description": "Annotator modules to run (default: clinvar, go, gnomad4)"
    })
}

#[derive(Debug, Deserialize)]
struct GetAlleleInput {
    chrom: String,
    pos: i64,
    ref_base: String,
    alt_base: String,
    #[serde(default = "default_annotators")]
    annotators: Vec<String>,
}

/// Annotate a chromosomal allele
pub struct GetAlleleTool {
    client: AnnotateClient,
}

impl GetAlleleTool {
    pub fn new(client: AnnotateClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetAlleleTool {
    fn name(&self) -> &str {
        "get_allele"
    }

    fn description(&self) -> &str {
        "Annotate a genomic variant given chromosome, position, reference base and alternate base."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "chrom": {"type": "string", "description": "Chromosome, e.g. chr7"},
                "pos": {"type": "integer", "description": "1-based genomic position"},
                "ref_base": {"type": "string", "description": "Reference base(s)"},
                "alt_base": {"type": "string", "description": "Alternate base(s)"},
                "annotators": annotators_property()
            },
            "required": ["chrom", "pos", "ref_base", "alt_base"]
        })
    }

    async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
        let input: GetAlleleInput = parse_input(self.name(), input)?;
        let url = allele_url(
            self.client.base_url(),
            &input.chrom,
            input.pos,
            &input.ref_base,
            &input.alt_base,
            &input.annotators,
        );
        let body = self.client.fetch(&url).await?;
        Ok(ToolResult::success(body))
    }
}

#[derive(Debug, Deserialize)]
struct GetRsidInput {
    rsid: String,
    #[serde(default = "default_annotators")]
    annotators: Vec<String>,
}

/// Annotate a variant by dbSNP rsID
pub struct GetRsidTool {
    client: AnnotateClient,
}

impl GetRsidTool {
    pub fn new(client: AnnotateClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetRsidTool {
    fn name(&self) -> &str {
        "get_rsid"
    }

    fn description(&self) -> &str {
        "Annotate a variant identified by its dbSNP rsID, e.g. rs429358."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "rsid": {"type": "string", "description": "dbSNP rsID, e.g. rs429358"},
                "annotators": annotators_property()
            },
            "required": ["rsid"]
        })
    }

    async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
        let input: GetRsidInput = parse_input(self.name(), input)?;
        let url = rsid_url(self.client.base_url(), &input.rsid, &input.annotators);
        let body = self.client.fetch(&url).await?;
        Ok(ToolResult::success(body))
    }
}

#[derive(Debug, Deserialize)]
struct GetCaidInput {
    caid: String,
    #[serde(default = "default_annotators")]
    annotators: Vec<String>,
}

/// Annotate a variant by ClinGen allele registry id
pub struct GetCaidTool {
    client: AnnotateClient,
}

impl GetCaidTool {
    pub fn new(client: AnnotateClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetCaidTool {
    fn name(&self) -> &str {
        "get_caid"
    }

    fn description(&self) -> &str {
        "Annotate a variant identified by its ClinGen allele registry id (CAid), e.g. CA123456."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "caid": {"type": "string", "description": "ClinGen allele registry id, e.g. CA123456"},
                "annotators": annotators_property()
            },
            "required": ["caid"]
        })
    }

    async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
        let input: GetCaidInput = parse_input(self.name(), input)?;
        let url = caid_url(self.client.base_url(), &input.caid, &input.annotators);
        let body = self.client.fetch(&url).await?;
        Ok(ToolResult::success(body))
    }
}
