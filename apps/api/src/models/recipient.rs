use serde::{Deserialize, Serialize};

/// A recipient as supplied by the client, possibly only partially resolved.
///
/// Field aliases cover the historical German payload names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientInput {
    #[serde(default, alias = "mdb_name")]
    pub name: Option<String>,
    #[serde(default, alias = "bundestag_address")]
    pub address: Option<String>,
    #[serde(default, alias = "fraktion", alias = "party")]
    pub affiliation: Option<String>,
    #[serde(default, alias = "anrede")]
    pub salutation: Option<String>,
    #[serde(default, alias = "bundesland")]
    pub region: Option<String>,
}

/// A fully resolved recipient. Never mutated after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientProfile {
    pub name: String,
    /// Multi-line postal address, lines separated by `\n`.
    pub address: String,
    pub affiliation: Option<String>,
    pub salutation: Option<String>,
    pub region: Option<String>,
}

impl RecipientProfile {
    /// "name|address" key used for deduplication and fingerprinting.
    pub fn signature(&self) -> String {
        format!("{}|{}", self.name.trim(), self.address.trim())
    }

    /// Name followed by the address lines, as substituted into letter templates.
    pub fn name_and_address(&self) -> String {
        if self.name.trim().is_empty() {
            self.address.clone()
        } else {
            format!("{}\n{}", self.name, self.address)
        }
    }
}
