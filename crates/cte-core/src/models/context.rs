use std::fmt;

use serde::{Deserialize, Serialize};

/// Regulatory context selecting which Documento Básico of the CTE the
/// assistant is operating under. Exactly one is active at a time.
///
/// Serialized with the official document codes (`"DB-SE-AE"`, ...) so that
/// persisted history written by earlier builds keeps loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CteContext {
    #[serde(rename = "GENERAL")]
    General,
    #[serde(rename = "DB-SE-AE")]
    DbSeAe,
    #[serde(rename = "DB-SE-C")]
    DbSeC,
    #[serde(rename = "DB-SE-A")]
    DbSeA,
    #[serde(rename = "DB-SE-F")]
    DbSeF,
    #[serde(rename = "DB-SE-M")]
    DbSeM,
    #[serde(rename = "DB-SI")]
    DbSi,
    #[serde(rename = "DB-SUA")]
    DbSua,
    #[serde(rename = "DB-HE")]
    DbHe,
    #[serde(rename = "DB-HR")]
    DbHr,
    #[serde(rename = "DB-HS")]
    DbHs,
}

impl CteContext {
    /// Official document code, as shown to the user and used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            CteContext::General => "GENERAL",
            CteContext::DbSeAe => "DB-SE-AE",
            CteContext::DbSeC => "DB-SE-C",
            CteContext::DbSeA => "DB-SE-A",
            CteContext::DbSeF => "DB-SE-F",
            CteContext::DbSeM => "DB-SE-M",
            CteContext::DbSi => "DB-SI",
            CteContext::DbSua => "DB-SUA",
            CteContext::DbHe => "DB-HE",
            CteContext::DbHr => "DB-HR",
            CteContext::DbHs => "DB-HS",
        }
    }

    /// All catalog contexts, in the order the document catalog lists them.
    pub fn all() -> &'static [CteContext] {
        &[
            CteContext::General,
            CteContext::DbSeAe,
            CteContext::DbSeC,
            CteContext::DbSeA,
            CteContext::DbSeF,
            CteContext::DbSeM,
            CteContext::DbSi,
            CteContext::DbSua,
            CteContext::DbHe,
            CteContext::DbHr,
            CteContext::DbHs,
        ]
    }
}

impl Default for CteContext {
    fn default() -> Self {
        CteContext::General
    }
}

impl fmt::Display for CteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_document_codes() {
        let json = serde_json::to_string(&CteContext::DbSeAe).unwrap();
        assert_eq!(json, "\"DB-SE-AE\"");

        let back: CteContext = serde_json::from_str("\"DB-SI\"").unwrap();
        assert_eq!(back, CteContext::DbSi);
    }

    #[test]
    fn test_display_matches_serde_name() {
        for ctx in CteContext::all() {
            let json = serde_json::to_string(ctx).unwrap();
            assert_eq!(json, format!("\"{}\"", ctx));
        }
    }
}
