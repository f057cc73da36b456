use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ---------------------------------------------------------------------------
// Category – the race a candidate runs in
// ---------------------------------------------------------------------------

/// Election race type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    President,
    Mayor,
}

impl Category {
    /// Both races, in report order.
    pub const ALL: [Category; 2] = [Category::President, Category::Mayor];

    /// Identifier used by the vote store.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::President => "PRESIDENT",
            Category::Mayor => "MAYOR",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_uppercase().as_str() {
            "PRESIDENT" => Ok(Self::President),
            "MAYOR" => Ok(Self::Mayor),
            other => Err(Error::invalid_config(format!("unknown category `{other}`"))),
        }
    }
}

// ---------------------------------------------------------------------------
// CandidateRecord – one row of the vote store
// ---------------------------------------------------------------------------

fn enabled_by_default() -> bool {
    true
}

/// Read-only snapshot of a candidate as reported by the vote store.
///
/// Field names on the wire follow the store's JSON (`dni`, `nombre`,
/// `politicalParty`, `imageUri`, `roleType`, `votes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// National identity number; unique per candidate.
    #[serde(rename = "dni")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub display_name: String,
    #[serde(rename = "politicalParty", default)]
    pub party: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageUri", default)]
    pub image_ref: String,
    #[serde(rename = "roleType")]
    pub category: Category,
    #[serde(rename = "votes", default)]
    pub vote_count: u64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl CandidateRecord {
    /// Enabled candidate with empty description and image.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        party: impl Into<String>,
        category: Category,
        vote_count: u64,
    ) -> Self {
        CandidateRecord {
            id: id.into(),
            display_name: display_name.into(),
            party: party.into(),
            description: String::new(),
            image_ref: String::new(),
            category,
            vote_count,
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_store_json() {
        let json = r#"{
            "dni": "12345678",
            "nombre": "Ana Pérez",
            "politicalParty": "Partido Verde",
            "description": "Economista",
            "imageUri": "https://img/ana.png",
            "roleType": "PRESIDENT",
            "votes": 120,
            "enabled": false
        }"#;
        let c: CandidateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(c.id, "12345678");
        assert_eq!(c.display_name, "Ana Pérez");
        assert_eq!(c.category, Category::President);
        assert_eq!(c.vote_count, 120);
        assert!(!c.enabled);
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"dni": "1", "nombre": "Luis", "roleType": "MAYOR"}"#;
        let c: CandidateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(c.vote_count, 0);
        assert!(c.enabled);
        assert!(c.party.is_empty());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(Category::President.to_string(), "PRESIDENT");
        assert_eq!("mayor".parse::<Category>().unwrap(), Category::Mayor);
        assert!("governor".parse::<Category>().is_err());
        assert_eq!(Category::ALL, [Category::President, Category::Mayor]);
    }
}
