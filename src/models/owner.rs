use serde::{Deserialize, Serialize};

/// Who a monetization request is made for: a single developer or a team
/// (an Edge "company").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Owner {
    Developer(String),
    Team(String),
}

impl Owner {
    pub fn id(&self) -> &str {
        match self {
            Owner::Developer(id) | Owner::Team(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Owner::Developer(_) => "developer",
            Owner::Team(_) => "team",
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, Owner::Team(_))
    }

    /// Path segments of this owner in the Edge monetization API.
    pub fn edge_segments(&self) -> [&str; 2] {
        match self {
            Owner::Developer(id) => ["developers", id],
            Owner::Team(id) => ["companies", id],
        }
    }

    /// Prefix of this owner's routes in our own API.
    pub fn route_prefix(&self) -> String {
        match self {
            Owner::Developer(id) => format!("/developers/{id}"),
            Owner::Team(id) => format!("/teams/{id}"),
        }
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_paths() {
        let dev = Owner::Developer("dev@example.com".into());
        assert_eq!(dev.edge_segments(), ["developers", "dev@example.com"]);
        assert_eq!(dev.route_prefix(), "/developers/dev@example.com");
        assert!(!dev.is_team());

        let team = Owner::Team("rocket".into());
        assert_eq!(team.edge_segments(), ["companies", "rocket"]);
        assert_eq!(team.route_prefix(), "/teams/rocket");
        assert_eq!(team.to_string(), "team:rocket");
    }

    #[test]
    fn test_owner_serialization() {
        let json = serde_json::to_value(Owner::Team("rocket".into())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "team", "id": "rocket"}));
    }
}
