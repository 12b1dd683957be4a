use serde::{Deserialize, Serialize};

/// A group as listed by `GET /rbac/groups`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

impl Group {
    /// Member identities (user ids, usually emails) in backend order.
    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.user_id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub user_id: String,
}

/// Body of `POST /rbac/groups`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
}

impl NewGroup {
    pub fn generated(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: format!("Automatically created group: {name}"),
        }
    }
}

/// Body of `POST /rbac/groups/{groupId}/members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMembership {
    pub user_id: String,
    pub group_id: String,
}

/// Exact (case-sensitive) lookup by group name.
pub fn find_by_name<'a>(groups: &'a [Group], name: &str) -> Option<&'a Group> {
    groups.iter().find(|g| g.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_decodes_without_members() {
        let group: Group = serde_json::from_str(r#"{"id":"g1","name":"CloudEngineers"}"#).unwrap();
        assert!(group.members.is_empty());
    }

    #[test]
    fn test_find_by_name_is_exact() {
        let groups: Vec<Group> = serde_json::from_str(
            r#"[{"id":"g1","name":"cloudengineers","members":[]},
                {"id":"g2","name":"CloudEngineers","members":[{"userId":"a@x.com"}]}]"#,
        )
        .unwrap();
        let found = find_by_name(&groups, "CloudEngineers").unwrap();
        assert_eq!(found.id, "g2");
        assert_eq!(found.member_ids(), vec!["a@x.com"]);
        assert!(find_by_name(&groups, "CLOUDENGINEERS").is_none());
    }
}
