//! JSON:API envelopes and the attribute sets of the resources the CI tools read.
//!
//! [Doc](https://developer.apple.com/documentation/appstoreconnectapi/xcode_cloud_workflows_and_builds)

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

//
#[derive(Deserialize, Debug, Clone)]
pub struct Document<T> {
    pub data: T,
    #[serde(default)]
    pub included: Vec<Value>,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Links {
    #[serde(rename = "self")]
    pub this: Option<String>,
    pub next: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Resource<A> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<A>,
    #[serde(default)]
    pub relationships: BTreeMap<String, Relationship>,
}

impl<A> Resource<A> {
    /// Attributes, or the all-`None` default when the server sent none.
    pub fn attrs(&self) -> A
    where
        A: Default + Clone,
    {
        self.attributes.clone().unwrap_or_default()
    }

    /// Id of a to-one relationship when its linkage was included.
    pub fn related_id(&self, name: &str) -> Option<&str> {
        match self.relationships.get(name)?.data.as_ref()? {
            Linkage::One(identifier) => Some(identifier.id.as_str()),
            Linkage::Many(_) => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<Linkage>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Linkage {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

//
// request bodies
//
#[derive(Serialize, Debug, Clone)]
pub struct RequestDocument<A> {
    pub data: RequestResource<A>,
}

#[derive(Serialize, Debug, Clone)]
pub struct RequestResource<A> {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<A>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipLinkage>,
}

#[derive(Serialize, Debug, Clone)]
pub struct RelationshipLinkage {
    pub data: ResourceIdentifier,
}

/// Placeholder attribute type for bodies that only carry relationships.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct NoAttributes {}

impl<A> RequestDocument<A> {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            data: RequestResource {
                kind: kind.into(),
                id: None,
                attributes: None,
                relationships: BTreeMap::new(),
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.data.id = Some(id.into());
        self
    }

    pub fn attributes(mut self, attributes: A) -> Self {
        self.data.attributes = Some(attributes);
        self
    }

    pub fn relationship(mut self, name: impl Into<String>, target: ResourceIdentifier) -> Self {
        self.data
            .relationships
            .insert(name.into(), RelationshipLinkage { data: target });
        self
    }
}

//
// attributes
//
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppAttributes {
    pub name: Option<String>,
    pub bundle_id: Option<String>,
    pub sku: Option<String>,
    pub primary_locale: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CiProductAttributes {
    pub name: Option<String>,
    pub product_type: Option<String>,
    pub created_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CiWorkflowAttributes {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_enabled: Option<bool>,
    pub is_locked_for_editing: Option<bool>,
    pub clean: Option<bool>,
    pub container_file_path: Option<String>,
    pub last_modified_date: Option<String>,
    pub branch_start_condition: Option<Value>,
}

impl CiWorkflowAttributes {
    pub fn branch_name(&self) -> Option<&str> {
        self.branch_start_condition
            .as_ref()?
            .pointer("/source/branchName")?
            .as_str()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScmRepositoryAttributes {
    pub owner_name: Option<String>,
    pub repository_name: Option<String>,
    pub http_clone_url: Option<String>,
    pub ssh_clone_url: Option<String>,
    pub last_accessed_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScmGitReferenceAttributes {
    pub name: Option<String>,
    pub canonical_name: Option<String>,
    pub is_deleted: Option<bool>,
    pub kind: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionProgress {
    Pending,
    Running,
    Complete,
    #[serde(other)]
    Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    Succeeded,
    Failed,
    Errored,
    Canceled,
    Skipped,
    #[serde(other)]
    Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CiBuildRunAttributes {
    pub number: Option<u64>,
    pub created_date: Option<String>,
    pub started_date: Option<String>,
    pub finished_date: Option<String>,
    pub execution_progress: Option<ExecutionProgress>,
    pub completion_status: Option<CompletionStatus>,
    pub start_reason: Option<String>,
    pub is_pull_request_build: Option<bool>,
}

impl CiBuildRunAttributes {
    /// Wall-clock duration between start and finish, in minutes.
    pub fn duration_minutes(&self) -> Option<f64> {
        let started = parse_timestamp(self.started_date.as_deref()?)?;
        let finished = parse_timestamp(self.finished_date.as_deref()?)?;
        Some((finished - started).num_milliseconds() as f64 / 60_000.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildAttributes {
    pub version: Option<String>,
    pub uploaded_date: Option<String>,
    pub expiration_date: Option<String>,
    pub expired: Option<bool>,
    pub min_os_version: Option<String>,
    pub processing_state: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CiBuildActionAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_distribution_audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required_to_pass: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<CompletionStatus>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CiTestDestinationAttributes {
    pub destination: Option<String>,
}

/// Parses the API's ISO 8601 timestamps, with or without a colon in the offset.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_de_workflow_with_repository() {
        let body = json!({
            "data": [{
                "type": "ciWorkflows",
                "id": "wf-1",
                "attributes": {
                    "name": "Default",
                    "description": "Build main",
                    "isEnabled": true,
                    "branchStartCondition": {
                        "source": { "branchName": "main" },
                        "autoCancel": true
                    }
                },
                "relationships": {
                    "repository": { "data": { "type": "scmRepositories", "id": "repo-9" } },
                    "actions": { "links": { "related": "https://example.invalid" } }
                }
            }],
            "included": [{ "type": "scmRepositories", "id": "repo-9" }],
            "links": { "self": "https://api.appstoreconnect.apple.com/v1/ciProducts/p/workflows" }
        });

        let doc: Document<Vec<Resource<CiWorkflowAttributes>>> =
            serde_json::from_value(body).unwrap();

        assert_eq!(doc.data.len(), 1);
        assert_eq!(doc.included.len(), 1);
        let workflow = &doc.data[0];
        assert_eq!(workflow.kind, "ciWorkflows");
        assert_eq!(workflow.attrs().name.as_deref(), Some("Default"));
        assert_eq!(workflow.attrs().branch_name(), Some("main"));
        assert_eq!(workflow.related_id("repository"), Some("repo-9"));
        assert_eq!(workflow.related_id("actions"), None);
        assert_eq!(workflow.related_id("missing"), None);
    }

    #[test]
    fn test_de_build_run_unknown_status() {
        let run: Resource<CiBuildRunAttributes> = serde_json::from_value(json!({
            "type": "ciBuildRuns",
            "id": "run-1",
            "attributes": {
                "number": 31,
                "executionProgress": "RUNNING",
                "completionStatus": "SOMETHING_NEW",
                "startedDate": "2024-03-01T10:00:00.000Z"
            }
        }))
        .unwrap();

        let attrs = run.attrs();
        assert_eq!(attrs.number, Some(31));
        assert_eq!(attrs.execution_progress, Some(ExecutionProgress::Running));
        assert_eq!(attrs.completion_status, Some(CompletionStatus::Other));
        assert_eq!(attrs.duration_minutes(), None);
    }

    #[test]
    fn test_de_resource_without_attributes() {
        let run: Resource<CiBuildRunAttributes> =
            serde_json::from_value(json!({ "type": "ciBuildRuns", "id": "run-2" })).unwrap();

        assert!(run.attributes.is_none());
        assert_eq!(run.attrs().number, None);
    }

    #[test]
    fn test_duration_minutes() {
        let attrs = CiBuildRunAttributes {
            started_date: Some("2024-03-01T10:00:00Z".to_string()),
            finished_date: Some("2024-03-01T10:12:30.000+0000".to_string()),
            ..Default::default()
        };

        assert_eq!(attrs.duration_minutes(), Some(12.5));
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = "2024-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();

        assert_eq!(parse_timestamp("2024-03-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T11:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T02:00:00.000-0800"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_ser_request_document() {
        let body = RequestDocument::<NoAttributes>::new("ciBuildRuns").relationship(
            "workflow",
            ResourceIdentifier::new("ciWorkflows", "wf-1"),
        );

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "data": {
                    "type": "ciBuildRuns",
                    "relationships": {
                        "workflow": { "data": { "type": "ciWorkflows", "id": "wf-1" } }
                    }
                }
            })
        );
    }
}
