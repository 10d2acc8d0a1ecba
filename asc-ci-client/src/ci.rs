//! Typed App Store Connect endpoints used by the Xcode Cloud tools.

use url::form_urlencoded;

use crate::{
    client::Client,
    error::Error,
    resources::{
        AppAttributes, BuildAttributes, CiBuildActionAttributes, CiBuildRunAttributes,
        CiProductAttributes, CiTestDestinationAttributes, CiWorkflowAttributes, Document,
        NoAttributes, RequestDocument, Resource, ResourceIdentifier, ScmGitReferenceAttributes,
        ScmRepositoryAttributes,
    },
};

pub type App = Resource<AppAttributes>;
pub type CiProduct = Resource<CiProductAttributes>;
pub type CiWorkflow = Resource<CiWorkflowAttributes>;
pub type CiBuildRun = Resource<CiBuildRunAttributes>;
pub type CiBuildAction = Resource<CiBuildActionAttributes>;
pub type CiTestDestination = Resource<CiTestDestinationAttributes>;
pub type ScmRepository = Resource<ScmRepositoryAttributes>;
pub type ScmGitReference = Resource<ScmGitReferenceAttributes>;
pub type Build = Resource<BuildAttributes>;

pub const TESTFLIGHT_INTERNAL_TESTERS: &str = "TESTFLIGHT_INTERNAL_TESTERS";

impl Client {
    pub fn list_apps(&self, bundle_id: Option<&str>) -> Result<Vec<App>, Error> {
        let endpoint = match bundle_id {
            Some(bundle_id) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("filter[bundleId]", bundle_id)
                    .finish();
                format!("apps?{query}")
            }
            None => "apps".to_string(),
        };
        Ok(self.get::<Document<Vec<App>>>(&endpoint)?.data)
    }

    pub fn list_ci_products(&self) -> Result<Vec<CiProduct>, Error> {
        Ok(self.get::<Document<Vec<CiProduct>>>("ciProducts")?.data)
    }

    /// With `include_repository` the `repository` relationship linkage is filled in.
    pub fn list_workflows(
        &self,
        product_id: &str,
        include_repository: bool,
    ) -> Result<Vec<CiWorkflow>, Error> {
        let mut endpoint = format!("ciProducts/{product_id}/workflows");
        if include_repository {
            endpoint.push_str("?include=repository");
        }
        Ok(self.get::<Document<Vec<CiWorkflow>>>(&endpoint)?.data)
    }

    pub fn list_scm_repositories(&self) -> Result<Vec<ScmRepository>, Error> {
        Ok(self.get::<Document<Vec<ScmRepository>>>("scmRepositories")?.data)
    }

    pub fn get_scm_repository(&self, repository_id: &str) -> Result<ScmRepository, Error> {
        Ok(self
            .get::<Document<ScmRepository>>(&format!("scmRepositories/{repository_id}"))?
            .data)
    }

    pub fn list_git_references(&self, repository_id: &str) -> Result<Vec<ScmGitReference>, Error> {
        Ok(self
            .get::<Document<Vec<ScmGitReference>>>(&format!(
                "scmRepositories/{repository_id}/gitReferences"
            ))?
            .data)
    }

    /// Newest first.
    pub fn list_build_runs(&self, workflow_id: &str, limit: u32) -> Result<Vec<CiBuildRun>, Error> {
        Ok(self
            .get::<Document<Vec<CiBuildRun>>>(&format!(
                "ciWorkflows/{workflow_id}/buildRuns?limit={limit}&sort=-number"
            ))?
            .data)
    }

    /// Starts a run of `workflow_id`; without a git reference the workflow's start condition decides what to build.
    pub fn start_build_run(
        &self,
        workflow_id: &str,
        git_reference_id: Option<&str>,
    ) -> Result<CiBuildRun, Error> {
        let mut body = RequestDocument::<NoAttributes>::new("ciBuildRuns").relationship(
            "workflow",
            ResourceIdentifier::new("ciWorkflows", workflow_id),
        );
        if let Some(git_reference_id) = git_reference_id {
            body = body.relationship(
                "sourceBranchOrTag",
                ResourceIdentifier::new("scmGitReferences", git_reference_id),
            );
        }

        Ok(self.post::<_, Document<CiBuildRun>>("ciBuildRuns", &body)?.data)
    }

    /// Most recently uploaded first.
    pub fn list_builds(&self, limit: u32) -> Result<Vec<Build>, Error> {
        Ok(self
            .get::<Document<Vec<Build>>>(&format!("builds?limit={limit}&sort=-uploadedDate"))?
            .data)
    }

    pub fn list_build_actions(&self, workflow_id: &str) -> Result<Vec<CiBuildAction>, Error> {
        Ok(self
            .get::<Document<Vec<CiBuildAction>>>(&format!("ciWorkflows/{workflow_id}/buildActions"))?
            .data)
    }

    pub fn create_build_action(
        &self,
        workflow_id: &str,
        attributes: CiBuildActionAttributes,
    ) -> Result<CiBuildAction, Error> {
        let body = RequestDocument::new("ciBuildActions")
            .attributes(attributes)
            .relationship("workflow", ResourceIdentifier::new("ciWorkflows", workflow_id));

        Ok(self
            .post::<_, Document<CiBuildAction>>("ciBuildActions", &body)?
            .data)
    }

    pub fn create_test_destination(
        &self,
        workflow_id: &str,
        destination: &str,
    ) -> Result<CiTestDestination, Error> {
        let body = RequestDocument::new("ciTestDestinations")
            .attributes(CiTestDestinationAttributes {
                destination: Some(destination.to_string()),
            })
            .relationship("workflow", ResourceIdentifier::new("ciWorkflows", workflow_id));

        Ok(self
            .post::<_, Document<CiTestDestination>>("ciTestDestinations", &body)?
            .data)
    }

    /// Points `workflow_id` at another connected repository.
    pub fn set_workflow_repository(
        &self,
        workflow_id: &str,
        repository_id: &str,
    ) -> Result<CiWorkflow, Error> {
        let body = RequestDocument::<NoAttributes>::new("ciWorkflows")
            .id(workflow_id)
            .relationship(
                "repository",
                ResourceIdentifier::new("scmRepositories", repository_id),
            );

        Ok(self
            .patch::<_, Document<CiWorkflow>>(&format!("ciWorkflows/{workflow_id}"), &body)?
            .data)
    }

    /// Finds the live branch (or tag) called `name` in a repository.
    pub fn find_git_reference(
        &self,
        repository_id: &str,
        name: &str,
    ) -> Result<ScmGitReference, Error> {
        let canonical = format!("refs/heads/{name}");

        self.list_git_references(repository_id)?
            .into_iter()
            .filter(|reference| !reference.attrs().is_deleted.unwrap_or(false))
            .find(|reference| {
                let attrs = reference.attrs();
                attrs.name.as_deref() == Some(name)
                    || attrs.canonical_name.as_deref() == Some(name)
                    || attrs.canonical_name.as_deref() == Some(canonical.as_str())
            })
            .ok_or_else(|| Error::NotFound {
                kind: "git reference",
                selector: name.to_string(),
            })
    }
}
