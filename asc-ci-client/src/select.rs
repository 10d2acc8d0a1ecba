use tracing::warn;

use crate::{
    ci::{CiProduct, CiWorkflow},
    client::Client,
    error::Error,
    resources::{
        AppAttributes, CiProductAttributes, CiWorkflowAttributes, Resource,
        ScmRepositoryAttributes,
    },
};

/// Which resource of a listing to act on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    /// The first one the API lists.
    #[default]
    First,
    /// The one whose id or name equals the value.
    Match(String),
}

impl Selector {
    pub fn from_option(value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => Selector::Match(value.into()),
            None => Selector::First,
        }
    }
}

impl core::fmt::Display for Selector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Selector::First => f.write_str("<first>"),
            Selector::Match(value) => write!(f, "{value:?}"),
        }
    }
}

pub trait Named {
    fn name(&self) -> Option<&str>;
}

impl Named for AppAttributes {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
impl Named for CiProductAttributes {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
impl Named for CiWorkflowAttributes {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
impl Named for ScmRepositoryAttributes {
    fn name(&self) -> Option<&str> {
        self.repository_name.as_deref()
    }
}

pub fn select<A: Named>(
    items: Vec<Resource<A>>,
    selector: &Selector,
    kind: &'static str,
) -> Result<Resource<A>, Error> {
    let not_found = || Error::NotFound {
        kind,
        selector: selector.to_string(),
    };

    match selector {
        Selector::First => {
            if items.len() > 1 {
                warn!(kind, count = items.len(), "several candidates, using the first");
            }
            items.into_iter().next().ok_or_else(not_found)
        }
        Selector::Match(value) => items
            .into_iter()
            .find(|item| {
                item.id == *value
                    || item.attributes.as_ref().and_then(Named::name) == Some(value.as_str())
            })
            .ok_or_else(not_found),
    }
}

impl Client {
    pub fn select_product(&self, selector: &Selector) -> Result<CiProduct, Error> {
        select(self.list_ci_products()?, selector, "CI product")
    }

    pub fn select_workflow(
        &self,
        product: &Selector,
        workflow: &Selector,
    ) -> Result<(CiProduct, CiWorkflow), Error> {
        let product = self.select_product(product)?;
        let workflow = select(self.list_workflows(&product.id, false)?, workflow, "workflow")?;
        Ok((product, workflow))
    }
}
