use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiProduct {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A named group of API products that rate plans are sold for
/// (an Edge "monetization package").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBundle {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "product")]
    pub products: Vec<ApiProduct>,
}

impl ProductBundle {
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ProductBundleRef {
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductBundleLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub rate_plans: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductBundleView {
    pub product_bundle: ProductBundle,
    pub links: ProductBundleLinks,
}
