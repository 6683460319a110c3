//! Admin API response shapes.
//!
//! GraphQL money fields (`price`, `unitCost.amount`) arrive as decimal
//! strings, e.g. `"159.00"`, and deserialize straight into [`Decimal`].
//! Fields a query does not select are modelled as `Option` with
//! `#[serde(default)]` so one node type serves several queries.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Envelope of every GraphQL response. A 200 status may still carry
/// `errors`, with or without partial `data`.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphqlErrorExtensions>,
}

impl GraphqlError {
    /// Query-cost throttling is reported as a 200 with this error code.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.code.as_deref())
            .is_some_and(|code| code == "THROTTLED")
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphqlErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

/// `data` of any `productVariants` query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariantsData<N> {
    pub product_variants: Connection<N>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    pub edges: Vec<Edge<N>>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct Edge<N> {
    pub node: N,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    #[serde(default)]
    pub inventory_item: Option<InventoryItemNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemNode {
    pub id: String,
    #[serde(default)]
    pub unit_cost: Option<MoneyV2>,
}

#[derive(Debug, Deserialize)]
pub struct MoneyV2 {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct SkuNode {
    #[serde(default)]
    pub sku: Option<String>,
}

/// Payload of one aliased mutation field. `null` when the field itself
/// errored, which the caller treats as a failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationPayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.field.as_deref() {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Top-level response from `GET /admin/api/{version}/products.json`.
#[derive(Debug, Deserialize)]
pub struct RestProductsResponse {
    pub products: Vec<RestProduct>,
}

#[derive(Debug, Deserialize)]
pub struct RestProduct {
    pub id: i64,
    #[serde(default)]
    pub variants: Vec<RestVariant>,
}

/// REST variants do not expose unit cost.
#[derive(Debug, Deserialize)]
pub struct RestVariant {
    pub id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    #[serde(default)]
    pub inventory_item_id: Option<i64>,
}
