//! GraphQL documents sent to the Admin API.
//!
//! Every value is passed as a variable; nothing user-supplied is spliced into
//! a document except the SKU search string, which is itself a variable.

use serde_json::{json, Map, Value};

use crate::client::UpdateItem;

pub const CATALOG_QUERY: &str = "\
query CatalogVariants($first: Int!, $cursor: String) {
  productVariants(first: $first, after: $cursor) {
    edges { node { id sku price inventoryQuantity inventoryItem { id unitCost { amount } } } }
    pageInfo { hasNextPage endCursor }
  }
}";

pub const SKU_QUERY: &str = "\
query VariantSkus($first: Int!, $cursor: String) {
  productVariants(first: $first, after: $cursor) {
    edges { node { sku } }
    pageInfo { hasNextPage endCursor }
  }
}";

pub const LOOKUP_QUERY: &str = "\
query LookupVariants($first: Int!, $query: String!, $cursor: String) {
  productVariants(first: $first, query: $query, after: $cursor) {
    edges { node { id sku inventoryItem { id } } }
    pageInfo { hasNextPage endCursor }
  }
}";

/// Reason recorded on inventory adjustments.
pub const INVENTORY_REASON: &str = "correction";
/// Inventory quantity name that is set.
pub const INVENTORY_QUANTITY_NAME: &str = "available";

/// Builds a search string matching any of `skus`:
/// `sku:"A" OR sku:"B"`. Quotes and backslashes in a SKU are escaped.
///
/// Shopify's search is fuzzy, so callers must still filter for exact matches.
#[must_use]
pub fn sku_search_query(skus: &[&str]) -> String {
    skus.iter()
        .map(|sku| {
            let escaped = sku.replace('\\', "\\\\").replace('"', "\\\"");
            format!("sku:\"{escaped}\"")
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Accepts either a numeric location ID or a full `gid://` and returns the gid.
#[must_use]
pub fn location_gid(location_id: &str) -> String {
    let id = location_id.trim();
    if id.starts_with("gid://") {
        id.to_owned()
    } else {
        format!("gid://shopify/Location/{id}")
    }
}

pub(crate) fn variant_alias(index: usize) -> String {
    format!("v{index}")
}

pub(crate) fn inventory_alias(index: usize) -> String {
    format!("q{index}")
}

/// Builds one mutation document covering every item, plus its variables.
///
/// Item `i` gets a `productVariantUpdate` aliased `v{i}` (price and unit
/// cost) and, when it has an inventory item, an `inventorySetQuantities`
/// aliased `q{i}` setting the `available` quantity at `location_gid`.
#[must_use]
pub fn update_mutation(items: &[UpdateItem], location_gid: &str) -> (String, Value) {
    let mut params = Vec::with_capacity(items.len() * 2);
    let mut fields = Vec::with_capacity(items.len() * 2);
    let mut variables = Map::new();

    for (index, item) in items.iter().enumerate() {
        let v = variant_alias(index);
        params.push(format!("${v}: ProductVariantInput!"));
        fields.push(format!(
            "  {v}: productVariantUpdate(input: ${v}) {{ productVariant {{ id }} userErrors {{ field message }} }}"
        ));
        variables.insert(
            v,
            json!({
                "id": item.variant_id,
                "price": item.price.normalize().to_string(),
                "inventoryItem": { "cost": item.cost.normalize().to_string() },
            }),
        );

        if let Some(inventory_item_id) = &item.inventory_item_id {
            let q = inventory_alias(index);
            params.push(format!("${q}: InventorySetQuantitiesInput!"));
            fields.push(format!(
                "  {q}: inventorySetQuantities(input: ${q}) {{ inventoryAdjustmentGroup {{ id }} userErrors {{ field message }} }}"
            ));
            variables.insert(
                q,
                json!({
                    "name": INVENTORY_QUANTITY_NAME,
                    "reason": INVENTORY_REASON,
                    "ignoreCompareQuantity": true,
                    "quantities": [{
                        "inventoryItemId": inventory_item_id,
                        "locationId": location_gid,
                        "quantity": item.quantity,
                    }],
                }),
            );
        }
    }

    let document = format!(
        "mutation BatchUpdate({}) {{\n{}\n}}",
        params.join(", "),
        fields.join("\n")
    );
    (document, Value::Object(variables))
}
