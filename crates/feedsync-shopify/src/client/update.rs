//! SKU resolution and the bulk price/cost/inventory mutation.

use std::collections::{HashMap, HashSet};

use feedsync_core::ChangeRecord;
use rust_decimal::Decimal;
use serde_json::json;

use crate::error::ShopifyError;
use crate::graphql::{
    inventory_alias, sku_search_query, update_mutation, variant_alias, LOOKUP_QUERY,
};
use crate::types::{MutationPayload, ProductVariantsData, VariantNode};

use super::{AdminClient, MAX_PAGES};

/// Page size for lookups. Search results include prefix and fuzzy matches,
/// so the page is always full size rather than sized to the SKU count.
const MAX_LOOKUP: usize = 250;

/// IDs needed to update one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantHandle {
    pub variant_id: String,
    pub inventory_item_id: Option<String>,
}

/// One resolved change, ready for the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateItem {
    pub variant_id: String,
    pub inventory_item_id: Option<String>,
    pub price: Decimal,
    pub cost: Decimal,
    pub quantity: i64,
}

impl UpdateItem {
    #[must_use]
    pub fn new(change: &ChangeRecord, handle: &VariantHandle) -> Self {
        Self {
            variant_id: handle.variant_id.clone(),
            inventory_item_id: handle.inventory_item_id.clone(),
            price: change.price,
            cost: change.cost,
            quantity: change.inventory,
        }
    }
}

/// Per-item result of a submitted mutation: `Err` carries the user errors.
pub type ItemOutcome = Result<(), String>;

impl AdminClient {
    /// Resolves SKUs to variant and inventory item IDs with one search query,
    /// following result pages until every SKU is found or the results run out.
    ///
    /// Only exact SKU matches are returned; SKUs the store does not have are
    /// simply absent from the map.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::graphql`], and returns
    /// [`ShopifyError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn lookup_variants(
        &self,
        skus: &[&str],
    ) -> Result<HashMap<String, VariantHandle>, ShopifyError> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = skus.iter().copied().filter(|sku| seen.insert(*sku)).collect();
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let query = sku_search_query(&unique);
        let mut resolved = HashMap::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(self.pagination_limit());
            }

            let variables = json!({
                "first": MAX_LOOKUP,
                "query": query,
                "cursor": cursor,
            });
            let data: ProductVariantsData<VariantNode> = self
                .graphql("variant lookup", LOOKUP_QUERY, variables)
                .await?;

            let connection = data.product_variants;
            for edge in connection.edges {
                let node = edge.node;
                let Some(sku) = node.sku.as_deref().map(str::trim) else {
                    continue;
                };
                if !seen.contains(sku) {
                    continue;
                }
                resolved.insert(
                    sku.to_owned(),
                    VariantHandle {
                        variant_id: node.id,
                        inventory_item_id: node.inventory_item.map(|item| item.id),
                    },
                );
            }

            if resolved.len() == unique.len() {
                break;
            }
            let page_info = connection.page_info;
            match page_info.end_cursor {
                Some(next) if page_info.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(
            requested = unique.len(),
            resolved = resolved.len(),
            pages = page_count,
            "resolved SKUs"
        );
        Ok(resolved)
    }

    /// Submits one mutation covering every item and reports each item's
    /// outcome, in input order.
    ///
    /// An item fails if either of its aliased fields returned `userErrors` or
    /// no payload, or if it has no inventory item to set the quantity on.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::graphql`]; in that case no item
    /// outcome is known.
    pub async fn submit_updates(
        &self,
        items: &[UpdateItem],
        location_gid: &str,
    ) -> Result<Vec<ItemOutcome>, ShopifyError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let (document, variables) = update_mutation(items, location_gid);
        let data: HashMap<String, Option<MutationPayload>> =
            self.graphql("bulk update", &document, variables).await?;

        let outcomes = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let mut errors = alias_errors(&data, &variant_alias(index));
                if item.inventory_item_id.is_some() {
                    errors.extend(alias_errors(&data, &inventory_alias(index)));
                } else {
                    errors.push("variant has no inventory item; quantity not set".to_owned());
                }
                if errors.is_empty() {
                    Ok(())
                } else {
                    Err(errors.join("; "))
                }
            })
            .collect();
        Ok(outcomes)
    }
}

fn alias_errors(data: &HashMap<String, Option<MutationPayload>>, alias: &str) -> Vec<String> {
    match data.get(alias) {
        Some(Some(payload)) => payload.user_errors.iter().map(ToString::to_string).collect(),
        _ => vec![format!("{alias}: no payload returned")],
    }
}
