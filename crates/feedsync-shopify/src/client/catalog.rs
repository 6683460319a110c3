//! Multi-page catalog reads.
//!
//! Every fetch here is all-or-nothing: a failure on any page discards the
//! pages already read, since a partial catalog would produce a wrong delta.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use feedsync_core::CatalogVariant;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::ShopifyError;
use crate::graphql::{CATALOG_QUERY, SKU_QUERY};
use crate::pagination::extract_next_cursor;
use crate::types::{ProductVariantsData, RestVariant, SkuNode, VariantNode};

use super::{AdminClient, MAX_PAGES};

impl AdminClient {
    /// Reads every variant through GraphQL into a SKU-keyed map.
    ///
    /// Variants with a blank SKU are skipped; when two variants share a SKU
    /// the later one wins.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::graphql`], and returns
    /// [`ShopifyError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn fetch_catalog(
        &self,
        page_size: u32,
        page_delay_ms: u64,
    ) -> Result<HashMap<String, CatalogVariant>, ShopifyError> {
        let mut catalog = HashMap::new();
        let mut skipped = 0usize;

        let pages = self
            .for_each_variant(
                "catalog page",
                CATALOG_QUERY,
                page_size,
                page_delay_ms,
                |node: VariantNode| match graphql_variant(node) {
                    Some(variant) => {
                        catalog.insert(variant.sku.clone(), variant);
                    }
                    None => skipped += 1,
                },
            )
            .await?;

        tracing::info!(
            store = %self.store,
            variants = catalog.len(),
            skipped,
            pages,
            "fetched storefront catalog"
        );
        Ok(catalog)
    }

    /// Reads only SKUs: trimmed, de-duplicated, sorted, blanks dropped.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_catalog`].
    pub async fn fetch_all_skus(
        &self,
        page_size: u32,
        page_delay_ms: u64,
    ) -> Result<BTreeSet<String>, ShopifyError> {
        let mut skus = BTreeSet::new();

        let pages = self
            .for_each_variant(
                "sku page",
                SKU_QUERY,
                page_size,
                page_delay_ms,
                |node: SkuNode| {
                    if let Some(sku) = non_blank(node.sku.as_deref()) {
                        skus.insert(sku.to_owned());
                    }
                },
            )
            .await?;

        tracing::info!(store = %self.store, skus = skus.len(), pages, "fetched storefront SKUs");
        Ok(skus)
    }

    /// Reads the catalog through REST `products.json`, following `Link`
    /// header cursors. Unit cost is not available here, so every variant's
    /// `cost` is `None`.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_products_page`], and returns
    /// [`ShopifyError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn fetch_catalog_rest(
        &self,
        page_size: u32,
        page_delay_ms: u64,
    ) -> Result<HashMap<String, CatalogVariant>, ShopifyError> {
        let mut catalog = HashMap::new();
        let mut cursor: Option<String> = None;
        let mut skipped = 0usize;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(self.pagination_limit());
            }
            if page_count > 1 && page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(page_delay_ms)).await;
            }

            let (response, link_header) = self
                .fetch_products_page(page_size, cursor.as_deref())
                .await?;

            for variant in response.products.into_iter().flat_map(|p| p.variants) {
                match rest_variant(variant) {
                    Some(variant) => {
                        catalog.insert(variant.sku.clone(), variant);
                    }
                    None => skipped += 1,
                }
            }

            cursor = extract_next_cursor(link_header.as_deref());
            if cursor.is_none() {
                break;
            }
        }

        tracing::info!(
            store = %self.store,
            variants = catalog.len(),
            skipped,
            pages = page_count,
            "fetched storefront catalog via REST"
        );
        Ok(catalog)
    }

    /// Drives a `productVariants(first:, after:)` query to the last page,
    /// handing each node to `visit`. Returns the number of pages read.
    async fn for_each_variant<N, F>(
        &self,
        context: &str,
        query: &str,
        page_size: u32,
        page_delay_ms: u64,
        mut visit: F,
    ) -> Result<usize, ShopifyError>
    where
        N: DeserializeOwned,
        F: FnMut(N),
    {
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(self.pagination_limit());
            }
            if page_count > 1 && page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(page_delay_ms)).await;
            }

            let data: ProductVariantsData<N> = self
                .graphql(context, query, json!({ "first": page_size, "cursor": cursor }))
                .await?;
            let connection = data.product_variants;
            let nodes = connection.edges.len();
            for edge in connection.edges {
                visit(edge.node);
            }
            tracing::debug!(page = page_count, nodes, "read variant page");

            let page_info = connection.page_info;
            match page_info.end_cursor {
                Some(next) if page_info.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        Ok(page_count)
    }

    pub(super) fn pagination_limit(&self) -> ShopifyError {
        ShopifyError::PaginationLimit {
            store: self.store.clone(),
            max_pages: MAX_PAGES,
        }
    }
}

fn non_blank(sku: Option<&str>) -> Option<&str> {
    sku.map(str::trim).filter(|s| !s.is_empty())
}

fn graphql_variant(node: VariantNode) -> Option<CatalogVariant> {
    let sku = non_blank(node.sku.as_deref())?.to_owned();
    let (inventory_item_id, cost) = match node.inventory_item {
        Some(item) => (Some(item.id), item.unit_cost.map(|money| money.amount)),
        None => (None, None),
    };
    Some(CatalogVariant {
        sku,
        internal_id: node.id,
        inventory_item_id,
        price: node.price.unwrap_or(Decimal::ZERO),
        cost,
        inventory_quantity: node.inventory_quantity.unwrap_or(0),
    })
}

fn rest_variant(variant: RestVariant) -> Option<CatalogVariant> {
    let sku = non_blank(variant.sku.as_deref())?.to_owned();
    Some(CatalogVariant {
        sku,
        internal_id: variant.id.to_string(),
        inventory_item_id: variant.inventory_item_id.map(|id| id.to_string()),
        price: variant.price,
        cost: None,
        inventory_quantity: variant.inventory_quantity.unwrap_or(0),
    })
}
