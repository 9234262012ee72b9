//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use outfitter_core::{Item, Money, Slug};

use crate::db::ItemRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::urls::ItemUrls;

/// Query parameters for pagination.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
}

/// Links for an item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemLinks {
    pub detail: String,
    pub add_to_cart: String,
    pub remove_from_cart: String,
}

/// Catalog item as shown to customers.
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub slug: Slug,
    pub title: String,
    pub price: Money,
    pub discount_price: Option<Money>,
    /// Price the customer pays, formatted with the currency symbol.
    pub display_price: String,
    pub category: &'static str,
    pub label: &'static str,
    pub label_class: &'static str,
    pub description: String,
    pub image: String,
    pub links: ItemLinks,
}

impl ItemView {
    #[must_use]
    pub fn new(item: &Item, currency_symbol: &str) -> Self {
        Self {
            slug: item.slug.clone(),
            title: item.title.clone(),
            price: item.price,
            discount_price: item.effective_discount(),
            display_price: item.unit_price().display_with(currency_symbol),
            category: item.category.display_name(),
            label: item.label.display_name(),
            label_class: item.label.css_class(),
            description: item.description.clone(),
            image: item.image.clone(),
            links: ItemLinks {
                detail: item.absolute_url(),
                add_to_cart: item.add_to_cart_url(),
                remove_from_cart: item.remove_from_cart_url(),
            },
        }
    }
}

/// One page of the catalog.
#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub items: Vec<ItemView>,
    pub page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Number of pages needed for `count` items; at least 1.
fn total_pages(count: i64, page_size: u32) -> u32 {
    let page_size = i64::from(page_size.max(1));
    let pages = (count.max(0) + page_size - 1) / page_size;
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Look up an item by the slug in the path.
///
/// A malformed slug can't match anything, so it is reported as not found.
pub(crate) async fn find_item(state: &AppState, raw_slug: &str) -> Result<Item> {
    let not_found = || AppError::NotFound(format!("no item with slug {raw_slug:?}"));
    let slug = Slug::parse(raw_slug).map_err(|_| not_found())?;

    ItemRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(not_found)
}

/// List the catalog, one page at a time.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<CatalogPage>> {
    let page_size = state.config().page_size;
    let page = query.page.unwrap_or(1).max(1);

    let items = ItemRepository::new(state.pool());
    let total_pages = total_pages(items.count().await?, page_size);
    let symbol = &state.config().currency_symbol;
    let views = items
        .list(page, page_size)
        .await?
        .iter()
        .map(|item| ItemView::new(item, symbol))
        .collect();

    Ok(Json(CatalogPage {
        items: views,
        page,
        total_pages,
        has_previous: page > 1,
        has_next: page < total_pages,
    }))
}

/// Show one item.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ItemView>> {
    let item = find_item(&state, &slug).await?;
    Ok(Json(ItemView::new(&item, &state.config().currency_symbol)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use outfitter_core::{Category, ItemId, Label};

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
    }

    #[test]
    fn test_item_view() {
        let item = Item {
            id: ItemId::new(1),
            title: "Trail Shirt".to_owned(),
            price: "30.00".parse().unwrap(),
            discount_price: Some("24.50".parse().unwrap()),
            category: Category::Shirt,
            label: Label::Secondary,
            slug: Slug::parse("trail-shirt").unwrap(),
            description: String::new(),
            image: "shirt.jpg".to_owned(),
        };
        let view = ItemView::new(&item, "€");
        assert_eq!(view.display_price, "€24.50");
        assert_eq!(view.category, "Shirt");
        assert_eq!(view.label_class, "secondary");
        assert_eq!(view.links.add_to_cart, "/add-to-cart/trail-shirt");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["slug"], "trail-shirt");
        assert_eq!(json["price"], "30.00");
    }
}
