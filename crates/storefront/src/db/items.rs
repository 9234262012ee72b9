//! Catalog item repository.

use sqlx::PgPool;

use outfitter_core::{Item, ItemId, Money, NewItem, Slug};

use super::{RepositoryError, conflict_on_unique, decode_column};

/// Columns selected for every item query, in `ItemRow` order.
pub(crate) const ITEM_COLUMNS: &str =
    "i.id, i.title, i.price, i.discount_price, i.category, i.label, i.slug, i.description, i.image";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    pub(crate) id: i32,
    pub(crate) title: String,
    pub(crate) price: Money,
    pub(crate) discount_price: Option<Money>,
    pub(crate) category: String,
    pub(crate) label: String,
    pub(crate) slug: String,
    pub(crate) description: String,
    pub(crate) image: String,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ItemId::new(row.id),
            title: row.title,
            price: row.price,
            discount_price: row.discount_price,
            category: decode_column("category", row.category.parse())?,
            label: decode_column("label", row.label.parse())?,
            slug: decode_column("slug", Slug::parse(&row.slug))?,
            description: row.description,
            image: row.image,
        })
    }
}

/// Repository for catalog reads and writes.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List one page of the catalog, ordered by id.
    ///
    /// Pages are 1-based; page 0 is treated as page 1.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, page: u32, page_size: u32) -> Result<Vec<Item>, RepositoryError> {
        let offset = i64::from(page.max(1) - 1) * i64::from(page_size);

        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM storefront.item i ORDER BY i.id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page_size))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    /// Count catalog items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storefront.item")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Get an item by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM storefront.item i WHERE i.slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Item::try_from).transpose()
    }

    /// Insert a new catalog item.
    ///
    /// The slug is derived from the title when the input has none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the input is invalid and
    /// `RepositoryError::Conflict` if the slug is already taken.
    pub async fn create(&self, new: &NewItem) -> Result<Item, RepositoryError> {
        new.validate()
            .map_err(|e| RepositoryError::Invalid(e.to_string()))?;

        let slug = match &new.slug {
            Some(slug) => slug.clone(),
            None => Slug::from_title(&new.title)
                .map_err(|e| RepositoryError::Invalid(format!("cannot derive slug: {e}")))?,
        };

        let row = sqlx::query_as::<_, ItemRow>(
            r"
            INSERT INTO storefront.item AS i
                (title, price, discount_price, category, label, slug, description, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING i.id, i.title, i.price, i.discount_price, i.category, i.label,
                      i.slug, i.description, i.image
            ",
        )
        .bind(new.title.trim())
        .bind(new.price)
        .bind(new.discount_price)
        .bind(new.category.code())
        .bind(new.label.code())
        .bind(slug.as_str())
        .bind(&new.description)
        .bind(&new.image)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "slug"))?;

        let item = Item::try_from(row)?;
        tracing::info!(item_id = %item.id, slug = %item.slug, "item created");
        Ok(item)
    }
}
