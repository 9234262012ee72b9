//! Billing address repository.

use sqlx::{PgConnection, PgPool};

use outfitter_core::{BillingAddress, BillingAddressId, CountryCode, NewBillingAddress, UserId};

use super::{RepositoryError, decode_column};

const ADDRESS_COLUMNS: &str = "id, user_id, street_address, house_address, country, zip";

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    street_address: String,
    house_address: String,
    country: String,
    zip: String,
}

impl TryFrom<AddressRow> for BillingAddress {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BillingAddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            street_address: row.street_address,
            house_address: row.house_address,
            country: decode_column("country", CountryCode::parse(&row.country))?,
            zip: row.zip,
        })
    }
}

/// Insert an address inside an open transaction.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    user_id: UserId,
    new: NewBillingAddress,
) -> Result<BillingAddress, RepositoryError> {
    let new = new.normalized().map_err(RepositoryError::Invalid)?;

    let row = sqlx::query_as::<_, AddressRow>(&format!(
        r"
        INSERT INTO storefront.billing_address (user_id, street_address, house_address, country, zip)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {ADDRESS_COLUMNS}
        "
    ))
    .bind(user_id)
    .bind(&new.street_address)
    .bind(&new.house_address)
    .bind(new.country.as_str())
    .bind(&new.zip)
    .fetch_one(&mut *conn)
    .await?;

    BillingAddress::try_from(row)
}

/// Repository for billing addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an address by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: BillingAddressId,
    ) -> Result<Option<BillingAddress>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM storefront.billing_address WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(BillingAddress::try_from).transpose()
    }
}
