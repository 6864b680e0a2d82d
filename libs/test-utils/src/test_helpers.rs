use anyhow::Result;
use uuid::Uuid;

use crate::postgres::TestPostgresContainer;

/// Insert an enabled USER identity with password "secret" and return its
/// id. The username is derived from the email's local part.
pub async fn create_test_identity(
    container: &TestPostgresContainer, email: &str,
) -> Result<Uuid> {
    let id = Uuid::now_v7();
    let username = email.split('@').next().unwrap_or(email).to_string();
    let password_hash = auth_core::hash_password("secret")
        .map_err(|e| anyhow::anyhow!("hash failed: {e}"))?;

    let client = container.pool.get().await?;
    let stmt = client
        .prepare(
            "INSERT INTO identity (id, authority, username, password, \
             email, enabled, firstname, lastname, patronymic) VALUES ($1, \
             'USER', $2, $3, $4, TRUE, 'Test', 'Identity', 'None')",
        )
        .await?;
    client
        .execute(&stmt, &[&id, &username, &password_hash, &email])
        .await?;

    Ok(id)
}

pub async fn create_test_admin(
    container: &TestPostgresContainer, email: &str,
) -> Result<Uuid> {
    let id = create_test_identity(container, email).await?;
    let client = container.pool.get().await?;
    let stmt = client
        .prepare("UPDATE identity SET authority = 'ADMIN' WHERE id = $1")
        .await?;
    client.execute(&stmt, &[&id]).await?;
    Ok(id)
}

pub async fn create_test_category(
    container: &TestPostgresContainer,
) -> Result<Uuid> {
    create_test_category_named(container, "Hotels").await
}

pub async fn create_test_category_named(
    container: &TestPostgresContainer, name: &str,
) -> Result<Uuid> {
    let id = Uuid::now_v7();
    let description = format!("Listings for {name}");

    let client = container.pool.get().await?;
    let stmt = client
        .prepare(
            "INSERT INTO category (id, name, description) VALUES ($1, $2, \
             $3)",
        )
        .await?;
    client.execute(&stmt, &[&id, &name, &description]).await?;

    Ok(id)
}

pub async fn create_test_property(
    container: &TestPostgresContainer, owner_id: Uuid,
    category_id: Option<Uuid>,
) -> Result<Uuid> {
    let id = Uuid::now_v7();

    let client = container.pool.get().await?;
    let stmt = client
        .prepare(
            "INSERT INTO property (id, category_id, name, address, \
             description, owner_id) VALUES ($1, $2, 'Deleon', 'Russkaya \
             175/1', 'Hotel Deleon', $3)",
        )
        .await?;
    client
        .execute(&stmt, &[&id, &category_id, &owner_id])
        .await?;

    Ok(id)
}

pub async fn create_test_advertisement(
    container: &TestPostgresContainer, property_id: Uuid,
) -> Result<Uuid> {
    let id = Uuid::now_v7();

    let client = container.pool.get().await?;
    let stmt = client
        .prepare(
            "INSERT INTO advertisement (id, title, description, \
             property_id, price, date) VALUES ($1, 'Deleon for rent', \
             'Rental details', $2, 340500.50, CURRENT_DATE)",
        )
        .await?;
    client.execute(&stmt, &[&id, &property_id]).await?;

    Ok(id)
}

/// Count rows in a table, for asserting that a rejected call mutated
/// nothing.
pub async fn count_rows(
    container: &TestPostgresContainer, table: &str,
) -> Result<i64> {
    let client = container.pool.get().await?;
    let row = client
        .query_one(&format!("SELECT COUNT(*) FROM {table}"), &[])
        .await?;
    Ok(row.get(0))
}
