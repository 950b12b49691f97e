use crate::config::{config, StoreBackend};
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    let database = &config().database;
    if database.backend != StoreBackend::Postgres {
        anyhow::bail!("migrate requires STORE_BACKEND=postgres");
    }

    let pool = DatabaseManager::connect(database).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;
    Ok(())
}
