use botfleet_storage::FleetDb;
use sea_orm::{DatabaseBackend, MockDatabase};

// Teardown must work on a borrowed connection; the connection type is not
// clonable in every build configuration.
#[tokio::test]
async fn close_works_on_a_borrowed_connection() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    FleetDb::close(&db).await.unwrap();
}
