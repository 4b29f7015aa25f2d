//! End-to-end test against a real SQL Server.
//!
//! Requires a reachable instance and the `DB_*` environment variables
//! (`DB_PASSWORD` at minimum), e.g.:
//!
//! ```sh
//! podman run --rm -d -p 1433:1433 -e ACCEPT_EULA=Y \
//!     -e MSSQL_SA_PASSWORD='YourStrong!Passw0rd' \
//!     mcr.microsoft.com/mssql/server:2022-latest
//! DB_SERVER=localhost DB_NAME=master DB_PASSWORD='YourStrong!Passw0rd' \
//!     cargo test --test live_mssql -- --ignored
//! ```

use std::time::Duration;

use mssql_bootstrap::prelude::*;

const SEED_SCRIPT: &str = "\
IF OBJECT_ID('BootstrapCustomers', 'U') IS NOT NULL DROP TABLE BootstrapCustomers;
GO
CREATE TABLE BootstrapCustomers (
    CustomerID INT PRIMARY KEY,
    Name NVARCHAR(100) NOT NULL,
    Country NVARCHAR(50) NULL DEFAULT 'VN'
);
GO
INSERT INTO BootstrapCustomers (CustomerID, Name) VALUES (1, 'Alice');
GO
INSERT INTO BootstrapCustomers (CustomerID, Name) VALUES (2, 'Bob');
GO
THIS IS NOT VALID SQL AND MUST BE SKIPPED;
GO
INSERT INTO BootstrapCustomers (CustomerID, Name) VALUES (3, 'Carol');
GO
";

#[tokio::test]
#[ignore = "requires a running SQL Server and DB_* environment variables"]
async fn seed_script_and_introspection_round_trip() {
    let config = ConnectionConfig::from_env().expect("DB_PASSWORD must be set");
    let policy = RetryPolicy::new(10, Duration::from_secs(5));
    let mut session = Session::connect(config, &policy).await.expect("connect");

    // Best-effort load: the deliberately broken statement is skipped, the
    // insert after it still runs.
    let report = run_script(&mut session, SEED_SCRIPT).await;
    assert_eq!(report.outcomes.len(), 6);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures().next().unwrap().index, 4);

    let customers = session
        .query_as_table("SELECT CustomerID, Name FROM BootstrapCustomers ORDER BY CustomerID")
        .await
        .expect("verification query");
    assert_eq!(customers.len(), 3);
    assert_eq!(
        customers.rows()[2].get("Name"),
        Some(&RowValues::Text("Carol".to_string()))
    );

    let tables = list_tables(&mut session).await.expect("list tables");
    assert!(tables.iter().any(|t| t.name == "BootstrapCustomers"));
    let mut sorted = tables.clone();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(tables, sorted, "tables must come back ordered by name");

    let columns = describe_table(&mut session, "BootstrapCustomers")
        .await
        .expect("describe table");
    assert_eq!(columns[0].name, "CustomerID");
    assert!(!columns[0].is_nullable);
    assert_eq!(columns[2].name, "Country");
    assert!(columns[2].is_nullable);
    assert!(columns[2].default.is_some());

    session.close().await.expect("close");
    assert!(!session.is_open());

    // A closed session refuses further work instead of silently no-opping.
    let err = session.execute("SELECT 1").await.unwrap_err();
    assert!(matches!(err, MssqlBootstrapError::UsageError(_)));
    // Closing twice is fine.
    session.close().await.expect("second close");
}
