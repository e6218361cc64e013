use crate::postgres_client_wrapper::{FromRow, PostgresClientWrapper};
use std::panic::{RefUnwindSafe, UnwindSafe};
use tokio_postgres::types::FromSqlOwned;
use uuid::Uuid;

const PASSWORD: &str = "passw0rd";

/// A database created for a single test.
///
/// The database is dropped again when the helper is stopped or dropped, unless
/// the test is panicking, in which case it is left around to be inspected.
///
/// All the methods unwrap errors directly to keep tests short.
pub struct TestHelper {
    pub test_db_name: String,
    main_connection: PostgresClientWrapper,
    helper_name: String,
    pub port: u16,
    cleaned_up_nicely: bool,
}

impl Drop for TestHelper {
    fn drop(&mut self) {
        if self.cleaned_up_nicely {
            return;
        }

        if std::thread::panicking() {
            eprintln!(
                "Thread is panicking when dropping test helper. Leaving database '{}' ({}) around to be inspected",
                self.test_db_name, self.helper_name
            );
        } else {
            let db_name = self.test_db_name.clone();
            let port = self.port;
            std::thread::spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();
                runtime.block_on(cleanup(&db_name, port));
            })
            .join()
            .expect("Failed to run test helper cleanup from drop");
        }
    }
}

impl RefUnwindSafe for TestHelper {}

impl UnwindSafe for TestHelper {}

/// Creates a database with a random name on the server listening on `port`.
pub async fn get_test_helper_on_port(name: &str, port: u16) -> TestHelper {
    let test_db_name = format!("test_db_{}", Uuid::new_v4().simple());

    {
        let conn = get_test_connection_on_port("postgres", port).await;
        conn.execute_non_query(&format!("create database {}", test_db_name))
            .await
            .expect("Failed to create test database");
    }

    let main_connection = get_test_connection_on_port(&test_db_name, port).await;

    TestHelper {
        test_db_name,
        main_connection,
        helper_name: name.to_string(),
        port,
        cleaned_up_nicely: false,
    }
}

impl TestHelper {
    /// The address of the test database, in the form the public operations accept.
    pub fn connection_string(&self) -> String {
        connection_string(&self.test_db_name, self.port)
    }

    pub async fn execute_not_query(&self, sql: &str) {
        self.main_connection
            .execute_non_query(sql)
            .await
            .unwrap_or_else(|e| panic!("Failed to execute non query: {:?}\n{}", e, sql));
    }

    pub async fn get_results<T: FromRow>(&self, sql: &str) -> Vec<T> {
        self.main_connection
            .get_results(sql, &[])
            .await
            .unwrap_or_else(|e| panic!("Failed to get results for query: {:?}\n{}", e, sql))
    }

    pub async fn get_single_result<T: FromSqlOwned>(&self, sql: &str) -> T {
        let results = self.get_results::<(T,)>(sql).await;
        assert_eq!(results.len(), 1, "Expected one result, got {}", results.len());
        results.into_iter().next().unwrap().0
    }

    pub fn get_conn(&self) -> &PostgresClientWrapper {
        &self.main_connection
    }

    pub async fn stop(mut self) {
        cleanup(&self.test_db_name, self.port).await;
        self.cleaned_up_nicely = true;
    }
}

fn connection_string(database_name: &str, port: u16) -> String {
    format!("host=localhost port={port} user=postgres password={PASSWORD} dbname={database_name}")
}

async fn get_test_connection_on_port(database_name: &str, port: u16) -> PostgresClientWrapper {
    PostgresClientWrapper::new(&connection_string(database_name, port))
        .await
        .expect("Connection to test database failed. Is postgres running?")
}

async fn cleanup(db_name: &str, port: u16) {
    let conn = get_test_connection_on_port("postgres", port).await;
    if conn.version() >= 130000 {
        conn.execute_non_query(&format!("drop database {} with (force);", db_name))
            .await
            .expect("Failed to drop test database");
    } else {
        conn.execute_non_query(&format!(
            "select pg_terminate_backend(pid) from pg_stat_activity where datname = '{}' and pid != pg_backend_pid()",
            db_name
        ))
        .await
        .expect("Failed to drop test database");
        conn.execute_non_query(&format!("drop database {};", db_name))
            .await
            .expect("Failed to drop test database");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_scout_test_macros::pg_test;

    #[pg_test(arg(postgres = 12))]
    #[pg_test(arg(postgres = 16))]
    async fn connects_to_expected_version(helper: &TestHelper) {
        let major = helper.get_conn().version() / 10000;
        assert!((12..=16).contains(&major), "unexpected version {}", major);

        let db_name: String = helper.get_single_result("select current_database();").await;
        assert_eq!(db_name, helper.test_db_name);
    }

    #[tokio::test]
    async fn drops_database_when_helper_is_dropped() {
        let (test_database_name, port) = {
            let helper = get_test_helper_on_port("helper", 5415).await;
            (helper.test_db_name.clone(), helper.port)
        };

        let conn = get_test_connection_on_port("postgres", port).await;
        let databases: Vec<String> = conn
            .get_single_results(
                "select datname::text from pg_database where datistemplate = false;",
                &[],
            )
            .await
            .unwrap();
        assert!(!databases.contains(&test_database_name));
    }
}
