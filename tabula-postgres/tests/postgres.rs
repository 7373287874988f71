
#[cfg(test)]
mod tests {
    use super::init::init;
    use futures::FutureExt;
    use rust_decimal::Decimal;
    use std::sync::LazyLock;
    use tabula_core::{Connection, Invocation, NO_PARAMS, Value};
    use tabula_postgres::{PoolConfig, PostgresConnection, PostgresPool};
    use tabula_tests::{execute_tests, init_logs, silent_logs};
    use time::macros::datetime;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    #[tokio::test]
    async fn postgres() {
        init_logs();
        let _guard = MUTEX.lock().await;

        let (url, container) = init().await;
        let pool = PostgresPool::open(PoolConfig::new(url.as_str()).max_size(4))
            .await
            .unwrap_or_else(|e| panic!("Could not connect to `{url}`: {e:#}"));
        execute_tests(async || pool.acquire().await).await;
        assert!(pool.idle_count().await > 0);
        pool.close().await;
        drop(container);
    }

    #[tokio::test]
    async fn single_connections() {
        init_logs();
        let _guard = MUTEX.lock().await;

        let (url, container) = init().await;
        execute_tests(async || PostgresConnection::connect(&url).await).await;
        drop(container);
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            assert!(
                PostgresConnection::connect("mysql://some_url")
                    .await
                    .is_err()
            );
            assert!(
                PostgresPool::open(PoolConfig::new("postgres://127.0.0.1:1/nothing"))
                    .await
                    .is_err()
            );
        }
    }

    #[tokio::test]
    async fn values() {
        init_logs();
        let _guard = MUTEX.lock().await;

        let (url, container) = init().await;
        let connection = PostgresConnection::connect(&url)
            .await
            .expect("Could not connect");
        let mut invocation = Invocation::new(connection);
        let id = Uuid::from_u128(0x6b3a_11c7_b0a4_4c0e_9f2d_3c9a_5e1f_8d42);
        let result = invocation
            .query(
                "SELECT $1::SMALLINT AS small, $2::NUMERIC AS amount, $3::UUID AS id, \
                $4::BYTEA AS data, $5::TIMESTAMP AS at, $6::TEXT AS missing, $7::BOOLEAN AS flag, \
                $8::OID AS object",
                [
                    // Narrowed to the parameter type
                    Value::Int64(Some(7)),
                    Value::Decimal(Some(Decimal::new(31415, 4))),
                    Value::Uuid(Some(id)),
                    Value::Blob(Some([1u8, 2, 3].into())),
                    Value::Timestamp(Some(datetime!(2024-02-29 12:30:00))),
                    Value::Null,
                    Value::Boolean(Some(true)),
                    Value::Int64(Some(1259)),
                ],
            )
            .await
            .expect("Could not select the values");
        let row = result.first().expect("There should be one row");
        assert_eq!(
            row.names(),
            [
                "small", "amount", "id", "data", "at", "missing", "flag", "object"
            ]
        );
        assert_eq!(
            row.values(),
            [
                Value::Int16(Some(7)),
                Value::Decimal(Some(Decimal::new(31415, 4))),
                Value::Uuid(Some(id)),
                Value::Blob(Some([1u8, 2, 3].into())),
                Value::Timestamp(Some(datetime!(2024-02-29 12:30:00))),
                Value::Varchar(None),
                Value::Boolean(Some(true)),
                Value::Int64(Some(1259)),
            ]
        );

        silent_logs! {
            let error = invocation
                .query("SELECT $1::SMALLINT", [Value::Int64(Some(1 << 20))])
                .await
                .expect_err("The value does not fit a SMALLINT");
            assert!(format!("{error:#}").contains("out of range"));
            let error = invocation
                .query("SELECT $1::OID", [Value::Int64(Some(-1))])
                .await
                .expect_err("An OID cannot be negative");
            assert!(format!("{error:#}").contains("out of range"));
            let error = invocation
                .exec("SELECT * FROM tabula_no_such_table", NO_PARAMS)
                .await
                .expect_err("The table does not exist");
            assert!(error.downcast_ref::<tokio_postgres::Error>().is_some());
        }
        invocation.close().await.expect("Could not close");
        drop(container);
    }

    #[tokio::test]
    async fn pool() {
        init_logs();
        let _guard = MUTEX.lock().await;

        let (url, container) = init().await;
        let pool = PostgresPool::open(PoolConfig::new(url.as_str()).max_size(1))
            .await
            .expect("Could not open the pool");
        assert_eq!(pool.idle_count().await, 1);

        // Checkouts are bounded by max_size
        let connection = pool.acquire().await.expect("Could not acquire");
        assert_eq!(pool.idle_count().await, 0);
        assert!(pool.acquire().now_or_never().is_none());
        connection.release().await.expect("Could not release");
        assert_eq!(pool.idle_count().await, 1);

        // A connection released inside a transaction is not reused
        let mut invocation = pool.invoke().await.expect("Could not invoke");
        invocation.begin().await.expect("Could not begin");
        assert!(invocation.connection().in_transaction());
        silent_logs! {
            invocation.close().await.expect("Could not close");
        }
        assert_eq!(pool.idle_count().await, 0);

        // Committed ones are
        let mut invocation = pool.invoke().await.expect("Could not invoke");
        invocation.begin().await.expect("Could not begin");
        invocation.commit().await.expect("Could not commit");
        invocation.close().await.expect("Could not close");
        assert_eq!(pool.idle_count().await, 1);

        // Raw transaction statements are tracked too
        let mut invocation = pool.invoke().await.expect("Could not invoke");
        invocation
            .exec("start transaction", NO_PARAMS)
            .await
            .expect("Could not start a transaction");
        assert!(invocation.connection().in_transaction());
        invocation
            .exec("SAVEPOINT before", NO_PARAMS)
            .await
            .expect("Could not create a savepoint");
        invocation
            .exec("ROLLBACK TO SAVEPOINT before", NO_PARAMS)
            .await
            .expect("Could not roll back to the savepoint");
        assert!(invocation.connection().in_transaction());
        invocation
            .exec("COMMIT", NO_PARAMS)
            .await
            .expect("Could not commit");
        assert!(!invocation.connection().in_transaction());
        invocation.close().await.expect("Could not close");
        assert_eq!(pool.idle_count().await, 1);

        let mut invocation = pool.invoke().await.expect("Could not invoke");
        invocation
            .exec("BEGIN", NO_PARAMS)
            .await
            .expect("Could not begin");
        assert!(!invocation.in_transaction());
        assert!(invocation.connection().in_transaction());
        silent_logs! {
            invocation.close().await.expect("Could not close");
        }
        assert_eq!(pool.idle_count().await, 0);

        pool.close().await;
        assert!(pool.acquire().await.is_err());
        drop(container);
    }
}
