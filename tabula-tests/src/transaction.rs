use tabula::{Connection, Entity, Invocation, MappingError, NO_PARAMS, Result};

#[derive(Default, Debug, Clone, PartialEq, Entity)]
#[tabula(table = "tabula_visit")]
pub struct Visit {
    #[tabula(primary_key, serial)]
    pub id: i32,
    pub page: String,
}

pub async fn transaction<C, F>(connect: &F)
where
    C: Connection,
    F: AsyncFn() -> Result<C>,
{
    let mut writer = Invocation::new(connect().await.expect("Could not connect the writer"));
    let mut reader = Invocation::new(connect().await.expect("Could not connect the reader"));

    // Setup
    writer
        .exec("DROP TABLE IF EXISTS tabula_visit", NO_PARAMS)
        .await
        .expect("Failed to drop tabula_visit");
    writer
        .exec(
            "CREATE TABLE tabula_visit (id SERIAL PRIMARY KEY, page VARCHAR NOT NULL)",
            NO_PARAMS,
        )
        .await
        .expect("Failed to create tabula_visit");

    // Uncommitted rows are invisible to other sessions and discarded by rollback
    writer.begin().await.expect("Could not begin");
    assert!(writer.in_transaction());
    let mut visit = Visit {
        page: "/index".into(),
        ..Default::default()
    };
    writer.create(&mut visit).await.expect("Could not create the visit");
    assert_eq!(
        writer
            .get::<Visit, _>([visit.id])
            .await
            .expect("Could not get the visit")
            .as_ref(),
        Some(&visit)
    );
    assert_eq!(
        reader
            .get::<Visit, _>([visit.id])
            .await
            .expect("Could not get the visit"),
        None
    );
    writer.rollback().await.expect("Could not rollback");
    assert!(!writer.in_transaction());
    assert_eq!(
        writer
            .get::<Visit, _>([visit.id])
            .await
            .expect("Could not get the visit"),
        None
    );

    // Committed rows are visible to other sessions
    writer.begin().await.expect("Could not begin");
    let error = writer
        .begin()
        .await
        .expect_err("Nested begin must be rejected");
    assert!(matches!(
        error.downcast_ref::<MappingError>(),
        Some(MappingError::TransactionActive)
    ));
    let mut visit = Visit {
        page: "/about".into(),
        ..Default::default()
    };
    writer.create(&mut visit).await.expect("Could not create the visit");
    writer.commit().await.expect("Could not commit");
    assert_eq!(
        reader
            .get::<Visit, _>([visit.id])
            .await
            .expect("Could not get the visit"),
        Some(visit.clone())
    );

    // Ending a transaction that is not open only warns
    writer
        .rollback()
        .await
        .expect("Rollback without a transaction is not an error");

    // The invocation is closed even when the work fails
    let connection = connect().await.expect("Could not connect");
    let result = Invocation::scoped(connection, async |invocation| {
        invocation.begin().await?;
        invocation.exec("SELECT * FROM tabula_missing_table", NO_PARAMS).await
    })
    .await;
    assert!(result.is_err());
    let count = Invocation::scoped(
        connect().await.expect("Could not connect"),
        async |invocation| Ok(invocation.get_all::<Visit>().await?.len()),
    )
    .await
    .expect("Could not count the visits");
    assert_eq!(count, 1);

    writer.close().await.expect("Could not close the writer");
    reader.close().await.expect("Could not close the reader");
}
