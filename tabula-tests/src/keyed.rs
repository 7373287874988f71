use tabula::{Connection, Entity, Invocation, NO_PARAMS};

/// Natural primary key next to a serial column that is not part of it.
#[derive(Default, Debug, Clone, PartialEq, Entity)]
#[tabula(table = "tabula_keyed")]
pub struct Keyed {
    #[tabula(serial)]
    pub id: i32,
    #[tabula(primary_key)]
    pub name: String,
    pub monies: i32,
    pub test: Option<String>,
}

/// Only key columns, upsert has nothing to update.
#[derive(Default, Debug, Clone, PartialEq, Entity)]
#[tabula(table = "tabula_keyed_tag")]
pub struct KeyedTag {
    #[tabula(primary_key)]
    pub tag: String,
}

pub async fn keyed<C: Connection>(invocation: &mut Invocation<C>) {
    // Setup
    for sql in [
        "DROP TABLE IF EXISTS tabula_keyed",
        "CREATE TABLE tabula_keyed (id SERIAL, name VARCHAR PRIMARY KEY, monies INTEGER, test VARCHAR)",
        "DROP TABLE IF EXISTS tabula_keyed_tag",
        "CREATE TABLE tabula_keyed_tag (tag VARCHAR PRIMARY KEY)",
    ] {
        invocation
            .exec(sql, NO_PARAMS)
            .await
            .unwrap_or_else(|e| panic!("Failed to run `{sql}`: {e:#}"));
    }

    invocation.begin().await.expect("Could not begin");
    let mut record = Keyed {
        name: "world test record".into(),
        monies: 5,
        test: Some("hello".into()),
        ..Default::default()
    };
    invocation.create(&mut record).await.expect("Could not create");
    let found = invocation
        .get::<Keyed, _>([record.name.as_str()])
        .await
        .expect("Could not get")
        .expect("The record should exist");
    assert_eq!(found.id, 1);
    assert_eq!(found.name, "world test record");
    assert_eq!(found.test.as_deref(), Some("hello"));

    // Update never touches the key or the serial
    let update = Keyed {
        name: "world test record".into(),
        monies: 0,
        test: Some("hello".into()),
        ..Default::default()
    };
    let result = invocation.update(&update).await.expect("Could not update");
    assert_eq!(result.rows_affected, 1);
    let found = invocation
        .get::<Keyed, _>(["world test record"])
        .await
        .expect("Could not get")
        .expect("The record should exist");
    assert_eq!(found.id, 1);
    assert_eq!(found.monies, 0);
    assert_eq!(found.test.as_deref(), Some("hello"));

    // Upsert of an existing key updates it
    let mut existing = Keyed {
        name: "world test record".into(),
        monies: 3,
        test: Some("hello".into()),
        ..Default::default()
    };
    invocation
        .upsert(&mut existing)
        .await
        .expect("Could not upsert the existing record");
    assert_eq!(existing.id, 1);
    let mut found = invocation
        .get::<Keyed, _>(["world test record"])
        .await
        .expect("Could not get")
        .expect("The record should exist");
    assert_eq!(found.id, 1);
    assert_eq!(found.monies, 3);
    assert_eq!(found.test.as_deref(), Some("hello"));

    // Upsert of a new key inserts it, the conflicting insert above used one value of the sequence
    found.name = "hello".into();
    found.monies = 0;
    invocation
        .upsert(&mut found)
        .await
        .expect("Could not upsert the new record");
    assert_eq!(found.id, 3);
    let inserted = invocation
        .get::<Keyed, _>(["hello"])
        .await
        .expect("Could not get")
        .expect("The record should exist");
    assert_eq!(inserted, found);
    let all = invocation
        .get_all::<Keyed>()
        .await
        .expect("Could not get all");
    assert_eq!(all.len(), 2);

    // Nothing to update
    let mut tag = KeyedTag { tag: "red".into() };
    invocation.upsert(&mut tag).await.expect("Could not upsert the tag");
    invocation
        .upsert(&mut tag)
        .await
        .expect("Upserting the same tag twice is not an error");
    let result = invocation
        .update(&tag)
        .await
        .expect("Update without updatable columns is not an error");
    assert_eq!(result.rows_affected, 0);
    assert_eq!(
        invocation
            .get_all::<KeyedTag>()
            .await
            .expect("Could not get all the tags"),
        [tag]
    );

    invocation.rollback().await.expect("Could not rollback");
    assert!(
        invocation
            .get_all::<Keyed>()
            .await
            .expect("Could not get all")
            .is_empty()
    );
}
