use tabula::{Connection, Entity, Invocation, MappingError, NO_PARAMS};

#[derive(Default, Debug, Clone, PartialEq, Entity)]
#[tabula(table = "tabula_person")]
pub struct Person {
    #[tabula(primary_key, serial)]
    pub id: i32,
    pub name: String,
    pub monies: i64,
}

pub async fn people<C: Connection>(invocation: &mut Invocation<C>) {
    // Setup
    invocation
        .exec("DROP TABLE IF EXISTS tabula_person", NO_PARAMS)
        .await
        .expect("Failed to drop tabula_person");
    invocation
        .exec(
            "CREATE TABLE tabula_person (id SERIAL PRIMARY KEY, name VARCHAR NOT NULL, monies BIGINT NOT NULL)",
            NO_PARAMS,
        )
        .await
        .expect("Failed to create tabula_person");

    // Create assigns the serial
    let mut ada = Person {
        name: "Ada".into(),
        monies: 5,
        ..Default::default()
    };
    invocation.create(&mut ada).await.expect("Could not create Ada");
    assert_eq!(ada.id, 1);
    let mut grace = Person {
        name: "Grace".into(),
        monies: 700,
        ..Default::default()
    };
    invocation
        .create(&mut grace)
        .await
        .expect("Could not create Grace");
    assert_eq!(grace.id, 2);

    // Get
    let found = invocation
        .get::<Person, _>([ada.id])
        .await
        .expect("Could not get Ada")
        .expect("Ada should exist");
    assert_eq!(found, ada);
    let missing = invocation
        .get::<Person, _>([999])
        .await
        .expect("A missing row is not an error");
    assert_eq!(missing, None);

    // Wrong number of keys
    let error = invocation
        .get::<Person, _>([1, 2])
        .await
        .expect_err("Two keys for a single column primary key");
    assert!(matches!(
        error.downcast_ref::<MappingError>(),
        Some(MappingError::ArgumentCount {
            expected: 1,
            actual: 2,
            ..
        })
    ));

    // Get all
    let mut everyone = invocation
        .get_all::<Person>()
        .await
        .expect("Could not get all the people");
    everyone.sort_by_key(|p| p.id);
    assert_eq!(everyone, [ada.clone(), grace.clone()]);

    // Update
    ada.monies = 6;
    ada.name = "Ada Lovelace".into();
    let result = invocation.update(&ada).await.expect("Could not update Ada");
    assert_eq!(result.rows_affected, 1);
    let found = invocation
        .get::<Person, _>([ada.id])
        .await
        .expect("Could not get Ada")
        .expect("Ada should exist");
    assert_eq!(found.name, "Ada Lovelace");
    assert_eq!(found.monies, 6);

    // Delete
    let result = invocation.delete(&grace).await.expect("Could not delete Grace");
    assert_eq!(result.rows_affected, 1);
    assert_eq!(
        invocation
            .get::<Person, _>([grace.id])
            .await
            .expect("Could not get Grace"),
        None
    );
    let result = invocation
        .delete(&grace)
        .await
        .expect("Deleting twice is not an error");
    assert_eq!(result.rows_affected, 0);

    // Truncate restarts the numbering
    invocation
        .truncate::<Person>()
        .await
        .expect("Could not truncate tabula_person");
    assert!(
        invocation
            .get_all::<Person>()
            .await
            .expect("Could not get all the people")
            .is_empty()
    );
    let mut linus = Person {
        name: "Linus".into(),
        monies: 1,
        ..Default::default()
    };
    invocation
        .create(&mut linus)
        .await
        .expect("Could not create Linus");
    assert_eq!(linus.id, 1);

    // Upsert of new people leaves the key to the sequence
    let mut barbara = Person {
        name: "Barbara".into(),
        monies: 2,
        ..Default::default()
    };
    let mut edsger = Person {
        name: "Edsger".into(),
        monies: 3,
        ..Default::default()
    };
    invocation
        .upsert(&mut barbara)
        .await
        .expect("Could not upsert Barbara");
    invocation
        .upsert(&mut edsger)
        .await
        .expect("Could not upsert Edsger");
    let mut donald = Person {
        name: "Donald".into(),
        monies: 4,
        ..Default::default()
    };
    invocation
        .create(&mut donald)
        .await
        .expect("Could not create Donald after the upserts");
    assert_eq!([barbara.id, edsger.id, donald.id], [2, 3, 4]);

    // Upsert of an existing person updates it
    barbara.monies = 20;
    invocation
        .upsert(&mut barbara)
        .await
        .expect("Could not upsert Barbara again");
    let found = invocation
        .get::<Person, _>([barbara.id])
        .await
        .expect("Could not get Barbara")
        .expect("Barbara should exist");
    assert_eq!(found, barbara);
    assert_eq!(
        invocation
            .get_all::<Person>()
            .await
            .expect("Could not get all the people")
            .len(),
        4
    );
}
