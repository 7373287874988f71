use crate::people::Person;
use tabula::{Connection, Invocation, MappingError, NO_PARAMS, Value};

pub async fn raw<C: Connection>(invocation: &mut Invocation<C>) {
    // Setup
    invocation
        .truncate::<Person>()
        .await
        .expect("Could not truncate tabula_person");
    invocation
        .exec(
            "INSERT INTO tabula_person (name, monies) VALUES ($1, $2), ($3, $4), ($5, $6)",
            [
                Value::from("Alan"),
                Value::from(10i64),
                Value::from("Barbara"),
                Value::from(20i64),
                Value::from("Claude"),
                Value::from(30i64),
            ],
        )
        .await
        .expect("Could not insert the people");

    // Rows bound to entities
    let result = invocation
        .query(
            "SELECT * FROM tabula_person WHERE monies >= $1 ORDER BY id",
            [15i64],
        )
        .await
        .expect("Could not select the people");
    assert_eq!(result.row_count(), 2);
    let people = result.bind_all::<Person>().expect("Could not bind the people");
    assert_eq!(
        people.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        ["Barbara", "Claude"]
    );
    let first = result
        .bind_one::<Person>()
        .expect("Could not bind the first person")
        .expect("There should be a first person");
    assert_eq!(first, people[0]);

    // Plain values
    let result = invocation
        .query("SELECT COUNT(*) AS total FROM tabula_person", NO_PARAMS)
        .await
        .expect("Could not count the people");
    assert_eq!(
        result.first().and_then(|r| r.get_column("total")),
        Some(&Value::Int64(Some(3)))
    );

    // Modifications report the affected rows
    let result = invocation
        .query(
            "UPDATE tabula_person SET monies = monies + 1 WHERE monies < $1",
            [25i64],
        )
        .await
        .expect("Could not update the people");
    assert_eq!(result.rows_affected, 2);
    assert!(result.rows.is_empty());

    // A projection missing mapped columns cannot be bound
    let result = invocation
        .query("SELECT name FROM tabula_person", NO_PARAMS)
        .await
        .expect("Could not select the names");
    let error = result
        .bind_all::<Person>()
        .expect_err("The id and monies columns are missing");
    assert!(matches!(
        error.downcast_ref::<MappingError>(),
        Some(MappingError::MissingColumn("id"))
    ));
}
