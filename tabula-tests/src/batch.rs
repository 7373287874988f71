use tabula::{Connection, Entity, Invocation, MappingError, NO_PARAMS, Record};

#[derive(Default, Debug, Clone, PartialEq, Entity)]
#[tabula(table = "tabula_batch_item")]
pub struct Item {
    #[tabula(primary_key, serial)]
    pub id: i64,
    pub label: String,
    pub weight: Option<f64>,
}

#[derive(Default, Debug, Clone, PartialEq, Entity)]
#[tabula(table = "tabula_batch_item")]
pub struct Impostor {
    #[tabula(primary_key, serial)]
    pub id: i64,
    pub label: String,
}

pub async fn batch<C: Connection>(invocation: &mut Invocation<C>) {
    // Setup
    invocation
        .exec("DROP TABLE IF EXISTS tabula_batch_item", NO_PARAMS)
        .await
        .expect("Failed to drop tabula_batch_item");
    invocation
        .exec(
            "CREATE TABLE tabula_batch_item (id BIGSERIAL PRIMARY KEY, label VARCHAR NOT NULL, weight DOUBLE PRECISION)",
            NO_PARAMS,
        )
        .await
        .expect("Failed to create tabula_batch_item");

    // Each record receives its own serial, in order
    let mut items: Vec<Item> = ["anvil", "feather", "brick"]
        .into_iter()
        .map(|label| Item {
            label: label.into(),
            weight: (label != "feather").then_some(12.5),
            ..Default::default()
        })
        .collect();
    invocation
        .create_many(items.iter_mut())
        .await
        .expect("Could not create the items");
    assert_eq!(items.iter().map(|v| v.id).collect::<Vec<_>>(), [1, 2, 3]);
    let feather = invocation
        .get::<Item, _>([2i64])
        .await
        .expect("Could not get the feather")
        .expect("The feather should exist");
    assert_eq!(feather, items[1]);
    assert_eq!(feather.weight, None);

    // An empty batch sends nothing
    invocation
        .create_many(Vec::<&mut Item>::new())
        .await
        .expect("An empty batch is not an error");

    // Mixed types are rejected before anything is sent, even when they map the same table
    let mut first = Item {
        label: "first".into(),
        ..Default::default()
    };
    let mut second = Impostor {
        label: "second".into(),
        ..Default::default()
    };
    let records: Vec<&mut dyn Record> = vec![&mut first, &mut second];
    let error = invocation
        .create_many(records)
        .await
        .expect_err("Mixed types must be rejected");
    assert!(matches!(
        error.downcast_ref::<MappingError>(),
        Some(MappingError::MixedTypes { .. })
    ));
    assert!(
        error.to_string().contains("same type"),
        "Unexpected message: {error}"
    );
    assert_eq!(first.id, 0);
    assert_eq!(
        invocation
            .get_all::<Item>()
            .await
            .expect("Could not get all the items")
            .len(),
        3
    );
}
