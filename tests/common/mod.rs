//! Shared fixture: people with pets, clans, shoes (with socks), pictures
//! and toys, stored in a `MemoryStore`.

#![allow(dead_code)]

use inherit_rs::{
    InheritableConfig, MemoryStore, Propagator, Record, RecordRef, RecordStore, RecordType,
    RelationMeta, Schema,
};

pub type Engine = Propagator<MemoryStore>;

pub fn schema() -> Schema {
    Schema::new()
        .with(
            RecordType::new("Person")
                .fields(["first_name", "favorite_color", "last_name", "soccer_team"])
                .belongs_to("clan", "Clan")
                .has_one("pet", "Pet")
                .has_many("shoes", "Shoe")
                .relation("pictures", RelationMeta::has_many("Picture").role("imageable"))
                .relation("toys", RelationMeta::has_many("Toy").foreign_key("owner"))
                .inheritable(
                    InheritableConfig::new(
                        ["favorite_color", "last_name", "soccer_team"],
                        ["pet", "clan", "shoes", "pictures", "toys"],
                    )
                    .unwrap(),
                )
                .unwrap(),
        )
        .with(RecordType::new("Clan").field("name"))
        .with(
            RecordType::new("Pet")
                .fields(["name", "breed"])
                .belongs_to("person", "Person"),
        )
        .with(
            RecordType::new("Shoe")
                .fields(["sneakers", "size", "brand"])
                .belongs_to("person", "Person")
                .has_many("socks", "Sock")
                .inheritable(InheritableConfig::new(Vec::<String>::new(), ["socks"]).unwrap())
                .unwrap(),
        )
        .with(RecordType::new("Sock").field("name").belongs_to("shoe", "Shoe"))
        .with(
            RecordType::new("Picture")
                .fields(["url", "place"])
                .relation("imageable", RelationMeta::polymorphic_belongs_to()),
        )
        .with(
            RecordType::new("Toy")
                .fields(["friendly", "material", "color", "brand"])
                .belongs_to("owner", "Person"),
        )
}

pub fn engine() -> Engine {
    Propagator::new(MemoryStore::new(), schema())
}

pub async fn create(engine: &Engine, mut record: Record) -> Record {
    let outcome = engine.store().persist(&mut record).await.unwrap();
    assert!(outcome.is_saved(), "fixture record rejected: {outcome:?}");
    record
}

pub fn reference(record: &Record) -> RecordRef {
    record.reference().expect("fixture record is persisted")
}

pub async fn person(engine: &Engine, last_name: &str) -> Record {
    create(
        engine,
        Record::new("Person")
            .with_field("first_name", "Peter")
            .with_field("favorite_color", "teal")
            .with_field("last_name", last_name)
            .with_field("soccer_team", "Sharks"),
    )
    .await
}

pub async fn child_of(engine: &Engine, parent: &Record) -> Record {
    create(engine, Record::new("Person").with_field("parent", reference(parent))).await
}

pub async fn with_pet(engine: &Engine, owner: &Record) -> Record {
    create(
        engine,
        Record::new("Pet")
            .with_field("name", "Rex")
            .with_field("breed", "collie")
            .with_field("person", reference(owner)),
    )
    .await
}

pub async fn with_clan(engine: &Engine, member: &mut Record) -> Record {
    let clan = create(engine, Record::new("Clan").with_field("name", "Stark")).await;
    member.set("clan", reference(&clan));
    assert!(engine.store().persist(member).await.unwrap().is_saved());
    clan
}

pub async fn with_shoes(engine: &Engine, owner: &Record, count: usize) -> Vec<Record> {
    let mut shoes = Vec::new();
    for i in 0..count {
        shoes.push(
            create(
                engine,
                Record::new("Shoe")
                    .with_field("sneakers", i % 2 == 0)
                    .with_field("size", 40 + i as i64)
                    .with_field("brand", "Acme")
                    .with_field("person", reference(owner)),
            )
            .await,
        );
    }
    shoes
}

pub async fn with_socks(engine: &Engine, shoe: &Record, count: usize) -> Vec<Record> {
    let mut socks = Vec::new();
    for i in 0..count {
        socks.push(
            create(
                engine,
                Record::new("Sock")
                    .with_field("name", format!("sock-{i}"))
                    .with_field("shoe", reference(shoe)),
            )
            .await,
        );
    }
    socks
}

pub async fn with_pictures(engine: &Engine, owner: &Record, count: usize) {
    for i in 0..count {
        create(
            engine,
            Record::new("Picture")
                .with_field("url", format!("https://example.com/{i}.png"))
                .with_field("place", "Medellin")
                .with_field("imageable", reference(owner)),
        )
        .await;
    }
}

pub async fn with_toys(engine: &Engine, owner: &Record, count: usize) {
    for _ in 0..count {
        create(
            engine,
            Record::new("Toy")
                .with_field("friendly", true)
                .with_field("material", "wood")
                .with_field("color", "red")
                .with_field("brand", "Lego")
                .with_field("owner", reference(owner)),
        )
        .await;
    }
}

pub async fn count(engine: &Engine, type_name: &str) -> u64 {
    engine.store().count(type_name).await.unwrap()
}

pub async fn related(engine: &Engine, record: &Record, relation: &str) -> Vec<Record> {
    engine.related(record, relation).await.unwrap()
}

/// Reload a record from the store.
pub async fn reload(engine: &Engine, record: &Record) -> Record {
    engine.store().fetch(&reference(record)).await.unwrap().unwrap()
}
