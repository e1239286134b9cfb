//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::json;

use folio::catalog::Faq;
use folio::{JsonRecord, RecordId, RecordStore, Result};

/// Generate short printable text.
pub fn text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ?.,]{0,24}".prop_map(String::from)
}

/// Generate a FAQ without an id, optionally ordered.
pub fn faq() -> impl Strategy<Value = Faq> {
    (text(), text(), proptest::option::of(0i64..100)).prop_map(|(question, answer, order)| {
        let faq = Faq::new(question, answer);
        match order {
            Some(order) => faq.with_order(order),
            None => faq,
        }
    })
}

/// Generate a dynamic record with a handful of scalar fields and no id.
pub fn json_record() -> impl Strategy<Value = JsonRecord> {
    proptest::collection::btree_map("[a-z]{1,8}", any::<i32>(), 0..6).prop_map(|fields| {
        fields
            .into_iter()
            .filter(|(name, _)| name != "id")
            .fold(JsonRecord::new(), |record, (name, value)| {
                record.with(name, value)
            })
    })
}

/// One step of a generated workload against a FAQ collection.
///
/// Indexes pick an existing record modulo the collection length.
#[derive(Debug, Clone)]
pub enum Op {
    Add(Faq),
    Update { index: usize, answer: String },
    Remove { index: usize },
    RemoveMissing,
    Reset,
}

/// Generate a workload of up to `max_len` operations.
pub fn ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        4 => faq().prop_map(Op::Add),
        3 => (any::<usize>(), text()).prop_map(|(index, answer)| Op::Update { index, answer }),
        3 => any::<usize>().prop_map(|index| Op::Remove { index }),
        1 => Just(Op::RemoveMissing),
        1 => Just(Op::Reset),
    ];
    proptest::collection::vec(op, 0..=max_len)
}

/// Id no generated workload ever assigns.
pub fn missing_id() -> RecordId {
    RecordId::Num(-1)
}

/// Apply `op` to `store`, returning whether the collection changed.
pub async fn apply(store: &RecordStore<Faq>, op: &Op) -> Result<bool> {
    let pick = |index: usize| {
        let items = store.items();
        if items.is_empty() {
            None
        } else {
            items[index % items.len()].id.clone()
        }
    };

    match op {
        Op::Add(faq) => store.add(faq.clone()).await.map(|_| true),
        Op::Update { index, answer } => match pick(*index) {
            Some(id) => store.update(id, json!({ "answer": answer })).await.map(|_| true),
            None => Ok(false),
        },
        Op::Remove { index } => match pick(*index) {
            Some(id) => store.remove(id).await,
            None => Ok(false),
        },
        Op::RemoveMissing => store.remove(missing_id()).await,
        Op::Reset => store.reset_to_defaults().await.map(|_| true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::Record;

    proptest! {
        #[test]
        fn generated_faqs_have_no_id(faq in faq()) {
            prop_assert!(faq.id().is_none());
        }

        #[test]
        fn generated_json_records_are_valid(record in json_record()) {
            prop_assert!(folio::core::validate_record(&record).is_ok());
            prop_assert!(record.id().is_none());
        }
    }
}
