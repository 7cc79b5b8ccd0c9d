use persistrie::list::{ListBuilder, PersistentList};
use persistrie::CollectionError;
use proptest::prelude::*;
use proptest::sample::Index;

#[derive(Debug, Clone)]
enum Op {
    Push(u16),
    Insert(Index, u16),
    Set(Index, u16),
    RemoveAt(Index),
    Pop,
    Truncate(Index),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u16>().prop_map(Op::Push),
        3 => (any::<Index>(), any::<u16>()).prop_map(|(i, x)| Op::Insert(i, x)),
        2 => (any::<Index>(), any::<u16>()).prop_map(|(i, x)| Op::Set(i, x)),
        3 => any::<Index>().prop_map(Op::RemoveAt),
        1 => Just(Op::Pop),
        1 => any::<Index>().prop_map(Op::Truncate),
    ]
}

fn apply_list(list: &PersistentList<u16>, model: &mut Vec<u16>, op: &Op) -> PersistentList<u16> {
    match op {
        Op::Push(x) => {
            model.push(*x);
            list.push(*x)
        }
        Op::Insert(i, x) => {
            let i = i.index(model.len() + 1);
            model.insert(i, *x);
            list.insert(i, *x).unwrap()
        }
        Op::Set(i, x) if !model.is_empty() => {
            let i = i.index(model.len());
            model[i] = *x;
            list.set(i, *x).unwrap()
        }
        Op::RemoveAt(i) if !model.is_empty() => {
            let i = i.index(model.len());
            model.remove(i);
            list.remove_at(i).unwrap()
        }
        Op::Pop => {
            model.pop();
            list.pop()
        }
        Op::Truncate(i) => {
            let len = i.index(model.len() + 1);
            model.truncate(len);
            list.truncate(len)
        }
        _ => list.clone(),
    }
}

proptest! {
    #[test]
    fn list_ops_match_vec(initial in 0usize..1500, ops in proptest::collection::vec(op(), 0..64)) {
        let mut model: Vec<u16> = (0..initial as u16).collect();
        let mut list: PersistentList<u16> = model.iter().copied().collect();
        let mut history = vec![(list.clone(), model.clone())];

        for op in ops.iter() {
            list = apply_list(&list, &mut model, op);
            prop_assert_eq!(list.len(), model.len());
            prop_assert!(list.iter().eq(model.iter()));
            history.push((list.clone(), model.clone()));
        }

        // Every earlier version is unaffected by later updates.
        for (old, expected) in history.iter() {
            prop_assert!(old.iter().eq(expected.iter()));
        }
    }

    #[test]
    fn list_builder_matches_persistent(initial in 0usize..1500, ops in proptest::collection::vec(op(), 0..64)) {
        let source: PersistentList<u16> = (0..initial as u16).collect();
        let mut model: Vec<u16> = source.iter().copied().collect();
        let mut builder: ListBuilder<u16> = source.builder();

        for op in ops.iter() {
            match op {
                Op::Push(x) => {
                    model.push(*x);
                    builder.push(*x);
                }
                Op::Insert(i, x) => {
                    let i = i.index(model.len() + 1);
                    model.insert(i, *x);
                    builder.insert(i, *x).unwrap();
                }
                Op::Set(i, x) if !model.is_empty() => {
                    let i = i.index(model.len());
                    prop_assert_eq!(builder.set(i, *x).unwrap(), model[i]);
                    model[i] = *x;
                }
                Op::RemoveAt(i) if !model.is_empty() => {
                    let i = i.index(model.len());
                    prop_assert_eq!(builder.remove_at(i).unwrap(), model.remove(i));
                }
                Op::Pop => prop_assert_eq!(builder.pop(), model.pop()),
                Op::Truncate(i) => {
                    let len = i.index(model.len() + 1);
                    model.truncate(len);
                    builder.truncate(len);
                }
                _ => {}
            }
        }

        let built = builder.build();
        prop_assert!(built.iter().eq(model.iter()));
        prop_assert!(source.iter().copied().eq(0..initial as u16));
    }

    #[test]
    fn list_get_and_bounds(len in 0usize..3000, probe in 0usize..3100) {
        let list: PersistentList<usize> = (0..len).collect();
        prop_assert_eq!(list.get(probe), if probe < len { Some(&probe) } else { None });
        prop_assert_eq!(list.iter().rev().next().copied(), len.checked_sub(1));
        if probe > len {
            prop_assert_eq!(
                list.insert(probe, 0).unwrap_err(),
                CollectionError::IndexOutOfBounds { index: probe, size: len }
            );
        }
        if probe >= len {
            prop_assert!(list.remove_at(probe).is_err());
            prop_assert!(list.set(probe, 0).is_err());
        }
    }

    #[test]
    fn list_insert_all_matches_splice(len in 0usize..1200, at: Index, extra in 0usize..100) {
        let list: PersistentList<usize> = (0..len).collect();
        let at = at.index(len + 1);
        let inserted = list.insert_all(at, 10_000..10_000 + extra).unwrap();

        let mut model: Vec<usize> = (0..len).collect();
        model.splice(at..at, 10_000..10_000 + extra);
        prop_assert!(inserted.iter().eq(model.iter()));
        prop_assert!(list.iter().copied().eq(0..len));
    }

    #[test]
    fn list_cursor_filters_like_retain(len in 0usize..800, modulus in 2usize..7) {
        let mut builder: ListBuilder<usize> = (0..len).collect::<PersistentList<_>>().builder();
        let mut cursor = builder.cursor(0).unwrap();
        while cursor.has_next() {
            let x = *cursor.next(&builder).unwrap();
            if x % modulus == 0 {
                prop_assert_eq!(cursor.remove(&mut builder).unwrap(), x);
            } else {
                cursor.set(&mut builder, x * 10).unwrap();
            }
        }
        let expected: Vec<usize> = (0..len).filter(|x| x % modulus != 0).map(|x| x * 10).collect();
        prop_assert!(builder.iter().eq(expected.iter()));
    }
}

#[test]
fn list_cursor_detects_foreign_modification() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut builder: ListBuilder<u32> = (0..10).collect::<PersistentList<_>>().builder();
    let mut cursor = builder.cursor(5).unwrap();
    builder.push(10);
    assert!(matches!(
        cursor.next(&builder),
        Err(CollectionError::ConcurrentModification { .. })
    ));
    // A value replacement is not structural.
    let mut cursor = builder.cursor(0).unwrap();
    builder.set(3, 33).unwrap();
    assert_eq!(cursor.next(&builder), Ok(&0));
}
