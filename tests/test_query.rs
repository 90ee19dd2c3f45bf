//! Tests for the cursor engine: construction, deferred combinators, and
//! eager terminals.

extern crate deft;

use std::cell::RefCell;
use std::rc::Rc;

use deft::runtime::ds::error::CoreError;
use deft::runtime::ds::value::{Callback, Value};
use deft::runtime::Runtime;

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Int(*v)).collect()
}

fn is_even() -> Callback {
    Callback::from_pred(|v| match v {
        Value::Int(n) => n % 2 == 0,
        _ => false,
    })
}

fn times_ten() -> Callback {
    Callback::from_fn(|v| match v {
        Value::Int(n) => Value::Int(n * 10),
        other => other.clone(),
    })
}

fn sum() -> Callback {
    Callback::new(|_rt, args| {
        let a = args.get(0).and_then(|v| v.as_int()).unwrap_or(0);
        let b = args.get(1).and_then(|v| v.as_int()).unwrap_or(0);
        Ok(Value::Int(a + b))
    })
}

mod construction_tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        let mut rt = Runtime::new();
        let cursor = rt.query(Value::Null).unwrap();
        assert_eq!(cursor.count(&mut rt).unwrap(), 0);
    }

    #[test]
    fn test_scalar_wraps_as_single_item() {
        let mut rt = Runtime::new();
        let cursor = rt.query(Value::Int(7)).unwrap();
        assert_eq!(cursor.to_list(&mut rt).unwrap(), vec![Value::Int(7)]);
    }

    #[test]
    fn test_existing_cursor_passes_through() {
        let mut rt = Runtime::new();
        let cursor = rt.query_list(ints(&[1, 2])).unwrap();
        let again = rt.query(Value::Obj(cursor.instance())).unwrap();
        assert!(Rc::ptr_eq(&cursor.instance(), &again.instance()));
    }

    #[test]
    fn test_callback_cursor() {
        let mut rt = Runtime::new();
        let stepper = Callback::new(|_rt, args| {
            let next_index = args.get(0).and_then(|v| v.as_int()).unwrap_or(0);
            if next_index < 3 {
                Ok(Value::Int(next_index * 2))
            } else {
                Ok(Value::Null)
            }
        });
        let cursor = rt.query(Value::Fn(stepper)).unwrap();
        assert_eq!(
            cursor.to_list(&mut rt).unwrap(),
            vec![Value::Int(0), Value::Int(2), Value::Int(4)]
        );
    }

    #[test]
    fn test_advance_is_monotonic() {
        let mut rt = Runtime::new();
        let cursor = rt.query_list(ints(&[1])).unwrap();
        assert!(cursor.advance(&mut rt).unwrap());
        assert_eq!(cursor.item(), Value::Int(1));
        assert_eq!(cursor.index(), 0);
        assert!(!cursor.advance(&mut rt).unwrap());
        // Once completed, advance never succeeds again.
        assert!(!cursor.advance(&mut rt).unwrap());
        assert_eq!(cursor.item(), Value::Null);
    }

    #[test]
    fn test_finish_is_permanent() {
        let mut rt = Runtime::new();
        let cursor = rt.query_list(ints(&[1, 2, 3])).unwrap();
        assert!(cursor.advance(&mut rt).unwrap());
        cursor.finish(&mut rt).unwrap();
        assert!(!cursor.advance(&mut rt).unwrap());
    }
}

mod combinator_tests {
    use super::*;

    #[test]
    fn test_filter_map_pipeline() {
        let mut rt = Runtime::new();
        let out = rt
            .query_list(ints(&[1, 2, 3, 4, 5]))
            .unwrap()
            .filter(&mut rt, is_even())
            .unwrap()
            .map(&mut rt, times_ten())
            .unwrap()
            .to_list(&mut rt)
            .unwrap();
        assert_eq!(out, vec![Value::Int(20), Value::Int(40)]);
    }

    #[test]
    fn test_combinator_construction_is_lazy() {
        let mut rt = Runtime::new();
        let calls = Rc::new(RefCell::new(0));
        let seen = calls.clone();
        let probe = Callback::new(move |_rt, args| {
            *seen.borrow_mut() += 1;
            Ok(args.get(0).cloned().unwrap_or(Value::Null))
        });

        let cursor = rt.query_list(ints(&[1, 2, 3])).unwrap();
        let mapped = cursor.map(&mut rt, probe).unwrap();
        // Nothing ran yet: construction defers all work to terminals.
        assert_eq!(*calls.borrow(), 0);
        mapped.to_list(&mut rt).unwrap();
        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn test_distinct_drops_duplicates_and_keyless_items() {
        let mut rt = Runtime::new();
        let source = vec![
            Value::Int(1),
            Value::Null,
            Value::Int(2),
            Value::Int(1),
            Value::Null,
            Value::Int(3),
            Value::Int(2),
        ];
        let out = rt
            .query_list(source)
            .unwrap()
            .distinct(&mut rt, None)
            .unwrap()
            .to_list(&mut rt)
            .unwrap();
        assert_eq!(out, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_distinct_with_key_callback() {
        let mut rt = Runtime::new();
        let parity = Callback::from_fn(|v| match v {
            Value::Int(n) => Value::Int(n % 2),
            other => other.clone(),
        });
        let out = rt
            .query_list(ints(&[1, 2, 3, 4]))
            .unwrap()
            .distinct(&mut rt, Some(parity))
            .unwrap()
            .to_list(&mut rt)
            .unwrap();
        assert_eq!(out, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_skip() {
        let mut rt = Runtime::new();
        let out = rt
            .query_list(ints(&[1, 2, 3, 4, 5]))
            .unwrap()
            .skip(&mut rt, 2)
            .unwrap()
            .to_list(&mut rt)
            .unwrap();
        assert_eq!(out, vec![Value::Int(3), Value::Int(4), Value::Int(5)]);

        let none = rt
            .query_list(ints(&[1, 2]))
            .unwrap()
            .skip(&mut rt, 10)
            .unwrap()
            .to_list(&mut rt)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_take_bounds() {
        let mut rt = Runtime::new();
        let out = rt
            .query_list(ints(&[1, 2, 3, 4, 5]))
            .unwrap()
            .take(&mut rt, 3)
            .unwrap()
            .to_list(&mut rt)
            .unwrap();
        assert_eq!(out, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

        let zero = rt
            .query_list(ints(&[1, 2]))
            .unwrap()
            .take(&mut rt, 0)
            .unwrap()
            .to_list(&mut rt)
            .unwrap();
        assert!(zero.is_empty());
    }

    #[test]
    fn test_take_count_never_exceeds_min() {
        let mut rt = Runtime::new();
        let capped = rt
            .query_list(ints(&[1, 2, 3, 4, 5]))
            .unwrap()
            .take(&mut rt, 3)
            .unwrap();
        assert_eq!(capped.count(&mut rt).unwrap(), 3);

        let short = rt
            .query_list(ints(&[1, 2]))
            .unwrap()
            .take(&mut rt, 10)
            .unwrap();
        assert_eq!(short.count(&mut rt).unwrap(), 2);
    }

    #[test]
    fn test_take_does_not_drain_upstream() {
        let mut rt = Runtime::new();
        let source = rt.query_list(ints(&[1, 2, 3, 4, 5])).unwrap();
        let taken = source.take(&mut rt, 2).unwrap();
        assert_eq!(
            taken.to_list(&mut rt).unwrap(),
            vec![Value::Int(1), Value::Int(2)]
        );
        // The upstream cursor is positioned, not exhausted.
        assert!(source.advance(&mut rt).unwrap());
        assert_eq!(source.item(), Value::Int(3));
    }

    #[test]
    fn test_while_stops_at_first_failure_without_lookahead() {
        let mut rt = Runtime::new();
        let source = rt.query_list(ints(&[1, 2, 9, 3, 4])).unwrap();
        let head = source
            .while_true(
                &mut rt,
                Callback::from_pred(|v| match v {
                    Value::Int(n) => *n < 5,
                    _ => false,
                }),
            )
            .unwrap();
        assert_eq!(
            head.to_list(&mut rt).unwrap(),
            vec![Value::Int(1), Value::Int(2)]
        );
        // The rejecting check consumed 9, and nothing after it.
        assert!(source.advance(&mut rt).unwrap());
        assert_eq!(source.item(), Value::Int(3));
    }

    #[test]
    fn test_flat_map_skips_null_projections() {
        let mut rt = Runtime::new();
        let project = Callback::from_fn(|v| match v {
            Value::Int(2) => Value::Null,
            Value::Int(n) => Value::list(vec![Value::Int(*n), Value::Int(*n)]),
            other => other.clone(),
        });
        let out = rt
            .query_list(ints(&[1, 2, 3]))
            .unwrap()
            .flat_map(&mut rt, Some(project))
            .unwrap()
            .to_list(&mut rt)
            .unwrap();
        assert_eq!(
            out,
            vec![Value::Int(1), Value::Int(1), Value::Int(3), Value::Int(3)]
        );
    }

    #[test]
    fn test_flat_map_without_projection_flattens() {
        let mut rt = Runtime::new();
        let source = vec![
            Value::list(ints(&[1, 2])),
            Value::list(ints(&[3])),
            Value::list(Vec::new()),
            Value::list(ints(&[4, 5])),
        ];
        let out = rt
            .query_list(source)
            .unwrap()
            .flat_map(&mut rt, None)
            .unwrap()
            .to_list(&mut rt)
            .unwrap();
        assert_eq!(out, ints(&[1, 2, 3, 4, 5]));
    }
}

mod terminal_tests {
    use super::*;

    #[test]
    fn test_each_early_stop_force_completes() {
        let mut rt = Runtime::new();
        let collected = Rc::new(RefCell::new(Vec::new()));
        let sink = collected.clone();
        let visitor = Callback::new(move |_rt, args| {
            let item = args.get(0).and_then(|v| v.as_int()).unwrap_or(0);
            sink.borrow_mut().push(item);
            Ok(Value::Bool(item != 3))
        });

        let cursor = rt.query_list(ints(&[1, 2, 3, 4, 5])).unwrap();
        let stopped = cursor.each(&mut rt, visitor).unwrap();
        assert!(stopped);
        assert_eq!(*collected.borrow(), vec![1, 2, 3]);
        assert!(!cursor.advance(&mut rt).unwrap());
    }

    #[test]
    fn test_each_runs_to_exhaustion() {
        let mut rt = Runtime::new();
        let cursor = rt.query_list(ints(&[1, 2])).unwrap();
        let stopped = cursor
            .each(&mut rt, Callback::new(|_rt, _args| Ok(Value::Null)))
            .unwrap();
        // A null return is not a stop signal; only a strict false is.
        assert!(!stopped);
    }

    #[test]
    fn test_reduce_with_seed() {
        let mut rt = Runtime::new();
        let cursor = rt.query_list(ints(&[1, 2, 3])).unwrap();
        let total = cursor.reduce(&mut rt, sum(), Some(Value::Int(10))).unwrap();
        assert_eq!(total, Value::Int(16));
    }

    #[test]
    fn test_reduce_without_seed_uses_first_item_once() {
        let mut rt = Runtime::new();
        let cursor = rt.query_list(ints(&[1, 2, 3])).unwrap();
        assert_eq!(cursor.reduce(&mut rt, sum(), None).unwrap(), Value::Int(6));
    }

    #[test]
    fn test_reduce_empty_without_seed_fails() {
        let mut rt = Runtime::new();
        let cursor = rt.query(Value::Null).unwrap();
        let err = cursor.reduce(&mut rt, sum(), None).unwrap_err();
        assert!(matches!(err, CoreError::EmptyReduce));
    }

    #[test]
    fn test_reduce_empty_with_seed_returns_seed() {
        let mut rt = Runtime::new();
        let cursor = rt.query(Value::Null).unwrap();
        assert_eq!(
            cursor.reduce(&mut rt, sum(), Some(Value::Int(0))).unwrap(),
            Value::Int(0)
        );
    }

    #[test]
    fn test_list_cursor_count_is_remaining_and_finishes() {
        let mut rt = Runtime::new();
        let cursor = rt.query_list(ints(&[10, 20, 30])).unwrap();
        assert!(cursor.advance(&mut rt).unwrap());
        // Counting consumes the traversal: remaining items, then done.
        assert_eq!(cursor.count(&mut rt).unwrap(), 2);
        assert!(!cursor.advance(&mut rt).unwrap());
    }

    #[test]
    fn test_count_through_combinators() {
        let mut rt = Runtime::new();
        let count = rt
            .query_list(ints(&[1, 2, 3, 4, 5]))
            .unwrap()
            .filter(&mut rt, is_even())
            .unwrap()
            .count(&mut rt)
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_first_short_circuits() {
        let mut rt = Runtime::new();
        let source = rt.query_list(ints(&[1, 2, 3, 4, 5])).unwrap();
        let filtered = source.filter(&mut rt, is_even()).unwrap();
        assert_eq!(filtered.first(&mut rt, None).unwrap(), Some(Value::Int(2)));
        // The match force-completed the filter cursor but did not drain
        // the upstream list.
        assert!(!filtered.advance(&mut rt).unwrap());
        assert!(source.advance(&mut rt).unwrap());
        assert_eq!(source.item(), Value::Int(3));
    }

    #[test]
    fn test_first_with_predicate() {
        let mut rt = Runtime::new();
        let cursor = rt.query_list(ints(&[1, 2, 3, 4])).unwrap();
        let found = cursor
            .first(
                &mut rt,
                Some(Callback::from_pred(|v| match v {
                    Value::Int(n) => *n > 2,
                    _ => false,
                })),
            )
            .unwrap();
        assert_eq!(found, Some(Value::Int(3)));
    }

    #[test]
    fn test_first_on_empty_is_none() {
        let mut rt = Runtime::new();
        let cursor = rt.query(Value::Null).unwrap();
        assert_eq!(cursor.first(&mut rt, None).unwrap(), None);
    }

    #[test]
    fn test_any_and_all() {
        let mut rt = Runtime::new();

        let cursor = rt.query(Value::Null).unwrap();
        assert!(!cursor.any(&mut rt, None).unwrap());

        let cursor = rt.query_list(ints(&[1, 2, 3])).unwrap();
        assert!(cursor.any(&mut rt, Some(is_even())).unwrap());

        let cursor = rt.query_list(ints(&[2, 4, 6])).unwrap();
        assert!(cursor.all(&mut rt, is_even()).unwrap());

        let cursor = rt.query_list(ints(&[2, 3, 4])).unwrap();
        assert!(!cursor.all(&mut rt, is_even()).unwrap());
    }

    #[test]
    fn test_index_by_groups_in_encounter_order() {
        let mut rt = Runtime::new();
        let source = vec![
            Value::Str("apple".to_string()),
            Value::Str("banana".to_string()),
            Value::Str("avocado".to_string()),
        ];
        let first_letter = Callback::from_fn(|v| match v {
            Value::Str(s) => Value::Str(s[0..1].to_string()),
            _ => Value::Null,
        });
        let index = rt
            .query_list(source)
            .unwrap()
            .index_by(&mut rt, Some(first_letter))
            .unwrap();

        assert_eq!(
            index.get("a").map(Vec::as_slice),
            Some(
                &[
                    Value::Str("apple".to_string()),
                    Value::Str("avocado".to_string())
                ][..]
            )
        );
        assert_eq!(
            index.get("b").map(Vec::as_slice),
            Some(&[Value::Str("banana".to_string())][..])
        );
    }

    #[test]
    fn test_index_by_drops_keyless_items() {
        let mut rt = Runtime::new();
        let source = vec![Value::Int(1), Value::Null, Value::Int(1)];
        let index = rt
            .query_list(source)
            .unwrap()
            .index_by(&mut rt, None)
            .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get("1").map(Vec::len),
            Some(2)
        );
    }

    #[test]
    fn test_unique_index_by_keeps_first() {
        let mut rt = Runtime::new();
        let source = vec![
            Value::Str("apple".to_string()),
            Value::Str("avocado".to_string()),
            Value::Str("banana".to_string()),
        ];
        let first_letter = Callback::from_fn(|v| match v {
            Value::Str(s) => Value::Str(s[0..1].to_string()),
            _ => Value::Null,
        });
        let index = rt
            .query_list(source)
            .unwrap()
            .unique_index_by(&mut rt, Some(first_letter))
            .unwrap();

        assert_eq!(index.get("a"), Some(&Value::Str("apple".to_string())));
        assert_eq!(index.get("b"), Some(&Value::Str("banana".to_string())));
    }
}
