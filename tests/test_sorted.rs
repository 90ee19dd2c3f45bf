//! Tests for the sorted-array operations.
//!
//! Covers the signed not-found encoding, set-semantics insert, and the
//! insert/remove round trip.

extern crate deft;

use deft::runtime::sorted::{binary_search, binary_search_by, insert, remove, remove_by};

mod binary_search_tests {
    use super::*;

    #[test]
    fn test_found_returns_index() {
        let list = vec![1, 3, 5, 7, 9];
        assert_eq!(binary_search(&list, &5), 2);
        assert_eq!(binary_search(&list, &1), 0);
        assert_eq!(binary_search(&list, &9), 4);
    }

    #[test]
    fn test_not_found_encodes_insertion_point() {
        let list = vec![1, 3, 5, 7, 9];
        // 6 would go at index 3; the result is the bitwise complement.
        assert_eq!(binary_search(&list, &6), -4);
        assert_eq!(!binary_search(&list, &6), 3);
    }

    #[test]
    fn test_before_first_and_past_last() {
        let list = vec![1, 3, 5, 7, 9];
        assert_eq!(binary_search(&list, &0), -1);
        assert_eq!(binary_search(&list, &10), -6);
    }

    #[test]
    fn test_empty_sequence() {
        let list: Vec<i64> = Vec::new();
        assert_eq!(binary_search(&list, &42), -1);
    }

    #[test]
    fn test_complement_is_valid_insertion_index() {
        let list = vec![10, 20, 30, 40];
        for candidate in &[5, 15, 25, 35, 45] {
            let result = binary_search(&list, candidate);
            assert!(result < 0, "candidate {} should be absent", candidate);
            let mut copy = list.clone();
            copy.insert(!result as usize, *candidate);
            let mut sorted = copy.clone();
            sorted.sort();
            assert_eq!(copy, sorted, "inserting {} at {} must keep order", candidate, !result);
        }
    }

    #[test]
    fn test_custom_comparator() {
        // Descending order with a reversed comparator.
        let list = vec![9, 7, 5, 3, 1];
        assert_eq!(binary_search_by(&list, &5, |a, b| b.cmp(a)), 2);
        assert_eq!(binary_search_by(&list, &6, |a, b| b.cmp(a)), -3);
    }
}

mod insert_tests {
    use super::*;

    #[test]
    fn test_insert_absent_returns_complement() {
        let mut list = vec![1, 3, 5];
        let result = insert(&mut list, 4);
        assert_eq!(result, -3);
        assert_eq!(list, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_insert_present_is_rejected() {
        let mut list = vec![1, 3, 5];
        let result = insert(&mut list, 3);
        assert_eq!(result, 1);
        assert_eq!(list, vec![1, 3, 5]);
    }

    #[test]
    fn test_insert_then_remove_is_identity() {
        let original = vec![2, 4, 6, 8];
        let mut list = original.clone();
        assert!(insert(&mut list, 5) < 0);
        assert_eq!(remove(&mut list, &5), Some(5));
        assert_eq!(list, original);
    }

    #[test]
    fn test_insert_into_empty() {
        let mut list: Vec<i64> = Vec::new();
        assert_eq!(insert(&mut list, 7), -1);
        assert_eq!(list, vec![7]);
    }
}

mod remove_tests {
    use super::*;

    #[test]
    fn test_remove_found_returns_element() {
        let mut list = vec![1, 3, 5, 7];
        assert_eq!(remove(&mut list, &5), Some(5));
        assert_eq!(list, vec![1, 3, 7]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut list = vec![1, 3, 5, 7];
        assert_eq!(remove(&mut list, &4), None);
        assert_eq!(list, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_remove_with_comparator() {
        let mut list = vec!["aa", "bbb", "cccc"];
        let removed = remove_by(&mut list, &"xxx", |a, b| a.len().cmp(&b.len()));
        assert_eq!(removed, Some("bbb"));
        assert_eq!(list, vec!["aa", "cccc"]);
    }
}
