//! Priority ordering for initialization.
//!
//! # Invariants
//! - Higher priority comes first.
//! - Equal priorities keep their input order (stable sort).
//! - Duplicates are kept; nothing is merged or removed.

use crate::model::declaration::AnnotatedDeclaration;
use crate::model::unit::OrderedInitList;
use log::debug;
use std::cmp::Reverse;

/// Stable-sorts `items` by descending priority in place.
///
/// Shared by the generator and the runtime registry so both honor the same
/// rule.
pub fn sort_by_priority_desc<T>(items: &mut [T], priority: impl Fn(&T) -> i32) {
    items.sort_by_key(|item| Reverse(priority(item)));
}

/// Orders validated singletons into the emitted initialization sequence.
pub fn order(valid_singletons: &[AnnotatedDeclaration]) -> OrderedInitList {
    let mut ordered: Vec<&AnnotatedDeclaration> = valid_singletons.iter().collect();
    sort_by_priority_desc(&mut ordered, |declaration| declaration.priority);
    debug!(
        "event=order module=orderer status=ok count={}",
        ordered.len()
    );
    OrderedInitList::from_ordered(
        ordered
            .into_iter()
            .map(|declaration| declaration.qualified_name.clone())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::{order, sort_by_priority_desc};
    use crate::model::declaration::AnnotatedDeclaration;

    fn singleton(name: &str, priority: i32) -> AnnotatedDeclaration {
        AnnotatedDeclaration::singleton(name, "lib.rs").with_priority(priority)
    }

    #[test]
    fn higher_priority_first_and_ties_keep_discovery_order() {
        let ordered = order(&[singleton("A", 5), singleton("B", 10), singleton("C", 5)]);
        assert_eq!(ordered.as_slice(), ["B", "A", "C"]);
    }

    #[test]
    fn distinct_priorities_sort_strictly_descending() {
        let ordered = order(&[
            singleton("low", -7),
            singleton("mid", 0),
            singleton("top", 42),
            singleton("high", 8),
        ]);
        assert_eq!(ordered.as_slice(), ["top", "high", "mid", "low"]);
    }

    #[test]
    fn extreme_priorities_do_not_wrap() {
        let ordered = order(&[
            singleton("min", i32::MIN),
            singleton("zero", 0),
            singleton("max", i32::MAX),
        ]);
        assert_eq!(ordered.as_slice(), ["max", "zero", "min"]);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(order(&[]).is_empty());
    }

    #[test]
    fn duplicates_are_preserved() {
        let ordered = order(&[singleton("A", 1), singleton("A", 1), singleton("B", 2)]);
        assert_eq!(ordered.as_slice(), ["B", "A", "A"]);
    }

    #[test]
    fn generic_sort_is_stable() {
        let mut items = vec![("x", 1), ("y", 3), ("z", 1), ("w", 3)];
        sort_by_priority_desc(&mut items, |item| item.1);
        assert_eq!(items, [("y", 3), ("w", 3), ("x", 1), ("z", 1)]);
    }
}
