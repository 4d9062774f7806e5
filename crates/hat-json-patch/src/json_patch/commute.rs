//! Commuting adjacent operations.
//!
//! `commute(a, b)` returns `(b', a')` such that applying `[b', a']` has the
//! same effect as applying `[a, b]`. Operations on unrelated locations swap
//! unchanged. When both touch the same array, indices are shifted to account
//! for the element one of them inserts or removes. Anything that reads or
//! writes what the other one wrote is a real ordering dependency and fails
//! with [`PatchError::CannotCommute`].
//!
//! Numeric segments are taken to address array elements.

use hat_json_pointer::{is_valid_index, overlaps};

use super::types::{Op, Path, PatchError};

/// Swaps two adjacent operations, see the module docs.
///
/// # Errors
///
/// [`PatchError::CannotCommute`] when `b` removes the location `a` touched
/// (unless both are removes), or when the two depend on each other.
pub fn commute(a: &Op, b: &Op) -> Result<(Op, Op), PatchError> {
    if a.is_test() && b.is_test() {
        return Ok((b.clone(), a.clone()));
    }
    if a.path() == b.path() && matches!(b, Op::Remove { .. }) {
        if matches!(a, Op::Remove { .. }) {
            return Ok((b.clone(), a.clone()));
        }
        return Err(cannot_commute(a, b, "the second operation removes what the first one touched"));
    }
    if matches!(a, Op::Move { .. }) || matches!(b, Op::Move { .. }) {
        return commute_move(a, b);
    }

    // b is expressed against the document after a; bring it back to the
    // document before a.
    let mut b2 = b.clone();
    let mut b_shifted_past_a = false;
    if let Some(effect) = effect(a) {
        for (path, point) in locations_mut(&mut b2) {
            let shifted = shift_back(path, point, &effect).map_err(|why| cannot_commute(a, b, why))?;
            if point {
                b_shifted_past_a = shifted;
            }
        }
    }

    for x in locations(a) {
        for y in locations(&b2) {
            if conflicts(&x, &y) {
                return Err(cannot_commute(a, b, "the operations touch overlapping locations"));
            }
        }
    }

    let mut a2 = a.clone();
    if let Some(effect) = effect(&b2) {
        for (path, point) in locations_mut(&mut a2) {
            shift_forward(path, point, &effect, b_shifted_past_a)
                .map_err(|why| cannot_commute(a, b, why))?;
        }
    }
    Ok((b2, a2))
}

fn cannot_commute(a: &Op, b: &Op, why: &str) -> PatchError {
    PatchError::CannotCommute(format!("{a} and {b}: {why}"))
}

// ── Locations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
    /// Insertion into an array at the last segment's position.
    Insert,
}

struct Location<'a> {
    path: &'a [String],
    access: Access,
}

fn is_array_slot(segment: &str) -> bool {
    segment == "-" || is_valid_index(segment)
}

fn target_access(path: &[String]) -> Access {
    match path.last() {
        Some(last) if is_array_slot(last) => Access::Insert,
        _ => Access::Write,
    }
}

fn locations(op: &Op) -> Vec<Location<'_>> {
    match op {
        Op::Add { path, .. } => vec![Location { path, access: target_access(path) }],
        Op::Copy { path, from } => vec![
            Location { path, access: target_access(path) },
            Location { path: from, access: Access::Read },
        ],
        Op::Move { path, from } => vec![
            Location { path, access: target_access(path) },
            Location { path: from, access: Access::Write },
        ],
        Op::Remove { path } | Op::Replace { path, .. } => {
            vec![Location { path, access: Access::Write }]
        }
        Op::Test { path, .. } => vec![Location { path, access: Access::Read }],
    }
}

/// Mutable paths of `op`, flagged `true` for an insertion point.
fn locations_mut(op: &mut Op) -> Vec<(&mut Path, bool)> {
    match op {
        Op::Add { path, .. } => vec![(path, true)],
        Op::Copy { path, from } | Op::Move { path, from } => vec![(path, true), (from, false)],
        Op::Remove { path } | Op::Replace { path, .. } | Op::Test { path, .. } => {
            vec![(path, false)]
        }
    }
}

fn parent_of(path: &[String]) -> &[String] {
    path.split_last().map(|(_, init)| init).unwrap_or(path)
}

/// Whether two locations, both relative to the same document, depend on each
/// other. Positions inside a shared array are not a dependency: they are
/// reconciled by shifting indices.
fn conflicts(x: &Location<'_>, y: &Location<'_>) -> bool {
    match (x.access, y.access) {
        (Access::Read, Access::Read) | (Access::Insert, Access::Insert) => false,
        (Access::Insert, _) => y.path.len() <= parent_of(x.path).len() && overlaps(x.path, y.path),
        (_, Access::Insert) => x.path.len() <= parent_of(y.path).len() && overlaps(x.path, y.path),
        _ => overlaps(x.path, y.path),
    }
}

// ── Array effects ─────────────────────────────────────────────────────────

enum Effect<'a> {
    Insert { parent: &'a [String], index: usize },
    Append { parent: &'a [String] },
    Delete { parent: &'a [String], index: usize },
}

impl Effect<'_> {
    fn parent(&self) -> &[String] {
        match self {
            Effect::Insert { parent, .. } | Effect::Append { parent } | Effect::Delete { parent, .. } => {
                parent
            }
        }
    }
}

/// How `op` changes the length of an array, if it does.
fn effect(op: &Op) -> Option<Effect<'_>> {
    match op {
        Op::Add { path, .. } | Op::Copy { path, .. } => {
            let (last, parent) = path.split_last()?;
            if last == "-" {
                Some(Effect::Append { parent })
            } else {
                Some(Effect::Insert { parent, index: last.parse().ok().filter(|_| is_valid_index(last))? })
            }
        }
        Op::Remove { path } => {
            let (last, parent) = path.split_last()?;
            Some(Effect::Delete { parent, index: last.parse().ok().filter(|_| is_valid_index(last))? })
        }
        _ => None,
    }
}

/// The index at which `path` passes through the array `parent`, if any.
fn slot_index(path: &[String], parent: &[String]) -> Option<usize> {
    if path.len() <= parent.len() || path[..parent.len()] != *parent {
        return None;
    }
    let segment = &path[parent.len()];
    if is_valid_index(segment) {
        segment.parse().ok()
    } else {
        None
    }
}

fn passes_through(path: &[String], parent: &[String]) -> bool {
    path.len() > parent.len() && path[..parent.len()] == *parent
}

/// Rewrites a location given after `effect` into one valid before it.
/// Returns whether the index moved.
fn shift_back(path: &mut Path, point: bool, effect: &Effect<'_>) -> Result<bool, &'static str> {
    let depth = effect.parent().len();
    if let Effect::Append { parent } = effect {
        if passes_through(path, parent) {
            return Err("the first operation appends to an array the second one uses");
        }
        return Ok(false);
    }
    let Some(j) = slot_index(path, effect.parent()) else {
        return Ok(false);
    };
    let is_point = point && path.len() == depth + 1;
    let shifted = match *effect {
        Effect::Insert { index, .. } if j > index => Some(j - 1),
        Effect::Insert { index, .. } if j == index && !is_point => {
            return Err("the second operation uses the element the first one inserted");
        }
        Effect::Delete { index, .. } if j >= index => Some(j + 1),
        _ => None,
    };
    match shifted {
        Some(k) => {
            path[depth] = k.to_string();
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Rewrites a location valid before `effect` into one valid after it.
///
/// `tie_stays` resolves two insertions at the same position: the element
/// inserted later in the original order goes after the other one.
fn shift_forward(
    path: &mut Path,
    point: bool,
    effect: &Effect<'_>,
    tie_stays: bool,
) -> Result<(), &'static str> {
    let depth = effect.parent().len();
    if let Effect::Append { parent } = effect {
        if passes_through(path, parent) {
            return Err("the second operation appends to an array the first one uses");
        }
        return Ok(());
    }
    let Some(j) = slot_index(path, effect.parent()) else {
        return Ok(());
    };
    let is_point = point && path.len() == depth + 1;
    let shifted = match *effect {
        Effect::Insert { index, .. } if j > index => Some(j + 1),
        Effect::Insert { index, .. } if j == index && !(is_point && tie_stays) => Some(j + 1),
        Effect::Delete { index, .. } if j > index => Some(j - 1),
        Effect::Delete { index, .. } if j == index && !is_point => {
            return Err("the first operation uses the element the second one removes");
        }
        _ => None,
    };
    if let Some(k) = shifted {
        path[depth] = k.to_string();
    }
    Ok(())
}

// ── Move ──────────────────────────────────────────────────────────────────

/// A move changes two places at once, so it only commutes with operations
/// that stay out of the containers it touches.
fn commute_move(a: &Op, b: &Op) -> Result<(Op, Op), PatchError> {
    for x in locations(a) {
        for y in locations(b) {
            if x.access == Access::Read && y.access == Access::Read {
                continue;
            }
            let shares_array = |p: &Location<'_>, q: &Location<'_>| {
                p.path.last().is_some_and(|last| is_array_slot(last))
                    && passes_through(q.path, parent_of(p.path))
            };
            if overlaps(x.path, y.path) || shares_array(&x, &y) || shares_array(&y, &x) {
                return Err(cannot_commute(a, b, "a move touches a location the other operation uses"));
            }
        }
    }
    Ok((b.clone(), a.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::apply::apply_patch;
    use hat_json_pointer::parse_json_pointer;
    use serde_json::{json, Value};

    fn path(s: &str) -> Vec<String> {
        parse_json_pointer(s)
    }

    fn add(p: &str, v: Value) -> Op {
        Op::Add { path: path(p), value: v }
    }

    fn remove(p: &str) -> Op {
        Op::Remove { path: path(p) }
    }

    fn replace(p: &str, v: Value) -> Op {
        Op::Replace { path: path(p), value: v }
    }

    fn test(p: &str, v: Value) -> Op {
        Op::Test { path: path(p), value: v }
    }

    fn assert_commutes(doc: &Value, a: Op, b: Op) -> (Op, Op) {
        let expected = apply_patch(doc, &[a.clone(), b.clone()]).expect("original order applies");
        let (b2, a2) = commute(&a, &b).expect("commutes");
        let actual = apply_patch(doc, &[b2.clone(), a2.clone()]).expect("commuted order applies");
        assert_eq!(actual, expected, "commute({a}, {b}) = ({b2}, {a2})");
        (b2, a2)
    }

    #[test]
    fn unrelated_object_paths_swap_unchanged() {
        let doc = json!({"a": 1, "b": 2});
        let (b2, a2) = assert_commutes(&doc, replace("/a", json!(3)), remove("/b"));
        assert_eq!(b2, remove("/b"));
        assert_eq!(a2, replace("/a", json!(3)));
    }

    #[test]
    fn same_path_then_remove_fails() {
        for a in [add("/a", json!(1)), replace("/a", json!(1)), test("/a", json!(1))] {
            let r = commute(&a, &remove("/a"));
            assert!(matches!(r, Err(PatchError::CannotCommute(_))), "{a}");
        }
    }

    #[test]
    fn remove_remove_same_path_swaps() {
        let doc = json!([1, 2, 3]);
        let (b2, a2) = assert_commutes(&doc, remove("/0"), remove("/0"));
        assert_eq!((b2, a2), (remove("/0"), remove("/0")));
    }

    #[test]
    fn sibling_insertions() {
        let doc = json!(["e0", "e1", "e2"]);
        let (b2, a2) = assert_commutes(&doc, add("/1", json!("x")), add("/2", json!("y")));
        assert_eq!(b2, add("/1", json!("y")));
        assert_eq!(a2, add("/1", json!("x")));

        let (b2, a2) = assert_commutes(&doc, add("/1", json!("x")), add("/1", json!("y")));
        assert_eq!(b2, add("/1", json!("y")));
        assert_eq!(a2, add("/2", json!("x")));
    }

    #[test]
    fn sibling_removals() {
        let doc = json!(["e0", "e1", "e2", "e3"]);
        let (b2, a2) = assert_commutes(&doc, remove("/1"), remove("/2"));
        assert_eq!((b2, a2), (remove("/3"), remove("/1")));
        let (b2, a2) = assert_commutes(&doc, remove("/2"), remove("/1"));
        assert_eq!((b2, a2), (remove("/1"), remove("/1")));
    }

    #[test]
    fn mixed_array_siblings() {
        let doc = json!(["e0", "e1", "e2", "e3"]);
        assert_commutes(&doc, remove("/1"), add("/1", json!("y")));
        assert_commutes(&doc, add("/1", json!("x")), remove("/2"));
        assert_commutes(&doc, add("/1", json!("x")), remove("/0"));
        assert_commutes(&doc, remove("/1"), replace("/1", json!("y")));
        assert_commutes(&doc, replace("/1", json!("y")), add("/1", json!("x")));
        assert_commutes(&doc, test("/3", json!("e3")), add("/0", json!("x")));
        assert_commutes(&doc, add("/0", json!("x")), test("/4", json!("e3")));
    }

    #[test]
    fn descendant_of_shifted_element() {
        let doc = json!({"rows": [{"v": 0}, {"v": 1}, {"v": 2}]});
        let (b2, _) = assert_commutes(&doc, remove("/rows/0"), replace("/rows/0/v", json!(9)));
        assert_eq!(b2, replace("/rows/1/v", json!(9)));
        let (_, a2) = assert_commutes(&doc, replace("/rows/1/v", json!(9)), add("/rows/0", json!({})));
        assert_eq!(a2, replace("/rows/2/v", json!(9)));
        assert_commutes(&doc, add("/rows/1", json!({"v": 5})), replace("/rows/3/v", json!(9)));
    }

    #[test]
    fn writing_into_inserted_element_fails() {
        let r = commute(&add("/rows/1", json!({})), &add("/rows/1/v", json!(1)));
        assert!(matches!(r, Err(PatchError::CannotCommute(_))));
        let r = commute(&add("/rows/1", json!({})), &replace("/rows/1", json!(1)));
        assert!(matches!(r, Err(PatchError::CannotCommute(_))));
    }

    #[test]
    fn ancestor_and_descendant_fail() {
        let r = commute(&replace("/a", json!({})), &add("/a/b", json!(1)));
        assert!(matches!(r, Err(PatchError::CannotCommute(_))));
        let r = commute(&add("/list/0", json!(1)), &test("/list", json!([1])));
        assert!(matches!(r, Err(PatchError::CannotCommute(_))));
        let r = commute(&replace("/a/b", json!(1)), &remove("/a"));
        assert!(matches!(r, Err(PatchError::CannotCommute(_))));
    }

    #[test]
    fn tests_commute_with_each_other() {
        let (b2, a2) = commute(&test("/a", json!(1)), &test("/a", json!(1))).unwrap();
        assert_eq!((b2, a2), (test("/a", json!(1)), test("/a", json!(1))));
    }

    #[test]
    fn append_blocks_array_neighbours() {
        let r = commute(&add("/l/-", json!(1)), &add("/l/-", json!(2)));
        assert!(matches!(r, Err(PatchError::CannotCommute(_))));
        let doc = json!({"l": [], "m": 0});
        assert_commutes(&doc, add("/l/-", json!(1)), replace("/m", json!(1)));
    }

    #[test]
    fn copy_source_is_shifted() {
        let doc = json!({"l": ["a", "b", "c"], "o": {}});
        let (_, a2) = assert_commutes(
            &doc,
            Op::Copy { path: path("/o/x"), from: path("/l/2") },
            add("/l/0", json!("z")),
        );
        assert_eq!(a2, Op::Copy { path: path("/o/x"), from: path("/l/3") });
    }

    #[test]
    fn move_commutes_only_when_unrelated() {
        let doc = json!({"a": 1, "b": {}, "c": [1, 2]});
        let mv = Op::Move { path: path("/b/a"), from: path("/a") };
        assert_commutes(&doc, mv.clone(), replace("/c/0", json!(5)));
        let r = commute(&mv, &replace("/b", json!(null)));
        assert!(matches!(r, Err(PatchError::CannotCommute(_))));
        let mv = Op::Move { path: path("/c/0"), from: path("/a") };
        let r = commute(&mv, &replace("/c/1", json!(5)));
        assert!(matches!(r, Err(PatchError::CannotCommute(_))));
    }
}
