//! Relationship labels from edge-type sequences.
//!
//! Labels depend on the exact sequence of step types, never on length alone.
//! The shapes covered:
//!
//! - `parents^n` / `children^n`: direct ancestors and descendants
//! - `parents^n, siblings`: aunts and uncles of any generation
//! - `siblings, children^n`: nieces and nephews of any generation
//! - `parents^u, siblings, children^d` (u, d >= 1): cousins, with removal
//! - two-step in-law and step relations
//!
//! Anything else is reported as `"N degrees of separation"`.

use super::EdgeType::{Children, Parents, Siblings, Spouses};
use super::{EdgeStep, EdgeType};

/// Cousin relationship derived from an up/across/down path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CousinPattern {
    /// 1 for first cousins, 2 for second, ...
    pub degree: usize,
    /// Generational difference between the two people.
    pub removed: usize,
}

/// Human-readable label for a path. Pure; never fails.
pub fn classify(path: &[EdgeStep]) -> String {
    let types: Vec<EdgeType> = path.iter().map(|s| s.edge_type).collect();
    classify_types(&types)
}

/// Label for a bare sequence of edge types.
pub fn classify_types(types: &[EdgeType]) -> String {
    match types {
        [] => return "self".to_string(),
        [single] => return single.singular().to_string(),
        _ => {}
    }

    if let Some(label) = two_step_label(types) {
        return label.to_string();
    }

    if types.iter().all(|t| *t == Parents) {
        return generational("grandparent", types.len());
    }
    if types.iter().all(|t| *t == Children) {
        return generational("grandchild", types.len());
    }

    if let Some(label) = collateral_label(types) {
        return label;
    }

    format!("{} degrees of separation", types.len())
}

fn two_step_label(types: &[EdgeType]) -> Option<&'static str> {
    let label = match types {
        [Parents, Siblings] => "aunt/uncle",
        [Siblings, Children] => "niece/nephew",
        [Parents, Children] | [Children, Parents] => "sibling",
        [Spouses, Parents] => "parent-in-law",
        [Children, Spouses] => "child-in-law",
        [Parents, Spouses] => "step-parent",
        [Spouses, Children] => "step-child",
        [Spouses, Siblings] | [Siblings, Spouses] => "sibling-in-law",
        _ => return None,
    };
    Some(label)
}

/// `grandparent` style labels for `n >= 2` generations.
fn generational(base: &str, n: usize) -> String {
    format!("{}{}", "great-".repeat(n.saturating_sub(2)), base)
}

/// Aunts/uncles, nieces/nephews and cousins: up `u` parents, one sibling
/// step, down `d` children.
fn collateral_label(types: &[EdgeType]) -> Option<String> {
    if let Some(pattern) = cousin_pattern(types) {
        return Some(cousin_label(pattern));
    }
    let label = match up_across_down(types)? {
        (0, 0) => "sibling".to_string(),
        (u, 0) => format!("{}aunt/uncle", "great-".repeat(u - 1)),
        (0, 1) => "niece/nephew".to_string(),
        (0, d) => format!("{}grand-niece/nephew", "great-".repeat(d - 2)),
        _ => return None,
    };
    Some(label)
}

/// Split `parents^u, siblings, children^d` into `(u, d)`.
fn up_across_down(types: &[EdgeType]) -> Option<(usize, usize)> {
    let up = types.iter().take_while(|t| **t == Parents).count();
    let rest = &types[up..];
    let (first, tail) = rest.split_first()?;
    if *first != Siblings || !tail.iter().all(|t| *t == Children) {
        return None;
    }
    Some((up, tail.len()))
}

/// Cousin degree and removal for an up/across/down path, if it is one.
///
/// A path of `k` parents, one sibling step and `k` children is a `k`th cousin;
/// unequal up and down counts give a cousin `|u - d|` times removed.
pub fn cousin_pattern(types: &[EdgeType]) -> Option<CousinPattern> {
    match up_across_down(types)? {
        (u, d) if u >= 1 && d >= 1 => Some(CousinPattern {
            degree: u.min(d),
            removed: u.abs_diff(d),
        }),
        _ => None,
    }
}

fn ordinal(n: usize) -> String {
    const WORDS: [&str; 10] = [
        "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
        "tenth",
    ];
    match n {
        1..=10 => WORDS[n - 1].to_string(),
        _ => format!("{}th", n),
    }
}

fn removal(n: usize) -> String {
    match n {
        1 => "once".to_string(),
        2 => "twice".to_string(),
        3 => "three times".to_string(),
        4 => "four times".to_string(),
        5 => "five times".to_string(),
        _ => format!("{} times", n),
    }
}

fn cousin_label(pattern: CousinPattern) -> String {
    let base = format!("{} cousin", ordinal(pattern.degree));
    if pattern.removed == 0 {
        base
    } else {
        format!("{} {} removed", base, removal(pattern.removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{reverse_path, EdgeStep};
    use crate::records::PersonId;

    fn path_of(types: &[EdgeType]) -> Vec<EdgeStep> {
        types
            .iter()
            .enumerate()
            .map(|(i, t)| EdgeStep {
                from: PersonId::new(format!("n{}", i)),
                to: PersonId::new(format!("n{}", i + 1)),
                edge_type: *t,
            })
            .collect()
    }

    fn label(types: &[EdgeType]) -> String {
        classify(&path_of(types))
    }

    #[test]
    fn test_direct_relations() {
        assert_eq!(label(&[]), "self");
        assert_eq!(label(&[Parents]), "parent");
        assert_eq!(label(&[Children]), "child");
        assert_eq!(label(&[Spouses]), "spouse");
        assert_eq!(label(&[Siblings]), "sibling");
    }

    #[test]
    fn test_ancestors_and_descendants() {
        assert_eq!(label(&[Parents, Parents]), "grandparent");
        assert_eq!(label(&[Children, Children]), "grandchild");
        assert_eq!(label(&[Parents; 3]), "great-grandparent");
        assert_eq!(label(&[Children; 3]), "great-grandchild");
        assert_eq!(label(&[Parents; 4]), "great-great-grandparent");
        assert_eq!(label(&[Parents; 5]), "great-great-great-grandparent");
    }

    #[test]
    fn test_two_step_shapes() {
        assert_eq!(label(&[Parents, Siblings]), "aunt/uncle");
        assert_eq!(label(&[Siblings, Children]), "niece/nephew");
        assert_eq!(label(&[Parents, Children]), "sibling");
        assert_eq!(label(&[Spouses, Parents]), "parent-in-law");
        assert_eq!(label(&[Children, Spouses]), "child-in-law");
        assert_eq!(label(&[Parents, Spouses]), "step-parent");
        assert_eq!(label(&[Spouses, Children]), "step-child");
        assert_eq!(label(&[Spouses, Siblings]), "sibling-in-law");
        assert_eq!(label(&[Siblings, Spouses]), "sibling-in-law");
        assert_eq!(label(&[Children, Parents]), "sibling");
    }

    #[test]
    fn test_aunts_and_nieces_across_generations() {
        assert_eq!(label(&[Parents, Parents, Siblings]), "great-aunt/uncle");
        assert_eq!(label(&[Parents, Parents, Parents, Siblings]), "great-great-aunt/uncle");
        assert_eq!(label(&[Siblings, Children, Children]), "grand-niece/nephew");
        assert_eq!(
            label(&[Siblings, Children, Children, Children]),
            "great-grand-niece/nephew"
        );
    }

    #[test]
    fn test_cousins() {
        assert_eq!(label(&[Parents, Siblings, Children]), "first cousin");
        assert_eq!(
            label(&[Parents, Parents, Siblings, Children, Children]),
            "second cousin"
        );
        assert_eq!(
            label(&[Parents, Parents, Parents, Siblings, Children, Children, Children]),
            "third cousin"
        );
        let fourth = [vec![Parents; 4], vec![Siblings], vec![Children; 4]].concat();
        assert_eq!(label(&fourth), "fourth cousin");
    }

    #[test]
    fn test_removed_cousins() {
        assert_eq!(
            label(&[Parents, Siblings, Children, Children]),
            "first cousin once removed"
        );
        assert_eq!(
            label(&[Parents, Parents, Siblings, Children]),
            "first cousin once removed"
        );
        assert_eq!(
            label(&[Parents, Siblings, Children, Children, Children]),
            "first cousin twice removed"
        );
        assert_eq!(
            label(&[Parents, Parents, Parents, Siblings, Children, Children]),
            "second cousin once removed"
        );
    }

    #[test]
    fn test_cousin_pattern() {
        assert_eq!(
            cousin_pattern(&[Parents, Siblings, Children]),
            Some(CousinPattern { degree: 1, removed: 0 })
        );
        assert_eq!(
            cousin_pattern(&[Parents, Parents, Siblings, Children]),
            Some(CousinPattern { degree: 1, removed: 1 })
        );
        assert_eq!(cousin_pattern(&[Parents, Siblings]), None);
        assert_eq!(cousin_pattern(&[Siblings, Children]), None);
        assert_eq!(cousin_pattern(&[Parents, Children, Children]), None);
        assert_eq!(cousin_pattern(&[Parents, Siblings, Children, Parents]), None);
    }

    #[test]
    fn test_cousin_labels_follow_pattern() {
        let paths = [
            vec![Parents, Siblings, Children],
            vec![Parents, Parents, Siblings, Children],
            vec![Parents, Siblings, Children, Children, Children],
            vec![Parents, Parents, Parents, Siblings, Children, Children],
        ];
        for types in paths {
            let pattern = cousin_pattern(&types).unwrap();
            assert_eq!(classify_types(&types), cousin_label(pattern), "{:?}", types);
        }
    }

    #[test]
    fn test_fallback_label() {
        assert_eq!(label(&[Spouses, Siblings, Children]), "3 degrees of separation");
        assert_eq!(
            label(&[Spouses, Spouses, Spouses, Spouses]),
            "4 degrees of separation"
        );
        assert_eq!(label(&[Children, Parents, Children]), "3 degrees of separation");
    }

    #[test]
    fn test_deterministic() {
        let path = path_of(&[Parents, Parents, Siblings, Children, Children]);
        assert_eq!(classify(&path), classify(&path));
    }

    #[test]
    fn test_reverse_round_trip_labels() {
        let pairs: Vec<(Vec<EdgeType>, &str)> = vec![
            (vec![Parents], "child"),
            (vec![Parents, Parents], "grandchild"),
            (vec![Parents, Siblings], "niece/nephew"),
            (vec![Parents, Parents, Siblings], "grand-niece/nephew"),
            (vec![Spouses, Parents], "child-in-law"),
            (vec![Parents, Spouses], "step-child"),
            (vec![Spouses, Siblings], "sibling-in-law"),
            (vec![Children, Parents], "sibling"),
            (vec![Parents, Siblings, Children], "first cousin"),
            (vec![Parents, Siblings, Children, Children], "first cousin once removed"),
        ];
        for (types, expected) in pairs {
            let reversed = reverse_path(&path_of(&types));
            assert_eq!(classify(&reversed), expected, "{:?}", types);
        }
    }
}
