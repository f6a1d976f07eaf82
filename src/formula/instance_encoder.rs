use super::Formula;
use std::collections::BTreeMap;

/// The order in which predicate blocks are written in problem instances.
const PREDICATE_BLOCK_ORDER: [&str; 8] = [
    "Atom",
    "SameAtom",
    "And",
    "Or",
    "Implication",
    "Not",
    "Box",
    "Diamond",
];

/// Encodes a formula into a problem instance, as read by [`FormulaTreeBuilder`](crate::io::FormulaTreeBuilder).
///
/// Subformulas are numbered in pre-order, the whole formula receiving the identifier 1.
/// The first line declares the number of subformulas, and the second one declares the number of worlds.
/// Each occurrence of an atom gets its own identifier; the occurrences of a same atom are tied by `SameAtom` pairs linking the first occurrence to each other one.
///
/// # Example
///
/// ```
/// # use kripkemin::formula::{encode_instance, parse_formula};
/// let instance = encode_instance(&parse_formula("p1 & ~p1").unwrap(), 1);
/// assert!(instance.starts_with("TYPE Subformula [1.. 4]\nTYPE World [1.. 1]\n"));
/// assert!(instance.contains("PREDICATE SameAtom\n(2, 4)\n"));
/// assert!(instance.contains("PREDICATE And\n(1, 2, 3)\n"));
/// ```
pub fn encode_instance(formula: &Formula, n_worlds: usize) -> String {
    let mut entries: Vec<(&Formula, Vec<usize>)> = Vec::new();
    let mut stack: Vec<(&Formula, Option<usize>)> = vec![(formula, None)];
    while let Some((f, parent)) = stack.pop() {
        let id = entries.len() + 1;
        entries.push((f, Vec::with_capacity(f.connective().arity())));
        if let Some(p) = parent {
            entries[p - 1].1.push(id);
        }
        match f {
            Formula::Atom(_) => {}
            Formula::Unary(_, x) => stack.push((x, Some(id))),
            Formula::Binary(_, l, r) => {
                stack.push((r, Some(id)));
                stack.push((l, Some(id)));
            }
        }
    }
    let mut blocks: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    let mut occurrences: Vec<(&str, Vec<usize>)> = Vec::new();
    for (i, (f, children)) in entries.iter().enumerate() {
        let id = i + 1;
        let tuple = std::iter::once(id)
            .chain(children.iter().copied())
            .map(|n| n.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        match f {
            Formula::Atom(a) => {
                blocks.entry("Atom").or_default().push(format!("({})", tuple));
                match occurrences.iter_mut().find(|(name, _)| *name == a.as_str()) {
                    Some((_, ids)) => ids.push(id),
                    None => occurrences.push((a.as_str(), vec![id])),
                }
            }
            Formula::Unary(c, _) | Formula::Binary(c, _, _) => {
                let predicate: &'static str = (*c).into();
                blocks
                    .entry(predicate)
                    .or_default()
                    .push(format!("({})", tuple));
            }
        }
    }
    for (_, ids) in occurrences.iter() {
        ids.iter().skip(1).for_each(|other| {
            blocks
                .entry("SameAtom")
                .or_default()
                .push(format!("({}, {})", ids[0], other))
        });
    }
    let mut instance = format!(
        "TYPE Subformula [1.. {}]\nTYPE World [1.. {}]\n",
        entries.len(),
        n_worlds
    );
    for predicate in PREDICATE_BLOCK_ORDER {
        instance.push_str(&format!("PREDICATE {}\n", predicate));
        for tuple in blocks.get(predicate).into_iter().flatten() {
            instance.push_str(tuple);
            instance.push('\n');
        }
    }
    instance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse_formula;

    #[test]
    fn test_encode() {
        let formula = parse_formula("box p1 & ~dia (p2 -> p1)").unwrap();
        let expected = r#"TYPE Subformula [1.. 8]
TYPE World [1.. 3]
PREDICATE Atom
(3)
(7)
(8)
PREDICATE SameAtom
(3, 8)
PREDICATE And
(1, 2, 4)
PREDICATE Or
PREDICATE Implication
(6, 7, 8)
PREDICATE Not
(4, 5)
PREDICATE Box
(2, 3)
PREDICATE Diamond
(5, 6)
"#;
        assert_eq!(expected, encode_instance(&formula, 3));
    }

    #[test]
    fn test_encode_atom() {
        let formula = parse_formula("p1").unwrap();
        let instance = encode_instance(&formula, 1);
        assert!(instance.starts_with(
            "TYPE Subformula [1.. 1]\nTYPE World [1.. 1]\nPREDICATE Atom\n(1)\nPREDICATE SameAtom\n"
        ));
    }

    #[test]
    fn test_encode_same_atom_chain() {
        let formula = parse_formula("(p1 & p1) & p1").unwrap();
        let instance = encode_instance(&formula, 1);
        assert!(instance.contains("PREDICATE SameAtom\n(3, 4)\n(3, 5)\nPREDICATE And\n"));
    }

    #[test]
    fn test_one_line_per_tuple() {
        let formula = parse_formula("~(p1 v p2) -> box p1").unwrap();
        let instance = encode_instance(&formula, 2);
        assert_eq!(2 + PREDICATE_BLOCK_ORDER.len() + 8, instance.lines().count());
        assert!(instance.ends_with("PREDICATE Diamond\n"));
        assert!(instance.contains("PREDICATE Implication\n(1, 2, 6)\n"));
        assert!(instance.contains("PREDICATE Or\n(3, 4, 5)\n"));
    }
}
