use super::WarningHandler;
use crate::{
    error::{ModelFinderError, Result},
    formula::{Connective, FormulaNode, FormulaTree},
    utils::AtomEquivalence,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::{
    collections::{BTreeMap, HashMap},
    str::FromStr,
};

lazy_static! {
    static ref TYPE_LINE_PATTERN: Regex =
        Regex::new(r"^TYPE\s+([_[:alpha:]][_[:alnum:]]*)\s*\[\s*1\s*\.\.\s*(\d+)\s*\]$").unwrap();
    static ref PREDICATE_LINE_PATTERN: Regex =
        Regex::new(r"^PREDICATE\s+([_[:alpha:]][_[:alnum:]]*)$").unwrap();
    static ref TUPLE_LINE_PATTERN: Regex =
        Regex::new(r"^\(\s*(\d+(\s*,\s*\d+)*)\s*\)$").unwrap();
}

pub(crate) const SUBFORMULA_TYPE: &str = "Subformula";
pub(crate) const WORLD_TYPE: &str = "World";
const SAME_ATOM_PREDICATE: &str = "SameAtom";

/// The kinds of lines found in problem instances.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum InstanceLine {
    Blank,
    Type(String, usize),
    Predicate(String),
    Tuple(Vec<usize>),
}

/// Classifies a line of a problem instance.
pub(crate) fn classify_line(line: &str) -> Result<InstanceLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(InstanceLine::Blank);
    }
    if let Some(c) = TYPE_LINE_PATTERN.captures(trimmed) {
        return parse_int(&c[2]).map(|n| InstanceLine::Type(c[1].to_string(), n));
    }
    if let Some(c) = PREDICATE_LINE_PATTERN.captures(trimmed) {
        return Ok(InstanceLine::Predicate(c[1].to_string()));
    }
    if let Some(c) = TUPLE_LINE_PATTERN.captures(trimmed) {
        return c[1]
            .split(',')
            .map(|s| parse_int(s.trim()))
            .collect::<Result<Vec<usize>>>()
            .map(InstanceLine::Tuple);
    }
    Err(ModelFinderError::MalformedInstance(format!(
        r#"syntax error in line "{}""#,
        trimmed
    )))
}

fn parse_int(s: &str) -> Result<usize> {
    s.parse::<usize>()
        .map_err(|e| ModelFinderError::MalformedInstance(format!(r#"invalid integer "{}": {}"#, s, e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Connective(Connective),
    SameAtom,
    Unknown,
}

impl Block {
    fn name(&self) -> String {
        match self {
            Block::Connective(c) => c.to_string(),
            Block::SameAtom => SAME_ATOM_PREDICATE.to_string(),
            Block::Unknown => "unknown".to_string(),
        }
    }

    fn tuple_len(&self) -> Option<usize> {
        match self {
            Block::Connective(c) => Some(1 + c.arity()),
            Block::SameAtom => Some(2),
            Block::Unknown => None,
        }
    }
}

fn predicates_for_tuple_len(len: usize) -> &'static str {
    match len {
        1 => "Atom",
        2 => "Not, Box, Diamond or SameAtom",
        3 => "And, Or or Implication",
        _ => "any predicate",
    }
}

struct Definition {
    connective: Connective,
    children: Vec<usize>,
    line: usize,
}

fn malformed<T>(message: String) -> Result<T> {
    Err(ModelFinderError::MalformedInstance(message))
}

/// Rebuilds the syntax tree of a formula from a problem instance.
///
/// # Instance format
///
/// A problem instance begins with type declarations, among which the number of subformulas (`TYPE Subformula [1.. n]`) and the number of worlds (`TYPE World [1.. m]`).
/// Then come predicate blocks, each of them beginning by a `PREDICATE <Name>` line followed by tuples.
/// The tuples of the `Atom` block are singletons; the ones of unary connectives (`Not`, `Box`, `Diamond`) are pairs and the ones of binary connectives (`And`, `Or`, `Implication`) are triples.
/// The first element of such a tuple is a subformula, and the next ones are its operands.
/// The `SameAtom` block contains pairs of atomic subformulas denoting the same proposition.
///
/// The following instance encodes the formula `(box p1 & ~p1)`.
///
/// ```text
/// TYPE Subformula [1.. 5]
/// TYPE World [1.. 1]
/// PREDICATE Atom
/// (3)
/// (5)
/// PREDICATE SameAtom
/// (3, 5)
/// PREDICATE And
/// (1, 2, 4)
/// PREDICATE Not
/// (4, 5)
/// PREDICATE Box
/// (2, 3)
/// ```
///
/// Each line is classified once, and an index from subformula identifiers to their defining tuples is built from these lines.
/// Blocks of unknown predicates are ignored, raising a warning.
///
/// # Example
///
/// ```
/// # use kripkemin::io::FormulaTreeBuilder;
/// let instance = "TYPE Subformula [1.. 2]\nTYPE World [1.. 1]\nPREDICATE Atom\n(2)\nPREDICATE Not\n(1, 2)\n";
/// let tree = FormulaTreeBuilder::default().build_from_str(instance).unwrap();
/// assert_eq!("~p1", tree.to_string());
/// ```
#[derive(Default)]
pub struct FormulaTreeBuilder {
    warning_handlers: Vec<WarningHandler>,
}

impl FormulaTreeBuilder {
    /// Adds a callback function to call when warnings are raised while parsing an instance.
    pub fn add_warning_handler(&mut self, h: WarningHandler) {
        self.warning_handlers.push(h);
    }

    /// Builds the formula tree from the text of a problem instance.
    pub fn build_from_str(&self, instance: &str) -> Result<FormulaTree> {
        self.build(&instance.lines().collect::<Vec<&str>>())
    }

    /// Builds the formula tree from the lines of a problem instance.
    ///
    /// Fails with [`ModelFinderError::MalformedInstance`] if the instance does not encode exactly one tree rooted at subformula 1.
    pub fn build<S>(&self, lines: &[S]) -> Result<FormulaTree>
    where
        S: AsRef<str>,
    {
        let mut n_subformulas = None;
        let mut block = None;
        let mut definitions: BTreeMap<usize, Definition> = BTreeMap::new();
        let mut same_atoms = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let line_index = i + 1;
            let classified = classify_line(line.as_ref()).map_err(|e| match e {
                ModelFinderError::MalformedInstance(m) => {
                    ModelFinderError::MalformedInstance(format!("at line {}: {}", line_index, m))
                }
                other => other,
            })?;
            match classified {
                InstanceLine::Blank => {}
                InstanceLine::Type(name, n) => match name.as_str() {
                    SUBFORMULA_TYPE if n_subformulas.is_some() => {
                        return malformed(format!(
                            "at line {}: the number of subformulas is declared twice",
                            line_index
                        ))
                    }
                    SUBFORMULA_TYPE => n_subformulas = Some(n),
                    WORLD_TYPE => {}
                    _ => self.warn(line_index, format!(r#"ignoring type "{}""#, name)),
                },
                InstanceLine::Predicate(name) => {
                    let new_block = if name == SAME_ATOM_PREDICATE {
                        Block::SameAtom
                    } else if let Ok(c) = Connective::from_str(&name) {
                        Block::Connective(c)
                    } else {
                        self.warn(line_index, format!(r#"ignoring unknown predicate "{}""#, name));
                        Block::Unknown
                    };
                    block = Some(new_block);
                }
                InstanceLine::Tuple(tuple) => {
                    let current = match block {
                        Some(b) => b,
                        None => {
                            return malformed(format!(
                                "at line {}: tuple found before any PREDICATE header",
                                line_index
                            ))
                        }
                    };
                    match current.tuple_len() {
                        None => continue,
                        Some(n) if n != tuple.len() => {
                            return malformed(format!(
                                "at line {}: tuple {:?} does not fit in the {} block; missing PREDICATE header for {}",
                                line_index,
                                tuple,
                                current.name(),
                                predicates_for_tuple_len(tuple.len()),
                            ))
                        }
                        Some(_) => {}
                    }
                    match current {
                        Block::Connective(connective) => {
                            let id = tuple[0];
                            if let Some(previous) = definitions.get(&id) {
                                return malformed(format!(
                                    "subformula {} is defined twice (lines {} and {})",
                                    id, previous.line, line_index
                                ));
                            }
                            definitions.insert(
                                id,
                                Definition {
                                    connective,
                                    children: tuple[1..].to_vec(),
                                    line: line_index,
                                },
                            );
                        }
                        Block::SameAtom => same_atoms.push((tuple[0], tuple[1], line_index)),
                        Block::Unknown => {}
                    }
                }
            }
        }
        let n = match n_subformulas {
            Some(0) => return malformed("the formula has no subformula".to_string()),
            Some(n) => n,
            None => {
                return malformed(format!(
                    "missing TYPE {} declaration",
                    SUBFORMULA_TYPE
                ))
            }
        };
        check_definitions(n, &definitions)?;
        check_tree_shape(n, &definitions)?;
        let atoms = compute_atom_equivalence(&definitions, &same_atoms)?;
        let nodes = definitions
            .into_iter()
            .map(|(id, d)| {
                let tag = match d.connective.symbol() {
                    Some(s) => s.to_string(),
                    None => atoms.leader_of(id).unwrap_or(id).to_string(),
                };
                FormulaNode::new(id, d.connective, d.children, tag)
            })
            .collect();
        Ok(FormulaTree::new(nodes, atoms))
    }

    fn warn(&self, line: usize, message: String) {
        self.warning_handlers
            .iter()
            .for_each(|h| (h)(line, message.clone()));
    }
}

fn check_definitions(n: usize, definitions: &BTreeMap<usize, Definition>) -> Result<()> {
    for (id, d) in definitions.iter() {
        if *id == 0 || *id > n {
            return malformed(format!(
                "at line {}: subformula {} is out of the declared range [1, {}]",
                d.line, id, n
            ));
        }
        if let Some(c) = d.children.iter().find(|c| **c == 0 || **c > n) {
            return malformed(format!(
                "at line {}: operand {} is out of the declared range [1, {}]",
                d.line, c, n
            ));
        }
    }
    match (1..=n).find(|id| !definitions.contains_key(id)) {
        Some(id) => malformed(format!("no predicate defines subformula {}", id)),
        None => Ok(()),
    }
}

fn check_tree_shape(n: usize, definitions: &BTreeMap<usize, Definition>) -> Result<()> {
    let mut parents: HashMap<usize, usize> = HashMap::with_capacity(n);
    for (id, d) in definitions.iter() {
        for child in d.children.iter() {
            if let Some(other) = parents.insert(*child, *id) {
                return malformed(format!(
                    "subformula {} is an operand of both subformulas {} and {}",
                    child, other, id
                ));
            }
        }
    }
    if let Some(parent) = parents.get(&1) {
        return malformed(format!(
            "subformula 1 must be the root, but it is an operand of subformula {}",
            parent
        ));
    }
    if let Some(orphan) = (2..=n).find(|id| !parents.contains_key(id)) {
        return malformed(format!(
            "subformula {} has no parent, but only subformula 1 may be the root",
            orphan
        ));
    }
    let mut visited = vec![false; n + 1];
    let mut n_visited = 0;
    let mut stack = vec![1];
    while let Some(id) = stack.pop() {
        if visited[id] {
            continue;
        }
        visited[id] = true;
        n_visited += 1;
        if let Some(d) = definitions.get(&id) {
            stack.extend(d.children.iter().copied());
        }
    }
    if n_visited != n {
        let unreachable = (1..=n).filter(|id| !visited[*id]).collect::<Vec<usize>>();
        return malformed(format!(
            "subformulas {:?} are not reachable from the root (cycle)",
            unreachable
        ));
    }
    Ok(())
}

fn compute_atom_equivalence(
    definitions: &BTreeMap<usize, Definition>,
    same_atoms: &[(usize, usize, usize)],
) -> Result<AtomEquivalence> {
    let mut atoms = AtomEquivalence::new_with_atoms(
        definitions
            .iter()
            .filter(|(_, d)| d.connective == Connective::Atom)
            .map(|(id, _)| *id),
    );
    for (a, b, line) in same_atoms.iter() {
        if let Some(not_atom) = [a, b].into_iter().find(|x| !atoms.contains(**x)) {
            return malformed(format!(
                "at line {}: SameAtom pair ({}, {}) refers to subformula {}, which is not an atom",
                line, a, b, not_atom
            ));
        }
        atoms.union(*a, *b);
    }
    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{encode_instance, parse_formula};
    use std::{cell::RefCell, rc::Rc};

    const INSTANCE: &str = r#"TYPE Subformula [1.. 8]
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

    fn build(instance: &str) -> Result<FormulaTree> {
        FormulaTreeBuilder::default().build_from_str(instance)
    }

    fn assert_malformed(instance: &str, expected_fragment: &str) {
        match build(instance) {
            Err(ModelFinderError::MalformedInstance(message)) => assert!(
                message.contains(expected_fragment),
                r#"message "{}" does not contain "{}""#,
                message,
                expected_fragment
            ),
            Err(e) => panic!("unexpected error {}", e),
            Ok(t) => panic!("unexpected success with formula {}", t),
        }
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(InstanceLine::Blank, classify_line("   ").unwrap());
        assert_eq!(
            InstanceLine::Type("Subformula".to_string(), 12),
            classify_line("TYPE  Subformula [ 1.. 12]").unwrap()
        );
        assert_eq!(
            InstanceLine::Predicate("SameAtom".to_string()),
            classify_line("PREDICATE SameAtom").unwrap()
        );
        assert_eq!(
            InstanceLine::Tuple(vec![12, 1, 21]),
            classify_line(" (12,1 , 21) ").unwrap()
        );
        assert!(classify_line("(1, 2").is_err());
        assert!(classify_line("(1, -2)").is_err());
        assert!(classify_line("PREDICATE").is_err());
    }

    #[test]
    fn test_build() {
        let tree = build(INSTANCE).unwrap();
        assert_eq!(8, tree.n_nodes());
        assert_eq!(1, tree.root().id());
        assert_eq!("(box p1 & ~dia (p2 -> p1))", tree.to_string());
        assert_eq!(
            vec!["&", "box", "3", "~", "dia", "->", "7", "3"],
            tree.iter_nodes().map(|n| n.tag()).collect::<Vec<&str>>()
        );
        assert_eq!(Some(3), tree.atom_equivalence().leader_of(8));
    }

    #[test]
    fn test_ids_are_not_substrings() {
        let mut instance = String::from(
            "TYPE Subformula [1.. 12]\nTYPE World [1.. 1]\nPREDICATE Atom\n(12)\n(11)\nPREDICATE Not\n",
        );
        (1..=9).for_each(|i| instance.push_str(&format!("({}, {})\n", i, i + 1)));
        instance.push_str("PREDICATE And\n(10, 11, 12)\n");
        let tree = build(&instance).unwrap();
        assert_eq!(12, tree.n_nodes());
        assert_eq!(vec![11, 12], tree.node(10).unwrap().children().to_vec());
        assert_eq!(vec![2], tree.node(1).unwrap().children().to_vec());
        assert_eq!("~~~~~~~~~(p1 & p2)", tree.to_string());
    }

    #[test]
    fn test_round_trip() {
        for text in [
            "p1",
            "~p1",
            "(box p1 & ~dia (p2 -> p1))",
            "((p1 v p2) -> (p2 v p1))",
            "dia (box (p1 & p2) v ~(p3 -> box dia p1))",
        ] {
            let formula = parse_formula(text).unwrap();
            let tree = build(&encode_instance(&formula, 1)).unwrap();
            assert_eq!(formula.n_subformulas(), tree.n_nodes());
            let reparsed = parse_formula(&tree.to_string()).unwrap();
            assert_eq!(formula, reparsed);
        }
    }

    #[test]
    fn test_blank_lines_and_spaces() {
        let instance = "\n  TYPE Subformula [1.. 2]  \n\nTYPE World [1.. 4]\n\nPREDICATE Atom\n  (2)\nPREDICATE Box\n( 1 ,2 )\n\n";
        assert_eq!("box p1", build(instance).unwrap().to_string());
    }

    #[test]
    fn test_unknown_predicate_is_warned() {
        let instance = "TYPE Subformula [1.. 1]\nTYPE World [1.. 1]\nPREDICATE Atom\n(1)\nPREDICATE Foo\n(1, 2, 3, 4)\n";
        let warnings = Rc::new(RefCell::new(Vec::new()));
        let mut builder = FormulaTreeBuilder::default();
        let warnings_clone = Rc::clone(&warnings);
        builder.add_warning_handler(Box::new(move |line, message| {
            warnings_clone.borrow_mut().push((line, message))
        }));
        assert_eq!("p1", builder.build_from_str(instance).unwrap().to_string());
        assert_eq!(
            vec![(5, r#"ignoring unknown predicate "Foo""#.to_string())],
            *warnings.borrow()
        );
    }

    #[test]
    fn test_missing_and_block() {
        let instance = r#"TYPE Subformula [1.. 5]
TYPE World [1.. 1]
PREDICATE Atom
(3)
(5)
PREDICATE SameAtom
(3, 5)
(1, 2, 4)
PREDICATE Not
(4, 5)
PREDICATE Box
(2, 3)
"#;
        assert_malformed(instance, "missing PREDICATE header for And");
        assert_malformed(instance, "at line 8");
    }

    #[test]
    fn test_tuple_before_predicate() {
        assert_malformed(
            "TYPE Subformula [1.. 1]\n(1)\nPREDICATE Atom\n",
            "tuple found before any PREDICATE header",
        );
    }

    #[test]
    fn test_undefined_subformula() {
        assert_malformed(
            "TYPE Subformula [1.. 3]\nPREDICATE Atom\n(2)\nPREDICATE And\n(1, 2, 3)\n",
            "no predicate defines subformula 3",
        );
    }

    #[test]
    fn test_duplicate_definition() {
        assert_malformed(
            "TYPE Subformula [1.. 2]\nPREDICATE Atom\n(2)\n(1)\nPREDICATE Not\n(1, 2)\n",
            "subformula 1 is defined twice (lines 4 and 6)",
        );
    }

    #[test]
    fn test_fan_in() {
        assert_malformed(
            "TYPE Subformula [1.. 3]\nPREDICATE Atom\n(3)\nPREDICATE Not\n(2, 3)\nPREDICATE And\n(1, 2, 3)\n",
            "subformula 3 is an operand of both subformulas 1 and 2",
        );
    }

    #[test]
    fn test_root_is_not_one() {
        assert_malformed(
            "TYPE Subformula [1.. 2]\nPREDICATE Atom\n(1)\nPREDICATE Not\n(2, 1)\n",
            "subformula 1 must be the root",
        );
    }

    #[test]
    fn test_two_roots() {
        assert_malformed(
            "TYPE Subformula [1.. 3]\nPREDICATE Atom\n(2)\n(3)\nPREDICATE Not\n(1, 2)\n",
            "subformula 3 has no parent",
        );
    }

    #[test]
    fn test_cycle() {
        assert_malformed(
            "TYPE Subformula [1.. 4]\nPREDICATE Atom\n(1)\nPREDICATE Not\n(2, 3)\n(3, 4)\n(4, 2)\n",
            "not reachable from the root",
        );
    }

    #[test]
    fn test_out_of_range() {
        assert_malformed(
            "TYPE Subformula [1.. 2]\nPREDICATE Atom\n(3)\n(2)\nPREDICATE Not\n(1, 2)\n",
            "subformula 3 is out of the declared range [1, 2]",
        );
        assert_malformed(
            "TYPE Subformula [1.. 1]\nPREDICATE Not\n(1, 2)\n",
            "operand 2 is out of the declared range [1, 1]",
        );
    }

    #[test]
    fn test_same_atom_on_non_atom() {
        assert_malformed(
            "TYPE Subformula [1.. 2]\nPREDICATE Atom\n(2)\nPREDICATE SameAtom\n(1, 2)\nPREDICATE Not\n(1, 2)\n",
            "refers to subformula 1, which is not an atom",
        );
    }

    #[test]
    fn test_missing_subformula_count() {
        assert_malformed("PREDICATE Atom\n(1)\n", "missing TYPE Subformula declaration");
        assert_malformed("TYPE Subformula [1.. 0]\n", "no subformula");
        assert_malformed(
            "TYPE Subformula [1.. 1]\nTYPE Subformula [1.. 1]\n",
            "declared twice",
        );
    }

    #[test]
    fn test_syntax_error() {
        assert_malformed(
            "TYPE Subformula [1.. 1]\nPREDICATE Atom\n1\n",
            "at line 3: syntax error",
        );
    }
}
