use super::{AtomNames, Connective, Formula};
use crate::utils::AtomEquivalence;
use std::fmt::Display;

/// A node of a [`FormulaTree`], i.e. a subformula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaNode {
    id: usize,
    connective: Connective,
    children: Vec<usize>,
    tag: String,
}

impl FormulaNode {
    pub(crate) fn new(id: usize, connective: Connective, children: Vec<usize>, tag: String) -> Self {
        Self {
            id,
            connective,
            children,
            tag,
        }
    }

    /// Returns the identifier of the subformula.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the main connective of the subformula.
    pub fn connective(&self) -> Connective {
        self.connective
    }

    /// Returns the identifiers of the operands, in order.
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Returns the tag of the node.
    ///
    /// For atoms, this is the identifier of the leader of their equivalence class.
    /// For other subformulas, this is the symbol of their main connective.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// The syntax tree of a formula, as reconstructed from a problem instance.
///
/// Nodes are identified by the integers from 1 to the number of subformulas; node 1 is the root.
/// Atoms denoting the same proposition are grouped into classes by an [`AtomEquivalence`].
///
/// Trees are built by [`FormulaTreeBuilder`](crate::io::FormulaTreeBuilder) and are immutable afterwards.
#[derive(Debug, Clone)]
pub struct FormulaTree {
    nodes: Vec<FormulaNode>,
    atoms: AtomEquivalence,
}

impl FormulaTree {
    pub(crate) fn new(nodes: Vec<FormulaNode>, atoms: AtomEquivalence) -> Self {
        Self { nodes, atoms }
    }

    /// Returns the number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the root node, i.e. the whole formula.
    pub fn root(&self) -> &FormulaNode {
        &self.nodes[0]
    }

    /// Returns the node with the given identifier, if any.
    pub fn node(&self, id: usize) -> Option<&FormulaNode> {
        if id == 0 {
            None
        } else {
            self.nodes.get(id - 1)
        }
    }

    /// Iterates over the nodes in increasing order of identifiers.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &FormulaNode> + '_ {
        self.nodes.iter()
    }

    /// Returns the equivalence classes of the atoms.
    pub fn atom_equivalence(&self) -> &AtomEquivalence {
        &self.atoms
    }

    /// Returns the default names of the atoms: `p1`, `p2`, ... in increasing order of class leaders.
    pub fn atom_names(&self) -> AtomNames {
        AtomNames::ordinal(self.atoms.leaders())
    }

    /// Converts this tree into a [`Formula`], naming atoms with the provided names.
    pub fn to_formula(&self, names: &AtomNames) -> Formula {
        let mut stack = vec![(self.root().id, false)];
        let mut built: Vec<Formula> = Vec::with_capacity(self.nodes.len());
        let pop_operand = |built: &mut Vec<Formula>| {
            built
                .pop()
                .unwrap_or_else(|| unreachable!("operands are built before their parent"))
        };
        while let Some((id, expanded)) = stack.pop() {
            let node = &self.nodes[id - 1];
            if !expanded && !node.children.is_empty() {
                stack.push((id, true));
                node.children
                    .iter()
                    .rev()
                    .for_each(|c| stack.push((*c, false)));
                continue;
            }
            let formula = match node.connective.arity() {
                0 => {
                    let leader = self.atoms.leader_of(id).unwrap_or(id);
                    Formula::Atom(names.name_of(leader))
                }
                1 => Formula::Unary(node.connective, Box::new(pop_operand(&mut built))),
                _ => {
                    let right = pop_operand(&mut built);
                    let left = pop_operand(&mut built);
                    Formula::Binary(node.connective, Box::new(left), Box::new(right))
                }
            };
            built.push(formula);
        }
        pop_operand(&mut built)
    }

    /// Returns the formula in fully bracketed infix notation, naming atoms with the provided names.
    ///
    /// Binary subformulas are wrapped into parentheses, the left operand being written first;
    /// prefix operators are written right before their operand.
    pub fn to_infix(&self, names: &AtomNames) -> String {
        let mut result = String::new();
        let mut stack = vec![Piece::Node(self.root().id)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(t) => result.push_str(t),
                Piece::Node(id) => {
                    let node = &self.nodes[id - 1];
                    match node.children.as_slice() {
                        [] => {
                            let leader = self.atoms.leader_of(id).unwrap_or(id);
                            result.push_str(&names.name_of(leader));
                        }
                        [child] => {
                            stack.push(Piece::Node(*child));
                            stack.push(Piece::Text(node.connective.prefix_text()));
                        }
                        [left, right, ..] => {
                            stack.push(Piece::Text(")"));
                            stack.push(Piece::Node(*right));
                            stack.push(Piece::Text(node.connective.infix_text()));
                            stack.push(Piece::Node(*left));
                            stack.push(Piece::Text("("));
                        }
                    }
                }
            }
        }
        result
    }
}

enum Piece {
    Node(usize),
    Text(&'static str),
}

impl Display for FormulaTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_infix(&self.atom_names()))
    }
}
