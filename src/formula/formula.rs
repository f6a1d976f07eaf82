use super::Connective;
use std::fmt::Display;

/// A modal formula, as written by users.
///
/// Unlike a [`FormulaTree`](super::FormulaTree), a formula carries atom names instead of subformula identifiers.
///
/// Its [Display] implementation produces fully bracketed text: binary subformulas are wrapped into parentheses, and prefix operators are written right before their operand.
/// This text can be read back with [`parse_formula`](super::parse_formula).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// An atomic proposition
    Atom(String),
    /// A subformula whose main connective is unary
    Unary(Connective, Box<Formula>),
    /// A subformula whose main connective is binary
    Binary(Connective, Box<Formula>, Box<Formula>),
}

impl Formula {
    /// Returns the main connective of the formula.
    pub fn connective(&self) -> Connective {
        match self {
            Formula::Atom(_) => Connective::Atom,
            Formula::Unary(c, _) | Formula::Binary(c, _, _) => *c,
        }
    }

    /// Returns the number of subformulas, the formula included.
    pub fn n_subformulas(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(f) = stack.pop() {
            count += 1;
            match f {
                Formula::Atom(_) => {}
                Formula::Unary(_, x) => stack.push(x),
                Formula::Binary(_, l, r) => {
                    stack.push(r);
                    stack.push(l);
                }
            }
        }
        count
    }
}

impl Drop for Formula {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        detach_operands(self, &mut stack);
        while let Some(mut f) = stack.pop() {
            detach_operands(&mut f, &mut stack);
        }
    }
}

fn detach_operands(f: &mut Formula, stack: &mut Vec<Formula>) {
    let mut detach = |x: &mut Box<Formula>| {
        stack.push(std::mem::replace(x.as_mut(), Formula::Atom(String::new())))
    };
    match f {
        Formula::Atom(_) => {}
        Formula::Unary(_, x) => detach(x),
        Formula::Binary(_, l, r) => {
            detach(l);
            detach(r);
        }
    }
}

enum Piece<'a> {
    Formula(&'a Formula),
    Text(&'static str),
}

impl Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut stack = vec![Piece::Formula(self)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(t) => f.write_str(t)?,
                Piece::Formula(Formula::Atom(a)) => f.write_str(a)?,
                Piece::Formula(Formula::Unary(c, x)) => {
                    stack.push(Piece::Formula(x));
                    stack.push(Piece::Text(c.prefix_text()));
                }
                Piece::Formula(Formula::Binary(c, l, r)) => {
                    stack.push(Piece::Text(")"));
                    stack.push(Piece::Formula(r));
                    stack.push(Piece::Text(c.infix_text()));
                    stack.push(Piece::Formula(l));
                    stack.push(Piece::Text("("));
                }
            }
        }
        Ok(())
    }
}
