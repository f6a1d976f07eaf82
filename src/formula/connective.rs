use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The main connective of a subformula.
///
/// The string representation of a connective (through [Display] and [FromStr](std::str::FromStr)) is the name of the predicate encoding it in problem instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum Connective {
    /// An atomic proposition
    Atom,
    /// The negation
    Not,
    /// The necessity modality
    Box,
    /// The possibility modality
    Diamond,
    /// The conjunction
    And,
    /// The disjunction
    Or,
    /// The material implication
    Implication,
}

impl Connective {
    /// Returns the number of operands of the connective.
    pub fn arity(&self) -> usize {
        match self {
            Connective::Atom => 0,
            Connective::Not | Connective::Box | Connective::Diamond => 1,
            Connective::And | Connective::Or | Connective::Implication => 2,
        }
    }

    /// Returns the symbol used to print the connective, or [Option::None] for atoms.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Connective::Atom => None,
            Connective::Not => Some("~"),
            Connective::Box => Some("box"),
            Connective::Diamond => Some("dia"),
            Connective::And => Some("&"),
            Connective::Or => Some("v"),
            Connective::Implication => Some("->"),
        }
    }

    pub(crate) fn prefix_text(&self) -> &'static str {
        match self {
            Connective::Not => "~",
            Connective::Box => "box ",
            Connective::Diamond => "dia ",
            _ => "",
        }
    }

    pub(crate) fn infix_text(&self) -> &'static str {
        match self {
            Connective::And => " & ",
            Connective::Or => " v ",
            Connective::Implication => " -> ",
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_from_predicate_name() {
        assert_eq!(Connective::Diamond, Connective::from_str("Diamond").unwrap());
        assert_eq!(
            Connective::Implication,
            Connective::from_str("Implication").unwrap()
        );
        assert!(Connective::from_str("SameAtom").is_err());
        assert!(Connective::from_str("and").is_err());
    }

    #[test]
    fn test_display_is_predicate_name() {
        for c in Connective::iter() {
            assert_eq!(c, Connective::from_str(&c.to_string()).unwrap());
        }
    }

    #[test]
    fn test_symbols() {
        assert_eq!(None, Connective::Atom.symbol());
        assert_eq!(
            vec!["~", "box", "dia", "&", "v", "->"],
            Connective::iter()
                .filter_map(|c| c.symbol())
                .collect::<Vec<&str>>()
        );
    }

    #[test]
    fn test_arity() {
        assert_eq!(
            vec![0, 1, 1, 1, 2, 2, 2],
            Connective::iter().map(|c| c.arity()).collect::<Vec<usize>>()
        );
    }
}
