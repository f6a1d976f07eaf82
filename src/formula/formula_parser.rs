use super::{Connective, Formula};
use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Atom(String),
    Unary(Connective),
    Binary(Connective),
    OpeningParenthesis,
    ClosingParenthesis,
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let chars = text.chars().collect::<Vec<char>>();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            _ if c.is_whitespace() => {}
            '(' => tokens.push(Token::OpeningParenthesis),
            ')' => tokens.push(Token::ClosingParenthesis),
            '~' => tokens.push(Token::Unary(Connective::Not)),
            '&' | '^' => tokens.push(Token::Binary(Connective::And)),
            '|' => tokens.push(Token::Binary(Connective::Or)),
            '-' if next == Some('>') => {
                tokens.push(Token::Binary(Connective::Implication));
                i += 1;
            }
            '[' if next == Some(']') => {
                tokens.push(Token::Unary(Connective::Box));
                i += 1;
            }
            '<' if next == Some('>') => {
                tokens.push(Token::Unary(Connective::Diamond));
                i += 1;
            }
            _ if c.is_ascii_alphabetic() => {
                let start = i;
                while i + 1 < chars.len() && (chars[i + 1].is_ascii_alphanumeric() || chars[i + 1] == '_') {
                    i += 1;
                }
                let word = chars[start..=i].iter().collect::<String>();
                tokens.push(match word.as_str() {
                    "box" => Token::Unary(Connective::Box),
                    "dia" => Token::Unary(Connective::Diamond),
                    "v" => Token::Binary(Connective::Or),
                    _ => Token::Atom(word),
                });
            }
            _ => return Err(anyhow!(r#"unexpected character "{}" at position {}"#, c, i)),
        }
        i += 1;
    }
    Ok(tokens)
}

fn precedence(c: Connective) -> usize {
    match c {
        Connective::Implication => 1,
        Connective::Or => 2,
        Connective::And => 3,
        _ => 4,
    }
}

fn is_right_associative(c: Connective) -> bool {
    c.arity() != 2 || c == Connective::Implication
}

enum StackedOperator {
    Unary(Connective),
    Binary(Connective),
    OpeningParenthesis,
}

fn apply(operator: &StackedOperator, operands: &mut Vec<Formula>) -> Result<()> {
    let mut pop = || operands.pop().ok_or_else(|| anyhow!("missing operand"));
    let f = match operator {
        StackedOperator::Unary(c) => Formula::Unary(*c, Box::new(pop()?)),
        StackedOperator::Binary(c) => {
            let right = pop()?;
            let left = pop()?;
            Formula::Binary(*c, Box::new(left), Box::new(right))
        }
        StackedOperator::OpeningParenthesis => return Err(anyhow!("unbalanced parentheses")),
    };
    operands.push(f);
    Ok(())
}

/// Parses a modal formula written in infix notation.
///
/// Atoms are words beginning by a letter (`p1`, `q`, ...), except for the keywords listed below.
/// The connectives are, from the loosest to the tightest:
///   * implication: `->` (right associative)
///   * disjunction: `v` or `|`
///   * conjunction: `&` or `^`
///   * negation, necessity and possibility: `~`, `box` or `[]`, `dia` or `<>` (prefix operators)
///
/// Parentheses may be used to override these priorities.
/// The text produced by the [Display] implementation of [`Formula`] is accepted by this parser.
///
/// The parser uses an explicit operator stack, so deeply nested formulas do not exhaust the call stack.
///
/// # Example
///
/// ```
/// # use kripkemin::formula::parse_formula;
/// let f = parse_formula("box p1 & ~ dia (p2 -> p1)").unwrap();
/// assert_eq!("(box p1 & ~dia (p2 -> p1))", f.to_string());
/// ```
pub fn parse_formula(text: &str) -> Result<Formula> {
    let context = || format!(r#"while parsing formula "{}""#, text);
    let tokens = tokenize(text).with_context(context)?;
    let mut operators: Vec<StackedOperator> = Vec::new();
    let mut operands: Vec<Formula> = Vec::new();
    let mut expecting_operand = true;
    for (i, token) in tokens.into_iter().enumerate() {
        let unexpected = || anyhow!("unexpected token at index {}", i);
        if expecting_operand {
            match token {
                Token::Atom(a) => {
                    operands.push(Formula::Atom(a));
                    expecting_operand = false;
                }
                Token::Unary(c) => operators.push(StackedOperator::Unary(c)),
                Token::OpeningParenthesis => operators.push(StackedOperator::OpeningParenthesis),
                Token::Binary(_) | Token::ClosingParenthesis => {
                    return Err(unexpected()).with_context(context)
                }
            }
            continue;
        }
        match token {
            Token::Binary(c) => {
                while let Some(top) = operators.last() {
                    let top_connective = match top {
                        StackedOperator::Unary(t) | StackedOperator::Binary(t) => *t,
                        StackedOperator::OpeningParenthesis => break,
                    };
                    let p_top = precedence(top_connective);
                    let p_new = precedence(c);
                    if p_top > p_new || (p_top == p_new && !is_right_associative(c)) {
                        if let Some(op) = operators.pop() {
                            apply(&op, &mut operands).with_context(context)?;
                        }
                    } else {
                        break;
                    }
                }
                operators.push(StackedOperator::Binary(c));
                expecting_operand = true;
            }
            Token::ClosingParenthesis => loop {
                match operators.pop() {
                    Some(StackedOperator::OpeningParenthesis) => break,
                    Some(op) => apply(&op, &mut operands).with_context(context)?,
                    None => return Err(anyhow!("unbalanced parentheses")).with_context(context),
                }
            },
            Token::Atom(_) | Token::Unary(_) | Token::OpeningParenthesis => {
                return Err(unexpected()).with_context(context)
            }
        }
    }
    if expecting_operand {
        return Err(anyhow!("unexpected end of formula")).with_context(context);
    }
    while let Some(op) = operators.pop() {
        apply(&op, &mut operands).with_context(context)?;
    }
    match (operands.pop(), operands.is_empty()) {
        (Some(f), true) => Ok(f),
        _ => Err(anyhow!("missing operator")).with_context(context),
    }
}
