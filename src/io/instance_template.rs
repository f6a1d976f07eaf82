use super::instance_reader::{classify_line, InstanceLine, SUBFORMULA_TYPE, WORLD_TYPE};
use crate::error::{ModelFinderError, Result};

/// An immutable problem instance, from which instances with different numbers of worlds are derived.
///
/// The number of worlds is declared by a `TYPE World [1.. n]` line.
/// Deriving an instance for another number of worlds only rewrites this line, leaving the others untouched;
/// the template itself is never modified, so each probe of a search works on its own copy.
///
/// # Example
///
/// ```
/// # use kripkemin::io::InstanceTemplate;
/// let template = InstanceTemplate::new("TYPE Subformula [1.. 1]\nTYPE World [1.. 1]\nPREDICATE Atom\n(1)\n").unwrap();
/// assert_eq!(1, template.n_subformulas());
/// assert_eq!(
///     "TYPE Subformula [1.. 1]\nTYPE World [1.. 4]\nPREDICATE Atom\n(1)\n",
///     template.with_size(4)
/// );
/// ```
#[derive(Debug, Clone)]
pub struct InstanceTemplate {
    lines: Vec<String>,
    world_line: usize,
    declared_worlds: usize,
    n_subformulas: usize,
}

impl InstanceTemplate {
    /// Builds a template from the text of a problem instance.
    ///
    /// Fails with [`ModelFinderError::MalformedInstance`] if the number of subformulas or the number of worlds is not declared exactly once.
    pub fn new(instance: &str) -> Result<Self> {
        let lines = instance.lines().map(|l| l.to_string()).collect::<Vec<String>>();
        let mut world_declaration = None;
        let mut n_subformulas = None;
        for (i, line) in lines.iter().enumerate() {
            if let Ok(InstanceLine::Type(name, n)) = classify_line(line) {
                let target = match name.as_str() {
                    SUBFORMULA_TYPE => &mut n_subformulas,
                    WORLD_TYPE => &mut world_declaration,
                    _ => continue,
                };
                if target.is_some() {
                    return Err(ModelFinderError::MalformedInstance(format!(
                        "at line {}: type {} is declared twice",
                        i + 1,
                        name
                    )));
                }
                *target = Some((i, n));
            }
        }
        let missing =
            |t: &str| ModelFinderError::MalformedInstance(format!("missing TYPE {} declaration", t));
        let (world_line, declared_worlds) = world_declaration.ok_or_else(|| missing(WORLD_TYPE))?;
        let (_, n_subformulas) = n_subformulas.ok_or_else(|| missing(SUBFORMULA_TYPE))?;
        Ok(Self {
            lines,
            world_line,
            declared_worlds,
            n_subformulas,
        })
    }

    /// Returns the number of subformulas declared by the instance.
    pub fn n_subformulas(&self) -> usize {
        self.n_subformulas
    }

    /// Returns the number of worlds declared by the instance.
    pub fn declared_worlds(&self) -> usize {
        self.declared_worlds
    }

    /// Returns the lines of the instance.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the text of the instance with the number of worlds set to `n_worlds`.
    pub fn with_size(&self, n_worlds: usize) -> String {
        let mut result = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i == self.world_line {
                result.push_str(&format!("TYPE {} [1.. {}]", WORLD_TYPE, n_worlds));
            } else {
                result.push_str(line);
            }
            result.push('\n');
        }
        result
    }
}
