use crate::error::{ModelFinderError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    static ref DATASET_OPEN_PATTERN: Regex =
        Regex::new(r#"^<DataSet\s+Name\s*=\s*['"]([^'"]*)['"]"#).unwrap();
    static ref INT_VALUE_PATTERN: Regex =
        Regex::new(r#"<IntValue\s+Name\s*=\s*['"](\d+)['"]\s*/>"#).unwrap();
}

const DATASET_CLOSE: &str = "</DataSet>";
const ROW_OPEN: &str = "<ARow>";
const FALSE_MARKER: &str = "<False/>";

/// The field of a binary tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleField {
    /// The first field of the tuple
    First,
    /// The second field of the tuple
    Second,
}

/// The way a binary relation is read from the output of the solver.
///
/// The relation is mapped from its key field to the list of values taken by the other field, in the order of the rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
    name: String,
    key: TupleField,
}

impl RelationSpec {
    /// Builds a new relation specification.
    pub fn new(name: &str, key: TupleField) -> Self {
        Self {
            name: name.to_string(),
            key,
        }
    }

    /// An accessibility relation: tuples are `(source world, target world)` and are keyed by the source world.
    pub fn accessibility(name: &str) -> Self {
        Self::new(name, TupleField::First)
    }

    /// A valuation relation: tuples are `(subformula, world)` and are keyed by the world.
    pub fn valuation(name: &str) -> Self {
        Self::new(name, TupleField::Second)
    }

    /// Returns the name of the relation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field used as key.
    pub fn key(&self) -> TupleField {
        self.key
    }
}

impl Default for RelationSpec {
    fn default() -> Self {
        Self::accessibility("Accessible")
    }
}

/// A binary relation decoded from the output of the solver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relation {
    name: String,
    map: BTreeMap<usize, Vec<usize>>,
}

impl Relation {
    /// Builds a relation from a name and a mapping.
    pub fn new(name: &str, map: BTreeMap<usize, Vec<usize>>) -> Self {
        Self {
            name: name.to_string(),
            map,
        }
    }

    /// Returns the name of the relation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the values associated with a key, in the order they were read.
    pub fn get(&self, key: usize) -> &[usize] {
        self.map.get(&key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Iterates over the keys and their values, in increasing key order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.map.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Returns the underlying mapping.
    pub fn as_map(&self) -> &BTreeMap<usize, Vec<usize>> {
        &self.map
    }

    /// Returns `true` iff the relation has no tuple.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Extracts binary relations from the output of the solver.
///
/// A relation is given by a block opened by a `<DataSet Name= '<name>' ...>` line and closed by the first subsequent `</DataSet>` line.
/// Each line in between is a row made of exactly two `<IntValue Name= '<n>'/>` fields.
/// Rows flagged by `<False/>` do not belong to the relation.
///
/// Error messages locate lines by their 1-based index in `lines`.
/// When decoding an [`OracleAnswer`](crate::oracle::OracleAnswer) witness, this index counts the non-blank lines of the solver output only.
///
/// ```
/// # use kripkemin::io::{RelationDecoder, RelationSpec};
/// let output = vec![
///     "<DataSet Name='Accessible' TypeSize= '2' >",
///     "<ARow><IntValue Name= '1'/><IntValue Name= '2'/><True/></ARow>",
///     "</DataSet>",
/// ];
/// let relation = RelationDecoder::extract(&output, &RelationSpec::accessibility("Accessible")).unwrap();
/// assert_eq!(&[2], relation.get(1));
/// ```
pub struct RelationDecoder;

impl RelationDecoder {
    /// Extracts the relation described by `spec` from the lines of the solver output.
    ///
    /// Fails with [`ModelFinderError::MalformedWitness`] if a marker is missing or if a row cannot be read.
    pub fn extract<S: AsRef<str>>(lines: &[S], spec: &RelationSpec) -> Result<Relation> {
        let open_index = lines
            .iter()
            .position(|l| is_block_opening(l.as_ref(), spec.name()))
            .ok_or_else(|| {
                ModelFinderError::MalformedWitness(format!(
                    "no data set for relation {}",
                    spec.name()
                ))
            })?;
        let close_offset = lines[open_index + 1..]
            .iter()
            .position(|l| l.as_ref().trim() == DATASET_CLOSE)
            .ok_or_else(|| {
                ModelFinderError::MalformedWitness(format!(
                    "data set for relation {} opened at witness line {} is never closed",
                    spec.name(),
                    open_index + 1
                ))
            })?;
        let mut map: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, line) in lines[open_index + 1..open_index + 1 + close_offset]
            .iter()
            .enumerate()
        {
            let line_index = open_index + i + 2;
            if let Some((first, second)) = read_row(line.as_ref(), line_index)? {
                let (key, value) = match spec.key() {
                    TupleField::First => (first, second),
                    TupleField::Second => (second, first),
                };
                map.entry(key).or_default().push(value);
            }
        }
        Ok(Relation::new(spec.name(), map))
    }
}

fn is_block_opening(line: &str, name: &str) -> bool {
    DATASET_OPEN_PATTERN
        .captures(line.trim())
        .map(|c| &c[1] == name)
        .unwrap_or(false)
}

fn read_row(line: &str, line_index: usize) -> Result<Option<(usize, usize)>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let malformed = |reason: &str| {
        ModelFinderError::MalformedWitness(format!(
            r#"at witness line {}: {} in row "{}""#,
            line_index, reason, trimmed
        ))
    };
    if !trimmed.starts_with(ROW_OPEN) {
        return Err(malformed("expected a row"));
    }
    let values = INT_VALUE_PATTERN
        .captures_iter(trimmed)
        .map(|c| c[1].parse::<usize>().map_err(|_| malformed("integer overflow")))
        .collect::<Result<Vec<usize>>>()?;
    if values.len() != 2 {
        return Err(malformed(&format!("expected 2 fields, got {}", values.len())));
    }
    if trimmed.contains(FALSE_MARKER) {
        return Ok(None);
    }
    Ok(Some((values[0], values[1])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::decode_answer;

    fn output_with(name: &str, rows: &[(usize, usize)]) -> Vec<String> {
        let mut lines = vec![
            "<PredicateInfo>".to_string(),
            format!("<DataSet Name='{}' TypeSize= '2' >", name),
        ];
        rows.iter().for_each(|(a, b)| {
            lines.push(format!(
                "<ARow><IntValue Name= '{}'/><IntValue Name= '{}'/><True/></ARow>",
                a, b
            ))
        });
        lines.push("</DataSet>".to_string());
        lines.push("</PredicateInfo>".to_string());
        lines
    }

    #[test]
    fn test_key_field_depends_on_relation() {
        let output = output_with("Accessibility", &[(1, 2), (2, 1)]);
        let accessibility =
            RelationDecoder::extract(&output, &RelationSpec::accessibility("Accessibility"))
                .unwrap();
        assert_eq!(
            &BTreeMap::from([(1, vec![2]), (2, vec![1])]),
            accessibility.as_map()
        );
        let valuation =
            RelationDecoder::extract(&output, &RelationSpec::valuation("Accessibility")).unwrap();
        assert_eq!(
            &BTreeMap::from([(2, vec![1]), (1, vec![2])]),
            valuation.as_map()
        );
    }

    #[test]
    fn test_values_keep_row_order() {
        let output = output_with("Valuation", &[(7, 1), (3, 1), (5, 2)]);
        let relation =
            RelationDecoder::extract(&output, &RelationSpec::valuation("Valuation")).unwrap();
        assert_eq!("Valuation", relation.name());
        assert_eq!(&[7, 3], relation.get(1));
        assert_eq!(&[5], relation.get(2));
        assert!(relation.get(3).is_empty());
        assert_eq!(
            vec![1, 2],
            relation.iter().map(|(k, _)| k).collect::<Vec<usize>>()
        );
    }

    #[test]
    fn test_selects_block_by_name() {
        let mut output = output_with("Valuation", &[(4, 1)]);
        output.append(&mut output_with("Accessible", &[(1, 1)]));
        let relation = RelationDecoder::extract(&output, &RelationSpec::default()).unwrap();
        assert_eq!(&BTreeMap::from([(1, vec![1])]), relation.as_map());
    }

    #[test]
    fn test_name_is_not_a_prefix_match() {
        let output = output_with("AccessibleTo", &[(1, 2)]);
        assert!(matches!(
            RelationDecoder::extract(&output, &RelationSpec::accessibility("Accessible")),
            Err(ModelFinderError::MalformedWitness(_))
        ));
    }

    #[test]
    fn test_empty_block() {
        let output = output_with("Accessible", &[]);
        let relation = RelationDecoder::extract(&output, &RelationSpec::default()).unwrap();
        assert!(relation.is_empty());
    }

    #[test]
    fn test_false_rows_are_skipped() {
        let output = vec![
            "<DataSet Name= 'Accessible' TypeSize= '2' >",
            "<ARow><IntValue Name= '1'/><IntValue Name= '2'/><False/></ARow>",
            "<ARow><IntValue Name= '2'/><IntValue Name= '2'/><True/></ARow>",
            "</DataSet>",
        ];
        let relation = RelationDecoder::extract(&output, &RelationSpec::default()).unwrap();
        assert_eq!(&BTreeMap::from([(2, vec![2])]), relation.as_map());
    }

    #[test]
    fn test_missing_open_marker() {
        let output = vec!["<ARow><IntValue Name= '1'/><IntValue Name= '2'/></ARow>", "</DataSet>"];
        match RelationDecoder::extract(&output, &RelationSpec::default()) {
            Err(ModelFinderError::MalformedWitness(m)) => assert!(m.contains("Accessible")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_missing_close_marker() {
        let mut output = output_with("Accessible", &[(1, 2)]);
        output.retain(|l| l != "</DataSet>");
        match RelationDecoder::extract(&output, &RelationSpec::default()) {
            Err(ModelFinderError::MalformedWitness(m)) => {
                assert!(m.contains("opened at witness line 2 is never closed"))
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_row_with_three_fields() {
        let output = vec![
            "<DataSet Name='Accessible'>",
            "<ARow><IntValue Name= '1'/><IntValue Name= '2'/><IntValue Name= '3'/></ARow>",
            "</DataSet>",
        ];
        match RelationDecoder::extract(&output, &RelationSpec::default()) {
            Err(ModelFinderError::MalformedWitness(m)) => {
                assert!(m.starts_with("at witness line 2: expected 2 fields, got 3"))
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_not_a_row() {
        let output = vec!["<DataSet Name='Accessible'>", "garbage", "</DataSet>"];
        assert!(matches!(
            RelationDecoder::extract(&output, &RelationSpec::default()),
            Err(ModelFinderError::MalformedWitness(_))
        ));
    }

    #[test]
    fn test_error_line_counts_witness_lines() {
        let answer = decode_answer(
            "<Satisfiable/>\n\n<DataSet Name='Accessible'>\n\n<ARow><IntValue Name= '1'/></ARow>\n</DataSet>\n",
            0,
        )
        .unwrap();
        match RelationDecoder::extract(answer.witness(), &RelationSpec::default()) {
            Err(ModelFinderError::MalformedWitness(m)) => {
                assert!(m.starts_with("at witness line 3: expected 2 fields, got 1"))
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
