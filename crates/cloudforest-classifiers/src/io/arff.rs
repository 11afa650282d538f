//! Writer for the ARFF relation files handed to CloudForest.
//!
//! Layout of a written file:
//!
//! ```text
//! @RELATION name
//!
//! @ATTRIBUTE 0 NUMERIC
//! @ATTRIBUTE flag {True,False}
//! @ATTRIBUTE name.target {0,1}
//!
//! @DATA
//! 0.5,True,1
//! NA,False,0
//! ```
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ClassifierError, Result};
use crate::math::Array2;

/// Token written for missing values.
pub const MISSING_VALUE: &str = "NA";

/// Values of one relation column. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Nominal(Vec<Option<i64>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Nominal(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn render(&self, row: usize) -> String {
        let rendered = match self {
            ColumnValues::Numeric(v) => v[row].filter(|x| x.is_finite()).map(|x| x.to_string()),
            ColumnValues::Boolean(v) => v[row].map(|b| if b { "True" } else { "False" }.to_string()),
            ColumnValues::Nominal(v) => v[row].map(|x| x.to_string()),
        };
        rendered.unwrap_or_else(|| MISSING_VALUE.to_string())
    }

    /// Attribute type inferred from the value type.
    fn declared_type(&self) -> &'static str {
        match self {
            ColumnValues::Boolean(_) => "{True,False}",
            _ => "NUMERIC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

/// A named table of typed, equally long columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub name: String,
    columns: Vec<Column>,
}

/// Designates a column as the target and lists the classes it is declared over.
#[derive(Debug, Clone)]
pub struct TargetColumn<'a> {
    pub name: &'a str,
    pub classes: &'a [i64],
}

impl Relation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// One numeric column per matrix column, named by position (`0`, `1`, ...).
    pub fn from_matrix(name: impl Into<String>, x: &Array2<f64>) -> Self {
        let mut relation = Self::new(name);
        for col in 0..x.ncols() {
            let values = x
                .column(col)
                .iter()
                .map(|v| if v.is_finite() { Some(*v) } else { None })
                .collect();
            relation.columns.push(Column {
                name: col.to_string(),
                values: ColumnValues::Numeric(values),
            });
        }
        relation
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: ColumnValues) -> Result<()> {
        let name = name.into();
        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return Err(ClassifierError::Shape(format!(
                    "column '{}' has {} values, relation has {} rows",
                    name,
                    values.len(),
                    first.values.len()
                )));
            }
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }
}

/// Write `relation` in ARFF form. When `target` names one of the columns, that
/// column is declared as an enumeration over `target.classes`.
pub fn write_relation<W: Write>(
    mut writer: W,
    relation: &Relation,
    target: Option<&TargetColumn<'_>>,
) -> Result<()> {
    write!(writer, "@RELATION {}\n\n", relation.name)?;

    for column in relation.columns() {
        let declared = match target {
            Some(t) if t.name == column.name => format!(
                "{{{}}}",
                t.classes
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            _ => column.values.declared_type().to_string(),
        };
        writeln!(writer, "@ATTRIBUTE {} {}", column.name, declared)?;
    }

    write!(writer, "\n@DATA\n")?;

    let mut rows = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(&mut writer);
    for row in 0..relation.n_rows() {
        let record: Vec<String> = relation
            .columns()
            .iter()
            .map(|c| c.values.render(row))
            .collect();
        rows.write_record(&record)?;
    }
    rows.flush()?;
    drop(rows);
    writer.flush()?;
    Ok(())
}

/// Buffered file variant of [`write_relation`].
pub fn write_relation_file<P: AsRef<Path>>(
    path: P,
    relation: &Relation,
    target: Option<&TargetColumn<'_>>,
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    log::debug!(
        "Writing relation '{}' ({} rows, {} columns) to {}",
        relation.name,
        relation.n_rows(),
        relation.columns().len(),
        path.as_ref().display()
    );
    write_relation(BufWriter::new(file), relation, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(relation: &Relation, target: Option<&TargetColumn<'_>>) -> String {
        let mut buf = Vec::new();
        write_relation(&mut buf, relation, target).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn boolean_columns_are_enumerated() {
        let mut relation = Relation::new("flags");
        relation
            .push_column("a", ColumnValues::Boolean(vec![Some(true), None]))
            .unwrap();
        relation
            .push_column("b", ColumnValues::Numeric(vec![Some(1.5), Some(2.0)]))
            .unwrap();

        let text = render(&relation, None);
        assert!(text.starts_with("@RELATION flags\n\n"));
        assert!(text.contains("@ATTRIBUTE a {True,False}\n"));
        assert!(text.contains("@ATTRIBUTE b NUMERIC\n"));
        assert!(text.ends_with("@DATA\nTrue,1.5\nNA,2\n"));
    }

    #[test]
    fn target_declaration_overrides_inferred_type() {
        let mut relation = Relation::new("t");
        relation
            .push_column("label", ColumnValues::Boolean(vec![Some(false), Some(true)]))
            .unwrap();
        let classes = [0, 1];
        let target = TargetColumn {
            name: "label",
            classes: &classes,
        };
        let text = render(&relation, Some(&target));
        assert!(text.contains("@ATTRIBUTE label {0,1}\n"));
    }

    #[test]
    fn nan_becomes_missing_token() {
        let x = Array2::from_shape_vec((2, 1), vec![f64::NAN, 3.0]).unwrap();
        let text = render(&Relation::from_matrix("m", &x), None);
        assert!(text.ends_with("@DATA\nNA\n3\n"));
    }

    #[test]
    fn non_finite_values_become_missing_token() {
        let x = Array2::from_shape_vec((3, 1), vec![f64::INFINITY, f64::NEG_INFINITY, 1.5]).unwrap();
        let text = render(&Relation::from_matrix("m", &x), None);
        assert!(text.ends_with("@DATA\nNA\nNA\n1.5\n"));

        let mut relation = Relation::new("pushed");
        relation
            .push_column("a", ColumnValues::Numeric(vec![Some(f64::INFINITY), Some(2.0)]))
            .unwrap();
        let text = render(&relation, None);
        assert!(!text.contains("inf"));
        assert!(text.ends_with("@DATA\nNA\n2\n"));
    }

    #[test]
    fn push_column_rejects_length_mismatch() {
        let mut relation = Relation::new("r");
        relation
            .push_column("a", ColumnValues::Nominal(vec![Some(1), Some(2)]))
            .unwrap();
        let err = relation
            .push_column("b", ColumnValues::Nominal(vec![Some(1)]))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Shape(_)));
    }
}
