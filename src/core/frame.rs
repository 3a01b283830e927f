//! Purpose: In-memory labeled tables and series.
//! Exports: `LabeledTable`, `LabeledSeries`.
//! Role: Value types consumed and produced by the codec, flattener, and tester export.
//! Invariants: Row count equals index length; every row is as wide as the column index.
//! Invariants: Stored values already conform to their column/series dtype.
use crate::core::dtype::DType;
use crate::core::error::{Error, ErrorKind};
use crate::core::index::Index;
use crate::core::scalar::Scalar;

#[derive(Clone, Debug, PartialEq)]
pub struct LabeledTable {
    values: Vec<Vec<Scalar>>,
    index: Index,
    columns: Index,
    dtypes: Vec<DType>,
}

impl LabeledTable {
    /// Builds a table from row-major values, inferring one dtype per column.
    pub fn new(values: Vec<Vec<Scalar>>, index: Index, columns: Index) -> Result<Self, Error> {
        check_table_shape(&values, &index, &columns)?;
        let dtypes = (0..columns.len())
            .map(|col| DType::infer(&column_of(&values, col)))
            .collect();
        Self::from_parts(values, index, columns, dtypes)
    }

    /// Builds a table from named columns of equal length, with a range row index.
    pub fn from_columns<I, L>(columns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (L, Vec<Scalar>)>,
        L: Into<Scalar>,
    {
        let (labels, data): (Vec<Scalar>, Vec<Vec<Scalar>>) = columns
            .into_iter()
            .map(|(label, values)| (label.into(), values))
            .unzip();
        let nrows = data.first().map(Vec::len).unwrap_or(0);
        if let Some((col, column)) = data.iter().enumerate().find(|(_, c)| c.len() != nrows) {
            return Err(Error::new(ErrorKind::Shape).with_message(format!(
                "column {} has {} values, expected {nrows}",
                labels[col],
                column.len()
            )));
        }
        let values = (0..nrows)
            .map(|row| data.iter().map(|column| column[row].clone()).collect())
            .collect();
        Self::new(values, Index::range(nrows), Index::flat(labels))
    }

    /// An empty table with the given column labels and a 0-row range index.
    pub fn empty(columns: Index) -> Self {
        let dtypes = vec![DType::Object; columns.len()];
        Self {
            values: Vec::new(),
            index: Index::range(0),
            columns,
            dtypes,
        }
    }

    pub(crate) fn from_parts(
        values: Vec<Vec<Scalar>>,
        index: Index,
        columns: Index,
        dtypes: Vec<DType>,
    ) -> Result<Self, Error> {
        check_table_shape(&values, &index, &columns)?;
        if dtypes.len() != columns.len() {
            return Err(Error::new(ErrorKind::Shape).with_message(format!(
                "got {} dtypes for {} columns",
                dtypes.len(),
                columns.len()
            )));
        }
        let values = values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&dtypes)
                    .map(|(value, dtype)| dtype.coerce(value))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            values,
            index,
            columns,
            dtypes,
        })
    }

    /// Coerces every column to its dtype.
    pub fn with_dtypes(self, dtypes: Vec<DType>) -> Result<Self, Error> {
        Self::from_parts(self.values, self.index, self.columns, dtypes)
    }

    pub fn with_index(self, index: Index) -> Result<Self, Error> {
        Self::from_parts(self.values, index, self.columns, self.dtypes)
    }

    pub fn values(&self) -> &[Vec<Scalar>] {
        &self.values
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn columns(&self) -> &Index {
        &self.columns
    }

    pub fn dtypes(&self) -> &[DType] {
        &self.dtypes
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }

    pub fn column_values(&self, position: usize) -> Option<Vec<Scalar>> {
        (position < self.columns.len()).then(|| column_of(&self.values, position))
    }

    pub fn column(&self, label: &Scalar) -> Option<Vec<Scalar>> {
        self.columns
            .position(label)
            .and_then(|pos| self.column_values(pos))
    }
}

fn column_of(values: &[Vec<Scalar>], col: usize) -> Vec<Scalar> {
    values.iter().map(|row| row[col].clone()).collect()
}

fn check_table_shape(values: &[Vec<Scalar>], index: &Index, columns: &Index) -> Result<(), Error> {
    if values.len() != index.len() {
        return Err(Error::new(ErrorKind::Shape).with_message(format!(
            "{} rows of values but index has {} labels",
            values.len(),
            index.len()
        )));
    }
    if let Some((row, values)) = values
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != columns.len())
    {
        return Err(Error::new(ErrorKind::Shape).with_message(format!(
            "row {row} has {} values but there are {} columns",
            values.len(),
            columns.len()
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabeledSeries {
    values: Vec<Scalar>,
    index: Index,
    dtype: DType,
    name: Option<String>,
}

impl LabeledSeries {
    pub fn new(values: Vec<Scalar>, index: Index) -> Result<Self, Error> {
        let dtype = DType::infer(&values);
        Self::from_parts(values, index, dtype, None)
    }

    /// A series over a 0-based range index.
    pub fn from_values(values: Vec<Scalar>) -> Self {
        let index = Index::range(values.len());
        let dtype = DType::infer(&values);
        let values = dtype.coerce_all(values.clone()).unwrap_or(values);
        Self {
            values,
            index,
            dtype,
            name: None,
        }
    }

    pub(crate) fn from_parts(
        values: Vec<Scalar>,
        index: Index,
        dtype: DType,
        name: Option<String>,
    ) -> Result<Self, Error> {
        if values.len() != index.len() {
            return Err(Error::new(ErrorKind::Shape).with_message(format!(
                "{} values but index has {} labels",
                values.len(),
                index.len()
            )));
        }
        let values = dtype.coerce_all(values)?;
        Ok(Self {
            values,
            index,
            dtype,
            name,
        })
    }

    pub fn with_dtype(self, dtype: DType) -> Result<Self, Error> {
        Self::from_parts(self.values, self.index, dtype, self.name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn dtype(&self) -> &DType {
        &self.dtype
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{LabeledSeries, LabeledTable};
    use crate::core::dtype::DType;
    use crate::core::error::ErrorKind;
    use crate::core::index::Index;
    use crate::core::scalar::Scalar;

    #[test]
    fn from_columns_builds_row_major_values() {
        let table = LabeledTable::from_columns([
            ("a", vec![1.into(), 2.into()]),
            ("b", vec![0.5.into(), 1.5.into()]),
        ])
        .unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.values()[1], vec![Scalar::Int(2), Scalar::Float(1.5)]);
        assert_eq!(table.dtypes(), &[DType::Int64, DType::Float64]);
        assert_eq!(
            table.column(&"b".into()),
            Some(vec![Scalar::Float(0.5), Scalar::Float(1.5)])
        );
    }

    #[test]
    fn mismatched_rows_are_shape_errors() {
        let err = LabeledTable::new(
            vec![vec![1.into()], vec![2.into(), 3.into()]],
            Index::range(2),
            Index::flat(vec!["a".into()]),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);

        let err = LabeledTable::new(
            vec![vec![1.into()]],
            Index::range(2),
            Index::flat(vec!["a".into()]),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn with_dtypes_coerces_columns() {
        let table = LabeledTable::from_columns([("x", vec![1.into(), 2.into()])])
            .unwrap()
            .with_dtypes(vec![DType::Float64])
            .unwrap();
        assert_eq!(table.values()[0][0], Scalar::Float(1.0));
    }

    #[test]
    fn series_length_must_match_index() {
        let err = LabeledSeries::new(vec![1.into()], Index::range(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
        let series = LabeledSeries::from_values(vec![1.into(), Scalar::Null]).with_name("s");
        assert_eq!(series.dtype(), &DType::Float64);
        assert_eq!(series.name(), Some("s"));
        assert_eq!(series.values()[1], Scalar::Float(f64::NAN));
    }
}
