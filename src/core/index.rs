//! Purpose: Row/column axis labels, either flat or hierarchical.
//! Exports: `Index`, `FlatIndex`, `MultiIndex`.
//! Role: Shared axis model for `LabeledTable` rows/columns and `LabeledSeries` rows.
//! Invariants: A flat index whose labels are tuples is distinct from a hierarchical index.
//! Invariants: Every hierarchical tuple has exactly `nlevels` components.
use crate::core::dtype::DType;
use crate::core::error::{Error, ErrorKind};
use crate::core::scalar::Scalar;

#[derive(Clone, Debug, PartialEq)]
pub struct FlatIndex {
    pub labels: Vec<Scalar>,
    pub dtype: DType,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiIndex {
    pub tuples: Vec<Vec<Scalar>>,
    pub dtypes: Vec<DType>,
    pub names: Vec<Option<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Index {
    Flat(FlatIndex),
    Multi(MultiIndex),
}

impl Index {
    /// 0-based contiguous `int64` labels.
    pub fn range(len: usize) -> Self {
        let labels = (0..len as i64).map(Scalar::Int).collect();
        Index::Flat(FlatIndex {
            labels,
            dtype: DType::Int64,
            name: None,
        })
    }

    pub fn flat(labels: Vec<Scalar>) -> Self {
        let dtype = DType::infer(&labels);
        // Inferred dtypes always accept their own values.
        let labels = dtype.coerce_all(labels.clone()).unwrap_or(labels);
        Index::Flat(FlatIndex {
            labels,
            dtype,
            name: None,
        })
    }

    /// Flat index with an explicit dtype; labels are coerced, not inferred.
    pub fn flat_with_dtype(labels: Vec<Scalar>, dtype: DType) -> Result<Self, Error> {
        Ok(Index::Flat(FlatIndex {
            labels: dtype.coerce_all(labels)?,
            dtype,
            name: None,
        }))
    }

    /// Builds a hierarchical index; the level count comes from the first tuple.
    pub fn multi(tuples: Vec<Vec<Scalar>>) -> Result<Self, Error> {
        let nlevels = tuples.first().map(Vec::len).unwrap_or(0);
        Self::multi_with_levels(tuples, nlevels)
    }

    pub(crate) fn multi_with_levels(
        tuples: Vec<Vec<Scalar>>,
        nlevels: usize,
    ) -> Result<Self, Error> {
        if let Some((row, tuple)) = tuples
            .iter()
            .enumerate()
            .find(|(_, tuple)| tuple.len() != nlevels)
        {
            return Err(Error::new(ErrorKind::Shape).with_message(format!(
                "hierarchical label {row} has {} levels, expected {nlevels}",
                tuple.len()
            )));
        }
        let dtypes: Vec<DType> = (0..nlevels)
            .map(|level| {
                let column: Vec<Scalar> = tuples.iter().map(|t| t[level].clone()).collect();
                DType::infer(&column)
            })
            .collect();
        // Same contract as `Index::flat`: labels conform to their level dtype.
        let tuples = coerce_tuples(tuples, &dtypes)?;
        Ok(Index::Multi(MultiIndex {
            tuples,
            dtypes,
            names: vec![None; nlevels],
        }))
    }

    pub fn len(&self) -> usize {
        match self {
            Index::Flat(flat) => flat.labels.len(),
            Index::Multi(multi) => multi.tuples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Index::Multi(_))
    }

    pub fn nlevels(&self) -> usize {
        match self {
            Index::Flat(_) => 1,
            Index::Multi(multi) => multi.dtypes.len(),
        }
    }

    /// Label at `position`; hierarchical labels come back as tuples.
    pub fn label(&self, position: usize) -> Option<Scalar> {
        match self {
            Index::Flat(flat) => flat.labels.get(position).cloned(),
            Index::Multi(multi) => multi.tuples.get(position).cloned().map(Scalar::Tuple),
        }
    }

    pub fn position(&self, label: &Scalar) -> Option<usize> {
        (0..self.len()).find(|&pos| self.label(pos).as_ref() == Some(label))
    }

    /// Sets the flat name, or the name of every level of a hierarchical index.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match &mut self {
            Index::Flat(flat) => flat.name = Some(name),
            Index::Multi(multi) => multi.names.fill(Some(name)),
        }
        self
    }

    pub fn with_names<I, S>(mut self, names: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let names: Vec<Option<String>> = names.into_iter().map(|n| n.map(Into::into)).collect();
        match &mut self {
            Index::Flat(flat) => {
                if names.len() != 1 {
                    return Err(level_count_error("names", names.len(), 1));
                }
                flat.name = names.into_iter().next().flatten();
            }
            Index::Multi(multi) => {
                if names.len() != multi.dtypes.len() {
                    return Err(level_count_error("names", names.len(), multi.dtypes.len()));
                }
                multi.names = names;
            }
        }
        Ok(self)
    }

    /// Coerces flat labels to `dtype`.
    pub fn with_dtype(self, dtype: DType) -> Result<Self, Error> {
        match self {
            Index::Flat(flat) => Ok(Index::Flat(FlatIndex {
                labels: dtype.coerce_all(flat.labels)?,
                dtype,
                name: flat.name,
            })),
            Index::Multi(_) => Err(Error::new(ErrorKind::Usage)
                .with_message("hierarchical indexes take one dtype per level")
                .with_hint("Use `with_dtypes` for hierarchical indexes.")),
        }
    }

    /// Coerces each level of a hierarchical index to its dtype.
    pub fn with_dtypes(self, dtypes: Vec<DType>) -> Result<Self, Error> {
        match self {
            Index::Flat(flat) => {
                if dtypes.len() != 1 {
                    return Err(level_count_error("dtypes", dtypes.len(), 1));
                }
                let dtype = dtypes.into_iter().next().unwrap_or(DType::Object);
                Index::Flat(flat).with_dtype(dtype)
            }
            Index::Multi(multi) => {
                if dtypes.len() != multi.dtypes.len() {
                    return Err(level_count_error("dtypes", dtypes.len(), multi.dtypes.len()));
                }
                let tuples = coerce_tuples(multi.tuples, &dtypes)?;
                Ok(Index::Multi(MultiIndex {
                    tuples,
                    dtypes,
                    names: multi.names,
                }))
            }
        }
    }
}

fn coerce_tuples(tuples: Vec<Vec<Scalar>>, dtypes: &[DType]) -> Result<Vec<Vec<Scalar>>, Error> {
    tuples
        .into_iter()
        .map(|tuple| {
            tuple
                .into_iter()
                .zip(dtypes)
                .map(|(label, dtype)| dtype.coerce(label))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

fn level_count_error(what: &str, got: usize, levels: usize) -> Error {
    Error::new(ErrorKind::Shape).with_message(format!(
        "got {got} {what} for an index with {levels} level(s)"
    ))
}
