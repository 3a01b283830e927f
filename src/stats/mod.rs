//! Purpose: Pairwise significance comparison across named numeric samples.
//! Exports: `significance_comparison`, `PairComparison`, `Truncation`, `asterisks`, `comparisons_to_table`.
//! Role: Run a paired Wilcoxon signed-rank test on every unordered pair of samples.
//! Invariants: Pairs follow combination order over mapping insertion order; each pair appears once.
//! Invariants: Unequal lengths are truncated (diagnostic), never padded; short samples are errors.
//! Invariants: `significant` is `p_value < 0.05`; asterisk tiers use `<=` with the tightest tier first.

pub mod wilcoxon;

use indexmap::IndexMap;

use crate::core::error::{Error, ErrorKind};
use crate::core::frame::LabeledTable;
use crate::core::scalar::Scalar;

pub const DEFAULT_MIN_ELEMENTS: usize = 5;
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// The longer sample of a pair was cut to the shorter one's length.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Truncation {
    pub key: String,
    pub other: String,
    pub original_len: usize,
    pub used_len: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PairComparison {
    pub a: String,
    pub b: String,
    pub p_value: f64,
    pub significant: bool,
    pub asterisks: &'static str,
    pub truncation: Option<Truncation>,
}

pub fn significance_comparison(
    samples: &IndexMap<String, Vec<f64>>,
    min_elements: usize,
) -> Result<Vec<PairComparison>, Error> {
    let entries: Vec<(&String, &Vec<f64>)> = samples.iter().collect();
    let mut results = Vec::new();
    for (i, &(k1, v1)) in entries.iter().enumerate() {
        for &(k2, v2) in &entries[i + 1..] {
            results.push(compare_pair(k1, v1, k2, v2, min_elements)?);
        }
    }
    Ok(results)
}

fn compare_pair(
    k1: &str,
    v1: &[f64],
    k2: &str,
    v2: &[f64],
    min_elements: usize,
) -> Result<PairComparison, Error> {
    let used = v1.len().min(v2.len());
    if used < min_elements {
        return Err(Error::new(ErrorKind::Validation)
            .with_message(format!(
                "at least {min_elements} elements are required in each sample \
                 ({k1} has {}, {k2} has {})",
                v1.len(),
                v2.len()
            ))
            .with_hint("Collect more observations or lower the minimum sample size."));
    }

    let truncation = if v1.len() > used {
        Some(truncate(k1, k2, v1.len(), used))
    } else if v2.len() > used {
        Some(truncate(k2, k1, v2.len(), used))
    } else {
        None
    };

    let result = wilcoxon::signed_rank(&v1[..used], &v2[..used])?;
    let p_value = result.p_value;
    Ok(PairComparison {
        a: k1.to_string(),
        b: k2.to_string(),
        p_value,
        significant: p_value < SIGNIFICANCE_LEVEL,
        asterisks: asterisks(p_value),
        truncation,
    })
}

fn truncate(key: &str, other: &str, original_len: usize, used_len: usize) -> Truncation {
    tracing::warn!(
        sample = key,
        other,
        original_len,
        used_len,
        "sample has more elements than its pair; using only the first {used_len}"
    );
    Truncation {
        key: key.to_string(),
        other: other.to_string(),
        original_len,
        used_len,
    }
}

pub fn asterisks(p_value: f64) -> &'static str {
    if p_value <= 0.0001 {
        "****"
    } else if p_value <= 0.001 {
        "***"
    } else if p_value <= 0.01 {
        "**"
    } else if p_value <= 0.05 {
        "*"
    } else {
        "ns"
    }
}

/// Results as a table with columns `A`, `B`, `p-value`, `significant`, `asterisks`.
pub fn comparisons_to_table(comparisons: &[PairComparison]) -> Result<LabeledTable, Error> {
    let column = |f: &dyn Fn(&PairComparison) -> Scalar| -> Vec<Scalar> {
        comparisons.iter().map(f).collect()
    };
    LabeledTable::from_columns([
        ("A", column(&|c| Scalar::from(c.a.as_str()))),
        ("B", column(&|c| Scalar::from(c.b.as_str()))),
        ("p-value", column(&|c| Scalar::Float(c.p_value))),
        ("significant", column(&|c| Scalar::Bool(c.significant))),
        ("asterisks", column(&|c| Scalar::from(c.asterisks))),
    ])
}
