use hdbstar_core::{VectorSource, VectorSourceError};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Row-major point set used by the integration suites.
#[derive(Clone, Debug)]
pub struct Points {
    name: &'static str,
    dimension: usize,
    values: Vec<f64>,
}

impl Points {
    #[must_use]
    pub fn new(name: &'static str, rows: &[&[f64]]) -> Self {
        let dimension = rows.first().map_or(0, |row| row.len());
        Self {
            name,
            dimension,
            values: rows.iter().flat_map(|row| row.iter().copied()).collect(),
        }
    }

    #[must_use]
    pub fn empty(name: &'static str, dimension: usize) -> Self {
        Self {
            name,
            dimension,
            values: Vec::new(),
        }
    }

    /// Well-separated isotropic blobs, `per_blob` points each, emitted blob
    /// by blob.
    #[must_use]
    pub fn blobs(seed: u64, centres: &[[f64; 2]], per_blob: usize, spread: f64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut values = Vec::with_capacity(centres.len() * per_blob * 2);
        for centre in centres {
            for _ in 0..per_blob {
                for axis in centre {
                    values.push(axis + rng.gen_range(-spread..=spread));
                }
            }
        }
        Self {
            name: "blobs",
            dimension: 2,
            values,
        }
    }

    /// Appends `rows` to the point set.
    #[must_use]
    pub fn with_rows(mut self, rows: &[[f64; 2]]) -> Self {
        self.values.extend(rows.iter().flatten());
        self
    }
}

impl VectorSource for Points {
    type Coordinate = f64;

    fn len(&self) -> usize {
        self.values.len().checked_div(self.dimension).unwrap_or(0)
    }

    fn name(&self) -> &str {
        self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, index: usize) -> Result<&[f64], VectorSourceError> {
        let start = index * self.dimension;
        self.values
            .get(start..start + self.dimension)
            .ok_or(VectorSourceError::OutOfBounds { index })
    }
}
