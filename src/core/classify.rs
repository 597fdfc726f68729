//! Threshold classification of a scalar into ordered category labels.
//!
//! A table is an ascending list of `(upper_limit, category)` pairs and a
//! category for everything above the last limit. Boundary values belong to
//! the lower bucket (`value <= limit`). NaN compares false against every
//! limit and lands in `above`.

#[derive(Debug, Clone, Copy)]
pub struct Breakpoints<'a, C> {
    steps: &'a [(f64, C)],
    above: C,
}

impl<'a, C: Copy> Breakpoints<'a, C> {
    pub const fn new(steps: &'a [(f64, C)], above: C) -> Self {
        Self { steps, above }
    }

    pub fn classify(&self, value: f64) -> C {
        self.steps
            .iter()
            .find(|(limit, _)| value <= *limit)
            .map(|(_, category)| *category)
            .unwrap_or(self.above)
    }

    pub fn steps(&self) -> &'a [(f64, C)] {
        self.steps
    }

    pub fn above(&self) -> C {
        self.above
    }
}

impl<C: Copy + Ord> Breakpoints<'_, C> {
    /// Limits ascend and categories never get less severe going up.
    pub fn is_monotonic(&self) -> bool {
        let limits_ascend = self.steps.windows(2).all(|w| w[0].0 < w[1].0);
        let categories: Vec<C> = self
            .steps
            .iter()
            .map(|(_, c)| *c)
            .chain(std::iter::once(self.above))
            .collect();
        limits_ascend && categories.windows(2).all(|w| w[0] <= w[1])
    }
}
