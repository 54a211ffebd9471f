//! Layered bonus arithmetic: Flat → Increased → More → Less → Clamp.

/// A single adjustment to a stat value.
///
/// Percentages are integers: `Increased(20)` is +20% (summed with other
/// increases), `More(50)` is ×1.5 and `Less(10)` is ×0.9 (each applied on its
/// own, in insertion order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    Flat(i32),
    Increased(i32),
    More(i32),
    Less(i32),
}

/// Bonuses collected for one stat, applied in layer order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BonusStack {
    bonuses: Vec<Bonus>,
}

impl BonusStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    /// Applies every bonus to `base` and clamps the result to `[min, max]`.
    ///
    /// ```text
    /// result = clamp((base + Σflat) × (100 + Σinc)/100 × Π more × Π less, min, max)
    /// ```
    pub fn apply(&self, base: i32, min: i32, max: i32) -> i32 {
        let mut flat = 0i64;
        let mut increased = 0i64;
        for bonus in &self.bonuses {
            match *bonus {
                Bonus::Flat(v) => flat += v as i64,
                Bonus::Increased(p) => increased += p as i64,
                _ => {}
            }
        }

        let mut value = (base as i64 + flat) * (100 + increased) / 100;
        for bonus in &self.bonuses {
            if let Bonus::More(p) = *bonus {
                value = value * (100 + p as i64) / 100;
            }
        }
        for bonus in &self.bonuses {
            if let Bonus::Less(p) = *bonus {
                value = value * (100 - p as i64) / 100;
            }
        }

        value.clamp(min as i64, max as i64) as i32
    }
}

impl FromIterator<Bonus> for BonusStack {
    fn from_iter<I: IntoIterator<Item = Bonus>>(iter: I) -> Self {
        Self {
            bonuses: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stack_only_clamps() {
        let stack = BonusStack::new();
        assert_eq!(stack.apply(7, 0, 100), 7);
        assert_eq!(stack.apply(170, 0, 100), 100);
    }

    #[test]
    fn layers_apply_in_order() {
        let stack: BonusStack = [
            Bonus::Less(10),
            Bonus::Flat(5),
            Bonus::More(50),
            Bonus::Increased(20),
            Bonus::Increased(15),
        ]
        .into_iter()
        .collect();

        // (10 + 5) × 1.35 = 20, × 1.5 = 30, × 0.9 = 27
        assert_eq!(stack.apply(10, 0, 100), 27);
        assert_eq!(stack.len(), 5);
    }

    #[test]
    fn negative_values_clamp_to_floor() {
        let stack: BonusStack = [Bonus::Flat(-50)].into_iter().collect();
        assert_eq!(stack.apply(20, 0, 100), 0);
    }
}
