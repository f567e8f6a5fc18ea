use crate::decimal::{Money, Rate};

/// convert a declared collateral value into its weighted usable value
///
/// The weighted value is the only figure that counts as loan cover; it is
/// frozen on the collateral record at write time and must be recomputed
/// whenever the declared value or the collateral type changes. A stale real
/// value is a correctness bug, not a cache miss.
pub fn compute_real_value(declared: Money, weighting: Rate) -> Money {
    declared.percentage(weighting.as_percentage())
}
