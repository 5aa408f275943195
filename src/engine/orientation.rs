use crate::models::{CurveTick, Orientation};

/// Choose the price shown as "chance". Prefers a coordinate at or below 1 so Yes/No markets
/// read as probabilities without needing market-type metadata. Evaluated once per pass on
/// the reference tick.
pub fn resolve_orientation(reference: &CurveTick) -> Orientation {
    let bounded = reference.price1 <= 1.0;
    let smaller = reference.price0 > 1.0 && reference.price1 < reference.price0;
    if bounded || smaller {
        Orientation::Price1
    } else {
        Orientation::Price0
    }
}
