use crate::models::CurveTick;

/// Position of the reference tick within an ascending curve.
///
/// Exact match on `live_current_tick` first; otherwise the tick nearest by index distance,
/// with the lower tick winning an exact tie. `None` only for an empty curve.
pub fn locate_reference_tick(curve: &[CurveTick], live_current_tick: i32) -> Option<usize> {
    if let Ok(idx) = curve.binary_search_by_key(&live_current_tick, |t| t.tick_index) {
        return Some(idx);
    }

    let target = live_current_tick as i64;
    let mut best: Option<(usize, i64)> = None;
    for (i, t) in curve.iter().enumerate() {
        let d = (t.tick_index as i64 - target).abs();
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}
