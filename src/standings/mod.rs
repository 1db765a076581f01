pub mod enrichment;
pub mod individual;
pub mod swiss_stats;
pub mod team;

/// Positions for a list already in ranking order. Champions all share
/// position 1. Everyone else takes their 1-based place, unless tied with a
/// non-champion predecessor, in which case they share the predecessor's
/// position and the skipped places stay skipped.
pub(crate) fn assign_positions<T>(
    sorted: &[T],
    is_champion: impl Fn(&T) -> bool,
    tied: impl Fn(&T, &T) -> bool
) -> Vec<u32> {
    let mut positions: Vec<u32> = Vec::with_capacity(sorted.len());

    for (i, item) in sorted.iter().enumerate() {
        let position = if is_champion(item) {
            1
        } else {
            match (i.checked_sub(1), positions.last()) {
                (Some(prev), Some(prev_position)) if !is_champion(&sorted[prev]) && tied(&sorted[prev], item) => {
                    *prev_position
                }
                _ => i as u32 + 1
            }
        };
        positions.push(position);
    }

    positions
}

/// The position a standing is published with. A saved position wins unless
/// the caller asked for it to be replaced by the fresh one.
pub(crate) fn published_position(saved: Option<u32>, computed: Option<u32>, overwrite_saved: bool) -> Option<u32> {
    if overwrite_saved {
        computed
    } else {
        saved
    }
}

/// Sort key of the display order: saved, else computed, else last.
pub(crate) fn display_key(saved: Option<u32>, computed: Option<u32>) -> u32 {
    saved.or(computed).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{assign_positions, display_key, published_position};

    #[test]
    fn test_positions_with_ties_keep_gaps() {
        // (champion, score)
        let sorted = vec![(true, 5), (false, 3), (false, 3), (false, 3), (false, 1)];
        let positions = assign_positions(&sorted, |s| s.0, |a, b| a.1 == b.1);

        assert_eq!(positions, vec![1, 2, 2, 2, 5]);
    }

    #[test]
    fn test_champions_share_first() {
        let sorted = vec![(true, 2), (true, 2), (false, 2)];
        let positions = assign_positions(&sorted, |s| s.0, |a, b| a.1 == b.1);

        // The first non-champion never ties with a champion
        assert_eq!(positions, vec![1, 1, 3]);
    }

    #[test]
    fn test_saved_position_fallbacks() {
        assert_eq!(display_key(Some(4), Some(1)), 4);
        assert_eq!(display_key(None, Some(1)), 1);
        assert_eq!(display_key(None, None), u32::MAX);

        assert_eq!(published_position(Some(4), Some(1), false), Some(4));
        assert_eq!(published_position(Some(4), Some(1), true), Some(1));
        assert_eq!(published_position(None, Some(1), false), None);
    }
}
