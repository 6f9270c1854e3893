use crate::label::{Label, Verdict};

/// Reduces a sequence of per-frame labels to one verdict by plurality
/// vote. Counting is done in first-occurrence order, never through a
/// hash map, so ties break deterministically: among labels with equal
/// maximum count, the one whose first occurrence comes earliest wins.
/// An empty sequence yields `NoVerdict`.
pub fn majority_vote(predictions: &[Label]) -> Verdict {
    let mut counts: Vec<(&Label, usize)> = Vec::new();
    for label in predictions {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut winner: Option<(&Label, usize)> = None;
    for (label, count) in counts {
        // Strictly-greater keeps the earliest first occurrence on ties.
        match winner {
            Some((_, best)) if count <= best => {}
            _ => winner = Some((label, count)),
        }
    }

    match winner {
        Some((label, _)) => Verdict::Label(label.clone()),
        None => Verdict::NoVerdict,
    }
}
