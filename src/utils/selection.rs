//! Ascending model-selection searches

use crate::error::Result;

/// Outcome of a model-selection search
#[derive(Debug, Clone, PartialEq)]
pub struct Selected<C, M> {
    pub candidate: C,
    pub model: M,
    pub score: f64,
}

/// Fit every candidate and keep the highest-scoring one.
///
/// A later candidate replaces the incumbent only when its score is strictly
/// greater, so ties go to the earliest candidate. NaN scores never win
/// against an incumbent. Returns `None` when `candidates` is empty.
pub fn best_of<C, M, I, F>(candidates: I, mut fit_and_score: F) -> Result<Option<Selected<C, M>>>
where
    I: IntoIterator<Item = C>,
    F: FnMut(&C) -> Result<(M, f64)>,
{
    let mut best: Option<Selected<C, M>> = None;

    for candidate in candidates {
        let (model, score) = fit_and_score(&candidate)?;
        let replace = match &best {
            None => true,
            Some(incumbent) => score > incumbent.score,
        };
        if replace {
            best = Some(Selected {
                candidate,
                model,
                score,
            });
        }
    }

    Ok(best)
}

/// Fit candidates in order and stop at the first one `accept` approves.
///
/// When none is approved the last candidate is returned. Returns `None`
/// when `candidates` is empty.
pub fn first_adequate<C, M, I, F, A>(candidates: I, mut fit: F, accept: A) -> Result<Option<(C, M)>>
where
    I: IntoIterator<Item = C>,
    F: FnMut(&C) -> Result<M>,
    A: Fn(&M) -> bool,
{
    let mut last = None;

    for candidate in candidates {
        let model = fit(&candidate)?;
        if accept(&model) {
            return Ok(Some((candidate, model)));
        }
        last = Some((candidate, model));
    }

    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdpError;

    #[test]
    fn test_best_of_picks_max() {
        let scores = [0.1, 0.7, 0.3];
        let best = best_of(0..3usize, |&i| Ok((i * 10, scores[i]))).unwrap().unwrap();
        assert_eq!(best.candidate, 1);
        assert_eq!(best.model, 10);
        assert_eq!(best.score, 0.7);
    }

    #[test]
    fn test_best_of_ties_keep_first() {
        let best = best_of(2..6usize, |_| Ok(((), 0.5))).unwrap().unwrap();
        assert_eq!(best.candidate, 2);
    }

    #[test]
    fn test_best_of_all_negative_infinity_keeps_first() {
        let best = best_of(2..5usize, |_| Ok(((), f64::NEG_INFINITY)))
            .unwrap()
            .unwrap();
        assert_eq!(best.candidate, 2);
    }

    #[test]
    fn test_best_of_empty() {
        let best = best_of(2..2usize, |_| Ok(((), 1.0))).unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn test_best_of_error_propagates() {
        let result = best_of(0..3usize, |&i| {
            if i == 1 {
                Err(PdpError::ComputationError("fit failed".to_string()))
            } else {
                Ok(((), 0.0))
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_first_adequate_stops_early() {
        let mut fitted = Vec::new();
        let (level, err) = first_adequate(
            2..=9usize,
            |&k| {
                fitted.push(k);
                Ok(1.0 / k as f64)
            },
            |&err| err < 0.3,
        )
        .unwrap()
        .unwrap();
        assert_eq!(level, 4);
        assert!(err < 0.3);
        assert_eq!(fitted, vec![2, 3, 4]);
    }

    #[test]
    fn test_first_adequate_falls_back_to_last() {
        let (level, _) = first_adequate(2..=9usize, |_| Ok(1.0), |&e| e < 0.02)
            .unwrap()
            .unwrap();
        assert_eq!(level, 9);
    }
}
