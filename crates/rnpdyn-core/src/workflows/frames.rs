use crate::core::models::structure::Structure;
use crate::core::models::trajectory::{FrameId, Trajectory};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Applies `analyze` to every frame and returns the results in ascending
/// frame order.
///
/// Frames are independent, so with the `parallel` feature they are processed
/// on the rayon pool; the caller merges the ordered results on its own.
pub(crate) fn map_frames<T, F>(
    trajectory: &Trajectory,
    reporter: &ProgressReporter,
    analyze: F,
) -> Result<Vec<(FrameId, T)>, EngineError>
where
    T: Send,
    F: Fn(FrameId, &Structure) -> Result<T, EngineError> + Sync,
{
    let frames: Vec<(FrameId, &Structure)> = trajectory.frames().collect();

    reporter.report(Progress::TaskStart {
        total_steps: frames.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = frames.iter();

    #[cfg(feature = "parallel")]
    let iterator = frames.par_iter();

    let results = iterator
        .map(|&(id, structure)| {
            let result = analyze(id, structure).map(|value| (id, value));
            reporter.report(Progress::TaskIncrement);
            result
        })
        .collect::<Result<Vec<_>, _>>();

    reporter.report(Progress::TaskFinish);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn trajectory(ids: &[FrameId]) -> Trajectory {
        ids.iter().map(|&id| (id, Structure::new())).collect()
    }

    #[test]
    fn results_follow_ascending_frame_order() {
        let t = trajectory(&[10, 2, 7]);
        let out = map_frames(&t, &ProgressReporter::new(), |id, _| Ok(id * 2)).unwrap();
        assert_eq!(out, vec![(2, 4), (7, 14), (10, 20)]);
    }

    #[test]
    fn first_error_is_propagated() {
        let t = trajectory(&[1, 2, 3]);
        let result = map_frames(&t, &ProgressReporter::new(), |id, _| {
            if id == 2 {
                Err(EngineError::empty("frame 2"))
            } else {
                Ok(id)
            }
        });
        assert!(matches!(result, Err(EngineError::EmptyComparison { .. })));
    }

    #[test]
    fn reports_one_increment_per_frame() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(format!("{:?}", event));
        }));
        let t = trajectory(&[1, 2, 3]);
        map_frames(&t, &reporter, |_, _| Ok(())).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert_eq!(events.first().unwrap(), "TaskStart { total_steps: 3 }");
        assert_eq!(events.iter().filter(|e| *e == "TaskIncrement").count(), 3);
        assert_eq!(events.last().unwrap(), "TaskFinish");
    }
}
