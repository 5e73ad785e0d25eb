//! View-level owner of the heatmap data and its elevation animation.

use crate::animator::{AnimationPhase, ElevationAnimator, TimerError, TimerHost};
use crate::config::HeatmapConfig;
use crate::console_log;
use crate::models::CoordinatePair;

pub struct HeatmapView<H: TimerHost + 'static> {
    animator: ElevationAnimator<H>,
    data: Option<Vec<CoordinatePair>>,
}

impl<H: TimerHost + 'static> HeatmapView<H> {
    pub fn new(host: H, config: &HeatmapConfig) -> Self {
        Self {
            animator: ElevationAnimator::new(host, config.elevation_scale, config.animation),
            data: None,
        }
    }

    pub fn mount(&self) -> Result<(), TimerError> {
        self.animator.start()
    }

    /// Replaces the data; a change in length between two loaded datasets
    /// replays the elevation ramp.
    pub fn set_data(&mut self, data: Option<Vec<CoordinatePair>>) -> Result<(), TimerError> {
        let resized = match (&self.data, &data) {
            (Some(old), Some(new)) => old.len() != new.len(),
            _ => false,
        };
        self.data = data;
        if resized {
            console_log!("Heatmap data resized, restarting elevation animation");
            self.animator.restart()?;
        }
        Ok(())
    }

    pub fn unmount(&self) {
        self.animator.stop();
    }

    pub fn data(&self) -> Option<&[CoordinatePair]> {
        self.data.as_deref()
    }

    pub fn elevation_scale(&self) -> u32 {
        self.animator.value()
    }

    pub fn phase(&self) -> AnimationPhase {
        self.animator.phase()
    }

    pub fn animator(&self) -> &ElevationAnimator<H> {
        &self.animator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::tests::ManualTimers;
    use std::rc::Rc;

    fn points(n: usize) -> Option<Vec<CoordinatePair>> {
        Some(vec![CoordinatePair::ORIGIN; n])
    }

    #[test]
    fn test_mount_then_first_data_does_not_restart() {
        let timers = ManualTimers::new();
        let mut view = HeatmapView::new(Rc::clone(&timers), &HeatmapConfig::default());
        view.mount().unwrap();
        timers.advance(1540);
        assert_eq!(view.elevation_scale(), 3);

        view.set_data(points(10)).unwrap();
        assert_eq!(view.elevation_scale(), 3);
        assert_eq!(view.phase(), AnimationPhase::Running);
        assert_eq!(view.data().map(<[_]>::len), Some(10));
    }

    #[test]
    fn test_length_change_restarts() {
        let timers = ManualTimers::new();
        let mut view = HeatmapView::new(Rc::clone(&timers), &HeatmapConfig::default());
        view.set_data(points(10)).unwrap();
        view.mount().unwrap();
        timers.advance(3000);
        assert_eq!(view.elevation_scale(), 5);
        assert_eq!(view.phase(), AnimationPhase::Idle);

        view.set_data(points(10)).unwrap();
        assert_eq!(view.phase(), AnimationPhase::Idle);

        view.set_data(points(12)).unwrap();
        assert_eq!(view.elevation_scale(), 1);
        assert_eq!(view.phase(), AnimationPhase::Pending);
        assert_eq!(timers.active(), 1);
    }

    #[test]
    fn test_clearing_data_does_not_restart() {
        let timers = ManualTimers::new();
        let mut view = HeatmapView::new(Rc::clone(&timers), &HeatmapConfig::default());
        view.set_data(points(4)).unwrap();
        view.set_data(None).unwrap();
        assert_eq!(view.phase(), AnimationPhase::Idle);
        assert!(view.data().is_none());
    }

    #[test]
    fn test_unmount_stops() {
        let timers = ManualTimers::new();
        let view = HeatmapView::new(Rc::clone(&timers), &HeatmapConfig::default());
        view.mount().unwrap();
        view.unmount();
        assert_eq!(view.phase(), AnimationPhase::Idle);
        assert_eq!(timers.active(), 0);
    }
}
