//! Per-target track bookkeeping
//!
//! A [`Track`] records the accepted state estimates of one target on a dense
//! timeline: slot `k` always belongs to time step `start_time + k`, and steps
//! without an associated detection hold an explicit missing marker (`None`).

use alloc::vec::Vec;
use nalgebra::{RealField, Scalar};

use super::collection::StateVectors;
use super::spaces::StateVector;
use crate::{GmphdError, Result};

/// One slot of a track timeline.
pub type TrackSlot<T, const N: usize> = Option<StateVector<T, N>>;

/// Lifecycle state of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    /// Accepting estimates.
    Active,
    /// Terminal; the track ended at `end_time`.
    Finished { end_time: u32 },
}

/// Timeline of estimates for a single labelled target.
///
/// Mutation goes through [`Track::add_estimate`] and [`Track::finish`] only;
/// both validate before touching the timeline, so a failed call leaves the
/// track unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<T: Scalar, const N: usize> {
    label: u32,
    start_time: u32,
    estimates: Vec<TrackSlot<T, N>>,
    status: TrackStatus,
}

impl<T: Scalar + Copy, const N: usize> Track<T, N> {
    /// Creates an active track with an empty timeline.
    pub fn new(label: u32, start_time: u32) -> Self {
        Self {
            label,
            start_time,
            estimates: Vec::new(),
            status: TrackStatus::Active,
        }
    }

    #[inline]
    pub fn label(&self) -> u32 {
        self.label
    }

    #[inline]
    pub fn start_time(&self) -> u32 {
        self.start_time
    }

    #[inline]
    pub fn status(&self) -> TrackStatus {
        self.status
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self.status, TrackStatus::Finished { .. })
    }

    /// Time the track was finished at, `None` while active.
    #[inline]
    pub fn end_time(&self) -> Option<u32> {
        match self.status {
            TrackStatus::Finished { end_time } => Some(end_time),
            TrackStatus::Active => None,
        }
    }

    /// The timeline, one slot per elapsed time step.
    #[inline]
    pub fn estimates(&self) -> &[TrackSlot<T, N>] {
        &self.estimates
    }

    /// Number of slots on the timeline.
    #[inline]
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// Time step of the last slot, `None` if the timeline is empty.
    pub fn last_time(&self) -> Option<u32> {
        let len = u32::try_from(self.estimates.len()).ok()?;
        len.checked_sub(1).map(|last| self.start_time + last)
    }

    /// Estimate recorded for absolute time step `time`.
    ///
    /// `None` both for missing markers and for times outside the timeline.
    pub fn estimate_at(&self, time: u32) -> Option<&StateVector<T, N>> {
        let offset = time.checked_sub(self.start_time)? as usize;
        self.estimates.get(offset)?.as_ref()
    }

    /// Iterates over `(time, estimate)` for slots that hold an estimate.
    pub fn detections(&self) -> impl Iterator<Item = (u32, &StateVector<T, N>)> + '_ {
        self.estimates
            .iter()
            .enumerate()
            .filter_map(|(offset, slot)| {
                slot.as_ref()
                    .map(|estimate| (self.start_time + offset as u32, estimate))
            })
    }

    /// Number of slots holding an estimate.
    pub fn detection_count(&self) -> usize {
        self.estimates.iter().filter(|slot| slot.is_some()).count()
    }

    /// Collects the recorded estimates, skipping gaps, into a batch.
    pub fn to_state_vectors(&self) -> StateVectors<T, N> {
        self.estimates.iter().flatten().copied().collect()
    }

    /// Records `estimate` for time step `time`.
    ///
    /// Steps skipped since the last slot are filled with missing markers.
    /// Fails if the track is finished, or if `time` is not strictly after the
    /// last recorded slot.
    pub fn add_estimate(&mut self, estimate: StateVector<T, N>, time: u32) -> Result<()> {
        self.ensure_active()?;
        let expected_len = self.slots_through(time)?;
        if expected_len <= self.estimates.len() {
            return Err(self.out_of_order(time));
        }

        self.pad_to(expected_len - 1);
        self.estimates.push(Some(estimate));
        Ok(())
    }

    /// Finishes the track at `time`.
    ///
    /// The timeline is padded with missing markers up to, but not including,
    /// the slot for `time`. Slots already recorded are kept as they are, so
    /// finishing at or before the last recorded step only changes the status.
    /// Fails if the track is already finished.
    pub fn finish(&mut self, time: u32) -> Result<()> {
        self.ensure_active()?;
        let target_len = time.saturating_sub(self.start_time) as usize;

        self.pad_to(target_len);
        self.status = TrackStatus::Finished { end_time: time };
        log::debug!(
            "Track {} finished at {}: {} slots, {} detections",
            self.label,
            time,
            self.estimates.len(),
            self.detection_count()
        );
        Ok(())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_finished() {
            return Err(GmphdError::TrackFinished { label: self.label });
        }
        Ok(())
    }

    /// Timeline length needed for `time` to have a slot.
    fn slots_through(&self, time: u32) -> Result<usize> {
        time.checked_sub(self.start_time)
            .map(|elapsed| elapsed as usize + 1)
            .ok_or_else(|| self.out_of_order(time))
    }

    fn out_of_order(&self, time: u32) -> GmphdError {
        GmphdError::OutOfOrderTime {
            time,
            last_time: self.last_time(),
        }
    }

    fn pad_to(&mut self, len: usize) {
        let gap = len.saturating_sub(self.estimates.len());
        if gap > 0 {
            log::trace!("Track {}: filling {} missing steps", self.label, gap);
            self.estimates.resize(len, None);
        }
    }
}

impl<T: RealField + Copy, const N: usize> Track<T, N> {
    /// Mean of the recorded estimates, `None` if nothing was recorded.
    pub fn mean_estimate(&self) -> Option<StateVector<T, N>> {
        self.to_state_vectors().mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn estimate() -> StateVector<f64, 2> {
        StateVector::from_array([1.0, 1.0])
    }

    #[test]
    fn test_add_estimate_with_gap() {
        let e = estimate();
        let mut track = Track::new(1, 10);

        track.add_estimate(e, 10).unwrap();
        assert_eq!(
            track.add_estimate(e, 10),
            Err(GmphdError::OutOfOrderTime { time: 10, last_time: Some(10) })
        );
        track.add_estimate(e, 11).unwrap();
        track.add_estimate(e, 15).unwrap();

        assert_eq!(track.estimates(), &[Some(e), Some(e), None, None, Some(e)]);
        assert_eq!(track.last_time(), Some(15));
        assert_eq!(track.detection_count(), 3);
    }

    #[test]
    fn test_out_of_order_leaves_track_untouched() {
        let mut track = Track::new(2, 5);
        track.add_estimate(estimate(), 8).unwrap();
        let before = track.clone();

        assert!(track.add_estimate(estimate(), 7).is_err());
        assert!(track.add_estimate(estimate(), 4).is_err());
        assert_eq!(track, before);
    }

    #[test]
    fn test_time_before_start_rejected() {
        let mut track = Track::<f64, 2>::new(3, 10);
        assert_eq!(
            track.add_estimate(estimate(), 9),
            Err(GmphdError::OutOfOrderTime { time: 9, last_time: None })
        );
        assert!(track.is_empty());
    }

    #[test]
    fn test_finish_pads_without_final_slot() {
        let mut track = Track::<f64, 2>::new(1, 10);
        assert!(!track.is_finished());

        track.finish(13).unwrap();
        assert!(track.is_finished());
        assert_eq!(track.end_time(), Some(13));
        assert_eq!(track.estimates(), &[None, None, None]);

        assert_eq!(track.finish(13), Err(GmphdError::TrackFinished { label: 1 }));
        assert_eq!(
            track.add_estimate(estimate(), 14),
            Err(GmphdError::TrackFinished { label: 1 })
        );
    }

    #[test]
    fn test_finish_after_estimates() {
        let e = estimate();
        let mut track = Track::new(4, 0);
        track.add_estimate(e, 0).unwrap();
        track.add_estimate(e, 2).unwrap();

        track.finish(5).unwrap();
        assert_eq!(track.estimates(), &[Some(e), None, Some(e), None, None]);
        assert_eq!(track.status(), TrackStatus::Finished { end_time: 5 });
    }

    #[test]
    fn test_finish_at_last_estimate_keeps_timeline() {
        let e = estimate();
        let mut track = Track::new(1, 10);
        track.add_estimate(e, 10).unwrap();
        track.add_estimate(e, 12).unwrap();
        let before = track.estimates().to_vec();

        assert_eq!(track.finish(12), Ok(()));
        assert!(track.is_finished());
        assert_eq!(track.end_time(), Some(12));
        assert_eq!(track.estimates(), before.as_slice());
    }

    #[test]
    fn test_finish_before_recorded_slots() {
        let e = estimate();
        let mut track = Track::new(2, 10);
        track.add_estimate(e, 11).unwrap();

        track.finish(10).unwrap();
        assert!(track.is_finished());
        assert_eq!(track.estimates(), &[None, Some(e)]);

        let mut early = Track::<f64, 2>::new(3, 10);
        early.finish(4).unwrap();
        assert!(early.is_finished());
        assert!(early.is_empty());
    }

    #[test]
    fn test_detections_at_end_of_time_range() {
        let mut track = Track::new(6, u32::MAX);
        track.add_estimate(estimate(), u32::MAX).unwrap();

        let detections: Vec<(u32, &StateVector<f64, 2>)> = track.detections().collect();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].0, u32::MAX);
        assert_eq!(track.last_time(), Some(u32::MAX));
    }

    #[test]
    fn test_lookup_by_time() {
        let mut track = Track::<f64, 2>::new(5, 100);
        track.add_estimate(StateVector::from_array([1.0, 0.0]), 100).unwrap();
        track.add_estimate(StateVector::from_array([3.0, 0.0]), 102).unwrap();

        assert_eq!(track.estimate_at(100).map(|v| v[0]), Some(1.0));
        assert!(track.estimate_at(101).is_none());
        assert_eq!(track.estimate_at(102).map(|v| v[0]), Some(3.0));
        assert!(track.estimate_at(99).is_none());
        assert!(track.estimate_at(103).is_none());

        let times: Vec<u32> = track.detections().map(|(t, _)| t).collect();
        assert_eq!(times, vec![100, 102]);

        let batch = track.to_state_vectors();
        assert_eq!(batch.shape(), (2, 2));
        assert!((track.mean_estimate().unwrap()[0] - 2.0).abs() < 1e-12);
    }
}
