//! Ordered, editable collection of captured steps.
//!
//! Sequence order is presentation order: exporters render steps exactly as
//! they appear here. Every mutation addresses a step by its [`StepId`], never
//! by position, and leaves the relative order of untouched steps intact.

use stepcast_common::error::{StepcastError, StepcastResult};

use crate::step::{Step, StepId};

/// The steps of one recording session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSequence {
    steps: Vec<Step>,
    next_id: u64,
}

impl StepSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step at the end and assign it a fresh identity.
    pub fn push(&mut self, mut step: Step) -> StepId {
        self.next_id += 1;
        let id = StepId(self.next_id);
        step.id = id;
        self.steps.push(step);
        id
    }

    /// Remove a step, returning it.
    pub fn remove(&mut self, id: StepId) -> StepcastResult<Step> {
        let index = self.index_of(id)?;
        Ok(self.steps.remove(index))
    }

    /// Swap a step with its predecessor. Returns `false` if it is already first.
    pub fn move_up(&mut self, id: StepId) -> StepcastResult<bool> {
        let index = self.index_of(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.steps.swap(index - 1, index);
        Ok(true)
    }

    /// Swap a step with its successor. Returns `false` if it is already last.
    pub fn move_down(&mut self, id: StepId) -> StepcastResult<bool> {
        let index = self.index_of(id)?;
        if index + 1 >= self.steps.len() {
            return Ok(false);
        }
        self.steps.swap(index, index + 1);
        Ok(true)
    }

    /// Replace a step's description. Blank text clears it.
    pub fn set_description(
        &mut self,
        id: StepId,
        description: impl Into<String>,
    ) -> StepcastResult<()> {
        let description = description.into();
        let step = self.get_mut(id)?;
        step.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        Ok(())
    }

    pub fn get(&self, id: StepId) -> StepcastResult<&Step> {
        let index = self.index_of(id)?;
        Ok(&self.steps[index])
    }

    pub fn get_mut(&mut self, id: StepId) -> StepcastResult<&mut Step> {
        let index = self.index_of(id)?;
        Ok(&mut self.steps[index])
    }

    /// Current position of a step, if it is still present.
    pub fn position(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    /// Step at a given position.
    pub fn at(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn ids(&self) -> Vec<StepId> {
        self.steps.iter().map(|step| step.id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn as_slice(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn index_of(&self, id: StepId) -> StepcastResult<usize> {
        self.position(id)
            .ok_or(StepcastError::StepNotFound { id: id.0 })
    }
}

impl<'a> IntoIterator for &'a StepSequence {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::RgbaImage;
    use proptest::prelude::*;
    use stepcast_platform_core::{MouseButton, Point};

    fn step_at(x: i32) -> Step {
        Step::click(
            RgbaImage::new(2, 2),
            MouseButton::Left,
            Point::new(x, 0),
            Utc::now(),
        )
    }

    fn xs(sequence: &StepSequence) -> Vec<i32> {
        sequence.iter().map(|s| s.coordinates.x).collect()
    }

    fn sequence_of(n: i32) -> (StepSequence, Vec<StepId>) {
        let mut sequence = StepSequence::new();
        let ids = (0..n).map(|x| sequence.push(step_at(x))).collect();
        (sequence, ids)
    }

    #[test]
    fn push_assigns_distinct_ids_in_order() {
        let (sequence, ids) = sequence_of(3);
        assert_eq!(sequence.ids(), ids);
        assert_eq!(ids, vec![StepId(1), StepId(2), StepId(3)]);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let (mut sequence, ids) = sequence_of(2);
        sequence.remove(ids[1]).unwrap();
        let fresh = sequence.push(step_at(9));
        assert_eq!(fresh, StepId(3));
    }

    #[test]
    fn move_up_and_down_swap_neighbours_only() {
        let (mut sequence, ids) = sequence_of(4);
        assert!(sequence.move_up(ids[2]).unwrap());
        assert_eq!(xs(&sequence), vec![0, 2, 1, 3]);
        assert!(sequence.move_down(ids[0]).unwrap());
        assert_eq!(xs(&sequence), vec![2, 0, 1, 3]);
    }

    #[test]
    fn moves_at_boundaries_are_noops() {
        let (mut sequence, ids) = sequence_of(3);
        assert!(!sequence.move_up(ids[0]).unwrap());
        assert!(!sequence.move_down(ids[2]).unwrap());
        assert_eq!(xs(&sequence), vec![0, 1, 2]);
    }

    #[test]
    fn operations_follow_identity_after_reorder() {
        let (mut sequence, ids) = sequence_of(3);
        sequence.move_down(ids[0]).unwrap();
        sequence.set_description(ids[0], "first click").unwrap();
        assert_eq!(sequence.at(1).unwrap().id(), ids[0]);
        assert_eq!(
            sequence.at(1).unwrap().description.as_deref(),
            Some("first click")
        );

        let removed = sequence.remove(ids[0]).unwrap();
        assert_eq!(removed.coordinates.x, 0);
        assert_eq!(xs(&sequence), vec![1, 2]);
    }

    #[test]
    fn stale_id_is_rejected() {
        let (mut sequence, ids) = sequence_of(2);
        sequence.remove(ids[0]).unwrap();
        assert!(matches!(
            sequence.set_description(ids[0], "late edit"),
            Err(StepcastError::StepNotFound { id: 1 })
        ));
        assert!(sequence.move_up(ids[0]).is_err());
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn blank_description_clears() {
        let (mut sequence, ids) = sequence_of(1);
        sequence.set_description(ids[0], "note").unwrap();
        sequence.set_description(ids[0], "  ").unwrap();
        assert_eq!(sequence.get(ids[0]).unwrap().description, None);
    }

    proptest! {
        #[test]
        fn removal_preserves_relative_order(n in 1i32..20, pick in 0usize..20) {
            let (mut sequence, ids) = sequence_of(n);
            let victim = ids[pick % ids.len()];
            sequence.remove(victim).unwrap();
            let remaining = xs(&sequence);
            let mut sorted = remaining.clone();
            sorted.sort();
            prop_assert_eq!(remaining, sorted);
            prop_assert_eq!(sequence.len(), ids.len() - 1);
        }

        #[test]
        fn swaps_keep_untouched_steps_in_place(n in 2i32..20, pick in 0usize..20) {
            let (mut sequence, ids) = sequence_of(n);
            let index = pick % (ids.len() - 1);
            sequence.move_down(ids[index]).unwrap();
            let after = xs(&sequence);
            for (i, x) in after.iter().enumerate() {
                if i != index && i != index + 1 {
                    prop_assert_eq!(*x, i as i32);
                }
            }
            prop_assert_eq!(after[index], index as i32 + 1);
            prop_assert_eq!(after[index + 1], index as i32);
        }
    }
}
