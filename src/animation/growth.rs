//! Growth animation over a live vertex buffer
//!
//! Consumes a fully built [`Tree`] and drives a copy of its vertex positions
//! toward the final shape, ring by ring from each branch's base to its tip.
//! Child branches start growing once the parent's front reaches their
//! attachment segment.

use crate::math::Vec3;
use crate::tree::{Branch, BranchId, Tree};
use super::easing::{ease, Easing};

/// Orchestrates growth of a whole tree
///
/// Owns the single live position buffer; each [`BranchAnimator`] writes only
/// to its own branch's index range. Driven by an external tick, never by an
/// internal timer.
#[derive(Debug, Clone)]
pub struct TreeAnimator {
    speed: f32,
    smooth: bool,
    easing: Easing,
    segment_width: usize,
    segment_height: usize,
    positions: Vec<Vec3>,
    animators: Vec<BranchAnimator>,
}

impl TreeAnimator {
    /// Wrap a built tree, starting from the fully collapsed state
    ///
    /// At `speed` 1.0 one unit tick grows one ring. `smooth` interpolates the
    /// front inside a ring interval instead of snapping ring by ring.
    pub fn new(tree: &Tree, speed: f32, smooth: bool) -> Self {
        let mut animator = Self {
            speed: speed.max(0.0),
            smooth,
            easing: Easing::default(),
            segment_width: tree.segment_width,
            segment_height: tree.segment_height,
            positions: vec![Vec3::ZERO; tree.mesh.vertex_count()],
            animators: Vec::new(),
        };

        let root = BranchAnimator::new(tree, tree.root, &mut animator.positions);
        animator.animators.push(root);
        animator
    }

    /// Select the curve applied to the smooth front; `Linear` by default
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Advance one animation step; `dt` is in tick units (1.0 = one tick)
    ///
    /// Returns true once every branch has finished growing.
    pub fn tick(&mut self, tree: &Tree, dt: f32) -> bool {
        let step = self.speed * dt;
        let mut emitted = Vec::new();

        for animator in &mut self.animators {
            animator.tick(tree, &mut self.positions, step, self.smooth, self.easing);

            for child in animator.take_emitable() {
                let mut child_animator = BranchAnimator::new(tree, child, &mut self.positions);
                // a freshly emitted branch starts moving in the same pass
                child_animator.tick(tree, &mut self.positions, step, self.smooth, self.easing);
                emitted.push(child_animator);
            }
        }

        self.animators.append(&mut emitted);
        self.animators
            .retain(|a| a.has_pending() || !a.is_finished());
        self.is_finished()
    }

    /// The animation is complete when the active set is empty
    pub fn is_finished(&self) -> bool {
        self.animators.is_empty()
    }

    /// Live positions for the whole combined buffer
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Flat f32 view of the live buffer
    pub fn position_data(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Branches currently growing or still holding un-emitted children
    pub fn active_branches(&self) -> Vec<BranchId> {
        self.animators.iter().map(|a| a.branch).collect()
    }
}

/// Grows one branch's vertex range toward its final positions
#[derive(Debug, Clone)]
pub struct BranchAnimator {
    branch: BranchId,
    offset: usize,
    /// Monotonic growth parameter; 1.0 spans the whole branch
    frame: f32,
    previous_segment_index: i32,
    /// Children not yet emitted, sorted by attachment segment index
    pending: Vec<(BranchId, usize)>,
    finished: bool,
}

impl BranchAnimator {
    fn new(tree: &Tree, id: BranchId, positions: &mut [Vec3]) -> Self {
        let branch = tree.branch(id);

        let mut pending: Vec<(BranchId, usize)> = branch
            .children
            .iter()
            .map(|&child| (child, tree.branch(child).attach_index.unwrap_or(0)))
            .collect();
        pending.sort_by_key(|&(_, attach)| attach);

        let animator = Self {
            branch: id,
            offset: branch.vertex_offset as usize,
            frame: 0.0,
            previous_segment_index: -1,
            pending,
            finished: false,
        };
        animator.initialize(tree, positions);
        animator
    }

    /// Collapse the branch: first ring already welded at its final position,
    /// all later rings and both caps pinned to the base point
    fn initialize(&self, tree: &Tree, positions: &mut [Vec3]) {
        let branch = tree.branch(self.branch);
        let width = tree.segment_width;
        let height = tree.segment_height;
        let finals = &branch.mesh.vertices;

        let ring_count = width * height;
        let base = finals[ring_count].position; // bottom cap = first segment position

        for j in 0..width {
            positions[self.offset + j] = finals[j].position;
        }
        for i in 1..height {
            for j in 0..width {
                positions[self.offset + i * width + j] = base;
            }
        }
        positions[self.offset + ring_count] = base;
        positions[self.offset + ring_count + 1] = base;
    }

    fn tick(
        &mut self,
        tree: &Tree,
        positions: &mut [Vec3],
        step: f32,
        smooth: bool,
        easing: Easing,
    ) {
        // a finished branch never re-enters growing
        if self.finished {
            return;
        }

        let branch = tree.branch(self.branch);
        let width = tree.segment_width;
        let height = tree.segment_height;
        let segment_frame_length = 1.0 / height as f32;

        let segment_index = (height as f32 * self.frame) as i32;
        let t = (height as f32 * self.frame).fract();

        // snap every ring the front has passed; rings skipped by a large
        // step catch up directly, without interpolation
        if segment_index > self.previous_segment_index {
            let limit = segment_index.min(height as i32 - 1);
            for i in (self.previous_segment_index + 1)..=limit {
                self.snap_ring(branch, positions, width, i as usize);
            }
        }

        if segment_index < height as i32 - 1 {
            if smooth {
                let front = segment_index as usize;
                self.blend_ring(branch, positions, width, front, ease(t, easing));
            }

            if segment_index != self.previous_segment_index {
                // pin everything past the front to the front's centerline so
                // the silhouette stays taut while growing
                let top = branch.segments[segment_index as usize].position;
                for i in (segment_index as usize + 2)..height {
                    for j in 0..width {
                        positions[self.offset + i * width + j] = top;
                    }
                }
                positions[self.offset + width * height + 1] = top;
            }
        } else {
            // tip reached: last ring and the tip cap land on final positions
            self.snap_ring(branch, positions, width, height - 1);
            let cap = width * height + 1;
            positions[self.offset + cap] = branch.mesh.vertices[cap].position;
        }

        self.previous_segment_index = segment_index;
        self.frame += segment_frame_length * step;

        // tolerance absorbs float accumulation over many small steps
        if self.previous_segment_index >= height as i32 - 1 && self.frame >= 1.0 - 1e-6 {
            self.finished = true;
        }
    }

    fn snap_ring(&self, branch: &Branch, positions: &mut [Vec3], width: usize, index: usize) {
        for j in 0..width {
            let idx = index * width + j;
            positions[self.offset + idx] = branch.mesh.vertices[idx].position;
        }
    }

    /// Move the ring above the front between the front ring's final
    /// vertices and its own, by factor `t`
    fn blend_ring(
        &self,
        branch: &Branch,
        positions: &mut [Vec3],
        width: usize,
        index: usize,
        t: f32,
    ) {
        for j in 0..width {
            let a = branch.mesh.vertices[index * width + j].position;
            let b = branch.mesh.vertices[(index + 1) * width + j].position;
            positions[self.offset + (index + 1) * width + j] = a.lerp(&b, t);
        }
    }

    /// Children whose attachment segment the growth front has reached, in
    /// increasing attachment order
    fn take_emitable(&mut self) -> Vec<BranchId> {
        let mut out = Vec::new();
        while let Some(&(child, attach)) = self.pending.first() {
            if attach as i32 <= self.previous_segment_index + 1 {
                out.push(child);
                self.pending.remove(0);
            } else {
                break;
            }
        }
        out
    }

    pub fn frame(&self) -> f32 {
        self.frame
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
