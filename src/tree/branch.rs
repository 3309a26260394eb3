use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::math::{hermite_point, Quat, Vec3};
use crate::mesh::{Mesh, Vertex};
use super::preset::{Preset, MAX_GENERATION};
use super::segment::Segment;

/// Index of a branch in the tree's arena
pub type BranchId = usize;

/// A recursive node of the tree
///
/// Branches live in the arena owned by [`Tree`]; children are stored as
/// arena indices, so the structure stays cycle-free without nested ownership.
#[derive(Debug, Clone)]
pub struct Branch {
    /// Remaining recursion depth; the root carries the configured maximum,
    /// 1 marks a capped terminal
    pub generation: u32,
    pub start: Vec3,
    pub direction: Vec3,
    pub height: f32,
    pub radius: f32,
    /// Cross-section rings along the bent centerline
    pub segments: Vec<Segment>,
    pub children: Vec<BranchId>,
    /// Segment index on the parent this branch is welded to; None for the root
    pub attach_index: Option<usize>,
    /// Where this branch's vertices begin in the combined buffer
    pub vertex_offset: u32,
    /// This branch's own tube mesh: segment_width * segment_height ring
    /// vertices plus the two cap centers
    pub mesh: Mesh,
}

impl Branch {
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Exit tangent frame of the last ring
    pub fn tip(&self) -> &Segment {
        self.segments.last().expect("branch always has segments")
    }
}

/// A fully built tree: branch arena plus the combined mesh
#[derive(Debug, Clone)]
pub struct Tree {
    pub branches: Vec<Branch>,
    pub root: BranchId,
    /// Combined buffer for the whole tree; normals and bounds are
    /// recomputed here only
    pub mesh: Mesh,
    /// Root-to-leaf generation depth, fixed once at the root so UV-V is
    /// consistent tree-wide
    pub generation_length: u32,
    pub segment_width: usize,
    pub segment_height: usize,
}

impl Tree {
    /// Build with a generator seeded from `preset.seed`
    pub fn from_preset(preset: &Preset) -> Result<Tree, String> {
        let mut rng = StdRng::seed_from_u64(preset.seed);
        Tree::build(preset, &mut rng)
    }

    /// Build at the origin, growing along +Y
    pub fn build(preset: &Preset, rng: &mut impl Rng) -> Result<Tree, String> {
        Tree::build_at(preset, Vec3::ZERO, Vec3::UP, rng)
    }

    /// Build a tree rooted at `start` growing along `direction`
    ///
    /// Deterministic for a fixed generator state. Either the whole tree is
    /// built and assembled, or an error is returned before recursion starts.
    pub fn build_at(
        preset: &Preset,
        start: Vec3,
        direction: Vec3,
        rng: &mut impl Rng,
    ) -> Result<Tree, String> {
        preset.validate()?;

        let generation = preset.generation.min(MAX_GENERATION);
        let direction = direction.normalize_or(Vec3::UP);

        let builder = Builder {
            preset,
            generation_length: generation,
        };

        let mut branches = Vec::new();
        let root = builder.build_branch(
            &mut branches,
            rng,
            start,
            direction,
            preset.height,
            preset.radius,
            generation,
            preset.bending_noise,
            None,
            None,
        );

        let mut tree = Tree {
            branches,
            root,
            mesh: Mesh::new(),
            generation_length: generation,
            segment_width: preset.segment_width,
            segment_height: preset.segment_height,
        };
        tree.assemble();
        Ok(tree)
    }

    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.branches[id]
    }

    pub fn root_branch(&self) -> &Branch {
        &self.branches[self.root]
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Ids of every branch at the given generation, in preorder
    pub fn branches_at_generation(&self, generation: u32) -> Vec<BranchId> {
        self.iter_preorder_ids()
            .filter(|&id| self.branches[id].generation == generation)
            .collect()
    }

    /// Iterate branches in pre-order (self first, then children)
    pub fn iter_preorder(&self) -> impl Iterator<Item = &Branch> {
        self.iter_preorder_ids().map(|id| &self.branches[id])
    }

    fn iter_preorder_ids(&self) -> PreorderIds<'_> {
        PreorderIds {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Walk the arena depth-first, assign vertex offsets, and concatenate
    /// every branch's own mesh into the combined buffer
    fn assemble(&mut self) {
        let mut combined = Mesh::new();
        self.append_branch(self.root, &mut combined);
        combined.recalculate_normals();
        combined.calculate_bounds();
        self.mesh = combined;
    }

    fn append_branch(&mut self, id: BranchId, combined: &mut Mesh) {
        self.branches[id].vertex_offset = combined.vertex_count() as u32;
        combined.merge(&self.branches[id].mesh);

        let children = self.branches[id].children.clone();
        for child in children {
            self.append_branch(child, combined);
        }
    }
}

struct PreorderIds<'a> {
    tree: &'a Tree,
    stack: Vec<BranchId>,
}

impl<'a> Iterator for PreorderIds<'a> {
    type Item = BranchId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        for &child in self.tree.branches[id].children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

struct Builder<'a> {
    preset: &'a Preset,
    generation_length: u32,
}

impl<'a> Builder<'a> {
    /// Build one branch and, recursively, its children; returns the arena id
    ///
    /// `from` carries the parent segment this branch is welded to, and
    /// `carried_tangent` the parent's exit tangent for the continuation child.
    #[allow(clippy::too_many_arguments)]
    fn build_branch(
        &self,
        branches: &mut Vec<Branch>,
        rng: &mut impl Rng,
        start: Vec3,
        direction: Vec3,
        height: f32,
        radius: f32,
        generation: u32,
        bending_noise: f32,
        from: Option<(&Segment, usize)>,
        carried_tangent: Option<Vec3>,
    ) -> BranchId {
        let p = self.preset;
        let h = p.segment_height;
        let direction = direction.normalize_or(Vec3::UP);

        // lateral bend in the branch's own frame
        let lateral = Vec3::new(
            uniform(rng, -bending_noise, bending_noise),
            0.0,
            uniform(rng, -bending_noise, bending_noise),
        );
        let bend = Quat::look_along(direction) * lateral;
        let end = start + (direction + bend).normalize_or(direction) * height;

        let tangent0 = carried_tangent.unwrap_or(direction * height);
        let tangent1 = (end - start) + direction * height;

        let mut segments: Vec<Segment> = Vec::with_capacity(h);
        for i in 0..h {
            let t = i as f32 / h as f32;
            let mut segment = Segment::new(
                p.segment_width,
                radius * lerp(1.0, p.radius_reduction_rate, t),
                p.segment_noise,
                rng,
            );

            let current = hermite_point(start, end, tangent0, tangent1, t);
            let next = hermite_point(start, end, tangent0, tangent1, (i + 1) as f32 / h as f32);
            let forward = (next - current).normalize_or(direction);
            segment.position = current;

            match (i, from) {
                // weld the joint to the parent ring
                (0, Some((parent, _))) => segment.weld_to(parent),
                // discrete parallel transport of the previous frame
                (_, Some(_)) => {
                    let prev = &segments[i - 1];
                    segment.rotation = Quat::rotation_between(prev.direction(), forward) * prev.rotation;
                }
                // unattached root: derive each frame from the tangent directly
                _ => segment.rotation = Quat::look_along(forward),
            }

            segments.push(segment);
        }

        let mut children = Vec::new();
        if generation > 1 {
            let count: usize = if p.child_count <= 2 {
                2
            } else {
                rng.random_range(2..p.child_count) as usize
            };

            for i in 0..count {
                // the last child continues the trunk from the final segment
                let continuation = i == count - 1;
                let attach = if continuation {
                    h - 1
                } else {
                    let f = uniform(rng, p.child_segment_from_min, p.child_segment_from_max);
                    ((h as f32 * f) as usize).min(h - 1)
                };

                let segment = &segments[attach];
                let child_height =
                    height * uniform(rng, p.height_reduction_rate_min, p.height_reduction_rate_max);
                let child_radius = if continuation {
                    segment.radius
                } else {
                    segment.radius
                        * uniform(rng, p.child_radius_rate_min, p.child_radius_rate_max)
                };
                let carried = if continuation { Some(tangent1) } else { None };

                let child = self.build_branch(
                    branches,
                    rng,
                    segment.position,
                    segment.direction(),
                    child_height,
                    child_radius,
                    generation - 1,
                    bending_noise * p.bending_scale,
                    Some((segment, attach)),
                    carried,
                );
                children.push(child);
            }
        }

        let mesh = self.build_tube(&segments, generation);

        branches.push(Branch {
            generation,
            start,
            direction,
            height,
            radius,
            segments,
            children,
            attach_index: from.map(|(_, index)| index),
            vertex_offset: 0,
            mesh,
        });
        branches.len() - 1
    }

    /// Tube mesh for one branch: ring vertices for every segment plus the
    /// bottom and top cap centers
    fn build_tube(&self, segments: &[Segment], generation: u32) -> Mesh {
        let w = self.preset.segment_width;
        let h = self.preset.segment_height;
        let mut mesh = Mesh::new();

        let uv_y_delta = 1.0 / self.generation_length as f32;
        let uv_y_start = uv_y_delta * (self.generation_length - generation) as f32;

        for (i, segment) in segments.iter().enumerate() {
            let ring = (0..w).map(|j| {
                // the last ring vertex reuses the first point so UVs can wrap
                let position = segment.rotation * segment.points[j % (w - 1)] + segment.position;
                let u = j as f32 / (w - 1) as f32;
                let v = i as f32 / h as f32 * uv_y_delta + uv_y_start;
                Vertex::new(position).with_uv(u, v)
            });
            mesh.add_vertices(ring);
        }

        // cap centers: bottom at the first ring, top at the last
        mesh.add_vertices([
            Vertex::new(segments[0].position),
            Vertex::new(segments[h - 1].position),
        ]);

        for i in 0..h - 1 {
            let ring = (i * w) as u32;
            for j in 0..w as u32 {
                let a = ring + j;
                let b = a + w as u32;
                let c = ring + (j + 1) % w as u32;
                let d = c + w as u32;
                mesh.add_triangle(a, b, c);
                mesh.add_triangle(c, b, d);
            }
        }

        let bottom = (w * h) as u32;
        let top = bottom + 1;

        // structural root: fan the bottom cap into the first ring
        if generation == self.generation_length {
            for j in 0..w as u32 {
                mesh.add_triangle(bottom, j, (j + 1) % w as u32);
            }
        }

        // terminal: fan the last ring into the top cap
        if generation == 1 {
            let offset = ((h - 1) * w) as u32;
            for j in 0..w as u32 {
                mesh.add_triangle(top, offset + (j + 1) % w as u32, offset + j);
            }
        }

        mesh
    }
}

fn uniform(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
