//! The particle buffer: a fixed population of head/tail vertex pairs.
//!
//! Each particle is one line segment. Its two vertices share a random seed
//! and an individual speed multiplier and are stored with identical
//! positions; the tail's visual stretch is added by the vertex shader and
//! never written back here. The buffer is laid out exactly as the GPU
//! vertex buffer expects, so uploading is a single `cast_slice`.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;

/// Lower bound of the per-particle speed multiplier.
pub const MIN_SPEED_FACTOR: f32 = 0.8;
/// Upper bound of the per-particle speed multiplier.
pub const MAX_SPEED_FACTOR: f32 = 1.2;

/// Axis-aligned simulation volume centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32, depth: f32) -> Self {
        Self { width, height, depth }
    }

    /// Half extents along each axis.
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth) * 0.5
    }

    /// Whether `y` lies inside `[-height/2, height/2]`.
    pub fn contains_y(&self, y: f32) -> bool {
        let half = self.height * 0.5;
        (-half..=half).contains(&y)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(40.0, 60.0, 40.0)
    }
}

/// One vertex as uploaded to the GPU.
///
/// Layout (24 bytes): position at 0, seed at 12, speed factor at 16,
/// tail flag at 20.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct RainVertex {
    pub position: [f32; 3],
    /// Uniform random value in `[0, 1)` shared by head and tail.
    pub seed: f32,
    /// Individual speed multiplier in `[0.8, 1.2]`.
    pub speed_factor: f32,
    /// `0.0` for the head, `1.0` for the tail.
    pub is_tail: f32,
}

impl RainVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3, // position
        },
        wgpu::VertexAttribute {
            offset: 12,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32, // seed
        },
        wgpu::VertexAttribute {
            offset: 16,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32, // speed factor
        },
        wgpu::VertexAttribute {
            offset: 20,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32, // is tail
        },
    ];

    /// Vertex buffer layout for a `LineList` draw, one vertex per step.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RainVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    #[inline]
    pub fn is_tail(&self) -> bool {
        self.is_tail > 0.5
    }
}

/// Owner of all particle state.
///
/// Vertices are interleaved: particle `i` has its head at `2 * i` and its
/// tail at `2 * i + 1`.
#[derive(Debug, Clone)]
pub struct ParticleBuffer {
    vertices: Vec<RainVertex>,
    bounds: Bounds,
}

impl ParticleBuffer {
    /// Scatter `count` particles uniformly through `bounds`.
    pub fn new<R: Rng + ?Sized>(count: usize, bounds: Bounds, rng: &mut R) -> Self {
        let half = bounds.half_extents();
        let mut vertices = Vec::with_capacity(count * 2);

        for _ in 0..count {
            let position = [
                rng.gen_range(-half.x..half.x),
                rng.gen_range(-half.y..half.y),
                rng.gen_range(-half.z..half.z),
            ];
            let seed: f32 = rng.gen();
            let speed_factor = rng.gen_range(MIN_SPEED_FACTOR..=MAX_SPEED_FACTOR);

            let head = RainVertex {
                position,
                seed,
                speed_factor,
                is_tail: 0.0,
            };
            vertices.push(head);
            vertices.push(RainVertex { is_tail: 1.0, ..head });
        }

        Self { vertices, bounds }
    }

    /// Build a buffer from explicit vertex pairs.
    ///
    /// Returns `None` if the slice has odd length or a pair is not a
    /// head followed by its matching tail.
    pub fn from_vertices(vertices: Vec<RainVertex>, bounds: Bounds) -> Option<Self> {
        if vertices.len() % 2 != 0 {
            return None;
        }
        let paired = vertices.chunks_exact(2).all(|pair| {
            !pair[0].is_tail()
                && pair[1].is_tail()
                && pair[0].position == pair[1].position
                && pair[0].seed == pair[1].seed
                && pair[0].speed_factor == pair[1].speed_factor
        });
        paired.then_some(Self { vertices, bounds })
    }

    /// Number of particles (half the vertex count).
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Vertex data in upload order.
    #[inline]
    pub fn vertices(&self) -> &[RainVertex] {
        &self.vertices
    }

    /// Head and tail of particle `index`.
    pub fn pair(&self, index: usize) -> (&RainVertex, &RainVertex) {
        (&self.vertices[index * 2], &self.vertices[index * 2 + 1])
    }

    /// Mutable head/tail pairs for the integrator.
    pub(crate) fn pairs_mut(&mut self) -> std::slice::ChunksExactMut<'_, RainVertex> {
        self.vertices.chunks_exact_mut(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<RainVertex>(), 24);
        let stride = RainVertex::layout().array_stride;
        assert_eq!(stride, 24);
    }

    #[test]
    fn test_population_and_pairing() {
        let mut rng = StdRng::seed_from_u64(7);
        let buffer = ParticleBuffer::new(500, Bounds::default(), &mut rng);

        assert_eq!(buffer.len(), 500);
        assert_eq!(buffer.vertices().len(), 1000);

        for i in 0..buffer.len() {
            let (head, tail) = buffer.pair(i);
            assert!(!head.is_tail());
            assert!(tail.is_tail());
            assert_eq!(head.position, tail.position);
            assert_eq!(head.seed, tail.seed);
            assert_eq!(head.speed_factor, tail.speed_factor);
        }
    }

    #[test]
    fn test_initial_values_in_range() {
        let bounds = Bounds::default();
        let half = bounds.half_extents();
        let mut rng = StdRng::seed_from_u64(42);
        let buffer = ParticleBuffer::new(2000, bounds, &mut rng);

        for v in buffer.vertices() {
            let [x, y, z] = v.position;
            assert!(x.abs() <= half.x && y.abs() <= half.y && z.abs() <= half.z);
            assert!((0.0..1.0).contains(&v.seed));
            assert!((MIN_SPEED_FACTOR..=MAX_SPEED_FACTOR).contains(&v.speed_factor));
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = ParticleBuffer::new(64, Bounds::default(), &mut StdRng::seed_from_u64(3));
        let b = ParticleBuffer::new(64, Bounds::default(), &mut StdRng::seed_from_u64(3));
        assert_eq!(a.vertices(), b.vertices());
    }

    #[test]
    fn test_from_vertices_rejects_unpaired() {
        let head = RainVertex {
            position: [0.0, 1.0, 0.0],
            seed: 0.5,
            speed_factor: 1.0,
            is_tail: 0.0,
        };
        let tail = RainVertex { is_tail: 1.0, ..head };

        assert!(ParticleBuffer::from_vertices(vec![head, tail], Bounds::default()).is_some());
        assert!(ParticleBuffer::from_vertices(vec![head], Bounds::default()).is_none());
        assert!(ParticleBuffer::from_vertices(vec![tail, head], Bounds::default()).is_none());

        let drifted = RainVertex { position: [0.0, 2.0, 0.0], ..tail };
        assert!(ParticleBuffer::from_vertices(vec![head, drifted], Bounds::default()).is_none());
    }

    #[test]
    fn test_contains_y() {
        let bounds = Bounds::default();
        assert!(bounds.contains_y(30.0));
        assert!(bounds.contains_y(-30.0));
        assert!(!bounds.contains_y(30.01));
    }
}
