//! GEMM compute kernels: WGSL source and compiled pipelines.

use crate::GpuDevice;
use std::fmt;
use std::str::FromStr;

/// Workgroup edge for both kernels (16×16 invocations per workgroup).
pub const TILE_SIZE: u32 = 16;

/// C[m, n] = A[m, k] @ B[k, n], row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GemmShape {
    pub m: usize,
    pub k: usize,
    pub n: usize,
}

impl GemmShape {
    pub fn square(n: usize) -> Self {
        Self { m: n, k: n, n }
    }

    pub fn a_len(&self) -> usize { self.m * self.k }
    pub fn b_len(&self) -> usize { self.k * self.n }
    pub fn c_len(&self) -> usize { self.m * self.n }

    pub fn is_empty(&self) -> bool {
        self.m == 0 || self.k == 0 || self.n == 0
    }

    /// `GemmDims` uniform: rows, cols, inner, padding.
    pub(crate) fn uniform(&self) -> [u32; 4] {
        [self.m as u32, self.n as u32, self.k as u32, 0]
    }
}

/// Which device kernel computes the product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Kernel {
    /// One invocation per output element; the innermost loop accumulates the
    /// dot product of a row of A and a column of B straight from storage.
    #[default]
    Naive,
    /// Workgroup shared-memory tiling: each 16×16 workgroup stages tiles of
    /// A and B before accumulating.
    Tiled,
}

impl Kernel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::Tiled => "tiled",
        }
    }

    pub fn wgsl(self) -> String {
        match self {
            Self::Naive => naive_wgsl(),
            Self::Tiled => tiled_wgsl(),
        }
    }

    /// Workgroup counts (x over columns, y over rows) covering C.
    pub fn workgroups(self, shape: GemmShape) -> (u32, u32) {
        (
            (shape.n as u32).div_ceil(TILE_SIZE),
            (shape.m as u32).div_ceil(TILE_SIZE),
        )
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" => Ok(Self::Naive),
            "tiled" => Ok(Self::Tiled),
            other => Err(format!("unknown kernel `{other}` (expected naive or tiled)")),
        }
    }
}

/// Buffer bindings in group 0, by slot: A, B, C, then the shape uniform.
const BINDINGS: [wgpu::BufferBindingType; 4] = [
    wgpu::BufferBindingType::Storage { read_only: true },
    wgpu::BufferBindingType::Storage { read_only: true },
    wgpu::BufferBindingType::Storage { read_only: false },
    wgpu::BufferBindingType::Uniform,
];

/// A compiled GEMM kernel and the layout its operands are bound through.
pub struct GemmPipeline {
    pub(crate) pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    kernel: Kernel,
}

impl GemmPipeline {
    /// Compile `kernel` for `device`.
    pub fn new(device: &GpuDevice, kernel: Kernel) -> Self {
        let dev = &device.device;
        let entries: Vec<_> = BINDINGS
            .iter()
            .zip(0u32..)
            .map(|(&ty, binding)| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();
        let layout = dev.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mmul-gpu operands"),
            entries: &entries,
        });

        let module = dev.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(kernel.name()),
            source: wgpu::ShaderSource::Wgsl(kernel.wgsl().into()),
        });
        let pipeline = dev.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(kernel.name()),
            layout: Some(&dev.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(kernel.name()),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            })),
            module: &module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        tracing::debug!(%kernel, "compiled GEMM pipeline");
        Self { pipeline, layout, kernel }
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Bind A, B, C and the shape uniform, in slot order.
    pub(crate) fn bind(&self, device: &GpuDevice, buffers: [&wgpu::Buffer; 4]) -> wgpu::BindGroup {
        let entries: Vec<_> = buffers
            .iter()
            .zip(0u32..)
            .map(|(buffer, binding)| wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        device.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mmul-gpu operands"),
            layout: &self.layout,
            entries: &entries,
        })
    }
}

// Field order matches `GemmShape::uniform`.
const OPERANDS_WGSL: &str = r#"struct GemmDims {
    rows: u32,
    cols: u32,
    inner: u32,
    _pad: u32,
}

@group(0) @binding(0) var<storage, read> A: array<f32>;
@group(0) @binding(1) var<storage, read> B: array<f32>;
@group(0) @binding(2) var<storage, read_write> C: array<f32>;
@group(0) @binding(3) var<uniform> dims: GemmDims;
"#;

fn naive_wgsl() -> String {
    format!(
        r#"{OPERANDS_WGSL}
@compute @workgroup_size({TILE_SIZE}, {TILE_SIZE})
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let i = gid.y;
    let j = gid.x;
    if (i >= dims.rows || j >= dims.cols) {{
        return;
    }}

    var temp: f32 = 0.0;
    for (var k: u32 = 0u; k < dims.inner; k = k + 1u) {{
        temp = temp + A[i * dims.inner + k] * B[k * dims.cols + j];
    }}
    C[i * dims.cols + j] = temp;
}}
"#
    )
}

fn tiled_wgsl() -> String {
    format!(
        r#"{OPERANDS_WGSL}
const T: u32 = {TILE_SIZE}u;

var<workgroup> a_sub: array<array<f32, {TILE_SIZE}>, {TILE_SIZE}>;
var<workgroup> b_sub: array<array<f32, {TILE_SIZE}>, {TILE_SIZE}>;

fn a_at(r: u32, c: u32) -> f32 {{
    if (r < dims.rows && c < dims.inner) {{
        return A[r * dims.inner + c];
    }}
    return 0.0;
}}

fn b_at(r: u32, c: u32) -> f32 {{
    if (r < dims.inner && c < dims.cols) {{
        return B[r * dims.cols + c];
    }}
    return 0.0;
}}

@compute @workgroup_size({TILE_SIZE}, {TILE_SIZE})
fn main(
    @builtin(workgroup_id) wid: vec3<u32>,
    @builtin(local_invocation_id) lid: vec3<u32>,
) {{
    let i = wid.y * T + lid.y;
    let j = wid.x * T + lid.x;

    var sum: f32 = 0.0;
    for (var k0: u32 = 0u; k0 < dims.inner; k0 = k0 + T) {{
        a_sub[lid.y][lid.x] = a_at(i, k0 + lid.x);
        b_sub[lid.y][lid.x] = b_at(k0 + lid.y, j);
        workgroupBarrier();

        for (var kk: u32 = 0u; kk < T; kk = kk + 1u) {{
            sum = sum + a_sub[lid.y][kk] * b_sub[kk][lid.x];
        }}
        workgroupBarrier();
    }}

    if (i < dims.rows && j < dims.cols) {{
        C[i * dims.cols + j] = sum;
    }}
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kernel() {
        assert_eq!("naive".parse::<Kernel>().unwrap(), Kernel::Naive);
        assert_eq!("Tiled".parse::<Kernel>().unwrap(), Kernel::Tiled);
        assert!("blocked".parse::<Kernel>().is_err());
        assert_eq!(Kernel::default(), Kernel::Naive);
    }

    #[test]
    fn workgroups_cover_output() {
        assert_eq!(Kernel::Naive.workgroups(GemmShape::square(1024)), (64, 64));
        assert_eq!(Kernel::Tiled.workgroups(GemmShape::square(17)), (2, 2));
        let shape = GemmShape { m: 5, k: 3, n: 40 };
        assert_eq!(Kernel::Naive.workgroups(shape), (3, 1));
    }

    #[test]
    fn shader_sources_substitute_constants() {
        let naive = Kernel::Naive.wgsl();
        assert!(naive.contains("@workgroup_size(16, 16)"));
        assert!(naive.contains("A[i * dims.inner + k] * B[k * dims.cols + j]"));
        assert!(!naive.contains("{TILE_SIZE}"));

        let tiled = Kernel::Tiled.wgsl();
        assert!(tiled.contains("array<array<f32, 16>, 16>"));
        assert!(tiled.contains("workgroupBarrier()"));
    }

    #[test]
    fn shape_lengths() {
        let s = GemmShape { m: 2, k: 3, n: 4 };
        assert_eq!((s.a_len(), s.b_len(), s.c_len()), (6, 12, 8));
        assert_eq!(s.uniform(), [2, 4, 3, 0]);
        assert!(GemmShape::square(0).is_empty());
    }
}
