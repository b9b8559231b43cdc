//! GL side of the render loop: a [`GlowBackend`] that compiles and
//! links composed shader sources, and a [`ScenePainter`] that owns the
//! full-screen quad and draws the active program with the per-frame
//! uniform snapshot.

use std::sync::Arc;

use eframe::glow::{self, HasContext};

use plotline_render::{BuildError, FrameUniforms, ProgramBackend, ProgramSlot, ShaderSource};

/// Uniform locations resolved once at link time. A location is `None`
/// when the linker optimized the uniform away (e.g. an empty graph set
/// never reads `time`); binding a `None` location is a no-op.
struct UniformLocations {
    window_size: Option<glow::UniformLocation>,
    position: Option<glow::UniformLocation>,
    zoom: Option<glow::UniformLocation>,
    subline_period: Option<glow::UniformLocation>,
    microline_period: Option<glow::UniformLocation>,
    time: Option<glow::UniformLocation>,
}

/// A linked program plus its resolved uniform locations.
pub struct LinkedProgram {
    raw: glow::Program,
    uniforms: UniformLocations,
}

/// [`ProgramBackend`] over a shared glow context.
pub struct GlowBackend {
    gl: Arc<glow::Context>,
}

impl GlowBackend {
    pub fn new(gl: Arc<glow::Context>) -> Self {
        Self { gl }
    }

    fn compile_shader(&self, stage: u32, source: &str) -> Result<glow::Shader, BuildError> {
        let gl = &self.gl;
        unsafe {
            let shader = gl.create_shader(stage).map_err(BuildError::Allocation)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let info = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                let err = if stage == glow::VERTEX_SHADER {
                    BuildError::VertexCompile(info)
                } else {
                    BuildError::FragmentCompile(info)
                };
                return Err(err);
            }
            Ok(shader)
        }
    }
}

impl ProgramBackend for GlowBackend {
    type Program = LinkedProgram;

    fn build(&mut self, source: &ShaderSource) -> Result<LinkedProgram, BuildError> {
        let vertex = self.compile_shader(glow::VERTEX_SHADER, &source.vertex)?;
        let fragment = match self.compile_shader(glow::FRAGMENT_SHADER, &source.fragment) {
            Ok(shader) => shader,
            Err(err) => {
                unsafe { self.gl.delete_shader(vertex) };
                return Err(err);
            }
        };

        let gl = &self.gl;
        unsafe {
            let program = match gl.create_program() {
                Ok(program) => program,
                Err(info) => {
                    gl.delete_shader(vertex);
                    gl.delete_shader(fragment);
                    return Err(BuildError::Allocation(info));
                }
            };
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);

            if !gl.get_program_link_status(program) {
                let info = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(BuildError::Link(info));
            }

            let uniforms = UniformLocations {
                window_size: gl.get_uniform_location(program, "windowSize"),
                position: gl.get_uniform_location(program, "position"),
                zoom: gl.get_uniform_location(program, "zoom"),
                subline_period: gl.get_uniform_location(program, "sublinePeriod"),
                microline_period: gl.get_uniform_location(program, "microlinePeriod"),
                time: gl.get_uniform_location(program, "time"),
            };
            Ok(LinkedProgram { raw: program, uniforms })
        }
    }

    fn destroy(&mut self, program: LinkedProgram) {
        unsafe { self.gl.delete_program(program.raw) };
    }
}

/// Clip-space corners of the full-screen quad.
const QUAD_VERTICES: [f32; 8] = [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0, -1.0];
const QUAD_INDICES: [u32; 6] = [2, 0, 3, 2, 1, 0];

/// Owns the quad geometry, the program slot and the latest uniform
/// snapshot. `paint` runs inside the UI's GL callback; everything else
/// runs on the UI thread between frames.
pub struct ScenePainter {
    backend: GlowBackend,
    slot: ProgramSlot<LinkedProgram>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    uniforms: FrameUniforms,
}

impl ScenePainter {
    pub fn new(gl: Arc<glow::Context>) -> Result<Self, BuildError> {
        let (vao, vbo, ebo) = unsafe {
            let vao = gl.create_vertex_array().map_err(BuildError::Allocation)?;
            let vbo = match gl.create_buffer() {
                Ok(buffer) => buffer,
                Err(info) => {
                    gl.delete_vertex_array(vao);
                    return Err(BuildError::Allocation(info));
                }
            };
            let ebo = match gl.create_buffer() {
                Ok(buffer) => buffer,
                Err(info) => {
                    gl.delete_buffer(vbo);
                    gl.delete_vertex_array(vao);
                    return Err(BuildError::Allocation(info));
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                as_bytes(&QUAD_VERTICES),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                as_bytes(&QUAD_INDICES),
                glow::STATIC_DRAW,
            );
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 2 * 4, 0);
            gl.enable_vertex_attrib_array(0);
            gl.bind_vertex_array(None);

            (vao, vbo, ebo)
        };

        Ok(Self {
            backend: GlowBackend::new(gl),
            slot: ProgramSlot::new(),
            vao,
            vbo,
            ebo,
            uniforms: FrameUniforms {
                window_size: [0.0, 0.0],
                position: [0.0, 0.0],
                zoom: 1.0,
                subline_period: 1.0,
                microline_period: 0.1,
                time: 0.0,
            },
        })
    }

    /// Swap in a build of `source`; see [`ProgramSlot::rebuild`] for
    /// the failure contract.
    pub fn rebuild(&mut self, source: &ShaderSource) -> bool {
        self.slot.rebuild(&mut self.backend, source)
    }

    pub fn has_program(&self) -> bool {
        self.slot.has_active()
    }

    pub fn set_uniforms(&mut self, uniforms: FrameUniforms) {
        self.uniforms = uniforms;
    }

    /// Draw the quad with the active program. Called from the GL paint
    /// callback with viewport and scissor already set to the plot rect.
    pub fn paint(&self) {
        let Some(program) = self.slot.active() else {
            return;
        };
        let gl = &self.backend.gl;
        let u = &self.uniforms;
        let locs = &program.uniforms;
        unsafe {
            gl.use_program(Some(program.raw));
            gl.uniform_2_f32(locs.window_size.as_ref(), u.window_size[0], u.window_size[1]);
            gl.uniform_2_f32(locs.position.as_ref(), u.position[0], u.position[1]);
            gl.uniform_1_f32(locs.zoom.as_ref(), u.zoom);
            gl.uniform_1_f32(locs.subline_period.as_ref(), u.subline_period);
            gl.uniform_1_f32(locs.microline_period.as_ref(), u.microline_period);
            gl.uniform_1_f32(locs.time.as_ref(), u.time);

            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, QUAD_INDICES.len() as i32, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
            gl.use_program(None);
        }
    }

    /// Release every GL object. The painter must not be used after.
    pub fn destroy(&mut self) {
        self.slot.clear(&mut self.backend);
        let gl = &self.backend.gl;
        unsafe {
            gl.delete_buffer(self.ebo);
            gl.delete_buffer(self.vbo);
            gl.delete_vertex_array(self.vao);
        }
    }
}

fn as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    // Plain-old-data reinterpretation for buffer uploads.
    unsafe {
        std::slice::from_raw_parts(data.as_ptr().cast::<u8>(), std::mem::size_of_val(data))
    }
}
