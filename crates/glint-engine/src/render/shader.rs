//! Shader program compilation, linking and reflection.
//!
//! Each WGSL stage is parsed and validated on its own (compile), then the pair is
//! checked for interface compatibility (link). Reflection of the vertex-stage
//! uniform block gives byte offsets by member name, which is how uniforms are
//! addressed by name.

use std::collections::BTreeMap;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Module, Scalar, TypeInner, VectorSize};

use crate::error::{GfxError, ShaderStage};

use super::mesh::AttributeFormat;

/// Group/binding the uniform block must use.
pub const UNIFORM_GROUP: u32 = 0;
pub const UNIFORM_BINDING: u32 = 0;

/// A compiled, linked vertex + fragment pair.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    vertex: StageSource,
    fragment: StageSource,
    vertex_inputs: Vec<(u32, Option<AttributeFormat>)>,
    uniforms: Option<UniformBlock>,
}

#[derive(Debug, Clone)]
struct StageSource {
    source: String,
    entry_point: String,
}

/// Reflected layout of the vertex-stage uniform block.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    /// Size of the block in bytes.
    pub size: u64,
    members: Vec<UniformMember>,
}

#[derive(Debug, Clone, PartialEq)]
struct UniformMember {
    name: String,
    offset: u32,
    is_mat4: bool,
}

impl UniformBlock {
    /// Byte offset of the `mat4x4<f32>` member called `name`.
    pub fn mat4_offset(&self, name: &str) -> Option<u32> {
        self.members
            .iter()
            .find(|m| m.is_mat4 && m.name == name)
            .map(|m| m.offset)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }
}

impl ShaderProgram {
    pub fn vertex_source(&self) -> &str {
        &self.vertex.source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment.source
    }

    pub fn vertex_entry_point(&self) -> &str {
        &self.vertex.entry_point
    }

    pub fn fragment_entry_point(&self) -> &str {
        &self.fragment.entry_point
    }

    pub fn uniforms(&self) -> Option<&UniformBlock> {
        self.uniforms.as_ref()
    }

    /// Checks that every vertex-stage input is fed by `attributes`
    /// (`(location, format)` pairs) with the same format.
    pub fn check_vertex_inputs(&self, attributes: &[(u32, AttributeFormat)]) -> Result<(), GfxError> {
        for &(location, format) in &self.vertex_inputs {
            let provided = attributes.iter().find(|(l, _)| *l == location).map(|(_, f)| *f);
            match (provided, format) {
                (None, _) => {
                    return Err(GfxError::link(format!(
                        "vertex input @location({location}) has no matching vertex attribute"
                    )));
                }
                (Some(p), Some(f)) if p == f => {}
                (Some(p), f) => {
                    return Err(GfxError::link(format!(
                        "vertex input @location({location}) expects {f:?}, attribute provides {p:?}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Compiles both stages and links them into a program.
pub fn compile_program(vertex_src: &str, fragment_src: &str) -> Result<ShaderProgram, GfxError> {
    let vs = compile_stage(vertex_src, ShaderStage::Vertex)?;
    let fs = compile_stage(fragment_src, ShaderStage::Fragment)?;

    let vs_entry = find_entry(&vs, naga::ShaderStage::Vertex)
        .ok_or_else(|| GfxError::link("vertex shader has no @vertex entry point"))?;
    let fs_entry = find_entry(&fs, naga::ShaderStage::Fragment)
        .ok_or_else(|| GfxError::link("fragment shader has no @fragment entry point"))?;

    // Vertex outputs must cover fragment inputs.
    let mut vs_outputs = BTreeMap::new();
    if let Some(result) = &vs_entry.function.result {
        collect_locations(&vs, result.ty, result.binding.as_ref(), &mut vs_outputs);
    }

    let mut fs_inputs = BTreeMap::new();
    for arg in &fs_entry.function.arguments {
        collect_locations(&fs, arg.ty, arg.binding.as_ref(), &mut fs_inputs);
    }

    for (location, ty) in &fs_inputs {
        match vs_outputs.get(location) {
            None => {
                return Err(GfxError::link(format!(
                    "fragment input @location({location}) is not written by the vertex stage"
                )));
            }
            Some(out_ty) if out_ty != ty => {
                return Err(GfxError::link(format!(
                    "@location({location}) type mismatch: vertex writes {out_ty:?}, fragment reads {ty:?}"
                )));
            }
            Some(_) => {}
        }
    }

    let mut fs_outputs = BTreeMap::new();
    if let Some(result) = &fs_entry.function.result {
        collect_locations(&fs, result.ty, result.binding.as_ref(), &mut fs_outputs);
    }
    if !fs_outputs.contains_key(&0) {
        return Err(GfxError::link("fragment shader does not write @location(0)"));
    }

    let mut vs_inputs = BTreeMap::new();
    for arg in &vs_entry.function.arguments {
        collect_locations(&vs, arg.ty, arg.binding.as_ref(), &mut vs_inputs);
    }
    let vertex_inputs = vs_inputs
        .into_iter()
        .map(|(location, ty)| (location, attribute_format(&ty)))
        .collect();

    if has_resources(&fs) {
        return Err(GfxError::link("fragment-stage resource bindings are not supported"));
    }
    let uniforms = reflect_uniforms(&vs)?;

    Ok(ShaderProgram {
        vertex: StageSource {
            source: vertex_src.to_string(),
            entry_point: vs_entry.name.clone(),
        },
        fragment: StageSource {
            source: fragment_src.to_string(),
            entry_point: fs_entry.name.clone(),
        },
        vertex_inputs,
        uniforms,
    })
}

fn compile_stage(src: &str, stage: ShaderStage) -> Result<Module, GfxError> {
    let module = naga::front::wgsl::parse_str(src).map_err(|e| GfxError::ShaderCompile {
        stage,
        log: e.emit_to_string(src),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| GfxError::ShaderCompile {
            stage,
            log: e.emit_to_string(src),
        })?;

    Ok(module)
}

fn find_entry(module: &Module, stage: naga::ShaderStage) -> Option<&naga::EntryPoint> {
    let mut matching = module.entry_points.iter().filter(|ep| ep.stage == stage);
    let first = matching.next()?;
    if matching.next().is_some() {
        log::debug!("multiple {stage:?} entry points; using `{}`", first.name);
    }
    Some(first)
}

/// Flattens `@location` bindings of an entry point argument or result.
///
/// Unbound values are structs whose members carry the bindings.
fn collect_locations(
    module: &Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut BTreeMap<u32, TypeInner>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.insert(*location, module.types[ty].inner.clone());
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_locations(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn attribute_format(ty: &TypeInner) -> Option<AttributeFormat> {
    match *ty {
        TypeInner::Scalar(Scalar::F32) => Some(AttributeFormat::Float32),
        TypeInner::Vector { size, scalar: Scalar::F32 } => Some(match size {
            VectorSize::Bi => AttributeFormat::Float32x2,
            VectorSize::Tri => AttributeFormat::Float32x3,
            VectorSize::Quad => AttributeFormat::Float32x4,
        }),
        _ => None,
    }
}

fn has_resources(module: &Module) -> bool {
    module
        .global_variables
        .iter()
        .any(|(_, var)| var.binding.is_some())
}

fn reflect_uniforms(module: &Module) -> Result<Option<UniformBlock>, GfxError> {
    let mut block = None;

    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };

        if var.space != AddressSpace::Uniform {
            return Err(GfxError::link(format!(
                "unsupported resource `{}` in address space {:?}",
                var.name.as_deref().unwrap_or("?"),
                var.space
            )));
        }
        if binding.group != UNIFORM_GROUP || binding.binding != UNIFORM_BINDING {
            return Err(GfxError::link(format!(
                "uniform block must use @group({UNIFORM_GROUP}) @binding({UNIFORM_BINDING}), found @group({}) @binding({})",
                binding.group, binding.binding
            )));
        }
        if block.is_some() {
            return Err(GfxError::link("only one uniform block is supported"));
        }

        let TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            return Err(GfxError::link("uniform block must be a struct"));
        };

        let members = members
            .iter()
            .map(|m| UniformMember {
                name: m.name.clone().unwrap_or_default(),
                offset: m.offset,
                is_mat4: matches!(
                    module.types[m.ty].inner,
                    TypeInner::Matrix {
                        columns: VectorSize::Quad,
                        rows: VectorSize::Quad,
                        scalar: Scalar::F32,
                    }
                ),
            })
            .collect();

        block = Some(UniformBlock {
            size: u64::from(*span),
            members,
        });
    }

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mesh::Vertex;
    use crate::render::shaders::{COLOR_FRAGMENT, FLAT_VERTEX, TRANSFORM_VERTEX};

    // ── built-in programs ─────────────────────────────────────────────────

    #[test]
    fn flat_program_links_without_uniforms() {
        let p = compile_program(FLAT_VERTEX, COLOR_FRAGMENT).unwrap();
        assert!(p.uniforms().is_none());
        assert_eq!(p.vertex_entry_point(), "vs_main");
        assert_eq!(p.fragment_entry_point(), "fs_main");
        p.check_vertex_inputs(&Vertex::ATTRIBUTES).unwrap();
    }

    #[test]
    fn transform_program_reflects_matrix_offsets() {
        let p = compile_program(TRANSFORM_VERTEX, COLOR_FRAGMENT).unwrap();
        let block = p.uniforms().unwrap();
        assert_eq!(block.size, 192);
        assert_eq!(block.mat4_offset("world"), Some(0));
        assert_eq!(block.mat4_offset("view"), Some(64));
        assert_eq!(block.mat4_offset("proj"), Some(128));
        assert_eq!(block.mat4_offset("mWorld"), None);
        let names: Vec<_> = block.member_names().collect();
        assert_eq!(names, ["world", "view", "proj"]);
    }

    // ── compile errors ────────────────────────────────────────────────────

    #[test]
    fn syntax_error_is_a_compile_error_for_that_stage() {
        let err = compile_program("fn vs_main( {", COLOR_FRAGMENT).unwrap_err();
        match err {
            GfxError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = compile_program(FLAT_VERTEX, "@fragment fn fs_main() -> vec4<f32> {").unwrap_err();
        assert!(matches!(err, GfxError::ShaderCompile { stage: ShaderStage::Fragment, .. }));
    }

    #[test]
    fn type_error_is_a_compile_error() {
        let fs = r#"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                let x: f32 = vec3<f32>(1.0, 1.0, 1.0);
                return vec4<f32>(x, x, x, 1.0);
            }
        "#;
        let err = compile_program(FLAT_VERTEX, fs).unwrap_err();
        assert!(matches!(err, GfxError::ShaderCompile { stage: ShaderStage::Fragment, .. }));
    }

    // ── link errors ───────────────────────────────────────────────────────

    #[test]
    fn missing_fragment_entry_is_a_link_error() {
        let err = compile_program(FLAT_VERTEX, "fn helper() {}").unwrap_err();
        assert!(matches!(err, GfxError::ShaderLink { .. }));
    }

    #[test]
    fn unmatched_fragment_input_is_a_link_error() {
        let fs = r#"
            @fragment
            fn fs_main(@location(3) c: vec3<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(c, 1.0);
            }
        "#;
        let err = compile_program(FLAT_VERTEX, fs).unwrap_err();
        let GfxError::ShaderLink { log } = err else { panic!("expected link error") };
        assert!(log.contains("@location(3)"));
    }

    #[test]
    fn mismatched_interface_type_is_a_link_error() {
        let fs = r#"
            @fragment
            fn fs_main(@location(0) c: vec4<f32>) -> @location(0) vec4<f32> {
                return c;
            }
        "#;
        let err = compile_program(FLAT_VERTEX, fs).unwrap_err();
        assert!(matches!(err, GfxError::ShaderLink { .. }));
    }

    #[test]
    fn fragment_uniform_is_rejected() {
        let fs = r#"
            struct Tint { color: vec4<f32> };
            @group(0) @binding(0) var<uniform> tint: Tint;

            @fragment
            fn fs_main(@location(0) c: vec3<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(c, 1.0) * tint.color;
            }
        "#;
        let err = compile_program(FLAT_VERTEX, fs).unwrap_err();
        assert!(matches!(err, GfxError::ShaderLink { .. }));
    }

    #[test]
    fn uniform_on_wrong_binding_is_rejected() {
        let vs = TRANSFORM_VERTEX.replace("@binding(0)", "@binding(2)");
        let err = compile_program(&vs, COLOR_FRAGMENT).unwrap_err();
        assert!(matches!(err, GfxError::ShaderLink { .. }));
    }

    // ── vertex inputs ─────────────────────────────────────────────────────

    #[test]
    fn vertex_inputs_must_match_attributes() {
        let p = compile_program(FLAT_VERTEX, COLOR_FRAGMENT).unwrap();

        let missing = [(0, AttributeFormat::Float32x3)];
        assert!(p.check_vertex_inputs(&missing).is_err());

        let wrong = [(0, AttributeFormat::Float32x2), (1, AttributeFormat::Float32x3)];
        assert!(p.check_vertex_inputs(&wrong).is_err());
    }
}
