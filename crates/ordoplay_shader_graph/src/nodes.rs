// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in shader node types.
//!
//! Socket internal names are what the renderer sees after flattening, so they
//! follow the renderer's parameter names rather than the display names.
//! Constant nodes keep their constant on an input socket named `value`;
//! only inputs are flattened and saved.

use crate::curve::{CurveInterpolation, CurveValue};
use crate::node::{NodeCategory, NodeRegistry, NodeType};
use crate::socket::{EnumOption, FloatValue, IntValue, Socket, SocketType, SocketValue, StringEnumValue};

/// Type ID of the material output node. A graph has exactly one.
pub const MATERIAL_OUTPUT: &str = "material_output";
/// Type ID of the constant value node
pub const VALUE: &str = "value";

fn float(value: f32, min: f32, max: f32) -> SocketValue {
    SocketValue::Float(FloatValue::new(value, min, max))
}

fn color(r: f32, g: f32, b: f32) -> SocketValue {
    SocketValue::Color([r, g, b])
}

fn choice(options: &[&str], selected: &str) -> SocketValue {
    let options = options.iter().map(|o| EnumOption::new(*o, *o)).collect();
    SocketValue::StringEnum(StringEnumValue::new(options, selected))
}

fn curve() -> SocketValue {
    SocketValue::Curve(CurveValue::identity(CurveInterpolation::CubicHermite))
}

/// Create the shader graph node registry with all available node types
pub fn create_shader_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Output
    // ========================================================================

    registry.register(NodeType {
        id: MATERIAL_OUTPUT.to_string(),
        name: "Material Output".to_string(),
        category: NodeCategory::Output,
        description: "Final material output".to_string(),
        inputs: vec![
            Socket::linked_input("Surface", "surface", SocketType::Closure),
            Socket::linked_input("Volume", "volume", SocketType::Closure),
            Socket::linked_input("Displacement", "displacement", SocketType::Vector),
        ],
        outputs: vec![],
    });

    // ========================================================================
    // Input
    // ========================================================================

    registry.register(NodeType {
        id: VALUE.to_string(),
        name: "Value".to_string(),
        category: NodeCategory::Input,
        description: "Constant float value".to_string(),
        inputs: vec![Socket::input("Value", "value", SocketValue::Float(FloatValue::unbounded(0.0)))],
        outputs: vec![Socket::output("Value", "out", SocketType::Float)],
    });

    registry.register(NodeType {
        id: "rgb".to_string(),
        name: "RGB".to_string(),
        category: NodeCategory::Input,
        description: "Constant color value".to_string(),
        inputs: vec![Socket::input("Color", "value", color(0.5, 0.5, 0.5))],
        outputs: vec![Socket::output("Color", "color", SocketType::Color)],
    });

    registry.register(NodeType {
        id: "fresnel".to_string(),
        name: "Fresnel".to_string(),
        category: NodeCategory::Input,
        description: "Dielectric fresnel weight".to_string(),
        inputs: vec![
            Socket::input("IOR", "ior", float(1.45, 0.0, 100.0)),
            Socket::linked_input("Normal", "normal", SocketType::Vector),
        ],
        outputs: vec![Socket::output("Fac", "fac", SocketType::Float)],
    });

    registry.register(NodeType {
        id: "texture_coordinate".to_string(),
        name: "Texture Coordinate".to_string(),
        category: NodeCategory::Input,
        description: "Texture coordinate spaces".to_string(),
        inputs: vec![Socket::input("From Dupli", "from_dupli", SocketValue::Boolean(false))],
        outputs: vec![
            Socket::output("Generated", "generated", SocketType::Vector),
            Socket::output("Normal", "normal", SocketType::Vector),
            Socket::output("UV", "uv", SocketType::Vector),
            Socket::output("Object", "object", SocketType::Vector),
        ],
    });

    // ========================================================================
    // Shader
    // ========================================================================

    registry.register(NodeType {
        id: "principled_bsdf".to_string(),
        name: "Principled BSDF".to_string(),
        category: NodeCategory::Shader,
        description: "Physically based surface shader".to_string(),
        inputs: vec![
            Socket::input("Distribution", "distribution", choice(&["GGX", "Multiscatter GGX"], "Multiscatter GGX")),
            Socket::input("Base Color", "base_color", color(0.8, 0.8, 0.8)),
            Socket::input("Metallic", "metallic", float(0.0, 0.0, 1.0)),
            Socket::input("Roughness", "roughness", float(0.5, 0.0, 1.0)),
            Socket::input("Specular", "specular", float(0.5, 0.0, 1.0)),
            Socket::input("IOR", "ior", float(1.45, 0.0, 100.0)),
            Socket::input("Transmission", "transmission", float(0.0, 0.0, 1.0)),
            Socket::linked_input("Normal", "normal", SocketType::Vector),
        ],
        outputs: vec![Socket::output("BSDF", "BSDF", SocketType::Closure)],
    });

    registry.register(NodeType {
        id: "diffuse_bsdf".to_string(),
        name: "Diffuse BSDF".to_string(),
        category: NodeCategory::Shader,
        description: "Lambertian and Oren-Nayar diffuse reflection".to_string(),
        inputs: vec![
            Socket::input("Color", "color", color(0.8, 0.8, 0.8)),
            Socket::input("Roughness", "roughness", float(0.0, 0.0, 1.0)),
            Socket::linked_input("Normal", "normal", SocketType::Vector),
        ],
        outputs: vec![Socket::output("BSDF", "BSDF", SocketType::Closure)],
    });

    registry.register(NodeType {
        id: "emission".to_string(),
        name: "Emission".to_string(),
        category: NodeCategory::Shader,
        description: "Light emission".to_string(),
        inputs: vec![
            Socket::input("Color", "color", color(1.0, 1.0, 1.0)),
            Socket::input("Strength", "strength", float(1.0, 0.0, 1_000_000.0)),
        ],
        outputs: vec![Socket::output("Emission", "emission", SocketType::Closure)],
    });

    registry.register(NodeType {
        id: "mix_shader".to_string(),
        name: "Mix Shader".to_string(),
        category: NodeCategory::Shader,
        description: "Blend two closures".to_string(),
        inputs: vec![
            Socket::input("Fac", "fac", float(0.5, 0.0, 1.0)),
            Socket::linked_input("Closure1", "closure1", SocketType::Closure),
            Socket::linked_input("Closure2", "closure2", SocketType::Closure),
        ],
        outputs: vec![Socket::output("Closure", "closure", SocketType::Closure)],
    });

    // ========================================================================
    // Texture
    // ========================================================================

    registry.register(NodeType {
        id: "noise_texture".to_string(),
        name: "Noise Texture".to_string(),
        category: NodeCategory::Texture,
        description: "Perlin noise".to_string(),
        inputs: vec![
            Socket::input("Scale", "scale", float(5.0, -1000.0, 1000.0)),
            Socket::input("Detail", "detail", float(2.0, 0.0, 16.0)),
            Socket::input("Distortion", "distortion", float(0.0, -1000.0, 1000.0)),
            Socket::linked_input("Vector", "vector", SocketType::Vector),
        ],
        outputs: vec![
            Socket::output("Color", "color", SocketType::Color),
            Socket::output("Fac", "fac", SocketType::Float),
        ],
    });

    registry.register(NodeType {
        id: "brick_texture".to_string(),
        name: "Brick Texture".to_string(),
        category: NodeCategory::Texture,
        description: "Procedural brick pattern".to_string(),
        inputs: vec![
            Socket::input("Offset", "offset", float(0.5, 0.0, 1.0)),
            Socket::input("Offset Frequency", "offset_frequency", SocketValue::Int(IntValue::new(2, 1, 99))),
            Socket::input("Squash", "squash", float(1.0, 0.0, 99.0)),
            Socket::input("Squash Frequency", "squash_frequency", SocketValue::Int(IntValue::new(2, 1, 99))),
            Socket::input("Color1", "color1", color(0.8, 0.8, 0.8)),
            Socket::input("Color2", "color2", color(0.2, 0.2, 0.2)),
            Socket::input("Mortar", "mortar", color(0.0, 0.0, 0.0)),
            Socket::input("Scale", "scale", float(5.0, -1000.0, 1000.0)),
            Socket::linked_input("Vector", "vector", SocketType::Vector),
        ],
        outputs: vec![
            Socket::output("Color", "color", SocketType::Color),
            Socket::output("Fac", "fac", SocketType::Float),
        ],
    });

    registry.register(NodeType {
        id: "image_texture".to_string(),
        name: "Image Texture".to_string(),
        category: NodeCategory::Texture,
        description: "Sample an image file".to_string(),
        inputs: vec![
            Socket::input("Interpolation", "interpolation", choice(&["Linear", "Closest", "Cubic", "Smart"], "Linear")),
            Socket::input("Projection", "projection", choice(&["Flat", "Box", "Sphere", "Tube"], "Flat")),
            Socket::input("Extension", "extension", choice(&["Repeat", "Extend", "Clip"], "Repeat")),
            Socket::linked_input("Vector", "vector", SocketType::Vector),
        ],
        outputs: vec![
            Socket::output("Color", "color", SocketType::Color),
            Socket::output("Alpha", "alpha", SocketType::Float),
        ],
    });

    // ========================================================================
    // Color
    // ========================================================================

    registry.register(NodeType {
        id: "rgb_curves".to_string(),
        name: "RGB Curves".to_string(),
        category: NodeCategory::Color,
        description: "Remap color channels through curves".to_string(),
        inputs: vec![
            Socket::input("All", "curve_all", curve()),
            Socket::input("R", "curve_r", curve()),
            Socket::input("G", "curve_g", curve()),
            Socket::input("B", "curve_b", curve()),
            Socket::input("Fac", "fac", float(1.0, 0.0, 1.0)),
            Socket::input("Color", "color", color(1.0, 1.0, 1.0)),
        ],
        outputs: vec![Socket::output("Color", "color", SocketType::Color)],
    });

    registry.register(NodeType {
        id: "mix_rgb".to_string(),
        name: "Mix RGB".to_string(),
        category: NodeCategory::Color,
        description: "Blend two colors".to_string(),
        inputs: vec![
            Socket::input("Type", "type", choice(&["Mix", "Add", "Multiply", "Screen", "Overlay"], "Mix")),
            Socket::input("Use Clamp", "use_clamp", SocketValue::Boolean(false)),
            Socket::input("Fac", "fac", float(0.5, 0.0, 1.0)),
            Socket::input("Color1", "color1", color(0.5, 0.5, 0.5)),
            Socket::input("Color2", "color2", color(0.5, 0.5, 0.5)),
        ],
        outputs: vec![Socket::output("Color", "color", SocketType::Color)],
    });

    // ========================================================================
    // Vector
    // ========================================================================

    registry.register(NodeType {
        id: "vector_curves".to_string(),
        name: "Vector Curves".to_string(),
        category: NodeCategory::Vector,
        description: "Remap vector components through curves".to_string(),
        inputs: vec![
            Socket::input("X", "curve_x", curve()),
            Socket::input("Y", "curve_y", curve()),
            Socket::input("Z", "curve_z", curve()),
            Socket::input("Fac", "fac", float(1.0, 0.0, 1.0)),
            Socket::input("Vector", "vector", SocketValue::Vector([0.0, 0.0, 0.0])),
        ],
        outputs: vec![Socket::output("Vector", "vector", SocketType::Vector)],
    });

    registry.register(NodeType {
        id: "bump".to_string(),
        name: "Bump".to_string(),
        category: NodeCategory::Vector,
        description: "Perturb the normal from a height value".to_string(),
        inputs: vec![
            Socket::input("Invert", "invert", SocketValue::Boolean(false)),
            Socket::input("Strength", "strength", float(1.0, 0.0, 1.0)),
            Socket::input("Distance", "distance", float(0.1, 0.0, 1000.0)),
            Socket::input("Height", "height", float(1.0, -1000.0, 1000.0)),
            Socket::linked_input("Normal", "normal", SocketType::Vector),
        ],
        outputs: vec![Socket::output("Normal", "normal", SocketType::Vector)],
    });

    // ========================================================================
    // Converter
    // ========================================================================

    registry.register(NodeType {
        id: "math".to_string(),
        name: "Math".to_string(),
        category: NodeCategory::Converter,
        description: "Scalar math operation".to_string(),
        inputs: vec![
            Socket::input(
                "Type",
                "type",
                choice(&["Add", "Subtract", "Multiply", "Divide", "Power", "Minimum", "Maximum"], "Add"),
            ),
            Socket::input("Use Clamp", "use_clamp", SocketValue::Boolean(false)),
            Socket::input("Value1", "value1", float(0.5, -10_000.0, 10_000.0)),
            Socket::input("Value2", "value2", float(0.5, -10_000.0, 10_000.0)),
        ],
        outputs: vec![Socket::output("Value", "value", SocketType::Float)],
    });

    registry.register(NodeType {
        id: "rgb_to_bw".to_string(),
        name: "RGB to BW".to_string(),
        category: NodeCategory::Converter,
        description: "Color to luminance".to_string(),
        inputs: vec![Socket::input("Color", "color", color(0.5, 0.5, 0.5))],
        outputs: vec![Socket::output("Val", "val", SocketType::Float)],
    });

    registry
}
