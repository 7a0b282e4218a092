//! `.rtr` scene file parser.
//!
//! The format is whitespace separated and organised in sections, each ended
//! by a `--` delimiter (or the end of the file):
//!
//! ```text
//! // comments run to the end of the line
//! lights
//! #0   -20 20 20   1.5          // position, intensity
//! --
//! materials
//! #0   ffcc00ff  0.6 0.3 0.1 0.0  50  1.0   // rgba, albedo x4, specular exponent, refractive index
//! --
//! objects
//! spheres
//! #0   -3 0 -16  2   0          // center, radius, material
//! planes
//! #1   0 -4 0  0 1 0   0        // point, normal, material
//! triangles
//! #2   0 0 -9  1 0 -9  0 1 -9   0
//! models
//! #3   bunny.obj  0 -4 -12  30   0   // file, shift, scale, material
//! --
//! scenes
//! #0   1024x768  0 0 0  0 0 0  1.05  4  { 0 1 2 3 } { 0 }
//! --
//! ```
//!
//! Every entry carries an explicit `#N` index. Indices may appear in any
//! order but must be dense once the section is complete.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

use rtr_math::{Color16, Vec3};
use thiserror::Error;

use crate::material::{Albedo, Light, Material};
use crate::primitive::{Plane, Sphere, Triangle};
use crate::scene::{Object, Scene};

/// Errors that can occur during `.rtr` parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("Invalid number '{text}' at line {line}")]
    InvalidNumber { line: usize, text: String },

    #[error("{section} #{index} defined twice (line {line})")]
    DuplicateIndex {
        section: &'static str,
        index: usize,
        line: usize,
    },

    #[error("{section} #{index} is missing; indices must be dense")]
    MissingIndex { section: &'static str, index: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A mesh entry whose triangles still live in an external OBJ file.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRef {
    pub path: String,
    pub shift: Vec3,
    pub scale: f64,
    pub material: usize,
}

/// An entry of the `objects` section.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectDecl {
    Inline(Object),
    Model(ModelRef),
}

/// Everything a `.rtr` file declares, before external meshes are loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RtrDocument {
    pub lights: Vec<Light>,
    pub materials: Vec<Material>,
    pub objects: Vec<ObjectDecl>,
    pub scenes: Vec<Scene>,
}

/// Parse `.rtr` content into a document.
pub fn parse_rtr(content: &str) -> ParseResult<RtrDocument> {
    RtrParser::new(content).parse()
}

#[derive(Clone, Copy, Debug)]
struct Token<'a> {
    line: usize,
    text: &'a str,
}

impl Token<'_> {
    fn is_delimiter(&self) -> bool {
        self.text.starts_with("--")
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ObjectKind {
    Sphere,
    Plane,
    Triangle,
    Model,
}

/// Token-level `.rtr` parser.
pub struct RtrParser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> RtrParser<'a> {
    /// Create a new parser from file contents.
    pub fn new(content: &'a str) -> Self {
        let mut tokens = Vec::new();

        for (i, line) in content.lines().enumerate() {
            for word in line.split_whitespace() {
                if word.starts_with("//") {
                    break;
                }
                split_braces(word, |text| tokens.push(Token { line: i + 1, text }));
            }
        }

        Self { tokens, pos: 0 }
    }

    /// Parse every section.
    pub fn parse(mut self) -> ParseResult<RtrDocument> {
        let mut doc = RtrDocument::default();
        let mut seen = HashSet::new();

        while let Some(token) = self.next() {
            if token.is_delimiter() {
                continue;
            }
            if !seen.insert(token.text) {
                return Err(self.error(token, format!("section '{}' appears twice", token.text)));
            }

            match token.text {
                "lights" => doc.lights = self.parse_lights()?,
                "materials" => doc.materials = self.parse_materials()?,
                "objects" => doc.objects = self.parse_objects()?,
                "scenes" => doc.scenes = self.parse_scenes()?,
                other => return Err(self.error(token, format!("unknown section '{}'", other))),
            }
        }

        log::debug!(
            "Parsed .rtr: {} lights, {} materials, {} objects, {} scenes",
            doc.lights.len(),
            doc.materials.len(),
            doc.objects.len(),
            doc.scenes.len()
        );
        Ok(doc)
    }

    fn parse_lights(&mut self) -> ParseResult<Vec<Light>> {
        let mut slots = Slots::new("light");
        while let Some(token) = self.entry_start() {
            let index = self.index(token)?;
            let position = self.vec3("light")?;
            let intensity = self.f64("light")?;
            slots.insert(index, token.line, Light::new(position, intensity))?;
        }
        slots.finish()
    }

    fn parse_materials(&mut self) -> ParseResult<Vec<Material>> {
        let mut slots = Slots::new("material");
        while let Some(token) = self.entry_start() {
            let index = self.index(token)?;
            let color = self.color()?;
            let albedo = Albedo::new(
                self.f64("material")?,
                self.f64("material")?,
                self.f64("material")?,
                self.f64("material")?,
            );
            let material = Material::new(color)
                .with_albedo(albedo)
                .with_specular_exponent(self.f64("material")?)
                .with_refractive_index(self.f64("material")?);
            slots.insert(index, token.line, material)?;
        }
        slots.finish()
    }

    fn parse_objects(&mut self) -> ParseResult<Vec<ObjectDecl>> {
        let mut slots = Slots::new("object");
        let mut kind = None;

        while let Some(token) = self.entry_start() {
            let group = match token.text {
                "spheres" => Some(ObjectKind::Sphere),
                "planes" => Some(ObjectKind::Plane),
                "triangles" => Some(ObjectKind::Triangle),
                "models" => Some(ObjectKind::Model),
                _ => None,
            };
            if group.is_some() {
                kind = group;
                continue;
            }

            let index = self.index(token)?;
            let decl = match kind {
                None => {
                    return Err(self.error(token, "object listed before any object group".into()))
                }
                Some(ObjectKind::Sphere) => {
                    let sphere = Sphere::new(self.vec3("sphere")?, self.f64("sphere")?);
                    ObjectDecl::Inline(Object::new(sphere, self.usize("sphere")?))
                }
                Some(ObjectKind::Plane) => {
                    let point = self.vec3("plane")?;
                    let normal = self.vec3("plane")?;
                    let plane = Plane::new(point, normal)
                        .map_err(|e| self.error(token, e.to_string()))?;
                    ObjectDecl::Inline(Object::new(plane, self.usize("plane")?))
                }
                Some(ObjectKind::Triangle) => {
                    let triangle =
                        Triangle::new(self.vec3("triangle")?, self.vec3("triangle")?, self.vec3("triangle")?);
                    ObjectDecl::Inline(Object::new(triangle, self.usize("triangle")?))
                }
                Some(ObjectKind::Model) => ObjectDecl::Model(ModelRef {
                    path: self.word("model")?.text.to_string(),
                    shift: self.vec3("model")?,
                    scale: self.f64("model")?,
                    material: self.usize("model")?,
                }),
            };
            slots.insert(index, token.line, decl)?;
        }
        slots.finish()
    }

    fn parse_scenes(&mut self) -> ParseResult<Vec<Scene>> {
        let mut slots = Slots::new("scene");
        while let Some(token) = self.entry_start() {
            let index = self.index(token)?;

            let size = self.word("scene")?;
            let (width, height): (u32, u32) = size
                .text
                .split_once('x')
                .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)))
                .ok_or_else(|| {
                    self.error(size, format!("expected image size WIDTHxHEIGHT, found '{}'", size.text))
                })?;

            let view_point = self.vec3("scene")?;
            let view_dir = self.vec3("scene")?;
            let fov = self.f64("scene")?;
            let depth: i32 = self.number("scene")?;
            let objects = self.index_list("scene")?;
            let lights = self.index_list("scene")?;

            let scene = Scene::new(width, height)
                .with_camera(view_point, view_dir, fov)
                .with_depth(depth)
                .with_objects(objects)
                .with_lights(lights);
            slots.insert(index, token.line, scene)?;
        }
        slots.finish()
    }

    // --- token helpers -----------------------------------------------------

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    /// Next token of the current section, or `None` at `--` / end of file.
    fn entry_start(&mut self) -> Option<Token<'a>> {
        let token = self.next()?;
        (!token.is_delimiter()).then_some(token)
    }

    fn word(&mut self, context: &'static str) -> ParseResult<Token<'a>> {
        self.next().ok_or(ParseError::UnexpectedEof(context))
    }

    fn number<T: std::str::FromStr>(&mut self, context: &'static str) -> ParseResult<T> {
        let token = self.word(context)?;
        token.text.parse().map_err(|_| ParseError::InvalidNumber {
            line: token.line,
            text: token.text.to_string(),
        })
    }

    fn f64(&mut self, context: &'static str) -> ParseResult<f64> {
        self.number(context)
    }

    fn usize(&mut self, context: &'static str) -> ParseResult<usize> {
        self.number(context)
    }

    fn vec3(&mut self, context: &'static str) -> ParseResult<Vec3> {
        Ok(Vec3::new(self.f64(context)?, self.f64(context)?, self.f64(context)?))
    }

    fn color(&mut self) -> ParseResult<Color16> {
        let token = self.word("material")?;
        let digits = token
            .text
            .strip_prefix("0x")
            .or_else(|| token.text.strip_prefix("0X"))
            .unwrap_or(token.text);
        u32::from_str_radix(digits, 16)
            .map(Color16::from_rgba_hex)
            .map_err(|_| ParseError::InvalidNumber {
                line: token.line,
                text: token.text.to_string(),
            })
    }

    /// Parse a `#N` entry index.
    fn index(&self, token: Token<'a>) -> ParseResult<usize> {
        token
            .text
            .strip_prefix('#')
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| self.error(token, format!("expected '#index', found '{}'", token.text)))
    }

    /// Parse `{ i j k ... }`.
    fn index_list(&mut self, context: &'static str) -> ParseResult<Vec<usize>> {
        let open = self.word(context)?;
        if open.text != "{" {
            return Err(self.error(open, format!("expected '{{', found '{}'", open.text)));
        }

        let mut list = Vec::new();
        loop {
            let token = self.word(context)?;
            if token.text == "}" {
                return Ok(list);
            }
            list.push(token.text.parse().map_err(|_| ParseError::InvalidNumber {
                line: token.line,
                text: token.text.to_string(),
            })?);
        }
    }

    fn error(&self, token: Token<'_>, message: String) -> ParseError {
        ParseError::Parse {
            line: token.line,
            message,
        }
    }
}

/// Split `{` and `}` off a word so `{0` and `1}` tokenize like `{ 0` and `1 }`.
fn split_braces<'a>(word: &'a str, mut emit: impl FnMut(&'a str)) {
    let mut start = 0;
    for (i, c) in word.char_indices() {
        if c == '{' || c == '}' {
            if start < i {
                emit(&word[start..i]);
            }
            emit(&word[i..i + 1]);
            start = i + 1;
        }
    }
    if start < word.len() {
        emit(&word[start..]);
    }
}

/// Collects `#N`-indexed entries and checks they end up dense.
///
/// Entries are keyed rather than stored by position, so an absurd index in
/// the file is reported as missing slots instead of sizing an allocation.
struct Slots<T> {
    section: &'static str,
    slots: BTreeMap<usize, T>,
}

impl<T> Slots<T> {
    fn new(section: &'static str) -> Self {
        Self {
            section,
            slots: BTreeMap::new(),
        }
    }

    fn insert(&mut self, index: usize, line: usize, value: T) -> ParseResult<()> {
        match self.slots.entry(index) {
            Entry::Occupied(_) => Err(ParseError::DuplicateIndex {
                section: self.section,
                index,
                line,
            }),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    fn finish(self) -> ParseResult<Vec<T>> {
        let section = self.section;
        self.slots
            .into_iter()
            .enumerate()
            .map(|(expected, (index, value))| {
                if index == expected {
                    Ok(value)
                } else {
                    Err(ParseError::MissingIndex {
                        section,
                        index: expected,
                    })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Primitive;

    const SCENE: &str = "
// Two spheres, a floor and a mirror triangle
lights
#0 -20 20 20 1.5
#1  30 50 -25 1.8
--
materials
#1 0x4c4c80ff 0.0 0.5 0.1 0.8 125 1.5 // glass
#0 6666ccff   0.6 0.3 0.1 0.0 50 1.0
--
objects
spheres
#0 -3 0 -16 2 0
#1 -1 -1.5 -12 2 1
planes
#2 0 -4 0 0 2 0 0
triangles
#3 0 0 -9 1 0 -9 0 1 -9 1
models
#4 meshes/duck.obj 0 -4 -12 30 0
--
scenes
#0 640x480 0 0 0 0 0 0 1.05 4 { 0 1 2 3 4 } { 0 1 }
#1 32x16 0 1 5 0 0 -1 0.8 0 {2} {}
--
";

    #[test]
    fn test_parse_sections() {
        let doc = parse_rtr(SCENE).unwrap();

        assert_eq!(doc.lights.len(), 2);
        assert_eq!(doc.lights[1].position, Vec3::new(30.0, 50.0, -25.0));
        assert_eq!(doc.lights[0].intensity, 1.5);

        // Materials listed out of order land at their index
        assert_eq!(doc.materials[0].color, Color16::new(0x66, 0x66, 0xcc, 0xff));
        assert_eq!(doc.materials[1].albedo.refractive, 0.8);
        assert_eq!(doc.materials[1].specular_exponent, 125.0);
        assert_eq!(doc.materials[1].refractive_index, 1.5);

        assert_eq!(doc.objects.len(), 5);
        match &doc.objects[2] {
            ObjectDecl::Inline(Object {
                primitive: Primitive::Plane(plane),
                material: 0,
            }) => assert_eq!(plane.normal(), Vec3::Y),
            other => panic!("unexpected object {:?}", other),
        }
        match &doc.objects[4] {
            ObjectDecl::Model(model) => {
                assert_eq!(model.path, "meshes/duck.obj");
                assert_eq!(model.shift, Vec3::new(0.0, -4.0, -12.0));
                assert_eq!(model.scale, 30.0);
            }
            other => panic!("unexpected object {:?}", other),
        }

        assert_eq!(doc.scenes.len(), 2);
        let scene = &doc.scenes[0];
        assert_eq!((scene.width, scene.height), (640, 480));
        assert_eq!(scene.depth, 4);
        assert!((scene.fov - 1.05).abs() < 1e-12);
        assert_eq!(scene.objects, vec![0, 1, 2, 3, 4]);
        assert_eq!(scene.lights, vec![0, 1]);

        let compact = &doc.scenes[1];
        assert_eq!(compact.objects, vec![2]);
        assert!(compact.lights.is_empty());
        assert_eq!(compact.view_dir, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_sections_end_at_eof() {
        let doc = parse_rtr("lights\n#0 0 0 0 1").unwrap();
        assert_eq!(doc.lights.len(), 1);
    }

    #[test]
    fn test_unknown_section() {
        let err = parse_rtr("cameras\n--").unwrap_err();
        assert!(matches!(err, ParseError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_duplicate_section() {
        let err = parse_rtr("lights\n--\nlights\n--").unwrap_err();
        assert!(matches!(err, ParseError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_missing_index() {
        let err = parse_rtr("lights\n#0 0 0 0 1\n#2 0 0 0 1\n--").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingIndex {
                section: "light",
                index: 1
            }
        ));
    }

    #[test]
    fn test_huge_index_is_reported_missing() {
        let err = parse_rtr("lights\n#18446744073709551615 0 0 0 1\n--").unwrap_err();
        assert!(matches!(err, ParseError::MissingIndex { section: "light", index: 0 }));

        let err = parse_rtr("scenes\n#0 2x2 0 0 0 0 0 -1 1.0 1 { } { }\n#100000000000 2x2 0 0 0 0 0 -1 1.0 1 { } { }\n--")
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingIndex { section: "scene", index: 1 }));
    }

    #[test]
    fn test_duplicate_index() {
        let err = parse_rtr("lights\n#0 0 0 0 1\n#0 1 1 1 1\n--").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateIndex { index: 0, line: 3, .. }));
    }

    #[test]
    fn test_invalid_number() {
        let err = parse_rtr("lights\n#0 0 zero 0 1\n--").unwrap_err();
        match err {
            ParseError::InvalidNumber { line, text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "zero");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_truncated_entry() {
        let err = parse_rtr("materials\n#0 ffffffff 1 0").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof("material")));
    }

    #[test]
    fn test_object_without_group() {
        let err = parse_rtr("objects\n#0 0 0 0 1 0\n--").unwrap_err();
        assert!(matches!(err, ParseError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_degenerate_plane() {
        let err = parse_rtr("objects\nplanes\n#0 0 0 0 0 0 0 0\n--").unwrap_err();
        assert!(matches!(err, ParseError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_bad_image_size() {
        let err = parse_rtr("scenes\n#0 640by480 0 0 0 0 0 0 1 1 { } { }\n--").unwrap_err();
        assert!(matches!(err, ParseError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_split_braces() {
        let mut out = Vec::new();
        split_braces("{0}", |t| out.push(t));
        assert_eq!(out, vec!["{", "0", "}"]);

        out.clear();
        split_braces("12", |t| out.push(t));
        assert_eq!(out, vec!["12"]);
    }
}
