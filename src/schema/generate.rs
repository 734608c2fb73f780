use std::collections::HashSet;

use super::descriptors::{EntityDescriptor, FieldDescriptor, Shape, SCALAR_TYPES};
use super::namespaces::{self, Namespace};
use super::SchemaError;

/// Where a field lives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    Element,
    Attribute,
    /// Character data of the enclosing element, escaped on output.
    CharData,
    /// Character data of the enclosing element, written as CDATA.
    CData,
}

/// A field tag split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    pub prefix: Option<&'a str>,
    pub local: &'a str,
    pub kind: WireKind,
    pub omit_empty: bool,
}

impl<'a> Tag<'a> {
    /// Parses a `name[,flag]*` tag.
    pub fn parse(tag: &'a str) -> Result<Self, String> {
        let mut parts = tag.split(',');
        let name = parts.next().unwrap_or_default();

        let mut kind = None;
        let mut omit_empty = false;
        for flag in parts {
            let flag_kind = match flag {
                "omitempty" => {
                    if omit_empty {
                        return Err("`omitempty` given twice".to_owned());
                    }
                    omit_empty = true;
                    continue;
                }
                "attr" => WireKind::Attribute,
                "chardata" => WireKind::CharData,
                "cdata" => WireKind::CData,
                "" => return Err("empty flag".to_owned()),
                other => return Err(format!("unknown flag `{other}`")),
            };
            if kind.replace(flag_kind).is_some() {
                return Err("more than one of `attr`, `chardata`, `cdata`".to_owned());
            }
        }

        let kind = kind.unwrap_or(WireKind::Element);
        if matches!(kind, WireKind::CharData | WireKind::CData) {
            if !name.is_empty() {
                return Err("text content takes no name".to_owned());
            }
            return Ok(Self {
                prefix: None,
                local: "",
                kind,
                omit_empty,
            });
        }

        let (prefix, local) = match name.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, name),
        };
        if let Some(prefix) = prefix {
            if !is_xml_name(prefix) {
                return Err(format!("invalid prefix `{prefix}`"));
            }
        }
        if !is_xml_name(local) {
            return Err(format!("invalid name `{local}`"));
        }

        Ok(Self {
            prefix,
            local,
            kind,
            omit_empty,
        })
    }

    /// The name as written in documents, prefix included.
    pub fn qualified_name(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.to_owned(),
        }
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        }
        _ => false,
    }
}

struct Field {
    name: &'static str,
    ty: &'static str,
    shape: Shape,
    tag: Tag<'static>,
    /// Resolved namespace URI; `None` for the root namespace.
    namespace: Option<&'static str>,
    entity: bool,
}

struct Entity {
    name: &'static str,
    fields: Vec<Field>,
}

impl Entity {
    fn fields_of(&self, kind: WireKind) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.tag.kind == kind)
    }

    fn text_field(&self) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| matches!(f.tag.kind, WireKind::CharData | WireKind::CData))
    }
}

/// Generates the shadow schema source for `schema`, resolving prefixes
/// against `namespaces`.
///
/// The output is a function of the inputs only: the same table always
/// produces the same source.
///
/// # Errors
///
/// Returns the first [`SchemaError`] found. Every entity is resolved before
/// any source is emitted.
pub fn generate(
    schema: &[EntityDescriptor],
    namespaces: &[Namespace],
) -> Result<String, SchemaError> {
    let entities = resolve(schema, namespaces)?;

    let mut out = Emitter::default();
    out.header();
    for entity in &entities {
        emit_shadow_struct(&mut out, entity);
        emit_decoder(&mut out, entity);
        emit_translation(&mut out, entity);
        emit_encoder(&mut out, entity);
    }
    Ok(out.finish())
}

fn resolve(
    schema: &[EntityDescriptor],
    table: &[Namespace],
) -> Result<Vec<Entity>, SchemaError> {
    let mut names: HashSet<&'static str> = HashSet::new();
    for entity in schema {
        if !names.insert(entity.name) {
            return Err(SchemaError::DuplicateEntity(entity.name.to_owned()));
        }
    }
    schema
        .iter()
        .map(|entity| resolve_entity(entity, &names, table))
        .collect()
}

fn resolve_entity(
    entity: &EntityDescriptor,
    entities: &HashSet<&'static str>,
    table: &[Namespace],
) -> Result<Entity, SchemaError> {
    let mut seen = HashSet::new();
    let mut has_text = false;
    let mut fields = Vec::with_capacity(entity.fields.len());

    for desc in entity.fields {
        let invalid = |reason: &str| SchemaError::InvalidShape {
            entity: entity.name.to_owned(),
            field: desc.field.to_owned(),
            reason: reason.to_owned(),
        };

        if !seen.insert(desc.field) {
            return Err(SchemaError::DuplicateField {
                entity: entity.name.to_owned(),
                field: desc.field.to_owned(),
            });
        }

        let tag = Tag::parse(desc.tag).map_err(|reason| SchemaError::MalformedTag {
            entity: entity.name.to_owned(),
            field: desc.field.to_owned(),
            tag: desc.tag.to_owned(),
            reason,
        })?;

        let namespace = match tag.prefix {
            Some(prefix) => Some(namespaces::resolve(table, prefix).ok_or_else(|| {
                SchemaError::UnknownPrefix {
                    entity: entity.name.to_owned(),
                    field: desc.field.to_owned(),
                    prefix: prefix.to_owned(),
                }
            })?),
            None => None,
        };

        let is_entity = if entities.contains(&desc.ty) {
            true
        } else if SCALAR_TYPES.contains(&desc.ty) {
            false
        } else {
            return Err(SchemaError::UnknownType {
                entity: entity.name.to_owned(),
                field: desc.field.to_owned(),
                ty: desc.ty.to_owned(),
            });
        };

        match tag.kind {
            WireKind::Attribute => {
                if is_entity {
                    return Err(invalid("attributes must have a scalar type"));
                }
                if !matches!(desc.shape, Shape::One | Shape::Optional) {
                    return Err(invalid("attributes cannot repeat or be boxed"));
                }
            }
            WireKind::CharData | WireKind::CData => {
                if desc.ty != "String" || desc.shape != Shape::One {
                    return Err(invalid("text content must be a plain `String`"));
                }
                if has_text {
                    return Err(invalid("only one text content field is allowed"));
                }
                has_text = true;
            }
            WireKind::Element => {
                if desc.shape == Shape::OptionalBoxed && !is_entity {
                    return Err(invalid("only entities can be boxed"));
                }
            }
        }

        fields.push(field_from(desc, tag, namespace, is_entity));
    }

    Ok(Entity {
        name: entity.name,
        fields,
    })
}

fn field_from(
    desc: &FieldDescriptor,
    tag: Tag<'static>,
    namespace: Option<&'static str>,
    entity: bool,
) -> Field {
    Field {
        name: desc.field,
        ty: desc.ty,
        shape: desc.shape,
        tag,
        namespace,
        entity,
    }
}

#[derive(Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn header(&mut self) {
        self.line(0, "// @generated by build.rs from src/schema/descriptors.rs. Do not edit.");
        self.blank();
        self.line(0, "use std::io::Write;");
        self.blank();
        self.line(0, "use quick_xml::events::BytesStart;");
        self.blank();
        self.line(0, "use crate::codec::XmlScalar;");
        self.line(
            0,
            "use crate::xml::de::{decode_scalar, Child, DecodeError, DecodeXml, XmlDecoder};",
        );
        self.line(0, "use crate::xml::ser::{EncodeError, EncodeXml, XmlEncoder};");
        self.blank();
    }

    fn finish(self) -> String {
        self.out
    }
}

fn shadow_type(field: &Field) -> String {
    let base = if field.entity {
        format!("Shadow{}", field.ty)
    } else {
        match field.ty {
            "String" | "i64" => field.ty.to_owned(),
            other => format!("crate::codec::{other}"),
        }
    };
    match field.shape {
        Shape::One => base,
        Shape::Optional => format!("Option<{base}>"),
        Shape::OptionalBoxed => format!("Option<Box<{base}>>"),
        Shape::Many => format!("Vec<{base}>"),
    }
}

fn namespace_literal(namespace: Option<&str>) -> String {
    match namespace {
        Some(uri) => format!("Some({uri:?})"),
        None => "None".to_owned(),
    }
}

/// Statement storing a decoded `value` into the shadow field.
fn assign(field: &Field, value: &str) -> String {
    match field.shape {
        Shape::One => format!("shadow.{} = {value};", field.name),
        Shape::Optional => format!("shadow.{} = Some({value});", field.name),
        Shape::OptionalBoxed => format!("shadow.{} = Some(Box::new({value}));", field.name),
        Shape::Many => format!("shadow.{}.push({value});", field.name),
    }
}

fn emit_shadow_struct(out: &mut Emitter, entity: &Entity) {
    out.line(0, &format!("/// URI-keyed mirror of [`crate::model::{}`].", entity.name));
    out.line(0, "#[derive(Debug, Default)]");
    out.line(0, &format!("pub struct Shadow{} {{", entity.name));
    for field in &entity.fields {
        out.line(1, &format!("pub {}: {},", field.name, shadow_type(field)));
    }
    out.line(0, "}");
    out.blank();
}

fn emit_decoder(out: &mut Emitter, entity: &Entity) {
    let attributes: Vec<&Field> = entity.fields_of(WireKind::Attribute).collect();
    let elements: Vec<&Field> = entity.fields_of(WireKind::Element).collect();
    let start = if attributes.is_empty() { "_start" } else { "start" };

    out.line(0, &format!("impl DecodeXml for Shadow{} {{", entity.name));
    out.line(1, "fn decode_xml<'i>(");
    out.line(2, "de: &mut XmlDecoder<'i>,");
    out.line(2, &format!("{start}: &BytesStart<'i>,"));
    out.line(2, "empty: bool,");
    out.line(1, ") -> Result<Self, DecodeError> {");
    out.line(2, "let mut shadow = Self::default();");

    if !attributes.is_empty() {
        out.line(2, "for (name, value) in de.attributes(start)? {");
        for (i, field) in attributes.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "} else if" };
            out.line(
                3,
                &format!(
                    "{keyword} name.is({}, {:?}) {{",
                    namespace_literal(field.namespace),
                    field.tag.local
                ),
            );
            let label = format!("{}.{}", entity.name, field.name);
            let value = format!("decode_scalar({label:?}, &value)?");
            out.line(4, &assign(field, &value));
        }
        out.line(3, "}");
        out.line(2, "}");
    }

    out.line(2, "if empty {");
    out.line(3, "return Ok(shadow);");
    out.line(2, "}");
    out.line(2, "loop {");
    out.line(3, "match de.next_child()? {");
    out.line(4, "Child::Element { name, start, empty } => {");
    for (i, field) in elements.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "} else if" };
        out.line(
            5,
            &format!(
                "{keyword} name.is({}, {:?}) {{",
                namespace_literal(field.namespace),
                field.tag.local
            ),
        );
        let value = if field.entity {
            format!("Shadow{}::decode_xml(de, &start, empty)?", field.ty)
        } else {
            let label = format!("{}.{}", entity.name, field.name);
            format!("de.read_scalar({label:?}, empty)?")
        };
        out.line(6, &assign(field, &value));
    }
    if elements.is_empty() {
        out.line(5, "de.skip(&name, &start, empty)?;");
    } else {
        out.line(5, "} else {");
        out.line(6, "de.skip(&name, &start, empty)?;");
        out.line(5, "}");
    }
    out.line(4, "}");
    match entity.text_field() {
        Some(field) => out.line(4, &format!("Child::Text(text) => shadow.{}.push_str(&text),", field.name)),
        None => out.line(4, "Child::Text(_) => {}"),
    }
    out.line(4, "Child::End => return Ok(shadow),");
    out.line(3, "}");
    out.line(2, "}");
    out.line(1, "}");
    out.line(0, "}");
    out.blank();
}

fn translate_expr(field: &Field) -> String {
    let source = format!("shadow.{}", field.name);
    if !field.entity {
        return source;
    }
    match field.shape {
        Shape::One => format!("{source}.into()"),
        Shape::Optional => format!("{source}.map(Into::into)"),
        Shape::OptionalBoxed => format!("{source}.map(|inner| Box::new((*inner).into()))"),
        Shape::Many => format!("{source}.into_iter().map(Into::into).collect()"),
    }
}

fn emit_translation(out: &mut Emitter, entity: &Entity) {
    out.line(
        0,
        &format!("impl From<Shadow{0}> for crate::model::{0} {{", entity.name),
    );
    out.line(1, &format!("fn from(shadow: Shadow{}) -> Self {{", entity.name));
    out.line(2, "Self {");
    for field in &entity.fields {
        out.line(3, &format!("{}: {},", field.name, translate_expr(field)));
    }
    out.line(2, "}");
    out.line(1, "}");
    out.line(0, "}");
    out.blank();
}

fn emit_attribute_encoder(out: &mut Emitter, field: &Field) {
    let name = field.tag.qualified_name();
    match (field.shape, field.tag.omit_empty) {
        (Shape::Optional, _) => {
            out.line(2, &format!("if let Some(value) = &self.{} {{", field.name));
            out.line(
                3,
                &format!("start.push_attribute(({name:?}, &*value.encode_text()));"),
            );
            out.line(2, "}");
        }
        (_, true) => {
            out.line(2, &format!("if !self.{}.is_zero() {{", field.name));
            out.line(
                3,
                &format!(
                    "start.push_attribute(({name:?}, &*self.{}.encode_text()));",
                    field.name
                ),
            );
            out.line(2, "}");
        }
        (_, false) => out.line(
            2,
            &format!(
                "start.push_attribute(({name:?}, &*self.{}.encode_text()));",
                field.name
            ),
        ),
    }
}

fn emit_child_encoder(out: &mut Emitter, field: &Field) {
    match field.tag.kind {
        WireKind::CharData => {
            out.line(2, &format!("en.text(&self.{})?;", field.name));
            return;
        }
        WireKind::CData => {
            out.line(2, &format!("en.cdata(&self.{})?;", field.name));
            return;
        }
        WireKind::Element | WireKind::Attribute => {}
    }

    let name = field.tag.qualified_name();
    let write = |value: &str| {
        if field.entity {
            format!("{value}.encode_xml(en, {name:?})?;")
        } else {
            format!("en.scalar({name:?}, {value})?;")
        }
    };
    match field.shape {
        Shape::One if field.entity => out.line(2, &write(&format!("self.{}", field.name))),
        Shape::One if field.tag.omit_empty => {
            out.line(2, &format!("if !self.{}.is_zero() {{", field.name));
            out.line(3, &write(&format!("&self.{}", field.name)));
            out.line(2, "}");
        }
        Shape::One => out.line(2, &write(&format!("&self.{}", field.name))),
        Shape::Optional | Shape::OptionalBoxed => {
            out.line(2, &format!("if let Some(value) = &self.{} {{", field.name));
            out.line(3, &write("value"));
            out.line(2, "}");
        }
        Shape::Many => {
            out.line(2, &format!("for value in &self.{} {{", field.name));
            out.line(3, &write("value"));
            out.line(2, "}");
        }
    }
}

fn emit_encoder(out: &mut Emitter, entity: &Entity) {
    let attributes: Vec<&Field> = entity.fields_of(WireKind::Attribute).collect();
    let binding = if attributes.is_empty() { "start" } else { "mut start" };

    out.line(0, &format!("impl EncodeXml for crate::model::{} {{", entity.name));
    out.line(1, "fn encode_xml<W: Write>(");
    out.line(2, "&self,");
    out.line(2, "en: &mut XmlEncoder<W>,");
    out.line(2, "name: &str,");
    out.line(1, ") -> Result<(), EncodeError> {");
    out.line(2, &format!("let {binding} = BytesStart::new(name);"));
    for field in &attributes {
        emit_attribute_encoder(out, field);
    }
    out.line(2, "en.open(start)?;");
    for field in entity
        .fields
        .iter()
        .filter(|f| f.tag.kind != WireKind::Attribute)
    {
        emit_child_encoder(out, field);
    }
    out.line(2, "en.close(name)");
    out.line(1, "}");
    out.line(0, "}");
    out.blank();
}
