use tracing::debug;

use crate::error::{DataAccessError, Result};

use super::model::*;
use super::xml::{Tag, XmlCursor};

/// Parses the text of an XML Schema document.
pub fn read_schema_str(text: &str) -> Result<Schema> {
    let mut cur = XmlCursor::new(text)?;
    let schema = read_schema_element(&mut cur)?;
    if !matches!(cur.node(), super::xml::Node::Eof) {
        return Err(cur.unexpected("end of document"));
    }
    debug!(
        target_namespace = schema.target_namespace.as_deref().unwrap_or(""),
        elements = schema.elements.len(),
        complex_types = schema.complex_types.len(),
        simple_types = schema.simple_types.len(),
        "read xml schema"
    );
    Ok(schema)
}

fn owned(tag: &Tag, key: &str) -> Option<String> {
    tag.attr(key).map(str::to_string)
}

fn required(tag: &Tag, element: &'static str, attribute: &'static str) -> Result<String> {
    tag.attr(attribute)
        .map(str::to_string)
        .ok_or(DataAccessError::XsdMissingAttribute { element, attribute })
}

fn invalid(attribute: &str, value: &str) -> DataAccessError {
    DataAccessError::XsdInvalidAttribute {
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

fn qname(tag: &Tag, key: &str) -> Option<QName> {
    tag.attr(key).map(QName::parse)
}

fn flag(tag: &Tag, key: &str) -> Result<bool> {
    match tag.attr(key).map(str::trim) {
        None | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(invalid(key, other)),
    }
}

fn form(tag: &Tag, key: &str) -> Result<Option<Form>> {
    match tag.attr(key).map(str::trim) {
        None => Ok(None),
        Some("qualified") => Ok(Some(Form::Qualified)),
        Some("unqualified") => Ok(Some(Form::Unqualified)),
        Some(other) => Err(invalid(key, other)),
    }
}

fn process_contents(tag: &Tag) -> Result<ProcessContents> {
    match tag.attr("processContents").map(str::trim) {
        None | Some("strict") => Ok(ProcessContents::Strict),
        Some("lax") => Ok(ProcessContents::Lax),
        Some("skip") => Ok(ProcessContents::Skip),
        Some(other) => Err(invalid("processContents", other)),
    }
}

fn attribute_use(tag: &Tag) -> Result<AttributeUse> {
    match tag.attr("use").map(str::trim) {
        None | Some("optional") => Ok(AttributeUse::Optional),
        Some("required") => Ok(AttributeUse::Required),
        Some("prohibited") => Ok(AttributeUse::Prohibited),
        Some(other) => Err(invalid("use", other)),
    }
}

fn occurs(tag: &Tag) -> Result<Occurs> {
    let mut occurs = Occurs::default();
    if let Some(min) = tag.attr("minOccurs") {
        occurs.min = min.trim().parse().map_err(|_| invalid("minOccurs", min))?;
    }
    if let Some(max) = tag.attr("maxOccurs") {
        occurs.max = match max.trim() {
            "unbounded" => MaxOccurs::Unbounded,
            n => MaxOccurs::Bounded(n.parse().map_err(|_| invalid("maxOccurs", max))?),
        };
    }
    Ok(occurs)
}

fn read_annotation(cur: &mut XmlCursor<'_>) -> Result<Option<Annotation>> {
    if cur.is_start("annotation") {
        read_annotation_element(cur).map(Some)
    } else {
        Ok(None)
    }
}

fn read_annotation_element(cur: &mut XmlCursor<'_>) -> Result<Annotation> {
    let tag = cur.expect_start("annotation")?;
    let mut annotation = Annotation {
        id: owned(&tag, "id"),
        items: Vec::new(),
    };
    loop {
        if cur.is_start("appinfo") {
            let tag = cur.expect_start("appinfo")?;
            let value = cur.read_text()?;
            cur.expect_end("appinfo")?;
            annotation.items.push(AnnotationItem::AppInfo(AppInfo {
                source: owned(&tag, "source"),
                value,
            }));
        } else if cur.is_start("documentation") {
            let tag = cur.expect_start("documentation")?;
            let value = cur.read_text()?;
            cur.expect_end("documentation")?;
            annotation
                .items
                .push(AnnotationItem::Documentation(Documentation {
                    source: owned(&tag, "source"),
                    lang: owned(&tag, "xml:lang"),
                    value,
                }));
        } else {
            break;
        }
    }
    cur.expect_end("annotation")?;
    Ok(annotation)
}

fn read_schema_element(cur: &mut XmlCursor<'_>) -> Result<Schema> {
    let tag = cur.expect_start("schema")?;
    let mut schema = Schema {
        id: owned(&tag, "id"),
        attribute_form_default: form(&tag, "attributeFormDefault")?.unwrap_or_default(),
        element_form_default: form(&tag, "elementFormDefault")?.unwrap_or_default(),
        target_namespace: owned(&tag, "targetNamespace"),
        version: owned(&tag, "version"),
        ..Schema::default()
    };
    for (key, value) in tag.attributes() {
        if key == "xmlns" {
            schema.namespaces.insert(String::new(), value.to_string());
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            schema.namespaces.insert(prefix.to_string(), value.to_string());
        }
    }

    loop {
        let name = cur.start_name().map(str::to_string);
        match name.as_deref() {
            Some("include") => schema.includes.push(read_include(cur)?),
            Some("import") => schema.imports.push(read_import(cur)?),
            Some("redefine") => schema.redefines.push(read_redefine(cur)?),
            Some("annotation") => schema.annotations.push(read_annotation_element(cur)?),
            Some("simpleType") => schema.simple_types.push(read_simple_type(cur)?),
            Some("complexType") => schema.complex_types.push(read_complex_type(cur)?),
            Some("group") => schema.groups.push(read_group(cur)?),
            Some("attributeGroup") => schema.attribute_groups.push(read_attribute_group(cur)?),
            Some("element") => schema.elements.push(read_element(cur)?),
            Some("attribute") => schema.attributes.push(read_attribute(cur)?),
            Some("notation") => schema.notations.push(read_notation(cur)?),
            _ => break,
        }
    }
    cur.expect_end("schema")?;
    Ok(schema)
}

fn read_include(cur: &mut XmlCursor<'_>) -> Result<Include> {
    let tag = cur.expect_start("include")?;
    let include = Include {
        id: owned(&tag, "id"),
        schema_location: required(&tag, "include", "schemaLocation")?,
        annotation: read_annotation(cur)?,
    };
    cur.expect_end("include")?;
    Ok(include)
}

fn read_import(cur: &mut XmlCursor<'_>) -> Result<Import> {
    let tag = cur.expect_start("import")?;
    let import = Import {
        id: owned(&tag, "id"),
        namespace: owned(&tag, "namespace"),
        schema_location: owned(&tag, "schemaLocation"),
        annotation: read_annotation(cur)?,
    };
    cur.expect_end("import")?;
    Ok(import)
}

fn read_redefine(cur: &mut XmlCursor<'_>) -> Result<Redefine> {
    let tag = cur.expect_start("redefine")?;
    let mut redefine = Redefine {
        id: owned(&tag, "id"),
        schema_location: required(&tag, "redefine", "schemaLocation")?,
        ..Redefine::default()
    };
    loop {
        let name = cur.start_name().map(str::to_string);
        match name.as_deref() {
            Some("annotation") => redefine.annotations.push(read_annotation_element(cur)?),
            Some("simpleType") => redefine.simple_types.push(read_simple_type(cur)?),
            Some("complexType") => redefine.complex_types.push(read_complex_type(cur)?),
            Some("group") => redefine.groups.push(read_group(cur)?),
            Some("attributeGroup") => {
                redefine.attribute_groups.push(read_attribute_group(cur)?)
            }
            _ => break,
        }
    }
    cur.expect_end("redefine")?;
    Ok(redefine)
}

fn read_notation(cur: &mut XmlCursor<'_>) -> Result<Notation> {
    let tag = cur.expect_start("notation")?;
    let notation = Notation {
        id: owned(&tag, "id"),
        name: required(&tag, "notation", "name")?,
        public: owned(&tag, "public"),
        system: owned(&tag, "system"),
        annotation: read_annotation(cur)?,
    };
    cur.expect_end("notation")?;
    Ok(notation)
}

fn read_element(cur: &mut XmlCursor<'_>) -> Result<Element> {
    let tag = cur.expect_start("element")?;
    let mut element = Element {
        id: owned(&tag, "id"),
        name: owned(&tag, "name"),
        reference: qname(&tag, "ref"),
        type_name: qname(&tag, "type"),
        substitution_group: qname(&tag, "substitutionGroup"),
        default: owned(&tag, "default"),
        fixed: owned(&tag, "fixed"),
        form: form(&tag, "form")?,
        occurs: occurs(&tag)?,
        nillable: flag(&tag, "nillable")?,
        is_abstract: flag(&tag, "abstract")?,
        annotation: read_annotation(cur)?,
        ..Element::default()
    };

    if cur.is_start("simpleType") {
        element.type_definition = Some(TypeDefinition::Simple(read_simple_type(cur)?));
    } else if cur.is_start("complexType") {
        element.type_definition = Some(TypeDefinition::Complex(read_complex_type(cur)?));
    }

    loop {
        let name = cur.start_name().map(str::to_string);
        let constraint = match name.as_deref() {
            Some("unique") => read_identity_constraint(cur, "unique")?,
            Some("key") => read_identity_constraint(cur, "key")?,
            Some("keyref") => read_identity_constraint(cur, "keyref")?,
            _ => break,
        };
        element.identity_constraints.push(constraint);
    }
    cur.expect_end("element")?;
    Ok(element)
}

fn read_identity_constraint(
    cur: &mut XmlCursor<'_>,
    element: &'static str,
) -> Result<IdentityConstraint> {
    let tag = cur.expect_start(element)?;
    let kind = match element {
        "keyref" => IdentityConstraintKind::KeyRef {
            refer: QName::parse(&required(&tag, element, "refer")?),
        },
        "key" => IdentityConstraintKind::Key,
        _ => IdentityConstraintKind::Unique,
    };
    let name = required(&tag, element, "name")?;
    let annotation = read_annotation(cur)?;

    if !cur.is_start("selector") {
        return Err(DataAccessError::XsdMissingContent {
            element,
            expected: "selector",
        });
    }
    let selector = read_xpath(cur, "selector")?;
    let mut fields = Vec::new();
    while cur.is_start("field") {
        fields.push(read_xpath(cur, "field")?);
    }
    if fields.is_empty() {
        return Err(DataAccessError::XsdMissingContent {
            element,
            expected: "field",
        });
    }
    cur.expect_end(element)?;

    Ok(IdentityConstraint {
        id: owned(&tag, "id"),
        annotation,
        name,
        kind,
        selector,
        fields,
    })
}

fn read_xpath(cur: &mut XmlCursor<'_>, element: &'static str) -> Result<XPathExpr> {
    let tag = cur.expect_start(element)?;
    let expr = XPathExpr {
        id: owned(&tag, "id"),
        xpath: required(&tag, element, "xpath")?,
        annotation: read_annotation(cur)?,
    };
    cur.expect_end(element)?;
    Ok(expr)
}

fn read_any(cur: &mut XmlCursor<'_>) -> Result<Any> {
    let tag = cur.expect_start("any")?;
    let any = Any {
        id: owned(&tag, "id"),
        occurs: occurs(&tag)?,
        namespace: owned(&tag, "namespace"),
        process_contents: process_contents(&tag)?,
        annotation: read_annotation(cur)?,
    };
    cur.expect_end("any")?;
    Ok(any)
}

fn read_any_attribute(cur: &mut XmlCursor<'_>) -> Result<AnyAttribute> {
    let tag = cur.expect_start("anyAttribute")?;
    let any = AnyAttribute {
        id: owned(&tag, "id"),
        namespace: owned(&tag, "namespace"),
        process_contents: process_contents(&tag)?,
        annotation: read_annotation(cur)?,
    };
    cur.expect_end("anyAttribute")?;
    Ok(any)
}

fn read_all(cur: &mut XmlCursor<'_>) -> Result<All> {
    let tag = cur.expect_start("all")?;
    let mut all = All {
        id: owned(&tag, "id"),
        occurs: occurs(&tag)?,
        annotation: read_annotation(cur)?,
        elements: Vec::new(),
    };
    while cur.is_start("element") {
        all.elements.push(read_element(cur)?);
    }
    cur.expect_end("all")?;
    Ok(all)
}

fn read_particles(cur: &mut XmlCursor<'_>) -> Result<Vec<Particle>> {
    let mut particles = Vec::new();
    loop {
        let name = cur.start_name().map(str::to_string);
        let particle = match name.as_deref() {
            Some("element") => Particle::Element(read_element(cur)?),
            Some("group") => Particle::Group(read_group(cur)?),
            Some("choice") => Particle::Choice(read_choice(cur)?),
            Some("sequence") => Particle::Sequence(read_sequence(cur)?),
            Some("any") => Particle::Any(read_any(cur)?),
            _ => break,
        };
        particles.push(particle);
    }
    Ok(particles)
}

fn read_choice(cur: &mut XmlCursor<'_>) -> Result<Choice> {
    let tag = cur.expect_start("choice")?;
    let choice = Choice {
        id: owned(&tag, "id"),
        occurs: occurs(&tag)?,
        annotation: read_annotation(cur)?,
        particles: read_particles(cur)?,
    };
    cur.expect_end("choice")?;
    Ok(choice)
}

fn read_sequence(cur: &mut XmlCursor<'_>) -> Result<Sequence> {
    let tag = cur.expect_start("sequence")?;
    let sequence = Sequence {
        id: owned(&tag, "id"),
        occurs: occurs(&tag)?,
        annotation: read_annotation(cur)?,
        particles: read_particles(cur)?,
    };
    cur.expect_end("sequence")?;
    Ok(sequence)
}

/// Reads an optional `all`, `choice`, `sequence` or `group`.
fn read_content(cur: &mut XmlCursor<'_>) -> Result<Option<Content>> {
    let name = cur.start_name().map(str::to_string);
    let content = match name.as_deref() {
        Some("all") => Content::All(read_all(cur)?),
        Some("choice") => Content::Choice(read_choice(cur)?),
        Some("sequence") => Content::Sequence(read_sequence(cur)?),
        Some("group") => Content::Group(read_group(cur)?),
        _ => return Ok(None),
    };
    Ok(Some(content))
}

fn read_group(cur: &mut XmlCursor<'_>) -> Result<Group> {
    let tag = cur.expect_start("group")?;
    let mut group = Group {
        id: owned(&tag, "id"),
        name: owned(&tag, "name"),
        reference: qname(&tag, "ref"),
        occurs: occurs(&tag)?,
        annotation: read_annotation(cur)?,
        content: None,
    };
    let name = cur.start_name().map(str::to_string);
    let content = match name.as_deref() {
        Some("all") => Some(Content::All(read_all(cur)?)),
        Some("choice") => Some(Content::Choice(read_choice(cur)?)),
        Some("sequence") => Some(Content::Sequence(read_sequence(cur)?)),
        _ => None,
    };
    // A reference has no body; a definition needs one.
    if content.is_none() && group.reference.is_none() {
        return Err(DataAccessError::XsdMissingContent {
            element: "group",
            expected: "all, choice or sequence",
        });
    }
    group.content = content.map(Box::new);
    cur.expect_end("group")?;
    Ok(group)
}

fn read_attribute(cur: &mut XmlCursor<'_>) -> Result<Attribute> {
    let tag = cur.expect_start("attribute")?;
    let mut attribute = Attribute {
        id: owned(&tag, "id"),
        name: owned(&tag, "name"),
        reference: qname(&tag, "ref"),
        type_name: qname(&tag, "type"),
        default: owned(&tag, "default"),
        fixed: owned(&tag, "fixed"),
        form: form(&tag, "form")?,
        usage: attribute_use(&tag)?,
        annotation: read_annotation(cur)?,
        simple_type: None,
    };
    if cur.is_start("simpleType") {
        attribute.simple_type = Some(read_simple_type(cur)?);
    }
    cur.expect_end("attribute")?;
    Ok(attribute)
}

fn read_attribute_group(cur: &mut XmlCursor<'_>) -> Result<AttributeGroup> {
    let tag = cur.expect_start("attributeGroup")?;
    let annotation = read_annotation(cur)?;
    let (attributes, any_attribute) = read_attribute_decls(cur)?;
    cur.expect_end("attributeGroup")?;
    Ok(AttributeGroup {
        id: owned(&tag, "id"),
        annotation,
        name: owned(&tag, "name"),
        reference: qname(&tag, "ref"),
        attributes,
        any_attribute,
    })
}

/// Reads `(attribute | attributeGroup)*, anyAttribute?`.
fn read_attribute_decls(
    cur: &mut XmlCursor<'_>,
) -> Result<(Vec<AttributeDecl>, Option<AnyAttribute>)> {
    let mut attributes = Vec::new();
    loop {
        if cur.is_start("attribute") {
            attributes.push(AttributeDecl::Attribute(read_attribute(cur)?));
        } else if cur.is_start("attributeGroup") {
            attributes.push(AttributeDecl::AttributeGroup(read_attribute_group(cur)?));
        } else {
            break;
        }
    }
    let any_attribute = if cur.is_start("anyAttribute") {
        Some(read_any_attribute(cur)?)
    } else {
        None
    };
    Ok((attributes, any_attribute))
}

fn read_complex_type(cur: &mut XmlCursor<'_>) -> Result<ComplexType> {
    let tag = cur.expect_start("complexType")?;
    let mut complex = ComplexType {
        id: owned(&tag, "id"),
        name: owned(&tag, "name"),
        is_abstract: flag(&tag, "abstract")?,
        mixed: flag(&tag, "mixed")?,
        annotation: read_annotation(cur)?,
        ..ComplexType::default()
    };

    if cur.is_start("simpleContent") {
        complex.content = Some(ComplexTypeContent::SimpleContent(read_simple_content(cur)?));
    } else if cur.is_start("complexContent") {
        complex.content = Some(ComplexTypeContent::ComplexContent(read_complex_content(
            cur,
        )?));
    } else {
        complex.content = read_content(cur)?.map(ComplexTypeContent::Model);
        let (attributes, any_attribute) = read_attribute_decls(cur)?;
        complex.attributes = attributes;
        complex.any_attribute = any_attribute;
    }
    cur.expect_end("complexType")?;
    Ok(complex)
}

fn read_simple_content(cur: &mut XmlCursor<'_>) -> Result<SimpleContent> {
    let tag = cur.expect_start("simpleContent")?;
    let annotation = read_annotation(cur)?;
    let derivation = if cur.is_start("restriction") {
        SimpleContentDerivation::Restriction(read_simple_content_restriction(cur)?)
    } else if cur.is_start("extension") {
        SimpleContentDerivation::Extension(read_extension(cur)?)
    } else {
        return Err(DataAccessError::XsdMissingContent {
            element: "simpleContent",
            expected: "restriction or extension",
        });
    };
    cur.expect_end("simpleContent")?;
    Ok(SimpleContent {
        id: owned(&tag, "id"),
        annotation,
        derivation,
    })
}

fn read_complex_content(cur: &mut XmlCursor<'_>) -> Result<ComplexContent> {
    let tag = cur.expect_start("complexContent")?;
    let annotation = read_annotation(cur)?;
    let derivation = if cur.is_start("restriction") {
        ComplexContentDerivation::Restriction(read_complex_content_restriction(cur)?)
    } else if cur.is_start("extension") {
        ComplexContentDerivation::Extension(read_extension(cur)?)
    } else {
        return Err(DataAccessError::XsdMissingContent {
            element: "complexContent",
            expected: "restriction or extension",
        });
    };
    cur.expect_end("complexContent")?;
    Ok(ComplexContent {
        id: owned(&tag, "id"),
        annotation,
        mixed: flag(&tag, "mixed")?,
        derivation,
    })
}

fn read_extension(cur: &mut XmlCursor<'_>) -> Result<Extension> {
    let tag = cur.expect_start("extension")?;
    let base = QName::parse(&required(&tag, "extension", "base")?);
    let annotation = read_annotation(cur)?;
    let content = read_content(cur)?;
    let (attributes, any_attribute) = read_attribute_decls(cur)?;
    cur.expect_end("extension")?;
    Ok(Extension {
        id: owned(&tag, "id"),
        annotation,
        base,
        content,
        attributes,
        any_attribute,
    })
}

fn read_complex_content_restriction(
    cur: &mut XmlCursor<'_>,
) -> Result<ComplexContentRestriction> {
    let tag = cur.expect_start("restriction")?;
    let base = QName::parse(&required(&tag, "restriction", "base")?);
    let annotation = read_annotation(cur)?;
    let content = read_content(cur)?;
    let (attributes, any_attribute) = read_attribute_decls(cur)?;
    cur.expect_end("restriction")?;
    Ok(ComplexContentRestriction {
        id: owned(&tag, "id"),
        annotation,
        base,
        content,
        attributes,
        any_attribute,
    })
}

fn read_simple_content_restriction(
    cur: &mut XmlCursor<'_>,
) -> Result<SimpleContentRestriction> {
    let tag = cur.expect_start("restriction")?;
    let base = QName::parse(&required(&tag, "restriction", "base")?);
    let annotation = read_annotation(cur)?;
    let simple_type = read_inline_simple_type(cur)?;
    let facets = read_facets(cur)?;
    let (attributes, any_attribute) = read_attribute_decls(cur)?;
    cur.expect_end("restriction")?;
    Ok(SimpleContentRestriction {
        id: owned(&tag, "id"),
        annotation,
        base,
        simple_type,
        facets,
        attributes,
        any_attribute,
    })
}

fn read_inline_simple_type(cur: &mut XmlCursor<'_>) -> Result<Option<Box<SimpleType>>> {
    if cur.is_start("simpleType") {
        Ok(Some(Box::new(read_simple_type(cur)?)))
    } else {
        Ok(None)
    }
}

fn read_facets(cur: &mut XmlCursor<'_>) -> Result<Vec<Facet>> {
    let mut facets = Vec::new();
    while let Some(kind) = cur.start_name().and_then(FacetKind::from_element_name) {
        let element = kind.element_name();
        let tag = cur.expect_start(element)?;
        facets.push(Facet {
            id: owned(&tag, "id"),
            kind,
            value: required(&tag, element, "value")?,
            fixed: flag(&tag, "fixed")?,
            annotation: read_annotation(cur)?,
        });
        cur.expect_end(element)?;
    }
    Ok(facets)
}

fn read_simple_type(cur: &mut XmlCursor<'_>) -> Result<SimpleType> {
    let tag = cur.expect_start("simpleType")?;
    let annotation = read_annotation(cur)?;
    let name = cur.start_name().map(str::to_string);
    let derivation = match name.as_deref() {
        Some("restriction") => SimpleDerivation::Restriction(read_simple_type_restriction(cur)?),
        Some("list") => SimpleDerivation::List(read_list(cur)?),
        Some("union") => SimpleDerivation::Union(read_union(cur)?),
        _ => {
            return Err(DataAccessError::XsdMissingContent {
                element: "simpleType",
                expected: "restriction, list or union",
            });
        }
    };
    cur.expect_end("simpleType")?;
    Ok(SimpleType {
        id: owned(&tag, "id"),
        annotation,
        name: owned(&tag, "name"),
        derivation,
    })
}

fn read_simple_type_restriction(cur: &mut XmlCursor<'_>) -> Result<SimpleTypeRestriction> {
    let tag = cur.expect_start("restriction")?;
    let restriction = SimpleTypeRestriction {
        id: owned(&tag, "id"),
        base: qname(&tag, "base"),
        annotation: read_annotation(cur)?,
        simple_type: read_inline_simple_type(cur)?,
        facets: read_facets(cur)?,
    };
    if restriction.base.is_none() && restriction.simple_type.is_none() {
        return Err(DataAccessError::XsdMissingAttribute {
            element: "restriction",
            attribute: "base",
        });
    }
    cur.expect_end("restriction")?;
    Ok(restriction)
}

fn read_list(cur: &mut XmlCursor<'_>) -> Result<List> {
    let tag = cur.expect_start("list")?;
    let list = List {
        id: owned(&tag, "id"),
        item_type: qname(&tag, "itemType"),
        annotation: read_annotation(cur)?,
        simple_type: read_inline_simple_type(cur)?,
    };
    cur.expect_end("list")?;
    Ok(list)
}

fn read_union(cur: &mut XmlCursor<'_>) -> Result<Union> {
    let tag = cur.expect_start("union")?;
    let mut union = Union {
        id: owned(&tag, "id"),
        member_types: tag
            .attr("memberTypes")
            .map(|types| types.split_whitespace().map(QName::parse).collect())
            .unwrap_or_default(),
        annotation: read_annotation(cur)?,
        simple_types: Vec::new(),
    };
    while cur.is_start("simpleType") {
        union.simple_types.push(read_simple_type(cur)?);
    }
    cur.expect_end("union")?;
    Ok(union)
}
