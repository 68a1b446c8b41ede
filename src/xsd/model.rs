//! XML Schema components as plain owned values.
//!
//! Attributes shared by most components are ordinary fields: `id` and the
//! optional `annotation`, plus `occurs` on particles. Alternatives in the
//! grammar are enums.

use std::collections::BTreeMap;
use std::fmt;

/// A possibly prefixed name such as `xs:string`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(prefix: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local: local.into(),
        }
    }

    /// Splits `prefix:local`. Text without a colon has no prefix.
    pub fn parse(text: &str) -> Self {
        match text.trim().split_once(':') {
            Some((prefix, local)) => Self::new(Some(prefix), local),
            None => Self::new(None, text.trim()),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

/// `minOccurs` / `maxOccurs`. Both default to 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occurs {
    pub min: u32,
    pub max: MaxOccurs,
}

impl Default for Occurs {
    fn default() -> Self {
        Self {
            min: 1,
            max: MaxOccurs::Bounded(1),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotation {
    pub id: Option<String>,
    pub items: Vec<AnnotationItem>,
}

impl Annotation {
    /// Text of every `documentation` child, in document order.
    pub fn documentation(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            AnnotationItem::Documentation(doc) => Some(doc.value.as_str()),
            AnnotationItem::AppInfo(_) => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationItem {
    AppInfo(AppInfo),
    Documentation(Documentation),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppInfo {
    pub source: Option<String>,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Documentation {
    pub source: Option<String>,
    pub lang: Option<String>,
    pub value: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Form {
    Qualified,
    #[default]
    Unqualified,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProcessContents {
    Skip,
    Lax,
    #[default]
    Strict,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttributeUse {
    #[default]
    Optional,
    Prohibited,
    Required,
}

/// Model groups a complex type, group or derivation can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    All(All),
    Choice(Choice),
    Sequence(Sequence),
    Group(Group),
}

/// Members of a `choice` or `sequence`, in document order.
#[derive(Clone, Debug, PartialEq)]
pub enum Particle {
    Element(Element),
    Group(Group),
    Choice(Choice),
    Sequence(Sequence),
    Any(Any),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct All {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub occurs: Occurs,
    pub elements: Vec<Element>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Choice {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub occurs: Occurs,
    pub particles: Vec<Particle>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sequence {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub occurs: Occurs,
    pub particles: Vec<Particle>,
}

/// A named model group definition, or a reference to one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub name: Option<String>,
    pub reference: Option<QName>,
    pub occurs: Occurs,
    pub content: Option<Box<Content>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Any {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub occurs: Occurs,
    pub namespace: Option<String>,
    pub process_contents: ProcessContents,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnyAttribute {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub namespace: Option<String>,
    pub process_contents: ProcessContents,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attribute {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub name: Option<String>,
    pub reference: Option<QName>,
    pub type_name: Option<QName>,
    pub default: Option<String>,
    pub fixed: Option<String>,
    pub form: Option<Form>,
    pub usage: AttributeUse,
    pub simple_type: Option<SimpleType>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeGroup {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub name: Option<String>,
    pub reference: Option<QName>,
    pub attributes: Vec<AttributeDecl>,
    pub any_attribute: Option<AnyAttribute>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeDecl {
    Attribute(Attribute),
    AttributeGroup(AttributeGroup),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub name: Option<String>,
    pub reference: Option<QName>,
    pub type_name: Option<QName>,
    pub substitution_group: Option<QName>,
    pub default: Option<String>,
    pub fixed: Option<String>,
    pub form: Option<Form>,
    pub occurs: Occurs,
    pub nillable: bool,
    pub is_abstract: bool,
    pub type_definition: Option<TypeDefinition>,
    pub identity_constraints: Vec<IdentityConstraint>,
}

/// An anonymous type declared inline.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDefinition {
    Simple(SimpleType),
    Complex(ComplexType),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComplexType {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub name: Option<String>,
    pub is_abstract: bool,
    pub mixed: bool,
    pub content: Option<ComplexTypeContent>,
    pub attributes: Vec<AttributeDecl>,
    pub any_attribute: Option<AnyAttribute>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComplexTypeContent {
    SimpleContent(SimpleContent),
    ComplexContent(ComplexContent),
    Model(Content),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleContent {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub derivation: SimpleContentDerivation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimpleContentDerivation {
    Restriction(SimpleContentRestriction),
    Extension(Extension),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComplexContent {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub mixed: bool,
    pub derivation: ComplexContentDerivation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComplexContentDerivation {
    Restriction(ComplexContentRestriction),
    Extension(Extension),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Extension {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub base: QName,
    pub content: Option<Content>,
    pub attributes: Vec<AttributeDecl>,
    pub any_attribute: Option<AnyAttribute>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComplexContentRestriction {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub base: QName,
    pub content: Option<Content>,
    pub attributes: Vec<AttributeDecl>,
    pub any_attribute: Option<AnyAttribute>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleContentRestriction {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub base: QName,
    pub simple_type: Option<Box<SimpleType>>,
    pub facets: Vec<Facet>,
    pub attributes: Vec<AttributeDecl>,
    pub any_attribute: Option<AnyAttribute>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleType {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub name: Option<String>,
    pub derivation: SimpleDerivation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimpleDerivation {
    Restriction(SimpleTypeRestriction),
    List(List),
    Union(Union),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimpleTypeRestriction {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub base: Option<QName>,
    pub simple_type: Option<Box<SimpleType>>,
    pub facets: Vec<Facet>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct List {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub item_type: Option<QName>,
    pub simple_type: Option<Box<SimpleType>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Union {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub member_types: Vec<QName>,
    pub simple_types: Vec<SimpleType>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacetKind {
    MinExclusive,
    MinInclusive,
    MaxExclusive,
    MaxInclusive,
    TotalDigits,
    FractionDigits,
    Length,
    MinLength,
    MaxLength,
    Enumeration,
    WhiteSpace,
    Pattern,
}

impl FacetKind {
    pub fn element_name(self) -> &'static str {
        match self {
            FacetKind::MinExclusive => "minExclusive",
            FacetKind::MinInclusive => "minInclusive",
            FacetKind::MaxExclusive => "maxExclusive",
            FacetKind::MaxInclusive => "maxInclusive",
            FacetKind::TotalDigits => "totalDigits",
            FacetKind::FractionDigits => "fractionDigits",
            FacetKind::Length => "length",
            FacetKind::MinLength => "minLength",
            FacetKind::MaxLength => "maxLength",
            FacetKind::Enumeration => "enumeration",
            FacetKind::WhiteSpace => "whiteSpace",
            FacetKind::Pattern => "pattern",
        }
    }

    pub fn from_element_name(name: &str) -> Option<FacetKind> {
        let kind = match name {
            "minExclusive" => FacetKind::MinExclusive,
            "minInclusive" => FacetKind::MinInclusive,
            "maxExclusive" => FacetKind::MaxExclusive,
            "maxInclusive" => FacetKind::MaxInclusive,
            "totalDigits" => FacetKind::TotalDigits,
            "fractionDigits" => FacetKind::FractionDigits,
            "length" => FacetKind::Length,
            "minLength" => FacetKind::MinLength,
            "maxLength" => FacetKind::MaxLength,
            "enumeration" => FacetKind::Enumeration,
            "whiteSpace" => FacetKind::WhiteSpace,
            "pattern" => FacetKind::Pattern,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Facet {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub kind: FacetKind,
    pub value: String,
    pub fixed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum IdentityConstraintKind {
    Unique,
    Key,
    KeyRef { refer: QName },
}

/// `unique`, `key` or `keyref`.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentityConstraint {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub name: String,
    pub kind: IdentityConstraintKind,
    pub selector: XPathExpr,
    pub fields: Vec<XPathExpr>,
}

/// A `selector` or `field`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XPathExpr {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub xpath: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Import {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub namespace: Option<String>,
    pub schema_location: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Include {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub schema_location: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Redefine {
    pub id: Option<String>,
    pub schema_location: String,
    pub annotations: Vec<Annotation>,
    pub simple_types: Vec<SimpleType>,
    pub complex_types: Vec<ComplexType>,
    pub groups: Vec<Group>,
    pub attribute_groups: Vec<AttributeGroup>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Notation {
    pub id: Option<String>,
    pub annotation: Option<Annotation>,
    pub name: String,
    pub public: Option<String>,
    pub system: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    pub id: Option<String>,
    /// Namespace prefix to URI. The default namespace uses the empty prefix.
    pub namespaces: BTreeMap<String, String>,
    pub attribute_form_default: Form,
    pub element_form_default: Form,
    pub target_namespace: Option<String>,
    pub version: Option<String>,
    pub includes: Vec<Include>,
    pub imports: Vec<Import>,
    pub redefines: Vec<Redefine>,
    pub annotations: Vec<Annotation>,
    pub simple_types: Vec<SimpleType>,
    pub complex_types: Vec<ComplexType>,
    pub groups: Vec<Group>,
    pub attribute_groups: Vec<AttributeGroup>,
    pub elements: Vec<Element>,
    pub attributes: Vec<Attribute>,
    pub notations: Vec<Notation>,
}

impl Schema {
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements
            .iter()
            .find(|e| e.name.as_deref() == Some(name))
    }

    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.complex_types
            .iter()
            .find(|t| t.name.as_deref() == Some(name))
    }

    pub fn simple_type(&self, name: &str) -> Option<&SimpleType> {
        self.simple_types
            .iter()
            .find(|t| t.name.as_deref() == Some(name))
    }

    /// Namespace URI bound to the prefix of `name`, if any.
    pub fn resolve_namespace(&self, name: &QName) -> Option<&str> {
        let prefix = name.prefix.as_deref().unwrap_or("");
        self.namespaces.get(prefix).map(String::as_str)
    }
}
