//! Fixed-length converter bean emission.
//!
//! Two documents: `outbound-converter.xml` from the request group and
//! `inbound-converter.xml` from the response group. Attribute order inside
//! each `field` element is fixed; children are written in tree order.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use super::{Artifact, SpecType, container_class_name, paths};
use crate::config::ResolvedXml;
use crate::error::{MsggenError, Result};
use crate::model::{FieldNode, MessageModel, OccurrenceMax};

const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const BEANS_NS: &str = "http://www.springframework.org/schema/beans";

const DEFAULT_GROUP_TAG_LENGTH: u32 = 10;
const DEFAULT_COUNTER_LENGTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    fn converter_element(&self) -> &'static str {
        match self {
            Direction::Outbound => "fix-length-outbound-converter",
            Direction::Inbound => "fix-length-inbound-converter",
        }
    }

    fn converter_id(&self) -> &'static str {
        match self {
            Direction::Outbound => "req_converter",
            Direction::Inbound => "resp_converter",
        }
    }

    fn class_suffix(&self) -> &'static str {
        match self {
            Direction::Outbound => "Request",
            Direction::Inbound => "Response",
        }
    }
}

/// Emit the outbound converter from the request group. An empty request is
/// a generation error; there is nothing to convert.
pub fn emit_outbound(model: &MessageModel, xml: &ResolvedXml, package: &str) -> Result<Artifact> {
    if !model.request.has_content() {
        return Err(MsggenError::generation(
            "request has no fields; cannot generate the outbound converter",
        ));
    }
    let bytes = write_document(model, xml, package, Direction::Outbound)?;
    Ok(Artifact::new(paths::OUTBOUND_XML, bytes))
}

/// Emit the inbound converter from the response group. An empty response
/// produces the envelope with no message element.
pub fn emit_inbound(model: &MessageModel, xml: &ResolvedXml, package: &str) -> Result<Artifact> {
    let bytes = write_document(model, xml, package, Direction::Inbound)?;
    Ok(Artifact::new(paths::INBOUND_XML, bytes))
}

fn write_document(
    model: &MessageModel,
    xml: &ResolvedXml,
    package: &str,
    direction: Direction,
) -> Result<Vec<u8>> {
    let namespace = match direction {
        Direction::Outbound => &xml.namespace_outbound,
        Direction::Inbound => &xml.namespace_inbound,
    };
    let group = match direction {
        Direction::Outbound => &model.request,
        Direction::Inbound => &model.response,
    };

    let mut doc = Doc {
        writer: Writer::new_with_indent(Vec::new(), b' ', 2),
    };

    doc.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut beans = BytesStart::new("beans");
    beans.push_attribute(("xmlns", namespace.as_str()));
    beans.push_attribute(("xmlns:xsi", XSI_NS));
    beans.push_attribute(("xmlns:beans", BEANS_NS));
    beans.push_attribute((
        "xsi:schemaLocation",
        format!("{} {}.xsd", namespace, namespace).as_str(),
    ));
    doc.event(Event::Start(beans))?;

    let mut converter = BytesStart::new(direction.converter_element());
    converter.push_attribute(("id", direction.converter_id()));
    converter.push_attribute(("codeGen", "true"));

    if group.has_content() {
        let operation_id = model.require_operation_id("converter XML")?;
        doc.event(Event::Start(converter))?;

        let mut message = BytesStart::new("message");
        message.push_attribute((
            "forType",
            format!(
                "{}.{}.{}{}",
                xml.group_id,
                xml.artifact_id,
                operation_id,
                direction.class_suffix()
            )
            .as_str(),
        ));
        doc.event(Event::Start(message))?;

        write_fields(&mut doc, &group.fields, package)?;

        doc.event(Event::End(BytesEnd::new("message")))?;
        doc.event(Event::End(BytesEnd::new(direction.converter_element())))?;
    } else {
        doc.event(Event::Empty(converter))?;
    }

    doc.event(Event::End(BytesEnd::new("beans")))?;

    let mut bytes = doc.writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

struct Doc {
    writer: Writer<Vec<u8>>,
}

impl Doc {
    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| MsggenError::generation(format!("cannot write converter XML: {}", e)))
    }
}

fn write_fields(doc: &mut Doc, nodes: &[FieldNode], package: &str) -> Result<()> {
    for node in nodes {
        if node.is_transitory {
            write_transitory(doc, node)?;
        } else if node.is_container() {
            write_container(doc, node, package)?;
        } else {
            write_primitive(doc, node)?;
        }
    }
    Ok(())
}

fn write_primitive(doc: &mut Doc, node: &FieldNode) -> Result<()> {
    let spec_type = SpecType::of(node.data_type.as_deref());

    let mut field = BytesStart::new("field");
    if let Some(name) = node.camel_case_name.as_deref() {
        field.push_attribute(("name", name));
    }
    field.push_attribute(("type", "DataField"));
    if let Some(length) = node.length {
        field.push_attribute(("length", length.to_string().as_str()));
    }
    if spec_type.numeric_padding() {
        field.push_attribute(("pad", "0"));
        field.push_attribute(("alignRight", "true"));
    } else {
        field.push_attribute(("nullPad", " "));
    }
    field.push_attribute(("converter", spec_type.converter()));
    if spec_type == SpecType::Decimal {
        field.push_attribute(("forType", "java.math.BigDecimal"));
    }
    doc.event(Event::Empty(field))
}

fn write_transitory(doc: &mut Doc, node: &FieldNode) -> Result<()> {
    if let Some(group_id) = node.group_id.as_deref() {
        let mut field = BytesStart::new("field");
        field.push_attribute(("type", "DataField"));
        field.push_attribute((
            "length",
            node.length.unwrap_or(DEFAULT_GROUP_TAG_LENGTH).to_string().as_str(),
        ));
        field.push_attribute(("fixedLength", "true"));
        field.push_attribute(("transitory", "true"));
        field.push_attribute(("defaultValue", group_id));
        field.push_attribute(("converter", "stringFieldConverter"));
        return doc.event(Event::Empty(field));
    }

    if let Some(occurrence) = node.occurrence() {
        let mut field = BytesStart::new("field");
        field.push_attribute(("type", "DataField"));
        field.push_attribute((
            "length",
            node.length.unwrap_or(DEFAULT_COUNTER_LENGTH).to_string().as_str(),
        ));
        field.push_attribute(("fixedLength", "true"));
        field.push_attribute(("transitory", "true"));
        if let OccurrenceMax::Count(max) = occurrence.max {
            field.push_attribute(("defaultValue", max.to_string().as_str()));
        }
        field.push_attribute(("pad", "0"));
        field.push_attribute(("alignRight", "true"));
        field.push_attribute(("converter", "counterFieldConverter"));
        return doc.event(Event::Empty(field));
    }

    // A transitory node carries exactly one of the two markers; the parser
    // guarantees this.
    Err(MsggenError::generation(format!(
        "transitory row '{}' carries neither groupId nor occurrenceCount",
        node.original_name
    )))
}

fn write_container(doc: &mut Doc, node: &FieldNode, package: &str) -> Result<()> {
    let mut field = BytesStart::new("field");
    if let Some(name) = node.camel_case_name.as_deref() {
        field.push_attribute(("name", name));
    }
    if node.is_array {
        field.push_attribute(("type", "RepeatingField"));
        if let Some(max) = node.occurrence().and_then(|o| o.finite_max()) {
            field.push_attribute(("fixedCount", max.to_string().as_str()));
        }
    } else {
        field.push_attribute(("type", "CompositeField"));
    }
    field.push_attribute((
        "forType",
        format!("{}.{}", package, container_class_name(node)).as_str(),
    ));

    doc.event(Event::Start(field))?;
    write_fields(doc, &node.children, package)?;
    doc.event(Event::End(BytesEnd::new("field")))
}
