//! Data-class emission.
//!
//! One Java file per message top-level, per distinct container class and
//! per enumeration field. Classes carry explicit accessors and an inner
//! builder, or lombok-style annotations when the annotation mode is
//! configured. Transitory rows never reach a class body.

use indexmap::IndexMap;

use super::{Artifact, SpecType, container_class_name, paths};
use crate::error::{MsggenError, Result};
use crate::model::{FieldGroup, FieldNode, MessageModel, SourceRef};
use crate::utils::capitalize;

#[derive(Debug, Clone, Copy)]
pub struct ClassGenOptions<'a> {
    pub package: &'a str,
    pub use_annotations: bool,
}

/// Emit every data class and enumeration for the model.
pub fn emit_classes(model: &MessageModel, options: ClassGenOptions<'_>) -> Result<Vec<Artifact>> {
    let operation_id = model.require_operation_id("data classes")?;

    let mut registry = Registry::default();

    if let Some(shared) = &model.shared_header {
        if shared.has_content() {
            registry.add_group_class("SharedHeader", "Shared Header", shared)?;
        }
    }
    registry.add_group_class(
        &format!("{}Request", operation_id),
        "Request",
        &model.request,
    )?;
    if model.response.has_content() {
        registry.add_group_class(
            &format!("{}Response", operation_id),
            "Response",
            &model.response,
        )?;
    }

    let mut artifacts = Vec::new();
    for class in registry.classes.values() {
        artifacts.push(Artifact::new(
            java_path(options.package, &class.name),
            render_class(class, options),
        ));
    }
    for enum_spec in registry.enums.values() {
        artifacts.push(Artifact::new(
            java_path(options.package, &enum_spec.name),
            render_enum(enum_spec, options.package),
        ));
    }
    Ok(artifacts)
}

fn java_path(package: &str, class_name: &str) -> String {
    format!(
        "{}/{}/{}.java",
        paths::JAVA_ROOT,
        package.replace('.', "/"),
        class_name
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum JavaType {
    Simple(&'static str),
    Object(String),
    List(String),
}

impl JavaType {
    fn declaration(&self) -> String {
        match self {
            JavaType::Simple(name) => (*name).to_string(),
            JavaType::Object(name) => name.clone(),
            JavaType::List(element) => format!("List<{}>", element),
        }
    }
}

#[derive(Debug, Clone)]
struct ClassField {
    camel: String,
    original_name: String,
    length: Option<u32>,
    java_type: JavaType,
}

#[derive(Debug, Clone)]
struct ClassSpec {
    name: String,
    described_as: String,
    fields: Vec<ClassField>,
    source: Option<SourceRef>,
}

impl ClassSpec {
    fn fingerprint(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|f| (f.camel.clone(), f.java_type.declaration()))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct EnumConstant {
    name: String,
    code: String,
    description: String,
}

#[derive(Debug, Clone)]
struct EnumSpec {
    name: String,
    original_name: String,
    constants: Vec<EnumConstant>,
}

#[derive(Debug, Default)]
struct Registry {
    classes: IndexMap<String, ClassSpec>,
    enums: IndexMap<String, EnumSpec>,
}

impl Registry {
    fn add_group_class(
        &mut self,
        name: &str,
        described_as: &str,
        group: &FieldGroup,
    ) -> Result<()> {
        let fields = self.collect_fields(&group.fields)?;
        self.register(ClassSpec {
            name: name.to_string(),
            described_as: described_as.to_string(),
            fields,
            source: None,
        })
    }

    fn collect_fields(&mut self, nodes: &[FieldNode]) -> Result<Vec<ClassField>> {
        let mut fields = Vec::new();
        for node in nodes {
            if node.is_transitory {
                continue;
            }
            let camel = node
                .camel_case_name
                .clone()
                .expect("non-transitory nodes are normalized");

            if node.is_container() {
                let class_name = container_class_name(node);
                let child_fields = self.collect_fields(&node.children)?;
                self.register(ClassSpec {
                    name: class_name.clone(),
                    described_as: node.original_name.clone(),
                    fields: child_fields,
                    source: Some(node.source.clone()),
                })?;
                let java_type = if node.is_array {
                    JavaType::List(class_name)
                } else {
                    JavaType::Object(class_name)
                };
                fields.push(ClassField {
                    camel,
                    original_name: node.original_name.clone(),
                    length: None,
                    java_type,
                });
            } else {
                if let Some(constraint) = node.enum_constraint.as_deref() {
                    self.register_enum(node, constraint)?;
                }
                let spec_type = SpecType::of(node.data_type.as_deref());
                fields.push(ClassField {
                    camel,
                    original_name: node.original_name.clone(),
                    length: node.length,
                    java_type: JavaType::Simple(spec_type.java_type()),
                });
            }
        }
        Ok(fields)
    }

    fn register(&mut self, class: ClassSpec) -> Result<()> {
        if let Some(existing) = self.classes.get(&class.name) {
            if existing.fingerprint() == class.fingerprint() {
                return Ok(());
            }
            let describe = |source: &Option<SourceRef>| match source {
                Some(s) => format!("{} row {}", s.sheet_name, s.row_index),
                None => "message top level".to_string(),
            };
            return Err(MsggenError::generation(format!(
                "class name '{}' is declared with different structures ({} vs {})",
                class.name,
                describe(&existing.source),
                describe(&class.source),
            )));
        }
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    fn register_enum(&mut self, node: &FieldNode, constraint: &str) -> Result<()> {
        let codes: Vec<&str> = constraint
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if codes.is_empty() {
            return Err(MsggenError::generation(format!(
                "field '{}' declares an empty enumeration",
                node.original_name
            )));
        }

        let camel = node.camel_case_name.as_deref().unwrap_or_default();
        let name = capitalize(camel);
        if self.enums.contains_key(&name) {
            return Ok(());
        }

        let constants = codes
            .iter()
            .map(|entry| {
                let (code, description) = match entry.split_once(':') {
                    Some((code, description)) => (code.trim(), description.trim()),
                    None => (*entry, *entry),
                };
                EnumConstant {
                    name: constant_name(code),
                    code: code.to_string(),
                    description: description.to_string(),
                }
            })
            .collect();

        self.enums.insert(
            name.clone(),
            EnumSpec {
                name,
                original_name: node.original_name.clone(),
                constants,
            },
        );
        Ok(())
    }
}

/// Derive a Java constant name from an enum code.
fn constant_name(code: &str) -> String {
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
        return format!("VALUE_{}", code);
    }
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_uppercase()) {
        return code.to_string();
    }
    code.to_ascii_uppercase()
        .chars()
        .map(|c| if c.is_ascii_uppercase() || c.is_ascii_digit() { c } else { '_' })
        .collect()
}

fn render_class(class: &ClassSpec, options: ClassGenOptions<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!("package {};\n\n", options.package));

    let imports = collect_imports(class, options.use_annotations);
    if !imports.is_empty() {
        for import in &imports {
            out.push_str(&format!("import {};\n", import));
        }
        out.push('\n');
    }

    out.push_str(&format!("/**\n * Data class for {}.\n */\n", class.described_as));
    if options.use_annotations {
        out.push_str("@Data\n@Builder\n@NoArgsConstructor\n");
    }
    out.push_str(&format!("public class {} {{\n", class.name));

    for field in &class.fields {
        out.push('\n');
        match field.length {
            Some(length) => out.push_str(&format!(
                "    /** {} (length {}) */\n",
                field.original_name, length
            )),
            None => out.push_str(&format!("    /** {} */\n", field.original_name)),
        }
        match &field.java_type {
            JavaType::List(element) => out.push_str(&format!(
                "    private List<{}> {} = new ArrayList<>();\n",
                element, field.camel
            )),
            other => out.push_str(&format!(
                "    private {} {};\n",
                other.declaration(),
                field.camel
            )),
        }
    }

    if !options.use_annotations {
        out.push_str(&format!("\n    public {}() {{\n    }}\n", class.name));

        for field in &class.fields {
            let declaration = field.java_type.declaration();
            let accessor = capitalize(&field.camel);
            out.push_str(&format!(
                "\n    public {} get{}() {{\n        return {};\n    }}\n",
                declaration, accessor, field.camel
            ));
            out.push_str(&format!(
                "\n    public void set{}({} {}) {{\n        this.{} = {};\n    }}\n",
                accessor, declaration, field.camel, field.camel, field.camel
            ));
        }

        render_builder(&mut out, class);
    }

    out.push_str("}\n");
    out
}

fn render_builder(out: &mut String, class: &ClassSpec) {
    out.push_str("\n    public static Builder builder() {\n        return new Builder();\n    }\n");
    out.push_str("\n    public static final class Builder {\n");
    for field in &class.fields {
        out.push_str(&format!(
            "        private {} {};\n",
            field.java_type.declaration(),
            field.camel
        ));
    }
    for field in &class.fields {
        out.push_str(&format!(
            "\n        public Builder {}({} {}) {{\n            this.{} = {};\n            return this;\n        }}\n",
            field.camel,
            field.java_type.declaration(),
            field.camel,
            field.camel,
            field.camel
        ));
    }
    out.push_str(&format!(
        "\n        public {} build() {{\n            {} value = new {}();\n",
        class.name, class.name, class.name
    ));
    for field in &class.fields {
        out.push_str(&format!(
            "            value.set{}({});\n",
            capitalize(&field.camel),
            field.camel
        ));
    }
    out.push_str("            return value;\n        }\n    }\n");
}

fn collect_imports(class: &ClassSpec, use_annotations: bool) -> Vec<String> {
    let mut imports = Vec::new();
    if class
        .fields
        .iter()
        .any(|f| f.java_type == JavaType::Simple("BigDecimal"))
    {
        imports.push("java.math.BigDecimal".to_string());
    }
    if class.fields.iter().any(|f| matches!(f.java_type, JavaType::List(_))) {
        imports.push("java.util.ArrayList".to_string());
        imports.push("java.util.List".to_string());
    }
    if use_annotations {
        imports.push("lombok.Builder".to_string());
        imports.push("lombok.Data".to_string());
        imports.push("lombok.NoArgsConstructor".to_string());
    }
    imports.sort();
    imports.dedup();
    imports
}

fn render_enum(enum_spec: &EnumSpec, package: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("package {};\n\n", package));
    out.push_str(&format!(
        "/**\n * Enumeration for {}.\n */\n",
        enum_spec.original_name
    ));
    out.push_str(&format!("public enum {} {{\n", enum_spec.name));

    for (i, constant) in enum_spec.constants.iter().enumerate() {
        let separator = if i + 1 == enum_spec.constants.len() { ";" } else { "," };
        out.push_str(&format!(
            "    {}(\"{}\", \"{}\"){}\n",
            constant.name, constant.code, constant.description, separator
        ));
    }

    out.push_str("\n    private final String code;\n    private final String description;\n");
    out.push_str(&format!(
        "\n    private {}(String code, String description) {{\n        this.code = code;\n        this.description = description;\n    }}\n",
        enum_spec.name
    ));
    out.push_str("\n    public String getCode() {\n        return code;\n    }\n");
    out.push_str("\n    public String getDescription() {\n        return description;\n    }\n");
    out.push_str(&format!(
        "\n    public static {} fromCode(String code) {{\n        for ({} value : values()) {{\n            if (value.code.equals(code)) {{\n                return value;\n            }}\n        }}\n        return null;\n    }}\n",
        enum_spec.name, enum_spec.name
    ));
    out.push_str("\n    public static boolean isValid(String code) {\n        return fromCode(code) != null;\n    }\n");
    out.push_str("}\n");
    out
}
