//! OpenAPI 3.0.3 document emission and schema splitting.
//!
//! The main document carries one POST path per operation and a
//! `components.schemas` registry mirroring the message structure. The
//! BY_OBJECT strategy then relocates every schema into
//! `openapi/schemas/{Name}.yaml` and rewrites the `$ref`s on both sides.

use indexmap::IndexMap;

use super::yaml::{self, Yaml};
use super::{Artifact, SpecType, container_class_name, paths};
use crate::config::{OpenApiConfig, SplitStrategy};
use crate::error::Result;
use crate::model::{FieldNode, MessageModel, Optionality};
use crate::utils::kebab_case;

/// Emit the main document plus any split schema files.
pub fn emit_openapi(model: &MessageModel, config: &OpenApiConfig) -> Result<Vec<Artifact>> {
    let operation_id = model.require_operation_id("the OpenAPI document")?;

    let mut schemas: IndexMap<String, Yaml> = IndexMap::new();

    if let Some(shared) = &model.shared_header {
        if shared.has_content() {
            let schema = object_schema(&shared.fields, &mut schemas);
            schemas.insert("SharedHeader".to_string(), schema);
        }
    }

    let request_schema_name = format!("{}Request", operation_id);
    let request_schema = object_schema(&model.request.fields, &mut schemas);
    schemas.insert(request_schema_name.clone(), request_schema);

    let response_schema_name = format!("{}Response", operation_id);
    let has_response = model.response.has_content();
    if has_response {
        let schema = object_schema(&model.response.fields, &mut schemas);
        schemas.insert(response_schema_name.clone(), schema);
    }

    let mut doc = Yaml::map();
    doc.insert("openapi".to_string(), Yaml::string("3.0.3"));
    doc.insert("info".to_string(), info_section(model, config, operation_id));
    doc.insert(
        "servers".to_string(),
        Yaml::Seq(vec![Yaml::Map(
            [("url".to_string(), Yaml::string(&config.server_url))]
                .into_iter()
                .collect(),
        )]),
    );
    doc.insert(
        "paths".to_string(),
        paths_section(
            operation_id,
            &request_schema_name,
            has_response.then_some(response_schema_name.as_str()),
        ),
    );

    let mut components = Yaml::map();
    components.insert("schemas".to_string(), Yaml::Map(schemas));
    doc.insert("components".to_string(), Yaml::Map(components));

    let mut main = Yaml::Map(doc);

    match config.split_strategy {
        SplitStrategy::None => Ok(vec![Artifact::new(paths::OPENAPI_MAIN, yaml::to_string(&main))]),
        SplitStrategy::ByObject => {
            let splits = split_by_object(&mut main);
            let mut artifacts =
                vec![Artifact::new(paths::OPENAPI_MAIN, yaml::to_string(&main))];
            for (name, schema_doc) in splits {
                artifacts.push(Artifact::new(
                    format!("{}/{}.yaml", paths::OPENAPI_SCHEMAS_DIR, name),
                    yaml::to_string(&schema_doc),
                ));
            }
            Ok(artifacts)
        }
    }
}

fn info_section(model: &MessageModel, config: &OpenApiConfig, operation_id: &str) -> Yaml {
    let title = config
        .title
        .clone()
        .or_else(|| model.metadata.operation_name.clone())
        .unwrap_or_else(|| format!("{} API", operation_id));
    let version = config
        .version
        .clone()
        .or_else(|| model.metadata.version.clone())
        .unwrap_or_else(|| "1.0.0".to_string());
    let description = config
        .description
        .clone()
        .unwrap_or_else(|| format!("Generated interface for {}", operation_id));

    let mut info = Yaml::map();
    info.insert("title".to_string(), Yaml::string(title));
    info.insert("version".to_string(), Yaml::string(version));
    info.insert("description".to_string(), Yaml::string(description));
    Yaml::Map(info)
}

fn paths_section(
    operation_id: &str,
    request_schema: &str,
    response_schema: Option<&str>,
) -> Yaml {
    let schema_ref = |name: &str| {
        Yaml::Map(
            [(
                "$ref".to_string(),
                Yaml::string(format!("#/components/schemas/{}", name)),
            )]
            .into_iter()
            .collect(),
        )
    };
    let json_content = |name: &str| {
        let mut media = Yaml::map();
        media.insert("schema".to_string(), schema_ref(name));
        let mut content = Yaml::map();
        content.insert("application/json".to_string(), Yaml::Map(media));
        Yaml::Map(content)
    };

    let mut request_body = Yaml::map();
    request_body.insert("required".to_string(), Yaml::Bool(true));
    request_body.insert("content".to_string(), json_content(request_schema));

    let mut ok_response = Yaml::map();
    ok_response.insert("description".to_string(), Yaml::string("Successful response"));
    if let Some(name) = response_schema {
        ok_response.insert("content".to_string(), json_content(name));
    }
    let mut responses = Yaml::map();
    responses.insert("200".to_string(), Yaml::Map(ok_response));

    let mut post = Yaml::map();
    post.insert("operationId".to_string(), Yaml::string(operation_id));
    post.insert("requestBody".to_string(), Yaml::Map(request_body));
    post.insert("responses".to_string(), Yaml::Map(responses));

    let mut path_item = Yaml::map();
    path_item.insert("post".to_string(), Yaml::Map(post));

    let mut paths = Yaml::map();
    paths.insert(format!("/{}", kebab_case(operation_id)), Yaml::Map(path_item));
    Yaml::Map(paths)
}

/// Build an object schema for a children list, registering every container
/// class encountered along the way.
fn object_schema(nodes: &[FieldNode], schemas: &mut IndexMap<String, Yaml>) -> Yaml {
    let mut properties = Yaml::map();
    let mut required: Vec<Yaml> = Vec::new();

    for node in nodes {
        if node.is_transitory {
            continue;
        }
        let name = node
            .camel_case_name
            .clone()
            .expect("non-transitory nodes are normalized");

        if node.optionality == Some(Optionality::Mandatory) {
            required.push(Yaml::string(&name));
        }

        if node.is_container() {
            let class_name = container_class_name(node);
            if !schemas.contains_key(&class_name) {
                // Reserve the slot first so self-referential shapes cannot
                // recurse forever, then fill it.
                schemas.insert(class_name.clone(), Yaml::Null);
                let schema = object_schema(&node.children, schemas);
                schemas.insert(class_name.clone(), schema);
            }
            let reference = Yaml::Map(
                [(
                    "$ref".to_string(),
                    Yaml::string(format!("#/components/schemas/{}", class_name)),
                )]
                .into_iter()
                .collect(),
            );
            if node.is_array {
                let mut array = Yaml::map();
                array.insert("type".to_string(), Yaml::string("array"));
                array.insert("items".to_string(), reference);
                if let Some(max) = node.occurrence().and_then(|o| o.finite_max()) {
                    array.insert("maxItems".to_string(), Yaml::Int(max as i64));
                }
                properties.insert(name, Yaml::Map(array));
            } else {
                properties.insert(name, reference);
            }
        } else {
            properties.insert(name, primitive_schema(node));
        }
    }

    let mut schema = Yaml::map();
    schema.insert("type".to_string(), Yaml::string("object"));
    schema.insert("properties".to_string(), Yaml::Map(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Yaml::Seq(required));
    }
    Yaml::Map(schema)
}

fn primitive_schema(node: &FieldNode) -> Yaml {
    let spec_type = SpecType::of(node.data_type.as_deref());
    let mut schema = Yaml::map();
    schema.insert("type".to_string(), Yaml::string("string"));
    if let Some(format) = spec_type.openapi_format() {
        schema.insert("format".to_string(), Yaml::string(format));
    }
    if let Some(length) = node.length {
        schema.insert("maxLength".to_string(), Yaml::Int(length as i64));
    }
    if let Some(default) = &node.default_value {
        schema.insert("default".to_string(), Yaml::string(default));
    }
    Yaml::Map(schema)
}

/// Apply the BY_OBJECT strategy to the main document, returning the split
/// schema documents. The main document is modified in place.
fn split_by_object(main: &mut Yaml) -> Vec<(String, Yaml)> {
    let schemas = {
        let root = main.as_map_mut().expect("main document is a map");
        let Some(components) = root.get_mut("components").and_then(Yaml::as_map_mut) else {
            return Vec::new();
        };
        let Some(Yaml::Map(schemas)) = components.shift_remove("schemas") else {
            return Vec::new();
        };
        if components.is_empty() {
            root.shift_remove("components");
        }
        schemas
    };

    if schemas.is_empty() {
        return Vec::new();
    }

    rewrite_refs(main, &|name| format!("./schemas/{}.yaml#/{}", name, name));

    schemas
        .into_iter()
        .map(|(name, mut schema)| {
            rewrite_refs(&mut schema, &|target| format!("./{}.yaml#/{}", target, target));
            let mut doc = Yaml::map();
            doc.insert(name.clone(), schema);
            (name, Yaml::Map(doc))
        })
        .collect()
}

const INLINE_REF_PREFIX: &str = "#/components/schemas/";

fn rewrite_refs(value: &mut Yaml, rewrite: &impl Fn(&str) -> String) {
    match value {
        Yaml::Map(map) => {
            for (key, entry) in map.iter_mut() {
                if key == "$ref" {
                    if let Yaml::Str(target) = entry {
                        if let Some(name) = target.strip_prefix(INLINE_REF_PREFIX) {
                            *target = rewrite(name);
                        }
                    }
                } else {
                    rewrite_refs(entry, rewrite);
                }
            }
        }
        Yaml::Seq(seq) => {
            for entry in seq.iter_mut() {
                rewrite_refs(entry, rewrite);
            }
        }
        _ => {}
    }
}
