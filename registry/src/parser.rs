//! Conversion of the registry element tree into a [`SchemaModel`].
//!
//! Element-level `api` attributes (on `<command>`, `<param>`, `<require>`)
//! are resolved here against the target API. Feature blocks and extensions
//! keep their `api`/`supported` lists; the core applies those.

use tracing::debug;
use vkw_codegen_core::{
    CommandDef, ExtensionDef, FeatureBlock, FeatureMember, GenError, PlatformDef, SchemaModel, Scope,
    split_api_list,
};

use crate::tree::Element;

/// Struct whose members become device feature entries.
pub const DEVICE_FEATURES_STRUCT: &str = "VkPhysicalDeviceFeatures";

type Result<T> = std::result::Result<T, GenError>;

/// Converts a parsed `<registry>` root.
pub(crate) fn convert(root: &Element, api: &str) -> Result<SchemaModel> {
    if root.name != "registry" {
        return Err(malformed(&root.name, "document root must be <registry>"));
    }

    let mut model = SchemaModel::new();

    for platforms in root.children_named("platforms") {
        for platform in platforms.children_named("platform") {
            model.platforms.push(parse_platform(platform)?);
        }
    }

    for types in root.children_named("types") {
        if let Some(features) = types
            .children_named("type")
            .find(|t| t.attr("name") == Some(DEVICE_FEATURES_STRUCT))
        {
            model.device_features = parse_device_features(features)?;
        }
    }

    for commands in root.children_named("commands") {
        for (index, command) in commands.children_named("command").enumerate() {
            if !applies_to(command, api) {
                debug!(index, "Skipping command definition for other API");
                continue;
            }
            model.commands.push(parse_command(command, index, api)?);
        }
    }

    for feature in root.children_named("feature") {
        model.features.push(parse_feature(feature, api)?);
    }

    for extensions in root.children_named("extensions") {
        for extension in extensions.children_named("extension") {
            model.extensions.push(parse_extension(extension, api)?);
        }
    }

    Ok(model)
}

fn parse_platform(element: &Element) -> Result<PlatformDef> {
    let name = required_attr(element, "name", "<platform>")?;
    Ok(PlatformDef {
        name: name.to_string(),
        guard_token: element.attr("protect").map(str::to_string),
    })
}

fn parse_device_features(element: &Element) -> Result<Vec<FeatureMember>> {
    element
        .children_named("member")
        .map(|member| -> Result<FeatureMember> {
            let name = child_text(member, "name").ok_or_else(|| malformed(DEVICE_FEATURES_STRUCT, "member without <name>"))?;
            let ty = child_text(member, "type")
                .ok_or_else(|| malformed(&format!("{DEVICE_FEATURES_STRUCT}::{name}"), "member without <type>"))?;
            Ok(FeatureMember { name, ty })
        })
        .collect()
}

fn parse_command(element: &Element, index: usize, api: &str) -> Result<CommandDef> {
    if let Some(alias) = element.attr("alias") {
        let name = required_attr(element, "name", &format!("<command #{index}>"))?;
        return Ok(CommandDef::alias(name, alias));
    }

    let name = element
        .child("proto")
        .and_then(|proto| child_text(proto, "name"))
        .ok_or_else(|| malformed(&format!("<command #{index}>"), "command without <proto><name>"))?;

    let mut param_types = Vec::new();
    for param in element.children_named("param") {
        if !applies_to(param, api) {
            continue;
        }
        let ty = child_text(param, "type").ok_or_else(|| malformed(&name, "parameter without <type>"))?;
        param_types.push(ty);
    }

    Ok(CommandDef::new(name, param_types))
}

fn parse_feature(element: &Element, api: &str) -> Result<FeatureBlock> {
    let name = required_attr(element, "name", "<feature>")?;
    let number = required_attr(element, "number", name)?;

    let mut block = FeatureBlock::new(name, number, Vec::<String>::new());
    block.api = element.attr("api").map(split_api_list).unwrap_or_default();

    for require in element.children_named("require") {
        if !applies_to(require, api) {
            continue;
        }
        for command in require.children_named("command") {
            block.commands.push(required_attr(command, "name", name)?.to_string());
        }
        for ty in require.children_named("type") {
            block.types.push(required_attr(ty, "name", name)?.to_string());
        }
    }

    Ok(block)
}

fn parse_extension(element: &Element, api: &str) -> Result<ExtensionDef> {
    let name = required_attr(element, "name", "<extension>")?;

    let kind = match element.attr("type") {
        None => None,
        Some("instance") => Some(Scope::Instance),
        Some("device") => Some(Scope::Device),
        Some(other) => return Err(malformed(name, &format!("unknown extension type {other:?}"))),
    };

    let mut commands: Vec<String> = Vec::new();
    for require in element.children_named("require") {
        if !applies_to(require, api) {
            continue;
        }
        for command in require.children_named("command") {
            let command = required_attr(command, "name", name)?;
            // Commands re-listed under several `depends` blocks are loaded once.
            if !commands.iter().any(|c| c == command) {
                commands.push(command.to_string());
            }
        }
    }

    Ok(ExtensionDef {
        name: name.to_string(),
        kind,
        platform: element.attr("platform").map(str::to_string),
        supported: element.attr("supported").map(split_api_list).unwrap_or_default(),
        commands,
    })
}

/// `true` when the element has no `api` attribute or lists `api`.
fn applies_to(element: &Element, api: &str) -> bool {
    element
        .attr("api")
        .is_none_or(|list| split_api_list(list).iter().any(|a| a == api))
}

fn required_attr<'a>(element: &'a Element, attr: &str, entity: &str) -> Result<&'a str> {
    element
        .attr(attr)
        .ok_or_else(|| malformed(entity, &format!("<{}> without {attr} attribute", element.name)))
}

fn child_text(element: &Element, name: &str) -> Option<String> {
    element
        .child(name)
        .map(Element::text)
        .filter(|text| !text.is_empty())
}

fn malformed(entity: &str, detail: &str) -> GenError {
    GenError::MalformedSchema {
        entity: entity.to_string(),
        detail: detail.to_string(),
    }
}
