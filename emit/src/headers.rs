//! Core and extension symbol table classes.

use tracing::debug;
use vkw_codegen_core::{CatalogEntry, ChainNode, GenerationModel, Scope, ScopeCatalog, VersionChain};

use crate::{banner, close_section, open_section};

pub const CORE_CLASSES_SECTION: &str = "VKW_DUMP_CORE_CLASSES";
pub const EXTENSION_CLASSES_SECTION: &str = "VKW_DUMP_EXTENSION_CLASSES";
pub const EXTENSION_NAME_MAP_SECTION: &str = "VKW_DUMP_EXTENSION_NAME_MAP_DEFINITION";

const INDENT: &str = "   ";

/// Banner, core classes, extension classes and the extension name map.
///
/// # Errors
///
/// Returns an error if the banner fingerprint cannot be computed.
pub fn render_headers_file(model: &GenerationModel) -> Result<String, String> {
    let mut out = banner(model)?;
    out.push_str(&render_core_classes(model));
    out.push('\n');
    out.push_str(&render_extension_classes(model));
    out.push('\n');
    out.push_str(&render_extension_name_map(model));
    Ok(out)
}

/// `InstanceCore<M,m>` and `DeviceCore<M,m>` specializations, one pair per
/// version, each deriving from the previous version's class.
pub fn render_core_classes(model: &GenerationModel) -> String {
    let mut out = String::new();
    open_section(&mut out, CORE_CLASSES_SECTION);
    for (instance, device) in model.chains.instance.nodes.iter().zip(&model.chains.device.nodes) {
        out.push_str(&core_class(&model.chains.instance, instance));
        out.push('\n');
        out.push_str(&core_class(&model.chains.device, device));
        out.push('\n');
    }
    close_section(&mut out, CORE_CLASSES_SECTION);
    out
}

fn core_class(chain: &VersionChain, node: &ChainNode) -> String {
    let (class, handle, var) = match chain.scope {
        Scope::Device => ("DeviceCore", "VkDevice", "device"),
        _ => ("InstanceCore", "VkInstance", "instance"),
    };
    let parent = match chain.parent(node) {
        Some(parent) => format!("{class}<{},{}>", parent.version.major, parent.version.minor),
        None => format!("SymbolTableBase<{handle}>"),
    };

    let mut out = String::new();
    out.push_str("template<>\n");
    out.push_str(&format!(
        "class {class}<{},{}>: public {parent} {{\n",
        node.version.major, node.version.minor
    ));
    out.push_str("public:\n");
    out.push_str(&format!("{INDENT}{class}(PFN_getProcAddr getProcAddr, {handle} {var}) :\n"));
    for command in &node.delta {
        out.push_str(&format!("{INDENT}{}\n", proc_addr_init(command)));
    }
    out.push_str(&format!("{INDENT}{parent}(getProcAddr, {var})\n"));
    out.push_str(&format!("{INDENT}{{}};\n"));
    push_members(&mut out, node.delta.iter().map(String::as_str));
    out.push_str("};\n");
    out
}

/// The `ext` enum, `ExtensionName` specializations and one `Extension`
/// class per catalogued extension, guarded per platform bucket.
pub fn render_extension_classes(model: &GenerationModel) -> String {
    let catalog = &model.catalog;
    let mut out = String::new();
    open_section(&mut out, EXTENSION_CLASSES_SECTION);

    out.push_str("enum class ext{\n");
    for entry in catalog.entries() {
        out.push_str(&format!("{},\n", entry.short_name));
    }
    out.push_str("};\n\n");

    for entry in catalog.entries() {
        out.push_str("template<>\n");
        out.push_str(&format!("struct ExtensionName<ext::{}>{{\n", entry.short_name));
        out.push_str(&format!(
            "{INDENT}constexpr static const char* value = \"{}\";\n",
            entry.name
        ));
        out.push_str("};\n\n");
    }

    for scope in [&catalog.instance, &catalog.device] {
        push_guarded(&mut out, scope, |out, entry| {
            out.push_str(&extension_class(entry));
            out.push('\n');
        });
    }

    close_section(&mut out, EXTENSION_CLASSES_SECTION);
    out
}

fn extension_class(entry: &CatalogEntry) -> String {
    let (parent_type, var) = match entry.scope {
        Scope::Device => ("Device", "device"),
        _ => ("Instance", "instance"),
    };
    let name = &entry.short_name;
    let base = format!("ExtensionBase<ext::{name}, {parent_type}>");

    let mut out = String::new();
    out.push_str("template<>\n");
    out.push_str(&format!("class Extension<ext::{name}>: public {base} {{\n"));
    out.push_str("public:\n");
    out.push_str(&format!("{INDENT}Extension({parent_type} const& {var}) :\n"));
    for command in entry.command_names() {
        out.push_str(&format!("{INDENT}{}\n", proc_addr_init(command)));
    }
    out.push_str(&format!("{INDENT}{base}({var})\n"));
    out.push_str(&format!("{INDENT}{{}};\n"));
    push_members(&mut out, entry.command_names());
    out.push_str("};\n");
    out
}

/// `VKW_MAP_ENTRY(ext::X, "VK_X")` per catalogued extension.
pub fn render_extension_name_map(model: &GenerationModel) -> String {
    let mut out = String::new();
    open_section(&mut out, EXTENSION_NAME_MAP_SECTION);
    for scope in [&model.catalog.instance, &model.catalog.device] {
        push_guarded(&mut out, scope, |out, entry| {
            out.push_str(&format!("VKW_MAP_ENTRY(ext::{}, \"{}\")\n", entry.short_name, entry.name));
        });
    }
    close_section(&mut out, EXTENSION_NAME_MAP_SECTION);
    out
}

/// Emits every bucket of `scope`, wrapping non-base buckets in their guard.
fn push_guarded(out: &mut String, scope: &ScopeCatalog, mut emit: impl FnMut(&mut String, &CatalogEntry)) {
    for bucket in &scope.buckets {
        debug!(scope = %scope.scope, platform = %bucket.platform, extensions = bucket.extensions.len(), "Rendering bucket");
        if let Some(guard) = &bucket.guard {
            out.push_str(&format!("#ifdef {guard}\n"));
        }
        for entry in &bucket.extensions {
            emit(out, entry);
        }
        if let Some(guard) = &bucket.guard {
            out.push_str(&format!("#endif // {guard}\n"));
        }
    }
}

fn proc_addr_init(command: &str) -> String {
    format!("{command}(getProcAddrT<PFN_{command}>(\"{command}\")),")
}

fn push_members<'a>(out: &mut String, commands: impl Iterator<Item = &'a str>) {
    for command in commands {
        out.push_str(&format!("{INDENT}PFN_{command} {command};\n"));
    }
}
