//! `VulkanTypeTraits` specializations.

use vkw_codegen_core::{GenerationModel, Scope, TypeTrait};

use crate::{banner, close_section, open_section};

pub const TYPE_DEFINITIONS_SECTION: &str = "VKW_GENERATE_TYPE_DEFINITIONS";
pub const TYPE_FUNC_IMPL_SECTION: &str = "VKW_GENERATE_TYPE_FUNC_IMPL";

/// Banner followed by [`render_type_traits`].
///
/// # Errors
///
/// Returns an error if the banner fingerprint cannot be computed.
pub fn render_type_traits_file(model: &GenerationModel) -> Result<String, String> {
    let mut out = banner(model)?;
    out.push_str(&render_type_traits(model));
    Ok(out)
}

/// Trait declarations, then their out-of-line definitions.
pub fn render_type_traits(model: &GenerationModel) -> String {
    let mut out = String::new();

    open_section(&mut out, TYPE_DEFINITIONS_SECTION);
    for ty in &model.type_traits {
        let creator = creator_type(ty);
        out.push_str("template<>\n");
        out.push_str(&format!("struct VulkanTypeTraits<{}> {{\n", ty.handle_type));
        out.push_str(&format!("   using CreatorType = {creator};\n"));
        out.push_str(&format!("   using CreateInfoType = {};\n", ty.create_info));
        out.push_str(&format!(
            "   static PFN_{} getConstructor({creator} const& creator);\n",
            ty.constructor
        ));
        out.push_str(&format!(
            "   static PFN_{} getDestructor({creator} const& creator);\n",
            ty.destructor
        ));
        out.push_str("};\n");
    }
    close_section(&mut out, TYPE_DEFINITIONS_SECTION);

    open_section(&mut out, TYPE_FUNC_IMPL_SECTION);
    for ty in &model.type_traits {
        let creator = creator_type(ty);
        for (kind, function) in [("Constructor", &ty.constructor), ("Destructor", &ty.destructor)] {
            out.push_str(&format!(
                "PFN_{function} VulkanTypeTraits<{}>::get{kind}({creator} const& creator) {{\n",
                ty.handle_type
            ));
            out.push_str(&format!("   return creator.core<1, 0>().{function};\n"));
            out.push_str("}\n");
        }
    }
    close_section(&mut out, TYPE_FUNC_IMPL_SECTION);

    out
}

fn creator_type(ty: &TypeTrait) -> &'static str {
    match ty.creator {
        Scope::Device => "vkw::Device",
        _ => "vkw::Instance",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_model;

    #[test]
    fn test_type_trait_declaration() {
        let out = render_type_traits(&sample_model());
        let expected = "template<>\n\
            struct VulkanTypeTraits<VkFence> {\n   \
            using CreatorType = vkw::Device;\n   \
            using CreateInfoType = VkFenceCreateInfo;\n   \
            static PFN_vkCreateFence getConstructor(vkw::Device const& creator);\n   \
            static PFN_vkDestroyFence getDestructor(vkw::Device const& creator);\n\
            };\n";
        assert!(out.contains(expected), "unexpected output:\n{out}");
    }

    #[test]
    fn test_type_trait_implementation() {
        let out = render_type_traits(&sample_model());
        let implementation = out.split("#ifdef VKW_GENERATE_TYPE_FUNC_IMPL\n").nth(1).unwrap();
        assert!(implementation.contains(
            "PFN_vkCreateFence VulkanTypeTraits<VkFence>::getConstructor(vkw::Device const& creator) {\n   return creator.core<1, 0>().vkCreateFence;\n}\n"
        ));
        assert!(implementation.contains("VulkanTypeTraits<VkFence>::getDestructor"));
        assert!(implementation.ends_with("#endif // VKW_GENERATE_TYPE_FUNC_IMPL\n"));
    }

    #[test]
    fn test_instance_created_handle_uses_instance_creator() {
        let mut model = sample_model();
        model.type_traits = vec![TypeTrait {
            handle_type: "VkDebugReportCallbackEXT".into(),
            creator: Scope::Instance,
            constructor: "vkCreateDebugReportCallbackEXT".into(),
            destructor: "vkDestroyDebugReportCallbackEXT".into(),
            create_info: "VkDebugReportCallbackCreateInfoEXT".into(),
        }];
        let out = render_type_traits(&model);
        assert!(out.contains("   using CreatorType = vkw::Instance;\n"));
        assert!(!out.contains("vkw::Device"));
    }
}
