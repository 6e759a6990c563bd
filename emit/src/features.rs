//! Device feature classes for the members of `VkPhysicalDeviceFeatures`.

use vkw_codegen_core::{FeatureMember, GenerationModel};

use crate::{banner, close_section, open_section};

pub const FEATURE_CLASSES_SECTION: &str = "VKW_GENERATE_FEATURE_CLASSES";
pub const FEATURE_MAP_SECTION: &str = "VKW_GENERATE_FEATURE_MAP";

/// Banner, feature classes and the feature map.
///
/// # Errors
///
/// Returns an error if the banner fingerprint cannot be computed.
pub fn render_features_file(model: &GenerationModel) -> Result<String, String> {
    let mut out = banner(model)?;
    out.push_str(&render_feature_classes(model));
    out.push('\n');
    out.push_str(&render_feature_map(model));
    Ok(out)
}

/// One `FeatureBase` subclass per device feature member.
pub fn render_feature_classes(model: &GenerationModel) -> String {
    let mut out = String::new();
    open_section(&mut out, FEATURE_CLASSES_SECTION);
    for member in &model.device_features {
        out.push_str(&feature_class(member));
    }
    close_section(&mut out, FEATURE_CLASSES_SECTION);
    out
}

fn feature_class(member: &FeatureMember) -> String {
    let FeatureMember { name, ty } = member;
    let mut out = String::new();
    out.push_str(&format!("class {name}: public FeatureBase {{\n"));
    out.push_str("public:\n");
    out.push_str(&format!(
        "   {ty}* feature_location(VkPhysicalDeviceFeatures* featureList) const override {{\n"
    ));
    out.push_str(&format!(
        "      return reinterpret_cast<{ty}*>(reinterpret_cast<char*>(featureList) + offsetof(VkPhysicalDeviceFeatures, {name}));\n"
    ));
    out.push_str("   };\n");
    out.push_str(&format!(
        "   {ty} const* feature_location(VkPhysicalDeviceFeatures const* featureList) const override {{\n"
    ));
    out.push_str(&format!(
        "      return reinterpret_cast<const {ty}*>(reinterpret_cast<const char*>(featureList) + offsetof(VkPhysicalDeviceFeatures, {name}));\n"
    ));
    out.push_str("   };\n");
    out.push_str("   const char* name() const override {\n");
    out.push_str("      return m_name;\n");
    out.push_str("   };\n");
    out.push_str("private:\n");
    out.push_str(&format!("   constexpr static const char* m_name = \"{name}\";\n"));
    out.push_str("};\n");
    out
}

/// `VKW_FEATURE_ENTRY(name)` per device feature member.
pub fn render_feature_map(model: &GenerationModel) -> String {
    let mut out = String::new();
    open_section(&mut out, FEATURE_MAP_SECTION);
    for member in &model.device_features {
        out.push_str(&format!("VKW_FEATURE_ENTRY({})\n", member.name));
    }
    close_section(&mut out, FEATURE_MAP_SECTION);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_model;

    #[test]
    fn test_feature_class_per_member() {
        let out = render_feature_classes(&sample_model());
        assert_eq!(out.matches(": public FeatureBase {").count(), 2);
        assert!(out.contains("class robustBufferAccess: public FeatureBase {"));
        assert!(out.contains("offsetof(VkPhysicalDeviceFeatures, geometryShader)"));
        assert!(out.contains("   constexpr static const char* m_name = \"geometryShader\";\n"));
        assert!(out.contains("reinterpret_cast<const VkBool32*>"));
    }

    #[test]
    fn test_feature_map_entries() {
        let out = render_feature_map(&sample_model());
        assert_eq!(
            out,
            "#ifdef VKW_GENERATE_FEATURE_MAP\n\
             VKW_FEATURE_ENTRY(robustBufferAccess)\n\
             VKW_FEATURE_ENTRY(geometryShader)\n\
             #endif // VKW_GENERATE_FEATURE_MAP\n"
        );
    }

    #[test]
    fn test_no_features_renders_empty_sections() {
        let mut model = sample_model();
        model.device_features.clear();
        assert_eq!(
            render_feature_classes(&model),
            "#ifdef VKW_GENERATE_FEATURE_CLASSES\n#endif // VKW_GENERATE_FEATURE_CLASSES\n"
        );
    }
}
