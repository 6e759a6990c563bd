//! Serialized model output.

use vkw_codegen_core::GenerationModel;

/// Supported model dump formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Formats a generation model in the requested output format.
pub fn format_model(model: &GenerationModel, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(model)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(model).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}
