use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{Level, debug, warn};
use vkw_codegen_core::{GenerationModel, GeneratorConfig, Scope, validate_model};
use vkw_codegen_emit::{
    OutputFormat, format_model, render_features_file, render_headers_file, render_type_traits_file,
};
use vkw_codegen_registry::load_registry;

#[derive(Debug, Parser)]
#[command(name = "vkw-gen")]
#[command(about = "Generate vkw header fragments from the Vulkan registry")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render core and extension symbol table classes.
    Headers(RenderArgs),
    /// Render device feature classes and the feature map.
    Features(RenderArgs),
    /// Render VulkanTypeTraits specializations.
    TypeTraits(RenderArgs),
    /// Dump the generation model.
    Model(ModelArgs),
    /// Build and validate the model, then print a summary.
    Check(RegistryArgs),
}

#[derive(Debug, Args)]
struct RegistryArgs {
    /// Path to vk.xml, or a directory containing it.
    registry: PathBuf,
    /// Generator configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    registry: RegistryArgs,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ModelArgs {
    #[command(flatten)]
    registry: RegistryArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Headers(args) => run_render(args, render_headers_file),
        Command::Features(args) => run_render(args, render_features_file),
        Command::TypeTraits(args) => run_render(args, render_type_traits_file),
        Command::Model(args) => run_model(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_render(
    args: RenderArgs,
    render: fn(&GenerationModel) -> Result<String, String>,
) -> Result<(), String> {
    let model = load_model(&args.registry)?;
    let raw = render(&model)?;
    write_output(args.output.as_deref(), &raw)
}

fn run_model(args: ModelArgs) -> Result<(), String> {
    let model = load_model(&args.registry)?;
    let raw = format_model(&model, args.format)?;
    write_output(args.output.as_deref(), &raw)
}

fn run_check(args: RegistryArgs) -> Result<(), String> {
    let model = load_model(&args)?;
    print!("{}", summarize(&args.registry, &model));

    let findings = validate_model(&model);
    for finding in &findings {
        let label = if finding.is_fatal() { "error" } else { "warning" };
        eprintln!("{label}: {finding}");
    }
    for rejected in &model.catalog.rejected {
        eprintln!("rejected: {}: {}", rejected.name, rejected.reason);
    }
    for unresolved in &model.unresolved_commands {
        eprintln!(
            "warning: {} (referenced by {}) is not defined by the registry; treated as instance-level",
            unresolved.command, unresolved.referenced_by
        );
    }

    let fatal = findings.iter().filter(|f| f.is_fatal()).count();
    if fatal > 0 || !model.catalog.rejected.is_empty() {
        return Err(format!(
            "check failed: {fatal} validation error(s), {} rejected extension(s)",
            model.catalog.rejected.len()
        ));
    }
    Ok(())
}

fn load_model(args: &RegistryArgs) -> Result<GenerationModel, String> {
    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    debug!(api = %config.api, policy = ?config.unknown_commands, "Loaded generator config");

    let schema = load_registry(&args.registry, &config.api)
        .map_err(|err| format!("Failed to load registry '{}': {err}", args.registry.display()))?;
    let model = GenerationModel::build(&schema, &config).map_err(|err| err.to_string())?;
    if !model.unresolved_commands.is_empty() {
        warn!(count = model.unresolved_commands.len(), "Commands classified by fallback");
    }
    Ok(model)
}

fn write_output(output: Option<&Path>, raw: &str) -> Result<(), String> {
    let Some(path) = output else {
        print!("{raw}");
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!("Failed to create output directory '{}': {err}", parent.display())
            })?;
        }
    }
    fs::write(path, raw).map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
    eprintln!("Wrote '{}'.", path.display());
    Ok(())
}

fn summarize(registry: &Path, model: &GenerationModel) -> String {
    let versions: Vec<String> = model.chains.versions().map(|v| v.to_string()).collect();
    let chain_commands = |scope: Scope| {
        model
            .chains
            .for_scope(scope)
            .map_or(0, |chain| chain.commands().count())
    };

    let mut out = String::new();
    out.push_str(&format!("Registry: {}\n", registry.display()));
    out.push_str(&format!("API: {}\n", model.api));
    out.push_str(&format!("Versions: {}\n", versions.join(", ")));
    out.push_str(&format!(
        "Core commands: {} instance, {} device\n",
        chain_commands(Scope::Instance),
        chain_commands(Scope::Device)
    ));
    out.push_str(&format!(
        "Extensions: {} instance, {} device, {} rejected\n",
        model.catalog.instance.entries().count(),
        model.catalog.device.entries().count(),
        model.catalog.rejected.len()
    ));
    out.push_str(&format!("Type traits: {}\n", model.type_traits.len()));
    out.push_str(&format!("Device features: {}\n", model.device_features.len()));
    if let Ok(fingerprint) = model.fingerprint() {
        out.push_str(&format!("Fingerprint: {fingerprint}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vkw_codegen_core::{CommandDef, ExtensionDef, FeatureBlock, SchemaModel};

    fn model() -> GenerationModel {
        let mut schema = SchemaModel::new();
        schema.commands.extend([
            CommandDef::new("vkDestroyInstance", ["VkInstance"]),
            CommandDef::new("vkQueueSubmit", ["VkQueue"]),
            CommandDef::new("vkCreateSwapchainKHR", ["VkDevice"]),
        ]);
        schema.features.push(FeatureBlock::new(
            "VK_VERSION_1_0",
            "1.0",
            ["vkDestroyInstance", "vkQueueSubmit"],
        ));
        schema.extensions.push(ExtensionDef::new(
            "VK_KHR_swapchain",
            Scope::Device,
            ["vkCreateSwapchainKHR"],
        ));
        GenerationModel::build(&schema, &GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn test_summarize_counts() {
        let summary = summarize(Path::new("vk.xml"), &model());
        assert!(summary.contains("Registry: vk.xml\n"));
        assert!(summary.contains("Versions: 1.0\n"));
        assert!(summary.contains("Core commands: 1 instance, 1 device\n"));
        assert!(summary.contains("Extensions: 0 instance, 1 device, 0 rejected\n"));
        assert!(summary.contains("Fingerprint: "));
    }

    #[test]
    fn test_write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vkw_headers.inc");
        write_output(Some(&path), "// contents\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "// contents\n");
    }

    #[test]
    fn test_cli_parses_render_args() {
        let cli = Cli::try_parse_from(["vkw-gen", "headers", "registry", "--output", "out.inc", "-v"]).unwrap();
        assert!(cli.verbose);
        let Command::Headers(args) = cli.command else {
            panic!("expected headers subcommand");
        };
        assert_eq!(args.registry.registry, PathBuf::from("registry"));
        assert_eq!(args.output, Some(PathBuf::from("out.inc")));
    }

    #[test]
    fn test_cli_requires_registry_path() {
        for sub in ["headers", "features", "type-traits", "model", "check"] {
            let err = Cli::try_parse_from(["vkw-gen", sub]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument, "{sub}");
        }
    }
}
