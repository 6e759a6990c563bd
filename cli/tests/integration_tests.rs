use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn registry_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("registry")
        .join("tests")
        .join("fixtures")
        .join("vk_subset.xml")
}

fn vkw_gen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vkw-gen"))
        .args(args)
        .output()
        .expect("failed to run vkw-gen")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("test paths are UTF-8")
}

/// Registry with a 1.0 -> 1.2 jump.
fn write_gap_registry(dir: &Path) -> PathBuf {
    let path = dir.join("vk.xml");
    fs::write(
        &path,
        r#"<registry>
    <commands>
        <command><proto><type>void</type> <name>vkDestroyInstance</name></proto>
            <param><type>VkInstance</type> <name>instance</name></param></command>
        <command><proto><type>void</type> <name>vkCmdDrawIndirectCount</name></proto>
            <param><type>VkCommandBuffer</type> <name>commandBuffer</name></param></command>
    </commands>
    <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
        <require><command name="vkDestroyInstance"/></require>
    </feature>
    <feature api="vulkan" name="VK_VERSION_1_2" number="1.2">
        <require><command name="vkCmdDrawIndirectCount"/></require>
    </feature>
</registry>"#,
    )
    .expect("failed to write registry");
    path
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn headers_to_stdout() {
    let output = vkw_gen(&["headers", path_arg(&registry_fixture())]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("// Generated by vkw-gen"));
    assert!(stdout.contains("class InstanceCore<1,2>: public InstanceCore<1,1> {"));
    assert!(stdout.contains("class DeviceCore<1,0>: public SymbolTableBase<VkDevice> {"));
    assert!(stdout.contains("#ifdef VK_USE_PLATFORM_XLIB_KHR\n"));
    assert!(stdout.contains("VKW_MAP_ENTRY(ext::KHR_swapchain, \"VK_KHR_swapchain\")"));
    assert!(!stdout.contains("vkGetFaultData"));
    assert!(!stdout.contains("NV_extension_1"));
}

#[test]
fn headers_to_file_from_registry_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(registry_fixture(), dir.path().join("vk.xml")).unwrap();
    let out_path = dir.path().join("generated").join("vkw_headers.inc");

    let output = vkw_gen(&["headers", path_arg(dir.path()), "--output", path_arg(&out_path)]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let written = fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("#ifdef VKW_DUMP_EXTENSION_CLASSES\n"));
}

#[test]
fn generated_headers_are_reproducible() {
    let first = vkw_gen(&["headers", path_arg(&registry_fixture())]);
    let second = vkw_gen(&["headers", path_arg(&registry_fixture())]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn features_and_type_traits() {
    let features = vkw_gen(&["features", path_arg(&registry_fixture())]);
    assert!(features.status.success());
    let features = String::from_utf8(features.stdout).unwrap();
    assert!(features.contains("class geometryShader: public FeatureBase {"));
    assert!(features.contains("VKW_FEATURE_ENTRY(robustBufferAccess)\n"));

    let traits = vkw_gen(&["type-traits", path_arg(&registry_fixture())]);
    assert!(traits.status.success());
    let traits = String::from_utf8(traits.stdout).unwrap();
    assert!(traits.contains("struct VulkanTypeTraits<VkFence> {"));
    assert!(!traits.contains("VulkanTypeTraits<VkInstance>"));
}

// ---------------------------------------------------------------------------
// Model and check
// ---------------------------------------------------------------------------

#[test]
fn model_json_dump() {
    let output = vkw_gen(&["model", path_arg(&registry_fixture()), "--format", "json"]);
    assert!(output.status.success());

    let model: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(model["api"], "vulkan");
    assert_eq!(model["chains"]["instance"]["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(model["chains"]["device"]["nodes"][1]["delta"][0], "vkTrimCommandPool");
}

#[test]
fn model_yaml_dump() {
    let output = vkw_gen(&["model", path_arg(&registry_fixture()), "--format", "yaml"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("api: vulkan"));
}

#[test]
fn check_passes_for_fixture() {
    let output = vkw_gen(&["check", path_arg(&registry_fixture())]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Versions: 1.0, 1.1, 1.2\n"));
    assert!(stdout.contains("Extensions: 3 instance, 3 device, 0 rejected\n"));
}

#[test]
fn version_gap_fails() {
    let dir = tempfile::tempdir().unwrap();
    let registry = write_gap_registry(dir.path());

    let output = vkw_gen(&["headers", path_arg(&registry)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("VK_VERSION_1_2"), "stderr: {stderr}");
}

#[test]
fn missing_registry_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = vkw_gen(&["check", path_arg(dir.path())]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to load registry"));
}

#[test]
fn config_overrides_classification() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("vkw-gen.yaml");
    fs::write(
        &config,
        "classification:\n  instance_overrides:\n    - vkGetDeviceProcAddr\n    - vkQueueSubmit\n",
    )
    .unwrap();

    let output = vkw_gen(&["model", path_arg(&registry_fixture()), "--config", path_arg(&config)]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let model: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let instance_1_0 = model["chains"]["instance"]["nodes"][0]["delta"].as_array().unwrap();
    assert!(instance_1_0.iter().any(|c| c == "vkQueueSubmit"));
    let device_1_0 = model["chains"]["device"]["nodes"][0]["delta"].as_array().unwrap();
    assert!(!device_1_0.iter().any(|c| c == "vkQueueSubmit"));
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("vkw-gen.yaml");
    fs::write(&config, "unknown_commands: [not, a, policy]\n").unwrap();

    let output = vkw_gen(&["check", path_arg(&registry_fixture()), "--config", path_arg(&config)]);
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("Failed to load config"));
}

#[test]
fn reject_policy_fails_on_unknown_command() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("vk.xml");
    fs::write(
        &registry,
        r#"<registry>
    <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
        <require><command name="vkNotDefinedAnywhere"/></require>
    </feature>
</registry>"#,
    )
    .unwrap();
    let config = dir.path().join("vkw-gen.yaml");
    fs::write(&config, "unknown_commands: reject\n").unwrap();

    let lenient = vkw_gen(&["check", path_arg(&registry)]);
    assert!(lenient.status.success());
    assert!(String::from_utf8(lenient.stderr).unwrap().contains("vkNotDefinedAnywhere"));

    let strict = vkw_gen(&["check", path_arg(&registry), "--config", path_arg(&config)]);
    assert!(!strict.status.success());
    assert!(String::from_utf8(strict.stderr).unwrap().contains("vkNotDefinedAnywhere"));
}
