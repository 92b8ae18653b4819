use component_installer::injector::{
    BufferedIo, ConfigInjector, ConfigTarget, InjectPlan, InjectResult, InjectionContext,
    InjectorKind, RemoveResult,
};
use std::fs;
use std::path::Path;

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

/// Application root holding `content` at the target's conventional path.
fn project_with(target: ConfigTarget, content: &str) -> (tempfile::TempDir, ConfigInjector) {
    let dir = tempfile::tempdir().unwrap();
    let injector = ConfigInjector::new(target, dir.path());
    fs::create_dir_all(injector.file().parent().unwrap()).unwrap();
    fs::write(injector.file(), content).unwrap();
    (dir, injector)
}

fn assert_golden(
    target: ConfigTarget,
    fixture: &str,
    package: &str,
    kind: InjectorKind,
    context: &InjectionContext,
) {
    let input = load_fixture(&format!("{fixture}.input"));
    let expected = load_fixture(&format!("{fixture}.expected"));
    let (_dir, injector) = project_with(target, &input);
    let mut io = BufferedIo::new();

    let result = injector.inject(package, kind, context, &mut io).unwrap();
    assert!(matches!(result, InjectResult::Injected { .. }), "{result}");

    let injected = fs::read_to_string(injector.file()).unwrap();
    assert_eq!(injected, expected, "golden mismatch for {fixture}");

    // Injecting again plans nothing and leaves the file alone
    let plan = injector.plan_inject(&injected, package, kind, context).unwrap();
    assert_eq!(plan, InjectPlan::AlreadyRegistered);
    let again = injector.inject(package, kind, context, &mut io).unwrap();
    assert!(matches!(again, InjectResult::AlreadyRegistered { .. }));
    assert_eq!(fs::read_to_string(injector.file()).unwrap(), expected);

    // Removing restores the original bytes
    let removed = injector.remove(package, &mut io).unwrap();
    assert!(matches!(
        removed,
        RemoveResult::Removed {
            duplicates_remaining: 0,
            ..
        }
    ));
    assert_eq!(fs::read_to_string(injector.file()).unwrap(), input);
}

#[test]
fn test_golden_application_config_component() {
    assert_golden(
        ConfigTarget::Application,
        "application.config.php",
        "Laminas\\Form",
        InjectorKind::Component,
        &InjectionContext::new(),
    );
}

#[test]
fn test_golden_modules_config_dependency_module() {
    assert_golden(
        ConfigTarget::Modules,
        "modules.config.php",
        "Acme\\Blog",
        InjectorKind::DependencyModule,
        &InjectionContext::new().with_module_dependencies(["Laminas\\Router"]),
    );
}

#[test]
fn test_golden_config_aggregator_provider() {
    assert_golden(
        ConfigTarget::ConfigAggregator,
        "config.php",
        "Laminas\\Form",
        InjectorKind::ConfigProvider,
        &InjectionContext::new(),
    );
}

#[test]
fn test_golden_legacy_array_syntax_module() {
    assert_golden(
        ConfigTarget::Application,
        "legacy.application.config.php",
        "ZfcUser",
        InjectorKind::Module,
        &InjectionContext::new(),
    );
}

#[test]
fn test_aggregator_recognizes_existing_provider_spellings() {
    let input = load_fixture("config.php.input");
    let (_dir, injector) = project_with(ConfigTarget::ConfigAggregator, &input);

    let registered = injector.registered_packages().unwrap();
    assert_eq!(
        registered,
        vec![
            "Laminas\\HttpHandlerRunner",
            "Mezzio\\Helper",
            "Mezzio",
            "Mezzio\\Router",
            "App",
        ]
    );

    // Both the namespace and the fully qualified class name match
    assert!(injector.is_registered("Mezzio\\Helper").unwrap());
    assert!(injector
        .is_registered("\\Mezzio\\Helper\\ConfigProvider")
        .unwrap());
}

#[test]
fn test_remove_provider_from_aggregator_keeps_comments() {
    let input = load_fixture("config.php.input");
    let (_dir, injector) = project_with(ConfigTarget::ConfigAggregator, &input);

    let result = injector.remove("App", &mut BufferedIo::new()).unwrap();
    assert!(matches!(result, RemoveResult::Removed { .. }));

    let updated = fs::read_to_string(injector.file()).unwrap();
    assert!(!updated.contains("App\\ConfigProvider::class"));
    assert!(updated.contains("    // Default App module config\n"));
    assert_eq!(
        updated,
        input.replace("    App\\ConfigProvider::class,\n", "")
    );
}

#[test]
fn test_crlf_file_keeps_line_endings() {
    let input = "<?php\r\nreturn [\r\n    'Laminas\\Router',\r\n    'Application',\r\n];\r\n";
    let (_dir, injector) = project_with(ConfigTarget::Modules, input);

    let _ = injector
        .inject(
            "Laminas\\Form",
            InjectorKind::Component,
            &InjectionContext::new(),
            &mut BufferedIo::new(),
        )
        .unwrap();

    assert_eq!(
        fs::read_to_string(injector.file()).unwrap(),
        "<?php\r\nreturn [\r\n    'Laminas\\Router',\r\n    'Laminas\\Form',\r\n    'Application',\r\n];\r\n"
    );
}

#[test]
fn test_tab_indented_file_keeps_tabs() {
    let input = "<?php\nreturn [\n\t'modules' => [\n\t\t'Application',\n\t],\n];\n";
    let (_dir, injector) = project_with(ConfigTarget::Application, input);

    let _ = injector
        .inject(
            "Laminas\\Form",
            InjectorKind::Component,
            &InjectionContext::new(),
            &mut BufferedIo::new(),
        )
        .unwrap();

    assert_eq!(
        fs::read_to_string(injector.file()).unwrap(),
        "<?php\nreturn [\n\t'modules' => [\n\t\t'Laminas\\Form',\n\t\t'Application',\n\t],\n];\n"
    );
}

#[test]
fn test_double_quoted_file_keeps_quote_style() {
    let input = "<?php\nreturn [\n    \"Application\",\n];\n";
    let (_dir, injector) = project_with(ConfigTarget::Modules, input);

    let _ = injector
        .inject(
            "Laminas\\Form",
            InjectorKind::Component,
            &InjectionContext::new(),
            &mut BufferedIo::new(),
        )
        .unwrap();

    let updated = fs::read_to_string(injector.file()).unwrap();
    assert!(updated.contains("    \"Laminas\\\\Form\",\n    \"Application\","), "{updated}");
}
