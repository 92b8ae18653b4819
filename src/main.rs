use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use component_installer::config::{load_or_default, InstallerSettings};
use component_installer::discovery::{closest_matches, ConfigDiscovery};
use component_installer::injector::{
    ConfigInjector, ConfigTarget, ConsoleIo, InjectResult, InjectionContext, InjectorChain,
    InjectorKind, RemoveResult,
};
use component_installer::installer::ComponentInstaller;
use component_installer::logging;
use component_installer::package::{
    module_dependencies, HostApi, InstalledRepository, PackageManifest,
};
use component_installer::safety::ProjectGuard;
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "component-installer")]
#[command(about = "Register PHP packages in application config files", long_about = None)]
#[command(version)]
struct Cli {
    /// Application root
    #[arg(short, long, global = true, default_value = ".", env = "COMPONENT_INSTALLER_PROJECT")]
    project: PathBuf,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long, global = true)]
    diff: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a package in the first config file accepting its kind
    Inject {
        /// Module namespace or config provider class
        package: String,

        /// config-provider, component, module, dependency-module or
        /// before-application-module
        #[arg(short, long, default_value = "module")]
        kind: InjectorKind,

        /// Write to this config target instead of the discovered ones
        #[arg(short, long)]
        target: Option<ConfigTarget>,

        /// Module belonging to the application (repeatable)
        #[arg(long = "app-module")]
        app_modules: Vec<String>,

        /// Module the package depends on (repeatable)
        #[arg(long = "dependency")]
        dependencies: Vec<String>,
    },

    /// Remove a package from every discovered config file
    Remove {
        package: String,

        /// Only touch this config target
        #[arg(short, long)]
        target: Option<ConfigTarget>,
    },

    /// Show where a package is registered
    Status { package: String },

    /// Handle installation of the package described by a composer.json
    Install {
        manifest: PathBuf,

        /// Plugin API version of the host package manager
        #[arg(long, env = "COMPOSER_PLUGIN_API_VERSION", default_value = "2.6.0")]
        plugin_api: String,
    },

    /// Handle removal of the package described by a composer.json
    Uninstall { manifest: PathBuf },

    /// List known config files and the kinds they accept
    List,
}

struct Session {
    root: PathBuf,
    settings: InstallerSettings,
    dry_run: bool,
    show_diff: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let root = cli
        .project
        .canonicalize()
        .with_context(|| format!("project root not found: {}", cli.project.display()))?;
    let settings = load_or_default(&root)?;
    let session = Session {
        root,
        settings,
        dry_run: cli.dry_run,
        show_diff: cli.diff,
    };

    match cli.command {
        Commands::Inject {
            package,
            kind,
            target,
            app_modules,
            dependencies,
        } => {
            let context = InjectionContext::new()
                .with_application_modules(app_modules)
                .with_module_dependencies(dependencies);
            cmd_inject(&session, &package, kind, target, &context)
        }
        Commands::Remove { package, target } => cmd_remove(&session, &package, target),
        Commands::Status { package } => cmd_status(&session, &package),
        Commands::Install {
            manifest,
            plugin_api,
        } => cmd_install(&session, &manifest, &plugin_api),
        Commands::Uninstall { manifest } => cmd_uninstall(&session, &manifest),
        Commands::List => cmd_list(&session),
    }
}

/// Helper: injectors for an explicit target, or the discovered chain.
fn injector_chain(session: &Session, target: Option<ConfigTarget>) -> Result<InjectorChain> {
    match target {
        Some(target) => {
            let guard = ProjectGuard::new(&session.root)?;
            Ok(InjectorChain::new(vec![ConfigInjector::new(target, &session.root)
                .with_sentinels(session.settings.injector.sentinels.iter().cloned())
                .with_guard(guard)]))
        }
        None => Ok(ConfigDiscovery::new(&session.root).chain(&session.settings.injector)?),
    }
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (updated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

/// Helper: contents of every file in the chain, for diffs after a write.
fn snapshot(chain: &InjectorChain) -> BTreeMap<PathBuf, String> {
    chain
        .injectors()
        .iter()
        .map(|injector| {
            let content = fs::read_to_string(injector.file()).unwrap_or_default();
            (injector.file().to_path_buf(), content)
        })
        .collect()
}

fn display_changes(before: &BTreeMap<PathBuf, String>) {
    for (file, original) in before {
        if let Ok(after) = fs::read_to_string(file) {
            if &after != original {
                display_diff(file, original, &after);
            }
        }
    }
}

fn cmd_inject(
    session: &Session,
    package: &str,
    kind: InjectorKind,
    target: Option<ConfigTarget>,
    context: &InjectionContext,
) -> Result<()> {
    let chain = injector_chain(session, target)?;
    let Some(injector) = chain.accepting(kind) else {
        anyhow::bail!(
            "{}\n  No discovered config file accepts {} entries under {}",
            "Nothing to inject into.".red(),
            kind,
            session.root.display()
        );
    };

    if session.dry_run {
        println!("{}", "[DRY RUN - showing what would be injected]".cyan());
        match injector.preview_inject(package, kind, context)? {
            Some(preview) => {
                println!(
                    "{} {}: Would inject into {}",
                    "✓".green(),
                    package,
                    preview.file.display()
                );
                if session.show_diff {
                    display_diff(&preview.file, &preview.before, &preview.after);
                }
            }
            None => println!(
                "{} {}: Already registered in {}",
                "⊙".yellow(),
                package,
                injector.file().display()
            ),
        }
        return Ok(());
    }

    let before = snapshot(&chain);
    let mut io = ConsoleIo::default();
    match injector.inject(package, kind, context, &mut io)? {
        InjectResult::Injected { file, .. } => {
            println!("{} {}: Injected into {}", "✓".green(), package, file.display());
            if session.show_diff {
                display_changes(&before);
            }
        }
        InjectResult::AlreadyRegistered { file } => {
            println!(
                "{} {}: Already registered in {}",
                "⊙".yellow(),
                package,
                file.display()
            );
        }
    }
    Ok(())
}

fn cmd_remove(session: &Session, package: &str, target: Option<ConfigTarget>) -> Result<()> {
    let chain = injector_chain(session, target)?;

    if session.dry_run {
        println!("{}", "[DRY RUN - showing what would be removed]".cyan());
        for injector in chain.injectors() {
            match injector.preview_remove(package) {
                Ok(Some(preview)) => {
                    println!(
                        "{} {}: Would remove from {}",
                        "✓".green(),
                        package,
                        preview.file.display()
                    );
                    if session.show_diff {
                        display_diff(&preview.file, &preview.before, &preview.after);
                    }
                }
                Ok(None) => {}
                Err(e) => eprintln!("{} {}: Error - {}", "✗".red(), injector.target(), e),
            }
        }
        return Ok(());
    }

    let before = snapshot(&chain);
    let mut io = ConsoleIo::default();
    let mut removed = 0;
    let mut failed = 0;

    for (target, result) in chain.remove(package, &mut io) {
        match result {
            Ok(result @ RemoveResult::Removed { .. }) => {
                println!("{} {}: {}", "✓".green(), package, result);
                removed += 1;
            }
            Ok(RemoveResult::NotRegistered { .. }) => {}
            Err(e) => {
                eprintln!("{} {}: Error - {}", "✗".red(), target, e);
                failed += 1;
            }
        }
    }

    if removed == 0 && failed == 0 {
        println!("{} {}: Not registered in any config file", "⊙".yellow(), package);
    }
    if session.show_diff {
        display_changes(&before);
    }
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_status(session: &Session, package: &str) -> Result<()> {
    let chain = ConfigDiscovery::new(&session.root).chain(&session.settings.injector)?;

    println!("{}", "Registration Status".bold());
    println!("Project: {}", session.root.display());
    println!();

    let mut found = false;
    let mut known = Vec::new();

    for injector in chain.injectors() {
        match injector.is_registered(package) {
            Ok(true) => {
                println!("{} {}", "✓".green(), injector.target());
                found = true;
            }
            Ok(false) => println!("{} {}", "·".dimmed(), injector.target()),
            Err(e) => eprintln!("{} {}: {}", "✗".red(), injector.target(), e),
        }
        if let Ok(packages) = injector.registered_packages() {
            known.extend(packages);
        }
    }

    if !found {
        println!();
        println!("{} {} is not registered", "⊙".yellow(), package);
        let suggestions = closest_matches(package, &known);
        if !suggestions.is_empty() {
            println!("  Did you mean: {}", suggestions.join(", ").bold());
        }
    }
    Ok(())
}

fn read_root_manifest(root: &Path) -> Result<Option<PackageManifest>> {
    let path = root.join("composer.json");
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(PackageManifest::from_path(&path)?))
}

fn cmd_install(session: &Session, manifest: &Path, plugin_api: &str) -> Result<()> {
    let package = PackageManifest::from_path(manifest)?;
    let api = HostApi::detect(plugin_api)?;
    let root_manifest = read_root_manifest(&session.root)?;

    let mut repository = InstalledRepository::load(&session.root, api)?;
    if let (true, Some(root)) = (api.includes_root_package(), root_manifest.clone()) {
        repository = repository.with_root(root);
    }
    let application_modules = root_manifest
        .map(|root| root.application_modules())
        .unwrap_or_default();

    let chain = ConfigDiscovery::new(&session.root).chain(&session.settings.injector)?;
    let installer = ComponentInstaller::new(chain)
        .with_package_settings(session.settings.packages.clone())
        .with_application_modules(application_modules);

    println!("Project: {}", session.root.display());
    println!("Package: {} ({})", package.name, api);
    println!();

    if session.dry_run {
        println!("{}", "[DRY RUN - showing what would be injected]".cyan());
        let dependencies = module_dependencies(&repository, &package);
        for entity in package.declared_entities() {
            let kind = installer.kind_for(entity.role, &dependencies);
            match installer.chain().accepting(kind) {
                Some(injector) => println!(
                    "{} {} ({}): Would inject into {}",
                    "✓".green(),
                    entity.name,
                    kind,
                    injector.target()
                ),
                None => println!(
                    "{} {} ({}): No config file accepts this kind",
                    "⊘".cyan(),
                    entity.name,
                    kind
                ),
            }
        }
        return Ok(());
    }

    let before = snapshot(installer.chain());
    let mut io = ConsoleIo::default();
    let outcomes = installer.on_package_installed(&package, &repository, &mut io);

    let mut injected = 0;
    let mut already = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(Some(InjectResult::Injected { .. })) => injected += 1,
            Ok(Some(InjectResult::AlreadyRegistered { .. })) => already += 1,
            Ok(None) => skipped += 1,
            Err(_) => failed += 1,
        }
    }

    if session.show_diff {
        display_changes(&before);
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} injected", format!("{}", injected).green());
    println!("  {} already registered", format!("{}", already).yellow());
    println!("  {} skipped", format!("{}", skipped).cyan());
    println!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_uninstall(session: &Session, manifest: &Path) -> Result<()> {
    let package = PackageManifest::from_path(manifest)?;
    let chain = ConfigDiscovery::new(&session.root).chain(&session.settings.injector)?;

    if session.dry_run {
        println!("{}", "[DRY RUN - showing what would be removed]".cyan());
        for entity in package.declared_entities() {
            for injector in chain.injectors() {
                if let Ok(Some(preview)) = injector.preview_remove(&entity.name) {
                    println!(
                        "{} {}: Would remove from {}",
                        "✓".green(),
                        entity.name,
                        injector.target()
                    );
                    if session.show_diff {
                        display_diff(&preview.file, &preview.before, &preview.after);
                    }
                }
            }
        }
        return Ok(());
    }

    let installer =
        ComponentInstaller::new(chain).with_package_settings(session.settings.packages.clone());
    let before = snapshot(installer.chain());
    let mut io = ConsoleIo::default();
    let outcomes = installer.on_package_uninstalled(&package, &mut io);

    let removed = outcomes
        .iter()
        .filter(|o| matches!(o.result, Ok(RemoveResult::Removed { .. })))
        .count();
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();

    if session.show_diff {
        display_changes(&before);
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} removed", format!("{}", removed).green());
    println!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_list(session: &Session) -> Result<()> {
    let discovery = ConfigDiscovery::new(&session.root);
    let active: Vec<ConfigTarget> = session.settings.injector.active_targets().collect();

    println!("{}", "Config Targets".bold());
    println!("Project: {}", session.root.display());
    println!();

    for target in ConfigTarget::ALL {
        let marker = if !active.contains(&target) {
            "⊘".cyan()
        } else if discovery.is_present(target) {
            "✓".green()
        } else {
            "·".dimmed()
        };
        let kinds: Vec<&str> = target.types_allowed().iter().map(|k| k.as_str()).collect();
        println!("{} {:<18} {}", marker, target.name(), target.relative_path());
        println!("    accepts: {}", kinds.join(", ").dimmed());
    }
    Ok(())
}
