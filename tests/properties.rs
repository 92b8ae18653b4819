use component_installer::injector::{
    ConfigFile, ConfigInjector, ConfigTarget, InjectPlan, InjectionContext, InjectorKind,
    RemovePlan,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Layout {
    Multiline,
    Inline,
}

fn namespace() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Z][a-z]{1,6}", 1..3).prop_map(|parts| parts.join("\\"))
}

fn kinds() -> impl Strategy<Value = InjectorKind> {
    prop_oneof![
        Just(InjectorKind::Component),
        Just(InjectorKind::Module),
        Just(InjectorKind::DependencyModule),
        Just(InjectorKind::BeforeApplicationModule),
    ]
}

fn layout() -> impl Strategy<Value = Layout> {
    prop_oneof![Just(Layout::Multiline), Just(Layout::Inline)]
}

fn render(names: &[String], long: bool, layout: Layout) -> String {
    let (open, close) = if long { ("array(", ")") } else { ("[", "]") };
    let body = match layout {
        Layout::Multiline if !names.is_empty() => names
            .iter()
            .map(|name| format!("    '{name}',\n"))
            .fold("\n".to_string(), |acc, line| acc + &line),
        _ => names
            .iter()
            .map(|name| format!("'{name}'"))
            .collect::<Vec<_>>()
            .join(", "),
    };
    format!("<?php\n\nreturn {open}{body}{close};\n")
}

fn registered(content: &str) -> Vec<String> {
    ConfigFile::parse("modules.config.php", content, ConfigTarget::Modules)
        .unwrap()
        .identifiers()
        .iter()
        .flatten()
        .cloned()
        .collect()
}

fn injector() -> ConfigInjector {
    ConfigInjector::new(ConfigTarget::Modules, "/app")
}

fn application_case() -> impl Strategy<Value = (Vec<String>, String, bool, Layout, bool)> {
    (
        prop::collection::btree_set(namespace(), 0..6),
        namespace(),
        any::<bool>(),
        layout(),
        any::<bool>(),
    )
        .prop_filter("package must be new", |(existing, package, ..)| {
            !existing.contains(package) && package != "Application"
        })
        .prop_map(|(existing, package, with_application, layout, long)| {
            let mut names: Vec<String> = existing
                .into_iter()
                .filter(|name| name != "Application")
                .collect();
            if with_application {
                names.push("Application".to_string());
            }
            (names, package, long, layout, with_application)
        })
}

fn inject(content: &str, package: &str, kind: InjectorKind, context: &InjectionContext) -> String {
    match injector().plan_inject(content, package, kind, context).unwrap() {
        InjectPlan::Edit(edit) => edit.apply_to(content).unwrap(),
        InjectPlan::AlreadyRegistered => panic!("{package} reported as registered"),
    }
}

proptest! {
    #[test]
    fn inject_is_idempotent(
        (names, package, long, layout, _) in application_case(),
        kind in kinds(),
    ) {
        let context = InjectionContext::new();
        let original = render(&names, long, layout);
        let injected = inject(&original, &package, kind, &context);

        let plan = injector().plan_inject(&injected, &package, kind, &context).unwrap();
        prop_assert_eq!(plan, InjectPlan::AlreadyRegistered);
    }

    #[test]
    fn inject_then_remove_restores_bytes(
        (names, package, long, layout, _) in application_case(),
        kind in kinds(),
    ) {
        let context = InjectionContext::new().with_application_modules(names.first().cloned());
        let original = render(&names, long, layout);
        let injected = inject(&original, &package, kind, &context);

        let restored = match injector().plan_remove(&injected, &package).unwrap() {
            RemovePlan::Edit { edit, duplicates_remaining } => {
                prop_assert_eq!(duplicates_remaining, 0);
                edit.apply_to(&injected).unwrap()
            }
            RemovePlan::NotRegistered => panic!("{package} missing after injection"),
        };
        prop_assert_eq!(restored, original);
    }

    #[test]
    fn inject_adds_exactly_one_entry_and_keeps_order(
        (names, package, long, layout, _) in application_case(),
        kind in kinds(),
    ) {
        let original = render(&names, long, layout);
        let injected = inject(&original, &package, kind, &InjectionContext::new());

        let after = registered(&injected);
        prop_assert_eq!(after.len(), names.len() + 1);
        prop_assert_eq!(after.iter().filter(|name| **name == package).count(), 1);

        let without: Vec<String> = after.into_iter().filter(|name| *name != package).collect();
        prop_assert_eq!(without, names);
    }

    #[test]
    fn component_stays_before_application(
        (names, package, long, layout, with_application) in application_case(),
    ) {
        let original = render(&names, long, layout);
        let injected = inject(&original, &package, InjectorKind::Component, &InjectionContext::new());
        let after = registered(&injected);

        let position = after.iter().position(|name| *name == package).unwrap();
        if with_application {
            let application = after.iter().position(|name| name == "Application").unwrap();
            prop_assert_eq!(position + 1, application);
        } else {
            prop_assert_eq!(position, after.len() - 1);
        }
    }

    #[test]
    fn before_application_module_precedes_application_modules(
        (names, package, long, layout, _) in application_case(),
    ) {
        prop_assume!(!names.is_empty());
        let application_module = names[names.len() / 2].clone();
        let context = InjectionContext::new().with_application_modules([application_module.clone()]);

        let original = render(&names, long, layout);
        let injected = inject(&original, &package, InjectorKind::BeforeApplicationModule, &context);
        let after = registered(&injected);

        let position = after.iter().position(|name| *name == package).unwrap();
        let application = after.iter().position(|name| *name == application_module).unwrap();
        prop_assert!(position < application);
    }

    #[test]
    fn array_syntax_and_surroundings_are_preserved(
        (names, package, long, layout, _) in application_case(),
        kind in kinds(),
    ) {
        let original = render(&names, long, layout);
        let injected = inject(&original, &package, kind, &InjectionContext::new());

        prop_assert!(injected.starts_with("<?php\n\nreturn "));
        prop_assert!(injected.ends_with(";\n"));
        prop_assert_eq!(injected.contains("array("), long);
        prop_assert_eq!(injected.matches('\'').count(), original.matches('\'').count() + 2);
    }
}
