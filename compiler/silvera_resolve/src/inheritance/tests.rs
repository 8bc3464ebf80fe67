use pretty_assertions::assert_eq;
use silvera_ir::{Deployment, HostKind, RestartPolicy};

use super::*;
use crate::testing::{config_server, function, module, registry, resolve_modules, typedef, ServiceBuilder};

fn service_id(model: &Model, path: &str, name: &str) -> DeclId {
    model.decl_by_name(model.module_by_path(path).unwrap(), name).unwrap()
}

#[test]
fn test_derived_without_deployment_shares_base_record() {
    let resolved = resolve_modules(vec![module(
        "app.si",
        &[],
        vec![
            // Derived first: the base is linked on demand.
            ServiceBuilder::new("Derived").extends("Base").build(),
            ServiceBuilder::new("Base").build(),
        ],
    )])
    .unwrap();

    let base = service_id(&resolved, "app.si", "Base");
    let derived = service_id(&resolved, "app.si", "Derived");
    let base_dep = resolved.service(base).unwrap().deployment.unwrap();
    assert_eq!(resolved.service(derived).unwrap().deployment, Some(base_dep));
    assert_eq!(resolved.deployment(base_dep).port, Some(8080));
    assert_eq!(resolved.deployment(base_dep).version(), Deployment::DEFAULT_VERSION);
}

#[test]
fn test_partial_deployment_merges_field_by_field() {
    let base_dep = Deployment {
        version: Some("2.0".into()),
        port: Some(9000),
        host: Some(HostKind::Container),
        restart_policy: Some(RestartPolicy {
            condition: Some("on-failure".into()),
            max_attempts: Some(3),
            ..RestartPolicy::default()
        }),
        ..Deployment::default()
    };
    let derived_dep = Deployment {
        version: Some("2.1".into()),
        restart_policy: Some(RestartPolicy {
            max_attempts: Some(5),
            ..RestartPolicy::default()
        }),
        ..Deployment::default()
    };
    let resolved = resolve_modules(vec![module(
        "app.si",
        &[],
        vec![
            ServiceBuilder::new("Base").deployment(base_dep).build(),
            ServiceBuilder::new("Derived")
                .extends("Base")
                .deployment(derived_dep)
                .build(),
        ],
    )])
    .unwrap();

    let derived = service_id(&resolved, "app.si", "Derived");
    let base = service_id(&resolved, "app.si", "Base");
    let dep_id = resolved.service(derived).unwrap().deployment.unwrap();
    assert_ne!(Some(dep_id), resolved.service(base).unwrap().deployment);

    let dep = resolved.deployment(dep_id);
    assert_eq!(dep.version.as_deref(), Some("2.1"));
    assert_eq!(dep.port, Some(9000));
    assert_eq!(dep.host, Some(HostKind::Container));
    assert_eq!(dep.lang.as_deref(), Some(Deployment::DEFAULT_LANG));
    let policy = dep.restart_policy.as_ref().unwrap();
    assert_eq!(policy.condition.as_deref(), Some("on-failure"));
    assert_eq!(policy.max_attempts, Some(5));
}

#[test]
fn test_api_members_are_appended() {
    let resolved = resolve_modules(vec![module(
        "app.si",
        &[],
        vec![
            ServiceBuilder::new("Base")
                .typedef(typedef("Account", &[("id", "str")]))
                .function(function("getAccount", "Account", &[("id", "str")]))
                .build(),
            ServiceBuilder::new("Derived")
                .extends("Base")
                .function(function("close", "void", &[]))
                .build(),
        ],
    )])
    .unwrap();

    let derived = service_id(&resolved, "app.si", "Derived");
    let base = service_id(&resolved, "app.si", "Base");
    let names: Vec<_> = resolved
        .service(derived)
        .unwrap()
        .api
        .functions
        .iter()
        .map(|&f| resolved.function(f).name.as_str())
        .collect();
    assert_eq!(names, vec!["close", "getAccount"]);
    assert_eq!(
        resolved.api_typedef(derived, "Account"),
        resolved.api_typedef(base, "Account")
    );
}

#[test]
fn test_redefining_inherited_function_is_rejected() {
    let err = resolve_modules(vec![module(
        "app.si",
        &[],
        vec![
            ServiceBuilder::new("Base")
                .function(function("ping", "void", &[]))
                .build(),
            ServiceBuilder::new("Derived")
                .extends("Base")
                .function(function("ping", "str", &[]))
                .build(),
        ],
    )])
    .unwrap_err();

    assert!(matches!(
        err,
        ResolveError::UnsupportedOverride { ref service, ref base, ref member, kind: MemberKind::Function, .. }
            if service == "Derived" && base == "Base" && member == "ping"
    ));
}

#[test]
fn test_redefining_inherited_type_is_rejected() {
    let err = resolve_modules(vec![module(
        "app.si",
        &[],
        vec![
            ServiceBuilder::new("Base")
                .typedef(typedef("Account", &[]))
                .build(),
            ServiceBuilder::new("Derived")
                .extends("Base")
                .typedef(typedef("Account", &[("note", "str")]))
                .build(),
        ],
    )])
    .unwrap_err();

    assert!(matches!(
        err,
        ResolveError::UnsupportedOverride { kind: MemberKind::TypeDef, .. }
    ));
}

#[test]
fn test_infrastructure_inherited_unless_set() {
    let resolved = resolve_modules(vec![
        module(
            "app.si",
            &["share.setup"],
            vec![
                ServiceBuilder::new("Base")
                    .config_server("Config")
                    .registry("Registry")
                    .build(),
                ServiceBuilder::new("Derived")
                    .extends("Base")
                    .registry("LocalRegistry")
                    .build(),
                registry("LocalRegistry"),
            ],
        ),
        module(
            "share/setup.si",
            &[],
            vec![config_server("Config"), registry("Registry")],
        ),
    ])
    .unwrap();

    let base = resolved.service(service_id(&resolved, "app.si", "Base")).unwrap();
    let derived = resolved.service(service_id(&resolved, "app.si", "Derived")).unwrap();
    assert_eq!(derived.config_server, base.config_server);
    assert_eq!(
        derived.service_registry,
        Some(Ref::Resolved(service_id(&resolved, "app.si", "LocalRegistry")))
    );
}

#[test]
fn test_cyclic_inheritance() {
    let err = resolve_modules(vec![module(
        "app.si",
        &[],
        vec![
            ServiceBuilder::new("A").extends("B").build(),
            ServiceBuilder::new("B").extends("A").build(),
        ],
    )])
    .unwrap_err();
    assert!(matches!(err, ResolveError::CyclicInheritance { ref service, .. } if service == "A"));
}

#[test]
fn test_extending_non_service() {
    let err = resolve_modules(vec![module(
        "app.si",
        &[],
        vec![
            ServiceBuilder::new("A").extends("Config").build(),
            config_server("Config"),
        ],
    )])
    .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::WrongKind { expected: "service", found: "config server", .. }
    ));
}

#[test]
fn test_ports_follow_declaration_order() {
    let resolved = resolve_modules(vec![module(
        "app.si",
        &[],
        vec![
            ServiceBuilder::new("A")
                .deployment(Deployment {
                    replicas: Some(2),
                    ..Deployment::default()
                })
                .build(),
            config_server("Config"),
            ServiceBuilder::new("B").build(),
        ],
    )])
    .unwrap();

    let port = |name: &str| {
        let id = service_id(&resolved, "app.si", name);
        resolved.deployment(resolved.decl(id).deployment().unwrap()).port
    };
    assert_eq!(port("A"), Some(8080));
    assert_eq!(port("Config"), Some(8082));
    assert_eq!(port("B"), Some(8083));
}
