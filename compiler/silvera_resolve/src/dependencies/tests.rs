use pretty_assertions::assert_eq;
use silvera_ir::{FailurePattern, Model};

use super::*;
use crate::testing::{
    config_server, dependency, dependency_with, directive, function, module, registry,
    resolve_modules, typedef, ServiceBuilder,
};

fn decl(model: &Model, path: &str, name: &str) -> DeclId {
    model
        .decl_by_name(model.module_by_path(path).unwrap(), name)
        .unwrap()
}

fn shop() -> Vec<silvera_ir::syntax::SourceModule> {
    vec![
        module(
            "shop.si",
            &[],
            vec![
                ServiceBuilder::new("Catalog")
                    .typedef(typedef("Product", &[("sku", "str"), ("price", "Price")]))
                    .typedef(typedef("Price", &[("amount", "double"), ("currency", "Currency")]))
                    .typedef(typedef("Currency", &[("code", "str"), ("fallback", "Currency")]))
                    .typedef(typedef("Filter", &[("term", "str")]))
                    .typedef(typedef("Unused", &[]))
                    .function(function("search", "list<Product>", &[("filter", "Filter")]))
                    .function(function("count", "i64", &[]))
                    .function(function("ping", "void", &[]))
                    .build(),
                ServiceBuilder::new("Cart").build(),
                dependency_with(
                    "Cart",
                    "Catalog",
                    vec![
                        directive("search", FailurePattern::FallbackMethod, None),
                        directive("count", FailurePattern::FallbackStatic, Some("zero")),
                    ],
                ),
            ],
        ),
    ]
}

#[test]
fn test_clones_carry_resilience_settings() {
    let resolved = resolve_modules(shop()).unwrap();
    let cart = decl(&resolved, "shop.si", "Cart");
    let catalog = decl(&resolved, "shop.si", "Catalog");

    let search = resolved.function(resolved.dep_function(cart, "search").unwrap());
    assert_eq!(search.owner, cart);
    assert_eq!(search.dep, resolved.api_function(catalog, "search"));
    assert_eq!(search.cb_pattern, Some(FailurePattern::FallbackMethod));
    assert_eq!(search.cb_fallback.as_deref(), Some("search_fallback"));

    let count = resolved.function(resolved.dep_function(cart, "count").unwrap());
    assert_eq!(count.cb_fallback.as_deref(), Some("zero"));

    assert!(resolved.dep_function(cart, "ping").is_none());
    assert_eq!(resolved.service(cart).unwrap().dependencies, vec![catalog]);
}

#[test]
fn test_dep_typedefs_closed_over_fields() {
    let resolved = resolve_modules(shop()).unwrap();
    let cart = decl(&resolved, "shop.si", "Cart");
    let catalog = decl(&resolved, "shop.si", "Catalog");

    let names: Vec<_> = resolved
        .service(cart)
        .unwrap()
        .dep_typedefs
        .iter()
        .map(|&t| resolved.typedef(t).name.as_str())
        .collect();
    // Self-referential Currency is visited once; Unused is unreachable.
    assert_eq!(names, vec!["Product", "Filter", "Price", "Currency"]);
    assert_eq!(
        resolved.service(cart).unwrap().dep_typedefs[0],
        resolved.api_typedef(catalog, "Product").unwrap()
    );
}

#[test]
fn test_clone_is_independent_of_original() {
    let mut resolved = resolve_modules(shop()).unwrap().into_inner();
    let cart = decl(&resolved, "shop.si", "Cart");
    let catalog = decl(&resolved, "shop.si", "Catalog");
    let clone = resolved.dep_function(cart, "search").unwrap();
    let original = resolved.api_function(catalog, "search").unwrap();
    assert_ne!(clone, original);

    resolved.function_mut(clone).params[0].name = "query".into();
    let extra = resolved.function(original).params[0].clone();
    resolved.function_mut(clone).params.push(extra);
    assert_eq!(resolved.function(original).params.len(), 1);
    assert_eq!(resolved.function(original).params[0].name, "filter");
    assert_eq!(resolved.function(original).cb_fallback, None);
}

#[test]
fn test_missing_methods_listed() {
    let err = resolve_modules(vec![module(
        "shop.si",
        &[],
        vec![
            ServiceBuilder::new("Catalog")
                .function(function("search", "void", &[]))
                .build(),
            ServiceBuilder::new("Cart").build(),
            dependency("Cart", "Catalog", &["search", "browse", "rank"]),
        ],
    )])
    .unwrap_err();

    assert!(matches!(
        err,
        ResolveError::MissingDependencyMethods { ref service, ref missing, .. }
            if service == "Catalog" && missing == &["browse".to_string(), "rank".to_string()]
    ));
}

#[test]
fn test_endpoint_must_be_service() {
    let err = resolve_modules(vec![module(
        "shop.si",
        &[],
        vec![
            ServiceBuilder::new("Cart").build(),
            config_server("Config"),
            dependency("Cart", "Config", &[]),
        ],
    )])
    .unwrap_err();
    assert!(matches!(err, ResolveError::WrongKind { expected: "service", .. }));
}

#[test]
fn test_payment_scenario() {
    let resolved = resolve_modules(vec![
        module(
            "payment.si",
            &["user", "share.setup"],
            vec![
                ServiceBuilder::new("PaymentService")
                    .config_server("Config")
                    .registry("Registry")
                    .build(),
                dependency_with(
                    "PaymentService",
                    "UserService",
                    vec![directive("login", FailurePattern::FallbackMethod, None)],
                ),
            ],
        ),
        module(
            "user.si",
            &["share.setup"],
            vec![ServiceBuilder::new("UserService")
                .config_server("Config")
                .registry("Registry")
                .typedef(typedef("Session", &[("token", "str")]))
                .function(function("login", "Session", &[("user", "str"), ("pwd", "pwd")]))
                .build()],
        ),
        module(
            "share/setup.si",
            &[],
            vec![config_server("Config"), registry("Registry")],
        ),
    ])
    .unwrap();

    let payment = decl(&resolved, "payment.si", "PaymentService");
    let user = decl(&resolved, "user.si", "UserService");
    let payment_svc = resolved.service(payment).unwrap();
    let user_svc = resolved.service(user).unwrap();

    assert_eq!(payment_svc.dep_functions.len(), 1);
    let login = resolved.function(payment_svc.dep_functions[0]);
    assert_eq!(login.name, "login");
    assert_eq!(login.dep, resolved.api_function(user, "login"));
    assert_eq!(resolved.function(login.dep.unwrap()).owner, user);
    assert_eq!(login.cb_fallback.as_deref(), Some("login_fallback"));

    assert_eq!(payment_svc.config_server, user_svc.config_server);
    assert_eq!(
        payment_svc.config_server,
        Some(Ref::Resolved(decl(&resolved, "share/setup.si", "Config")))
    );
    assert_eq!(payment_svc.dep_typedefs, user_svc.api.typedefs);
}
