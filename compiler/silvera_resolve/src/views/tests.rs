use pretty_assertions::assert_eq;
use silvera_ir::syntax::{SourceAnnotation, SourceCrud, SourceCrudOp};
use silvera_ir::{Deployment, Span};

use super::*;
use crate::testing::{
    broker, consumer, dependency, function, gateway, group, message, module, pool, producer,
    resolve_modules, typedef, with_annotation, ServiceBuilder,
};

fn app() -> Model {
    let mut account = typedef("Account", &[("id", "str")]);
    account.crud.push(SourceCrud {
        op: SourceCrudOp::Delete,
        message: Some("users.Removed".into()),
        channel: Some("Bus.users".into()),
        span: Span::DUMMY,
    });

    let decls = vec![
        pool(vec![group(
            "users",
            vec![message("Created", &[("id", "str")]), message("Removed", &[])],
            vec![],
        )]),
        broker(
            "Bus",
            &[("users", "users.Created"), ("audit", "users.Created")],
        ),
        ServiceBuilder::new("Users")
            .deployment(Deployment {
                port: Some(9000),
                replicas: Some(3),
                ..Deployment::default()
            })
            .typedef(account)
            .function(with_annotation(
                with_annotation(function("register", "void", &[]), producer("users.Created", "Bus.users")),
                producer("users.Created", "Bus.audit"),
            ))
            .function(with_annotation(function("refresh", "void", &[]), SourceAnnotation::Async))
            .function(function("find", "Account", &[("id", "str")]))
            .build(),
        ServiceBuilder::new("Mailer")
            .internal(with_annotation(
                function("onCreated", "void", &[]),
                consumer("users.Created", "Bus.users"),
            ))
            .build(),
        ServiceBuilder::new("Reports").build(),
        dependency("Reports", "Users", &["find"]),
        gateway("Edge", &[("Users", "/users"), ("Mailer", "/mail"), ("Users", "/accounts")]),
    ];
    resolve_modules(vec![module("app.si", &[], decls)])
        .unwrap()
        .into_inner()
}

fn service(model: &Model, name: &str) -> DeclId {
    model
        .decl_by_name(model.module_by_path("app.si").unwrap(), name)
        .unwrap()
}

#[test]
fn test_produces_includes_crud_events() {
    let model = app();
    let users = service(&model, "Users");
    let bus = model.broker_by_name("Bus").unwrap();
    let created = model.find_message("users.Created").unwrap();
    let removed = model.find_message("users.Removed").unwrap();

    assert_eq!(
        produces(&model, users),
        vec![
            (created, vec![ChannelHandle::new(bus, 0), ChannelHandle::new(bus, 1)]),
            (removed, vec![ChannelHandle::new(bus, 0)]),
        ]
    );
    assert!(consumes(&model, users).is_empty());
}

#[test]
fn test_consumers() {
    let model = app();
    let mailer = service(&model, "Mailer");
    let bus = model.broker_by_name("Bus").unwrap();
    let created = model.find_message("users.Created").unwrap();

    assert_eq!(consumes(&model, mailer), vec![(created, vec![ChannelHandle::new(bus, 0)])]);
    assert_eq!(
        consumer_functions(&model, mailer),
        model.service(mailer).unwrap().api.internal
    );
    assert!(uses_messaging(&model, mailer));
    assert!(!uses_messaging(&model, service(&model, "Reports")));
}

#[test]
fn test_has_async() {
    let model = app();
    assert!(has_async(&model, service(&model, "Users")));
    assert!(!has_async(&model, service(&model, "Mailer")));
}

#[test]
fn test_gateway_urls() {
    let model = app();
    // Users takes 9000..9002, Mailer 8080, Reports 8081, Edge 8082.
    assert_eq!(
        gateway_urls(&model, service(&model, "Users")),
        vec!["http://localhost:8082/users", "http://localhost:8082/accounts"]
    );
    assert_eq!(
        gateway_urls(&model, service(&model, "Mailer")),
        vec!["http://localhost:8082/mail"]
    );
    assert!(gateway_urls(&model, service(&model, "Reports")).is_empty());
}

#[test]
fn test_instances() {
    let model = app();
    let ports: Vec<_> = instances(&model, service(&model, "Users"))
        .iter()
        .map(|i| (i.index, i.port))
        .collect();
    assert_eq!(ports, vec![(0, 9000), (1, 9001), (2, 9002)]);
    assert_eq!(
        instances(&model, service(&model, "Mailer")),
        vec![ServiceInstance { index: 0, port: 8080 }]
    );
}

#[test]
fn test_all_functions_and_service_fqn() {
    let model = app();
    let reports = service(&model, "Reports");
    let functions = all_functions(&model, reports);
    assert_eq!(functions.len(), 1);
    assert_eq!(model.function(functions[0]).owner, reports);
    assert_eq!(service_fqn(&model, functions[0]), "app.Users");

    let users = service(&model, "Users");
    let names: Vec<_> = all_functions(&model, users)
        .into_iter()
        .map(|f| model.function(f).name.clone())
        .collect();
    assert_eq!(names, vec!["register", "refresh", "find"]);
}
