use pretty_assertions::assert_eq;

use super::*;
use crate::{CommStyle, MessagePool};

fn service_kind() -> DeclKind {
    DeclKind::Service(ServiceDecl::new(CommStyle::Rpc))
}

#[test]
fn test_import_module_path() {
    let import = Import {
        url: "share.setup".into(),
        span: Span::DUMMY,
    };
    assert_eq!(import.module_path(), "share/setup.si");
}

#[test]
fn test_split_fqn() {
    assert_eq!(
        split_fqn("share.setup.Config"),
        Some(("share/setup.si".to_string(), "Config"))
    );
    assert_eq!(split_fqn("Config"), None);
}

#[test]
fn test_duplicate_module_path() {
    let mut model = Model::new();
    model.add_module("orders.si", "", Vec::new()).unwrap();
    let err = model.add_module("orders.si", "", Vec::new()).unwrap_err();
    assert_eq!(err, DuplicateModule("orders.si".into()));
}

#[test]
fn test_decl_lookup_by_name_and_fqn() {
    let mut model = Model::new();
    let share = model.add_module("share/setup.si", "", Vec::new()).unwrap();
    let orders = model.add_module("orders.si", "", Vec::new()).unwrap();
    let config = model.add_decl(share, Some("Config".into()), Span::DUMMY, service_kind());
    let svc = model.add_decl(orders, Some("Orders".into()), Span::DUMMY, service_kind());

    assert_eq!(model.decl_by_name(share, "Config"), Some(config));
    assert_eq!(model.decl_by_name(orders, "Config"), None);
    assert_eq!(model.decl_by_fqn("share.setup.Config"), Some(config));
    assert_eq!(model.decl_fqn(svc), "orders.Orders");
    assert_eq!(model.module(share).qualifier(), "share.setup");

    let order: Vec<_> = model.decls().map(|(id, _)| id).collect();
    assert_eq!(order, vec![config, svc]);
}

#[test]
fn test_find_message_walks_groups() {
    let mut model = Model::new();
    let module = model.add_module("msgs.si", "", Vec::new()).unwrap();

    let orders = model.push_group(MessageGroup {
        name: "orders".into(),
        span: Span::DUMMY,
        parent: None,
        groups: Vec::new(),
        messages: Vec::new(),
    });
    let audit = model.push_group(MessageGroup {
        name: "audit".into(),
        span: Span::DUMMY,
        parent: Some(orders),
        groups: Vec::new(),
        messages: Vec::new(),
    });
    model.group_mut(orders).groups.push(audit);
    let logged = model.push_message(Message {
        name: "Logged".into(),
        span: Span::DUMMY,
        group: audit,
        fields: Vec::new(),
    });
    model.group_mut(audit).messages.push(logged);

    let pool = model.add_decl(
        module,
        None,
        Span::DUMMY,
        DeclKind::MessagePool(MessagePool {
            groups: vec![orders],
        }),
    );

    assert_eq!(model.find_message("orders.audit.Logged"), None);
    model.set_msg_pool(pool);

    assert_eq!(model.find_message("orders.audit.Logged"), Some(logged));
    assert_eq!(model.find_message("orders.Logged"), None);
    assert_eq!(model.find_message("Logged"), None);
    assert_eq!(model.message_fqn(logged), "orders.audit.Logged");
    assert_eq!(model.group_fqn(audit), "orders.audit");
}
