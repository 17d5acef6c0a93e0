mod common;

use common::Harness;
use erp_admin::error::ConsoleError;
use erp_admin::screens::entities::{Groups, Menus, Permissions, Users};
use erp_admin::screens::{EntityScreen, RowOutcome};
use erp_admin::table::RowActionKind;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_get(h: &Harness, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&h.server)
        .await;
}

fn groups() -> serde_json::Value {
    json!([
        {"id": 1, "nome": "Administradores", "descricao": "Acesso total"},
        {"id": 2, "nome": "Vendas", "descricao": null}
    ])
}

#[tokio::test]
async fn invalid_form_never_reaches_the_server() {
    let h = Harness::signed_in().await;
    mount_get(&h, "/api/grupos", groups()).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&h.server)
        .await;

    let mut screen = EntityScreen::<Groups>::new(h.api.clone());
    screen.load().await.unwrap();
    assert_eq!(screen.open_create().title, "Add Group");
    assert!(screen.form_mut().unwrap().set("nome", json!("")));

    let err = screen.submit().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Validation(_)));
    let form = &screen.form().unwrap().form;
    assert_eq!(form.error("nome"), Some("Name is required"));
    assert!(!form.is_loading());
}

#[tokio::test]
async fn create_merges_the_server_answer() {
    let h = Harness::signed_in().await;
    mount_get(&h, "/api/grupos", groups()).await;
    Mock::given(method("POST"))
        .and(path("/api/grupos"))
        .and(body_json(json!({"nome": "Financeiro", "descricao": "Contas"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 9, "nome": "Financeiro", "descricao": "Contas"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut screen = EntityScreen::<Groups>::new(h.api.clone());
    screen.load().await.unwrap();
    screen.open_create();
    let form = screen.form_mut().unwrap();
    assert!(form.set("nome", json!("Financeiro")));
    assert!(form.set("descricao", json!("Contas")));

    let row = screen.submit().await.unwrap();
    assert_eq!(row["id"], json!(9));
    assert_eq!(screen.rows().len(), 3);
    assert!(screen.form().is_none());

    let toast = h.toasts.last().unwrap();
    assert_eq!(toast.title, "Group created");
    assert_eq!(toast.description.as_deref(), Some("Financeiro was created successfully."));
}

#[tokio::test]
async fn user_edit_keeps_password_and_sends_numbers() {
    let h = Harness::signed_in().await;
    mount_get(&h, "/api/grupos", groups()).await;
    mount_get(
        &h,
        "/api/usuarios",
        json!([{"id": 4, "nome": "Ana", "email": "ana@empresa.com", "ativo": true, "grupos": ["Vendas"]}]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/usuarios/4"))
        .and(body_json(json!({
            "nome": "Ana Lima", "email": "ana@empresa.com", "ativo": true, "grupo_id": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut screen = EntityScreen::<Users>::new(h.api.clone());
    screen.load().await.unwrap();
    assert_eq!(screen.row_action(RowActionKind::Edit, 0).unwrap(), RowOutcome::FormOpened);

    let dialog = screen.form().unwrap();
    assert_eq!(dialog.title, "Edit User: Ana");
    assert_eq!(dialog.form.value("grupo_id"), Some(&json!("2")));
    assert_eq!(
        dialog.form.field("senha").map(|f| f.label.as_str()),
        Some("Password (leave blank to keep)")
    );

    screen.form_mut().unwrap().set("nome", json!("Ana Lima"));
    screen.form_mut().unwrap().set("senha", json!(""));
    let row = screen.submit().await.unwrap();
    assert_eq!(row["nome"], json!("Ana Lima"));
    assert_eq!(screen.find(4).unwrap()["nome"], json!("Ana Lima"));
}

#[tokio::test]
async fn delete_goes_through_the_dialog() {
    let h = Harness::signed_in().await;
    mount_get(&h, "/api/grupos", groups()).await;
    Mock::given(method("DELETE"))
        .and(path("/api/grupos/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut screen = EntityScreen::<Groups>::new(h.api.clone());
    screen.load().await.unwrap();

    let dialog = screen.request_delete(2).unwrap();
    assert_eq!(
        dialog.message,
        "Are you sure you want to delete the group Vendas? This action cannot be undone."
    );
    screen.cancel_delete();
    assert!(screen.delete_dialog().is_none());

    screen.request_delete(2).unwrap();
    screen.confirm_delete().await.unwrap();
    assert!(screen.delete_dialog().is_none());
    assert!(screen.find(2).is_none());
    assert_eq!(h.toasts.last().unwrap().title, "Group deleted");
}

#[tokio::test]
async fn failed_delete_closes_the_dialog_and_keeps_the_row() {
    let h = Harness::signed_in().await;
    mount_get(&h, "/api/grupos", groups()).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "Grupo em uso"})))
        .mount(&h.server)
        .await;

    let mut screen = EntityScreen::<Groups>::new(h.api.clone());
    screen.load().await.unwrap();
    screen.request_delete(1).unwrap();
    assert!(screen.confirm_delete().await.is_err());
    assert!(screen.delete_dialog().is_none());
    assert!(screen.find(1).is_some());
    assert_eq!(h.toasts.last().unwrap().description.as_deref(), Some("Grupo em uso"));
}

#[tokio::test]
async fn parent_menus_cannot_be_deleted() {
    let h = Harness::signed_in().await;
    mount_get(
        &h,
        "/api/menus",
        json!([
            {"id": 1, "nome": "Cadastros", "rota": "", "icone": "folder", "paiId": null, "ordem": 1},
            {"id": 2, "nome": "Usuários", "rota": "/usuarios", "icone": "users", "paiId": 1, "ordem": 1}
        ]),
    )
    .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&h.server)
        .await;

    let mut screen = EntityScreen::<Menus>::new(h.api.clone());
    screen.load().await.unwrap();
    assert_eq!(screen.find(2).unwrap()["paiNome"], json!("Cadastros"));

    let err = screen.request_delete(1).unwrap_err();
    assert!(matches!(err, ConsoleError::Refused(_)));
    assert!(screen.delete_dialog().is_none());
    let toast = h.toasts.last().unwrap();
    assert_eq!(toast.title, "Cannot delete");
    assert!(toast.is_destructive());
}

#[tokio::test]
async fn duplicate_permission_is_refused_locally() {
    let h = Harness::signed_in().await;
    mount_get(&h, "/api/grupos", groups()).await;
    mount_get(&h, "/api/menus", json!([{"id": 3, "nome": "Usuários", "rota": "/usuarios", "ordem": 1}])).await;
    mount_get(&h, "/api/niveis-acesso", json!([{"id": 1, "nome": "Leitura"}])).await;
    mount_get(
        &h,
        "/api/permissoes",
        json!([{"id": 5, "menuId": 3, "grupoId": 1, "nivelAcessoId": 1}]),
    )
    .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&h.server)
        .await;

    let mut screen = EntityScreen::<Permissions>::new(h.api.clone());
    screen.load().await.unwrap();
    let row = screen.find(5).unwrap();
    assert_eq!(row["menuNome"], json!("Usuários"));
    assert_eq!(row["grupoNome"], json!("Administradores"));
    assert_eq!(row["nivelAcessoNome"], json!("Leitura"));

    screen.open_create();
    let form = screen.form_mut().unwrap();
    form.set("menuId", json!("3"));
    form.set("grupoId", json!("1"));
    form.set("nivelAcessoId", json!("1"));
    let err = screen.submit().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Refused(_)));
    assert!(screen.form().is_some());
}

#[tokio::test]
async fn failed_load_keeps_rows() {
    let h = Harness::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/api/grupos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(groups()))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/grupos"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let mut screen = EntityScreen::<Groups>::new(h.api.clone());
    screen.load().await.unwrap();
    assert!(screen.load().await.is_err());
    assert_eq!(screen.rows().len(), 2);
    assert!(!screen.is_loading());
}
