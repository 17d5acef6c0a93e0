mod common;

use common::Harness;
use erp_admin::error::ConsoleError;
use erp_admin::reports::{EmbeddedReportView, ReportOutcome, SqlReportView};
use erp_admin::table::export;
use erp_admin::types::routes;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn sql_report_runs_and_exports() {
    let h = Harness::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorios-sql/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "nome": "Vendas por cliente", "descricao": "Totais", "sql": "SELECT ...", "ordem": 1
        })))
        .mount(&h.server)
        .await;
    let rows: Vec<_> = (1..=12)
        .map(|i| json!({"cliente": format!("Cliente {}", i), "total": i * 10}))
        .collect();
    Mock::given(method("POST"))
        .and(path("/api/relatorios-sql/3/executar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "colunas": ["cliente", "total"],
            "dados": rows
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut view = SqlReportView::load(&h.api, 3).await.ready().unwrap();
    assert_eq!(view.table().page_rows().len(), 10);
    assert!(view.table_mut().next_page());
    assert_eq!(view.table().page_rows().len(), 2);
    assert!(!view.table().is_exportable());

    let dir = tempfile::tempdir().unwrap();
    let written = view.export_to(dir.path(), h.api.notifier().as_ref()).unwrap();
    assert_eq!(written.file_name().unwrap(), "Vendas por cliente.csv");

    let content = std::fs::read_to_string(&written).unwrap();
    let parsed = export::parse(&content).unwrap();
    assert_eq!(parsed.len(), 13);
    assert_eq!(parsed[0], vec!["cliente", "total"]);
    assert_eq!(parsed[12], vec!["Cliente 12", "120"]);
    assert!(content.contains("\"Cliente 1\",10\n"));
    assert_eq!(h.toasts.last().unwrap().title, "Export complete");
}

#[tokio::test]
async fn failed_run_keeps_the_view_without_data() {
    let h = Harness::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorios-sql/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4, "nome": "Quebrado", "sql": "SELEC", "ordem": 2
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/relatorios-sql/4/executar"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Erro de sintaxe"})))
        .mount(&h.server)
        .await;

    let view = SqlReportView::load(&h.api, 4).await.ready().unwrap();
    assert!(view.result().is_none());

    let titles: Vec<String> = h
        .toasts
        .snapshot()
        .into_iter()
        .filter_map(|t| t.description)
        .collect();
    assert!(titles.contains(&"Erro de sintaxe".to_string()));
    assert!(titles.contains(&"Could not run the report".to_string()));

    let dir = tempfile::tempdir().unwrap();
    let err = view.export_to(dir.path(), h.api.notifier().as_ref()).unwrap_err();
    assert!(matches!(err, ConsoleError::NoData));
    assert_eq!(h.toasts.last().unwrap().description.as_deref(), Some("No data to export"));
}

#[tokio::test]
async fn missing_embedded_report_redirects_to_the_list() {
    let h = Harness::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorios-powerbi/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Não encontrado"})))
        .mount(&h.server)
        .await;

    match EmbeddedReportView::load(&h.api, 77).await {
        ReportOutcome::Redirect { route, error } => {
            assert_eq!(route, routes::POWERBI_REPORTS);
            assert!(matches!(error, ConsoleError::NotFound(_)));
        }
        ReportOutcome::Ready(_) => panic!("report should not open"),
    }
    assert_eq!(h.toasts.last().unwrap().description.as_deref(), Some("Report not found"));
}

#[tokio::test]
async fn embedded_report_describes_its_frame() {
    let h = Harness::signed_in().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorios-powerbi/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "nome": "Financeiro", "url": "https://app.powerbi.com/view?r=abc",
            "descricao": "Painel mensal", "ordem": 1
        })))
        .mount(&h.server)
        .await;

    let view = EmbeddedReportView::load(&h.api, 1).await.into_result().unwrap();
    let embed = view.embed();
    assert_eq!(embed.src, "https://app.powerbi.com/view?r=abc");
    assert_eq!(embed.title, "Financeiro");
    assert!(embed.fullscreen);
    assert_eq!(view.back_route(), routes::POWERBI_REPORTS);
}
