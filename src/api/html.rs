//! 报表页面渲染 (服务端拼接 HTML, 表单以 GET 提交)

use crate::models::{PriceTable, Report, COLUMNS};
use crate::service::report::{ReportQuery, ALL_TABLES};
use std::fmt::Write;
use url::form_urlencoded;

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:280px;padding:16px;background:#f4f4f6;min-height:100vh}\
main{flex:1;padding:16px 24px}\
table{border-collapse:collapse;width:100%;margin-bottom:8px}\
th,td{border:1px solid #ddd;padding:4px 8px;text-align:left}\
th{background:#fafafa}\
.info{background:#e8f1fb;padding:8px 12px;border-radius:4px}\
.error{background:#fde8e8;padding:8px 12px;border-radius:4px}";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn page(title: &str, sidebar: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">\
         <title>{}</title><style>{}</style></head>\
         <body><aside>{}</aside><main>{}</main></body></html>",
        escape(title),
        STYLE,
        sidebar,
        body
    )
}

/// 下载链接, 保留当前过滤条件
pub fn csv_href(price_table_id: &str, query: &ReportQuery) -> String {
    // 路径段中空格必须是 %20, '+' 已被编码为 %2B
    let id = form_urlencoded::byte_serialize(price_table_id.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    let mut params = form_urlencoded::Serializer::new(String::new());
    if let Some(product) = query.product_filter() {
        params.append_pair("product", product);
    }
    if query.include_unpriced() {
        params.append_pair("include_unpriced", "true");
    }
    let params = params.finish();

    if params.is_empty() {
        format!("/api/tables/{}/csv", id)
    } else {
        format!("/api/tables/{}/csv?{}", id, params)
    }
}

fn filter_form(available: &[String], query: &ReportQuery) -> String {
    let selected = query.selected_table();
    let mut options = format!(
        "<option value=\"{0}\"{1}>{0}</option>",
        ALL_TABLES,
        if selected.is_none() { " selected" } else { "" }
    );
    for id in available {
        let _ = write!(
            options,
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(id),
            if selected == Some(id.as_str()) { " selected" } else { "" }
        );
    }

    format!(
        "<h2>Filtros</h2><form method=\"get\" action=\"/\">\
         <p><label>Escolha tabela de preço (usu_codtpr)<br><select name=\"table\">{}</select></label></p>\
         <p><label>Filtrar por código do produto (parte do código) - vazio = todos<br>\
         <input type=\"text\" name=\"product\" value=\"{}\"></label></p>\
         <p><label><input type=\"checkbox\" name=\"include_unpriced\"{}> \
         Incluir produtos mesmo sem preço na tabela</label></p>\
         <p><button type=\"submit\">Aplicar</button></p></form>",
        options,
        escape(query.product_filter().unwrap_or_default()),
        if query.include_unpriced() { " checked" } else { "" }
    )
}

fn render_table(table: &PriceTable, query: &ReportQuery) -> String {
    let id = escape(&table.price_table_id);
    if table.is_empty() {
        return format!(
            "<p class=\"info\">Tabela {}: sem produtos para exibir com os filtros aplicados.</p>",
            id
        );
    }

    let mut html = format!("<section><h2>Tabela: <strong>{}</strong></h2><table><thead><tr>", id);
    for column in COLUMNS {
        let _ = write!(html, "<th>{}</th>", column);
    }
    html.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row.cells() {
            let _ = write!(html, "<td>{}</td>", escape(&cell));
        }
        html.push_str("</tr>");
    }
    let _ = write!(
        html,
        "</tbody></table><p><a href=\"{}\" download>Baixar - {}.csv</a></p></section>",
        escape(&csv_href(&table.price_table_id, query)),
        id
    );
    html
}

/// 报表主页面
pub fn render_dashboard(report: &Report, query: &ReportQuery) -> String {
    let mut body = format!(
        "<h1>Tabelas de Preço - ERP</h1><p>Conectado usando driver: <strong>{}</strong>.</p>",
        escape(&report.driver)
    );
    for table in &report.tables {
        body.push_str(&render_table(table, query));
    }

    page(
        "Produtos - Embalagens e Tabelas",
        &filter_form(&report.available_tables, query),
        &body,
    )
}

/// 数据库不可用时的错误页面, 不显示任何报表内容
pub fn render_fatal(detail: &str, installed_drivers: &[String]) -> String {
    let body = format!(
        "<h1>Tabelas de Preço - ERP</h1>\
         <p class=\"error\">Erro ao conectar/ler o banco de dados. \
         Verifique credenciais, driver e conexão de rede.</p>\
         <pre>{}</pre>\
         <p class=\"info\">Drivers instalados: {}</p>",
        escape(detail),
        escape(&format!("{:?}", installed_drivers))
    );
    page("Produtos - Embalagens e Tabelas", "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConsolidatedRow;

    fn query(product: Option<&str>, unpriced: bool) -> ReportQuery {
        ReportQuery {
            table: None,
            product: product.map(str::to_string),
            include_unpriced: unpriced.then(|| "on".to_string()),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_csv_href_keeps_filters() {
        assert_eq!(csv_href("T 1", &query(None, false)), "/api/tables/T%201/csv");
        assert_eq!(
            csv_href("T1", &query(Some("ab"), true)),
            "/api/tables/T1/csv?product=ab&include_unpriced=true"
        );
    }

    #[test]
    fn test_dashboard_renders_tables_and_notice() {
        let report = Report {
            driver: "postgres".to_string(),
            available_tables: vec!["T1".to_string(), "T2".to_string()],
            tables: vec![
                PriceTable {
                    price_table_id: "T1".to_string(),
                    rows: vec![ConsolidatedRow {
                        product_code: "<P1>".to_string(),
                        package_price: Some("R$ 1,00".to_string()),
                        packages_per_box: None,
                        box_price: None,
                        package_weight: None,
                    }],
                },
                PriceTable {
                    price_table_id: "T2".to_string(),
                    rows: Vec::new(),
                },
            ],
        };

        let html = render_dashboard(&report, &query(None, false));

        assert!(html.contains("Conectado usando driver: <strong>postgres</strong>"));
        assert!(html.contains("Tabela: <strong>T1</strong>"));
        assert!(html.contains("<td>&lt;P1&gt;</td>"));
        assert!(html.contains("Baixar - T1.csv"));
        assert!(html.contains("Tabela T2: sem produtos para exibir com os filtros aplicados."));
        assert!(html.contains("<option value=\"Todas\" selected>"));
    }

    #[test]
    fn test_fatal_page_lists_drivers() {
        let html = render_fatal("connection refused", &["postgres".to_string()]);
        assert!(html.contains("Erro ao conectar/ler o banco de dados"));
        assert!(html.contains("connection refused"));
        assert!(html.contains("Drivers instalados: [&quot;postgres&quot;]"));
        assert!(!html.contains("<table>"));
    }
}
