//! Seed content for the sales report example
//!
//! One template (`RelatorioVendas`), the nine fields its placeholders refer
//! to, and nine sample data rows.

/// Template row inserted by the seed phase
#[derive(Debug, Clone, Copy)]
pub struct SeedTemplate {
    pub name: &'static str,
    pub css: &'static str,
    pub header_html: &'static str,
    pub body_html: &'static str,
    pub footer_html: &'static str,
}

/// Field row, attached to its template by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedField {
    pub field_name: &'static str,
    pub label: &'static str,
    pub section: &'static str,
    pub field_type: &'static str,
    pub display_order: i32,
    pub required: bool,
}

/// Free-standing data row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedDatum {
    pub field_name: &'static str,
    pub value: &'static str,
}

pub const SALES_TEMPLATE_NAME: &str = "RelatorioVendas";

pub const SALES_TEMPLATE: SeedTemplate = SeedTemplate {
    name: SALES_TEMPLATE_NAME,
    css: concat!(
        "body { font-family: Arial, sans-serif; font-size: 12px; margin: 20px; color: #333; } \n",
        "             h1 { color: #FF6600; margin-bottom: 5px; } \n",
        "             .header { text-align: center; border-bottom: 2px solid #FF6600; padding-bottom: 10px; margin-bottom: 20px; }\n",
        "             .info { background: #f9f9f9; padding: 10px; border-left: 4px solid #FF6600; margin-bottom: 15px; }\n",
        "             .table { width: 100%; border-collapse: collapse; margin-top: 15px; }\n",
        "             .table th { background: #FF6600; color: white; padding: 8px; text-align: left; }\n",
        "             .table td { padding: 8px; border-bottom: 1px solid #ddd; }\n",
        "             .footer { text-align: center; margin-top: 30px; font-size: 10px; color: #666; border-top: 1px solid #ccc; padding-top: 10px; }",
    ),
    header_html: r#"<div class="header"><h1>Relatório de Vendas - {{Periodo}}</h1><p>{{Empresa}}</p></div>"#,
    body_html: concat!(
        r#"<div class="info"><p><strong>Vendedor:</strong> {{Vendedor}}</p><p><strong>Região:</strong> {{Regiao}}</p><p><strong>Total:</strong> {{TotalVendas}}</p></div>"#,
        "\n             ",
        r#"<table class="table"><thead><tr><th>Produto</th><th>Quantidade</th><th>Valor</th></tr></thead><tbody><tr><td>{{Produto}}</td><td>{{Quantidade}}</td><td>{{Valor}}</td></tr></tbody></table>"#,
    ),
    footer_html: r#"<div class="footer"><p>Gerado em {{DataGeracao}} por DynamicReportEngine</p></div>"#,
};

const fn field(
    field_name: &'static str,
    label: &'static str,
    section: &'static str,
    field_type: &'static str,
    display_order: i32,
    required: bool,
) -> SeedField {
    SeedField {
        field_name,
        label,
        section,
        field_type,
        display_order,
        required,
    }
}

pub const SALES_FIELDS: [SeedField; 9] = [
    field("Periodo", "Período", "Header", "Texto", 1, true),
    field("Empresa", "Nome da Empresa", "Header", "Texto", 2, true),
    field("Vendedor", "Nome do Vendedor", "Body", "Texto", 3, true),
    field("Regiao", "Região de Vendas", "Body", "Texto", 4, false),
    field("TotalVendas", "Total de Vendas (R$)", "Body", "Moeda", 5, true),
    field("Produto", "Nome do Produto", "Body", "Texto", 6, false),
    field("Quantidade", "Quantidade Vendida", "Body", "Numero", 7, false),
    field("Valor", "Valor Unitário", "Body", "Moeda", 8, false),
    field("DataGeracao", "Data de Geração", "Footer", "Data", 9, true),
];

pub const SALES_DATA: [SeedDatum; 9] = [
    SeedDatum { field_name: "Periodo", value: "Janeiro/2024" },
    SeedDatum { field_name: "Empresa", value: "TechCorp Ltda" },
    SeedDatum { field_name: "Vendedor", value: "João Silva" },
    SeedDatum { field_name: "Regiao", value: "Sudeste" },
    SeedDatum { field_name: "TotalVendas", value: "R$ 45.320,00" },
    SeedDatum { field_name: "Produto", value: "Notebook Dell Inspiron 15" },
    SeedDatum { field_name: "Quantidade", value: "12" },
    SeedDatum { field_name: "Valor", value: "R$ 3.200,00" },
    SeedDatum { field_name: "DataGeracao", value: "2024-01-31 14:30:00" },
];
