// src/views.rs
//
// Páginas HTML renderizadas no servidor com Handlebars. Os templates entram no
// binário em tempo de compilação e são registrados uma única vez.

use axum::{http::StatusCode, response::Html};
use chrono::NaiveDate;
use handlebars::{handlebars_helper, Handlebars};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::common::error::AppError;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout", include_str!("../templates/layout.hbs")),
    ("login", include_str!("../templates/login.hbs")),
    ("erro", include_str!("../templates/erro.hbs")),
    ("dashboard", include_str!("../templates/dashboard.hbs")),
    ("clientes/lista", include_str!("../templates/clientes/lista.hbs")),
    ("clientes/form", include_str!("../templates/clientes/form.hbs")),
    ("clientes/detalhe", include_str!("../templates/clientes/detalhe.hbs")),
    ("projetos/lista", include_str!("../templates/projetos/lista.hbs")),
    ("projetos/form", include_str!("../templates/projetos/form.hbs")),
    ("projetos/detalhe", include_str!("../templates/projetos/detalhe.hbs")),
    ("funcionarios/lista", include_str!("../templates/funcionarios/lista.hbs")),
    ("funcionarios/form", include_str!("../templates/funcionarios/form.hbs")),
    ("funcionarios/detalhe", include_str!("../templates/funcionarios/detalhe.hbs")),
    ("orcamentos/lista", include_str!("../templates/orcamentos/lista.hbs")),
    ("orcamentos/form", include_str!("../templates/orcamentos/form.hbs")),
    ("orcamentos/detalhe", include_str!("../templates/orcamentos/detalhe.hbs")),
    ("relatorios/index", include_str!("../templates/relatorios/index.hbs")),
    ("relatorios/lucratividade", include_str!("../templates/relatorios/lucratividade.hbs")),
    ("relatorios/custos", include_str!("../templates/relatorios/custos.hbs")),
    ("relatorios/folha", include_str!("../templates/relatorios/folha.hbs")),
    ("ia", include_str!("../templates/ia.hbs")),
    ("usuarios/lista", include_str!("../templates/usuarios/lista.hbs")),
    ("usuarios/form", include_str!("../templates/usuarios/form.hbs")),
];

/// "R$ 1.234,56" (negativos com sinal na frente).
pub fn formatar_moeda(valor: f64) -> String {
    let centavos = (valor.abs() * 100.0).round() as u64;
    let digitos = (centavos / 100).to_string();

    let mut inteiro = String::with_capacity(digitos.len() + digitos.len() / 3);
    for (i, c) in digitos.chars().enumerate() {
        if i > 0 && (digitos.len() - i) % 3 == 0 {
            inteiro.push('.');
        }
        inteiro.push(c);
    }

    let sinal = if valor < 0.0 && centavos > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sinal, inteiro, centavos % 100)
}

/// AAAA-MM-DD (com ou sem hora) vira DD/MM/AAAA; outros textos passam intactos.
pub fn formatar_data(valor: &str) -> String {
    valor
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| valor.to_string())
}

/// Rótulo legível dos códigos de status e categoria gravados no banco.
pub fn status_label(codigo: &str) -> String {
    match codigo {
        "pendente" => "Pendente",
        "em_andamento" => "Em andamento",
        "concluido" => "Concluído",
        "cancelado" => "Cancelado",
        "rascunho" => "Rascunho",
        "enviado" => "Enviado",
        "aprovado" => "Aprovado",
        "rejeitado" => "Rejeitado",
        "material" => "Material",
        "ferramenta" => "Ferramenta",
        "transporte" => "Transporte",
        "alimentacao" => "Alimentação",
        "outros" => "Outros",
        "mao_de_obra" => "Mão de obra",
        "admin" => "Administrador",
        "usuario" => "Usuário",
        outro => outro,
    }
    .to_string()
}

handlebars_helper!(moeda: |v: Json| formatar_moeda(v.as_f64().unwrap_or(0.0)));
handlebars_helper!(data: |v: Json| v.as_str().map(formatar_data).unwrap_or_default());
handlebars_helper!(status_helper: |v: Json| v.as_str().map(status_label).unwrap_or_default());
handlebars_helper!(percentual: |v: Json| {
    format!("{:.1}%", v.as_f64().unwrap_or(0.0)).replace('.', ",")
});

/// Helpers compartilhados pelas páginas e pelo prompt da IA. `eq` já vem
/// embutido no Handlebars.
pub fn register_helpers(hb: &mut Handlebars<'_>) {
    hb.register_helper("moeda", Box::new(moeda));
    hb.register_helper("data", Box::new(data));
    hb.register_helper("status_label", Box::new(status_helper));
    hb.register_helper("percentual", Box::new(percentual));
}

static REGISTRY: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut hb = Handlebars::new();
    register_helpers(&mut hb);
    for (name, source) in TEMPLATES {
        if let Err(e) = hb.register_template_string(name, source) {
            tracing::error!("Template '{}' inválido: {}", name, e);
        }
    }
    hb
});

pub fn render(name: &str, ctx: &Value) -> Result<Html<String>, AppError> {
    Ok(Html(REGISTRY.render(name, ctx)?))
}

/// Página de erro. Nunca falha: se o template quebrar, cai para HTML simples.
pub fn error_page(status: StatusCode, mensagem: &str, detalhes: &[String]) -> Html<String> {
    let ctx = json!({
        "titulo": "Erro",
        "codigo": status.as_u16(),
        "mensagem": mensagem,
        "detalhes": detalhes,
    });
    match REGISTRY.render("erro", &ctx) {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::error!("Falha ao renderizar página de erro: {}", e);
            Html(format!(
                "<!doctype html><h1>Erro {}</h1><p>{}</p>",
                status.as_u16(),
                handlebars::html_escape(mensagem)
            ))
        }
    }
}
