pub mod auth;
pub mod clientes;
pub mod dashboard;
pub mod funcionarios;
pub mod health;
pub mod ia;
pub mod orcamentos;
pub mod projetos;
pub mod relatorios;
pub mod usuarios;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};

use crate::{models::auth::Usuario, views::status_label};

/// Contexto comum das páginas: usuário logado, item de menu e título.
pub(crate) fn pagina(usuario: &Usuario, menu: &str, titulo: &str, mut dados: Value) -> Value {
    if let Value::Object(map) = &mut dados {
        map.insert("usuario".into(), json!(usuario));
        map.insert("menu".into(), json!(menu));
        map.insert("titulo".into(), json!(titulo));
    }
    dados
}

/// Opções de um `<select>` a partir dos códigos gravados no banco.
pub(crate) fn opcoes<'a>(codigos: impl IntoIterator<Item = &'a str>) -> Vec<Value> {
    codigos
        .into_iter()
        .map(|c| json!({ "valor": c, "rotulo": status_label(c) }))
        .collect()
}

/// Resposta de download (CSV/PDF).
pub(crate) fn arquivo(content_type: &'static str, nome: &str, corpo: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", nome)),
    ];
    (headers, corpo).into_response()
}

pub(crate) fn csv(nome: &str, conteudo: String) -> Response {
    arquivo("text/csv; charset=utf-8", nome, conteudo.into_bytes())
}

pub(crate) fn pdf(nome: &str, bytes: Vec<u8>) -> Response {
    arquivo("application/pdf", nome, bytes)
}
