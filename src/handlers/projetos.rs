// src/handlers/projetos.rs

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::{error::AppError, form::blank_as_none},
    config::AppState,
    handlers::{opcoes, pagina},
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Usuario,
        projeto::{GastoCategoria, GastoPayload, Projeto, ProjetoPayload, ProjetoStatus},
        relatorio::Periodo,
    },
    views,
};

const CATEGORIAS_GASTO: [GastoCategoria; 5] = [
    GastoCategoria::Material,
    GastoCategoria::Ferramenta,
    GastoCategoria::Transporte,
    GastoCategoria::Alimentacao,
    GastoCategoria::Outros,
];

#[derive(Debug, Deserialize)]
pub struct FiltroStatus {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<String>,
}

fn statuses() -> Vec<Value> {
    opcoes(ProjetoStatus::ALL.iter().map(|s| s.as_str()))
}

async fn buscar(app_state: &AppState, id: i64) -> Result<Projeto, AppError> {
    app_state
        .projetos
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Projeto".into()))
}

async fn formulario(
    app_state: &AppState,
    user: &Usuario,
    projeto: Option<Projeto>,
) -> Result<Html<String>, AppError> {
    let clientes = app_state.clientes.list().await?;
    let (titulo, acao, status_atual) = match &projeto {
        Some(p) => ("Editar projeto", format!("/projetos/{}", p.id), p.status.clone()),
        None => (
            "Novo projeto",
            "/projetos".to_string(),
            ProjetoStatus::Pendente.as_str().to_string(),
        ),
    };
    views::render(
        "projetos/form",
        &pagina(
            user,
            "projetos",
            titulo,
            json!({
                "projeto": projeto,
                "clientes": clientes,
                "statuses": statuses(),
                "status_atual": status_atual,
                "acao": acao,
            }),
        ),
    )
}

// GET /projetos
pub async fn lista(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filtro): Query<FiltroStatus>,
) -> Result<Html<String>, AppError> {
    // Status desconhecido vale como "todos"
    let status = filtro
        .status
        .as_deref()
        .filter(|s| ProjetoStatus::ALL.iter().any(|p| p.as_str() == *s));

    let projetos = app_state.projetos.list(status).await?;
    views::render(
        "projetos/lista",
        &pagina(
            &user,
            "projetos",
            "Projetos",
            json!({ "projetos": projetos, "statuses": statuses(), "status_filtro": status }),
        ),
    )
}

// GET /projetos/novo
pub async fn novo(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Html<String>, AppError> {
    formulario(&app_state, &user, None).await
}

// POST /projetos
pub async fn criar(
    State(app_state): State<AppState>,
    Form(payload): Form<ProjetoPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    let projeto = app_state.projetos.create(&payload).await?;
    tracing::info!("Projeto #{} ({}) criado", projeto.id, projeto.nome);
    Ok(Redirect::to(&format!("/projetos/{}", projeto.id)))
}

// GET /projetos/{id}
pub async fn detalhe(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let projeto = buscar(&app_state, id).await?;
    let gastos = app_state.projetos.list_gastos(id).await?;
    let trabalhos = app_state.funcionarios.list_trabalhos_do_projeto(id).await?;
    let lucratividade = app_state
        .relatorio_service
        .lucratividade(Some(id))
        .await?
        .into_iter()
        .next();

    let titulo = projeto.nome.clone();
    views::render(
        "projetos/detalhe",
        &pagina(
            &user,
            "projetos",
            &titulo,
            json!({
                "projeto": projeto,
                "gastos": gastos,
                "trabalhos": trabalhos,
                "lucratividade": lucratividade,
                "categorias_gasto": opcoes(CATEGORIAS_GASTO.iter().map(|c| c.as_str())),
                "hoje": Periodo::hoje().format("%Y-%m-%d").to_string(),
            }),
        ),
    )
}

// GET /projetos/{id}/editar
pub async fn editar(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let projeto = buscar(&app_state, id).await?;
    formulario(&app_state, &user, Some(projeto)).await
}

// POST /projetos/{id}
pub async fn atualizar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Form(payload): Form<ProjetoPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    app_state
        .projetos
        .update(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Projeto".into()))?;
    Ok(Redirect::to(&format!("/projetos/{}", id)))
}

// POST /projetos/{id}/excluir
pub async fn excluir(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if app_state.projetos.delete(id).await? == 0 {
        return Err(AppError::NotFound("Projeto".into()));
    }
    tracing::info!("Projeto #{} excluído (gastos e trabalhos em cascata)", id);
    Ok(Redirect::to("/projetos"))
}

// =============================================================================
//  GASTOS
// =============================================================================

// POST /projetos/{id}/gastos
pub async fn criar_gasto(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Form(payload): Form<GastoPayload>,
) -> Result<Redirect, AppError> {
    payload.validate()?;
    buscar(&app_state, id).await?;
    app_state.projetos.create_gasto(id, &payload).await?;
    Ok(Redirect::to(&format!("/projetos/{}", id)))
}

// POST /projetos/{id}/gastos/{gasto_id}/excluir
pub async fn excluir_gasto(
    State(app_state): State<AppState>,
    Path((id, gasto_id)): Path<(i64, i64)>,
) -> Result<Redirect, AppError> {
    if app_state.projetos.delete_gasto(id, gasto_id).await? == 0 {
        return Err(AppError::NotFound("Gasto".into()));
    }
    Ok(Redirect::to(&format!("/projetos/{}", id)))
}
