// src/handlers/relatorios.rs

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::{csv, pagina, pdf},
    middleware::auth::AuthenticatedUser,
    models::relatorio::{
        CustoCategoria, FiltroPeriodo, FiltroProjeto, FolhaPagamento, Formato,
        LucratividadeProjeto, Periodo,
    },
    services::document_service,
    views,
};

fn periodo(filtro: &FiltroPeriodo) -> Result<Periodo, AppError> {
    Periodo::from_filtro(filtro, Periodo::hoje()).map_err(AppError::InvalidInput)
}

// GET /relatorios
pub async fn index(AuthenticatedUser(user): AuthenticatedUser) -> Result<Response, AppError> {
    Ok(views::render("relatorios/index", &pagina(&user, "relatorios", "Relatórios", json!({})))?
        .into_response())
}

// GET /relatorios/lucratividade
pub async fn lucratividade(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filtro): Query<FiltroProjeto>,
) -> Result<Response, AppError> {
    let linhas = app_state.relatorio_service.lucratividade(filtro.projeto_id).await?;

    match filtro.formato {
        Formato::Csv => Ok(csv(
            "lucratividade.csv",
            document_service::csv_lucratividade(&linhas),
        )),
        Formato::Pdf => {
            let bytes = app_state.document_service.pdf_lucratividade(linhas).await?;
            Ok(pdf("lucratividade.pdf", bytes))
        }
        Formato::Html => {
            let projetos = app_state.projetos.list(None).await?;
            let total_receita: f64 = linhas.iter().map(|l| l.receita).sum();
            let total_lucro: f64 = linhas.iter().map(|l| l.lucro).sum();
            Ok(views::render(
                "relatorios/lucratividade",
                &pagina(
                    &user,
                    "relatorios",
                    "Lucratividade por projeto",
                    json!({
                        "linhas": linhas,
                        "projetos": projetos,
                        "projeto_id": filtro.projeto_id,
                        "total_receita": total_receita,
                        "total_lucro": total_lucro,
                    }),
                ),
            )?
            .into_response())
        }
    }
}

// GET /relatorios/custos
pub async fn custos(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filtro): Query<FiltroProjeto>,
) -> Result<Response, AppError> {
    let linhas = app_state.relatorio_service.custos(filtro.projeto_id).await?;

    match filtro.formato {
        Formato::Csv => Ok(csv("custos.csv", document_service::csv_custos(&linhas))),
        Formato::Pdf => {
            let bytes = app_state.document_service.pdf_custos(linhas).await?;
            Ok(pdf("custos.pdf", bytes))
        }
        Formato::Html => {
            let projetos = app_state.projetos.list(None).await?;
            let total: f64 = linhas.iter().map(|l| l.total).sum();
            Ok(views::render(
                "relatorios/custos",
                &pagina(
                    &user,
                    "relatorios",
                    "Custos por categoria",
                    json!({
                        "linhas": linhas,
                        "projetos": projetos,
                        "projeto_id": filtro.projeto_id,
                        "total": total,
                    }),
                ),
            )?
            .into_response())
        }
    }
}

// GET /relatorios/folha
pub async fn folha(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filtro): Query<FiltroPeriodo>,
) -> Result<Response, AppError> {
    let periodo = periodo(&filtro)?;
    let folha = app_state.relatorio_service.folha(&periodo).await?;

    match filtro.formato {
        Formato::Csv => Ok(csv(
            &format!("folha_{}_{}.csv", folha.inicio, folha.fim),
            document_service::csv_folha(&folha),
        )),
        Formato::Pdf => {
            let nome = format!("folha_{}_{}.pdf", folha.inicio, folha.fim);
            let bytes = app_state.document_service.pdf_folha(folha).await?;
            Ok(pdf(&nome, bytes))
        }
        Formato::Html => Ok(views::render(
            "relatorios/folha",
            &pagina(&user, "relatorios", "Folha de pagamento", json!({ "folha": folha })),
        )?
        .into_response()),
    }
}

// =============================================================================
//  API JSON
// =============================================================================

// GET /api/relatorios/lucratividade
#[utoipa::path(
    get,
    path = "/api/relatorios/lucratividade",
    tag = "Relatórios",
    params(FiltroProjeto),
    responses(
        (status = 200, description = "Receita, custos, lucro e margem por projeto", body = Vec<LucratividadeProjeto>),
        (status = 303, description = "Sem sessão: redireciona para /login")
    ),
    security(("sessao" = []))
)]
pub async fn api_lucratividade(
    State(app_state): State<AppState>,
    Query(filtro): Query<FiltroProjeto>,
) -> Result<Json<Vec<LucratividadeProjeto>>, ApiError> {
    Ok(Json(app_state.relatorio_service.lucratividade(filtro.projeto_id).await?))
}

// GET /api/relatorios/custos
#[utoipa::path(
    get,
    path = "/api/relatorios/custos",
    tag = "Relatórios",
    params(FiltroProjeto),
    responses(
        (status = 200, description = "Custos agrupados por categoria, com percentual", body = Vec<CustoCategoria>)
    ),
    security(("sessao" = []))
)]
pub async fn api_custos(
    State(app_state): State<AppState>,
    Query(filtro): Query<FiltroProjeto>,
) -> Result<Json<Vec<CustoCategoria>>, ApiError> {
    Ok(Json(app_state.relatorio_service.custos(filtro.projeto_id).await?))
}

// GET /api/relatorios/folha
#[utoipa::path(
    get,
    path = "/api/relatorios/folha",
    tag = "Relatórios",
    params(FiltroPeriodo),
    responses(
        (status = 200, description = "Folha de pagamento do período", body = FolhaPagamento),
        (status = 400, description = "Período inválido")
    ),
    security(("sessao" = []))
)]
pub async fn api_folha(
    State(app_state): State<AppState>,
    Query(filtro): Query<FiltroPeriodo>,
) -> Result<Json<FolhaPagamento>, ApiError> {
    let periodo = periodo(&filtro)?;
    Ok(Json(app_state.relatorio_service.folha(&periodo).await?))
}
